use crate::{
    engine::{
        BankruptcyReport, BuildReceipt, JailExit, MortgageReceipt, MoveSummary, PurchaseReceipt,
        TileEffect, TurnSummary,
    },
    types::{GameId, PlayerId, TileIndex, TurnNumber},
};
use serde::{Deserialize, Serialize};

/// All player-issued actions, as they travel over IPC and into the
/// command log. Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum GameCommand {
    RollAndMove { roll_index: u64 },
    ResolveTile,
    PurchaseProperty { property: TileIndex },
    BuildOnProperty { property: TileIndex },
    SellBuilding { property: TileIndex },
    MortgageProperty { property: TileIndex },
    UnmortgageProperty { property: TileIndex },
    PayJailFine,
    UseJailCard,
    DeclareBankruptcy,
    AdvanceTurn,
}

impl GameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RollAndMove { .. }        => "roll_and_move",
            Self::ResolveTile               => "resolve_tile",
            Self::PurchaseProperty { .. }   => "purchase_property",
            Self::BuildOnProperty { .. }    => "build_on_property",
            Self::SellBuilding { .. }       => "sell_building",
            Self::MortgageProperty { .. }   => "mortgage_property",
            Self::UnmortgageProperty { .. } => "unmortgage_property",
            Self::PayJailFine               => "pay_jail_fine",
            Self::UseJailCard               => "use_jail_card",
            Self::DeclareBankruptcy         => "declare_bankruptcy",
            Self::AdvanceTurn               => "advance_turn",
        }
    }
}

/// The detail of an accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "report", content = "detail", rename_all = "snake_case")]
pub enum ActionReport {
    Moved(MoveSummary),
    TileResolved(TileEffect),
    Purchased(PurchaseReceipt),
    Built(BuildReceipt),
    Sold(BuildReceipt),
    Mortgaged(MortgageReceipt),
    Unmortgaged(MortgageReceipt),
    LeftJail(JailExit),
    Bankrupt(BankruptcyReport),
    TurnAdvanced(TurnSummary),
}

/// A command as persisted, accepted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub game_id:  GameId,
    pub turn:     TurnNumber,
    pub actor:    PlayerId,
    pub command:  GameCommand,
    /// The rejection message when the command was refused.
    pub rejected: Option<String>,
}
