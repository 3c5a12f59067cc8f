//! Game events: the record of every state change.
//!
//! RULE: Every mutation an action applies is described by at least one
//! event in its outcome. Replaying a game's event log explains every
//! difference between two consecutive states.

use crate::{
    cards::{Card, DeckKind},
    dice::DiceRoll,
    state::{Creditor, DebtReason, TurnPhase, WealthRank, WinReason},
    types::{Cash, GameId, PlayerId, TileIndex, TurnNumber},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JailRelease {
    Doubles,
    Fine,
    Card,
}

/// Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Lifecycle ──────────────────────────────────
    GameCreated {
        game_id: GameId,
    },
    PlayerJoined {
        player: PlayerId,
        cash:   Cash,
    },
    GameStarted {
        players:   Vec<PlayerId>,
        deck_seed: u64,
    },
    PhaseChanged {
        from: TurnPhase,
        to:   TurnPhase,
    },
    TurnAdvanced {
        turn_counter: TurnNumber,
        actor:        PlayerId,
    },

    // ── Movement and jail ──────────────────────────
    DiceRolled {
        player: PlayerId,
        index:  u64,
        roll:   DiceRoll,
    },
    PlayerMoved {
        player:    PlayerId,
        from:      TileIndex,
        to:        TileIndex,
        passed_go: bool,
    },
    SalaryPaid {
        player: PlayerId,
        amount: Cash,
    },
    SentToJail {
        player: PlayerId,
    },
    JailEscapeFailed {
        player:        PlayerId,
        attempts_left: u8,
    },
    ReleasedFromJail {
        player: PlayerId,
        via:    JailRelease,
    },
    JailFinePaid {
        player: PlayerId,
        amount: Cash,
        forced: bool,
    },

    // ── Tiles and cards ────────────────────────────
    RentPaid {
        payer:    PlayerId,
        owner:    PlayerId,
        property: TileIndex,
        amount:   Cash,
    },
    RentWaived {
        player:   PlayerId,
        owner:    PlayerId,
        property: TileIndex,
    },
    TaxPaid {
        player: PlayerId,
        tile:   TileIndex,
        amount: Cash,
    },
    CardDrawn {
        player: PlayerId,
        deck:   DeckKind,
        card:   Card,
    },
    CardCashCollected {
        player: PlayerId,
        amount: Cash,
    },
    CardCashPaid {
        player: PlayerId,
        amount: Cash,
    },
    JailCardGranted {
        player: PlayerId,
    },

    // ── Property ───────────────────────────────────
    PropertyPurchased {
        player:   PlayerId,
        property: TileIndex,
        price:    Cash,
    },
    BuildingBuilt {
        player:    PlayerId,
        property:  TileIndex,
        buildings: u8,
        cost:      Cash,
    },
    BuildingSold {
        player:    PlayerId,
        property:  TileIndex,
        buildings: u8,
        refund:    Cash,
    },
    PropertyMortgaged {
        player:   PlayerId,
        property: TileIndex,
        loan:     Cash,
    },
    PropertyUnmortgaged {
        player:   PlayerId,
        property: TileIndex,
        cost:     Cash,
    },
    PropertyTransferred {
        property: TileIndex,
        from:     PlayerId,
        /// None when released to the bank.
        to:       Option<PlayerId>,
    },

    // ── Debt ───────────────────────────────────────
    DebtOutstanding {
        debtor:    PlayerId,
        creditor:  Creditor,
        amount:    Cash,
        shortfall: Cash,
        reason:    DebtReason,
    },
    DebtSettled {
        debtor:   PlayerId,
        creditor: Creditor,
        amount:   Cash,
        reason:   DebtReason,
    },
    PlayerBankrupt {
        player:   PlayerId,
        creditor: Creditor,
        cash:     Cash,
    },

    // ── Outcome ────────────────────────────────────
    GameWon {
        winner: PlayerId,
        reason: WinReason,
    },
    GameDrawn {
        rankings: Vec<WealthRank>,
    },
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub game_id:    GameId,
    pub turn:       TurnNumber,
    pub seq:        u32,
    pub event_type: String,
    pub payload:    String, // JSON-serialized GameEvent
}

/// Stable name of a GameEvent variant, for the event_type column.
pub fn event_type_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::GameCreated { .. }         => "game_created",
        GameEvent::PlayerJoined { .. }        => "player_joined",
        GameEvent::GameStarted { .. }         => "game_started",
        GameEvent::PhaseChanged { .. }        => "phase_changed",
        GameEvent::TurnAdvanced { .. }        => "turn_advanced",
        GameEvent::DiceRolled { .. }          => "dice_rolled",
        GameEvent::PlayerMoved { .. }         => "player_moved",
        GameEvent::SalaryPaid { .. }          => "salary_paid",
        GameEvent::SentToJail { .. }          => "sent_to_jail",
        GameEvent::JailEscapeFailed { .. }    => "jail_escape_failed",
        GameEvent::ReleasedFromJail { .. }    => "released_from_jail",
        GameEvent::JailFinePaid { .. }        => "jail_fine_paid",
        GameEvent::RentPaid { .. }            => "rent_paid",
        GameEvent::RentWaived { .. }          => "rent_waived",
        GameEvent::TaxPaid { .. }             => "tax_paid",
        GameEvent::CardDrawn { .. }           => "card_drawn",
        GameEvent::CardCashCollected { .. }   => "card_cash_collected",
        GameEvent::CardCashPaid { .. }        => "card_cash_paid",
        GameEvent::JailCardGranted { .. }     => "jail_card_granted",
        GameEvent::PropertyPurchased { .. }   => "property_purchased",
        GameEvent::BuildingBuilt { .. }       => "building_built",
        GameEvent::BuildingSold { .. }        => "building_sold",
        GameEvent::PropertyMortgaged { .. }   => "property_mortgaged",
        GameEvent::PropertyUnmortgaged { .. } => "property_unmortgaged",
        GameEvent::PropertyTransferred { .. } => "property_transferred",
        GameEvent::DebtOutstanding { .. }     => "debt_outstanding",
        GameEvent::DebtSettled { .. }         => "debt_settled",
        GameEvent::PlayerBankrupt { .. }      => "player_bankrupt",
        GameEvent::GameWon { .. }             => "game_won",
        GameEvent::GameDrawn { .. }           => "game_drawn",
    }
}
