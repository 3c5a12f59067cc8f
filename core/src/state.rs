use crate::{
    board::Board,
    cards::{DeckKind, DeckState},
    dice::DiceRoll,
    ledger::{BankLedger, PlayerState},
    registry::PropertyRegistry,
    types::{Cash, GameId, PlayerId, TileIndex, TurnNumber},
};
use serde::{Deserialize, Serialize};

/// Per-actor turn phase. `AwaitingCardResolution` and `AwaitingWinCheck`
/// are passed through inside a single action and only show up in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingJailResolution,
    AwaitingMove,
    AwaitingTileResolution,
    AwaitingBuildDecision,
    AwaitingCardResolution,
    AwaitingWinCheck,
    TurnAdvance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    LastPlayerStanding,
    PropertyDominance,
}

/// One entry of the ranking reported on a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthRank {
    pub player:         PlayerId,
    pub cash:           Cash,
    pub property_value: Cash,
    pub building_value: Cash,
    pub total:          Cash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameStatus {
    Lobby,
    InProgress,
    GameOver { winner: PlayerId, reason: WinReason },
    Drawn { rankings: Vec<WealthRank> },
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver { .. } | Self::Drawn { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum Creditor {
    Bank,
    Player(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DebtReason {
    Rent { property: TileIndex },
    Tax { tile: TileIndex },
    JailFine,
    Card,
}

/// An involuntary debit the debtor could not cover from cash alone.
/// While one is pending the debtor may only liquidate or concede.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDebt {
    pub debtor:   PlayerId,
    pub creditor: Creditor,
    pub amount:   Cash,
    pub reason:   DebtReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id:      GameId,
    /// Turn order; insertion order at join. Bankrupt players stay in place.
    pub players:      Vec<PlayerState>,
    pub registry:     PropertyRegistry,
    /// Rotation slots passed since start. Never decreases.
    pub turn_index:   u64,
    /// Always `turn_index % players.len()`.
    pub actor_index:  usize,
    /// Completed actor turns.
    pub turn_counter: TurnNumber,
    pub phase:        TurnPhase,
    pub status:       GameStatus,
    pub chance:       DeckState,
    pub community:    DeckState,
    pub initialized:  bool,
    pub pending_debt: Option<PendingDebt>,
    pub last_roll:    Option<DiceRoll>,
    pub bank:         BankLedger,
    pub deck_seed:    u64,
}

impl GameState {
    pub fn new(game_id: GameId, board: &Board) -> Self {
        Self {
            game_id,
            players: Vec::new(),
            registry: PropertyRegistry::new(board),
            turn_index: 0,
            actor_index: 0,
            turn_counter: 0,
            phase: TurnPhase::AwaitingJailResolution,
            status: GameStatus::Lobby,
            chance: DeckState::unshuffled(DeckKind::Chance),
            community: DeckState::unshuffled(DeckKind::CommunityChest),
            initialized: false,
            pending_debt: None,
            last_roll: None,
            bank: BankLedger::default(),
            deck_seed: 0,
        }
    }

    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_index(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn current_actor(&self) -> Option<&PlayerState> {
        self.players.get(self.actor_index)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|p| !p.bankrupt)
    }

    pub fn deck_mut(&mut self, kind: DeckKind) -> &mut DeckState {
        match kind {
            DeckKind::Chance         => &mut self.chance,
            DeckKind::CommunityChest => &mut self.community,
        }
    }

    pub fn total_player_cash(&self) -> Cash {
        self.players.iter().map(|p| p.cash).sum()
    }

    /// Give `property` to `owner`, keeping mortgage and building state.
    /// Updates the previous owner's index as well.
    pub fn assign_property(&mut self, property: TileIndex, owner: &str) {
        let Some(entry) = self.registry.get_mut(property) else { return };
        let previous = entry.owner.replace(owner.to_string());
        let buildings = entry.buildings;

        if let Some(previous) = previous.and_then(|id| self.player_mut(&id)) {
            previous.owned.remove(&property);
            previous.buildings.remove(&property);
        }
        if let Some(player) = self.player_mut(owner) {
            player.owned.insert(property);
            if buildings > 0 {
                player.buildings.insert(property, buildings);
            }
        }
    }

    /// Return `property` to the unowned pool, clearing mortgage and
    /// buildings.
    pub fn release_property(&mut self, property: TileIndex) {
        let Some(entry) = self.registry.get_mut(property) else { return };
        let previous = entry.owner.take();
        entry.mortgaged = false;
        entry.buildings = 0;

        if let Some(previous) = previous.and_then(|id| self.player_mut(&id)) {
            previous.owned.remove(&property);
            previous.buildings.remove(&property);
        }
    }

    pub fn set_buildings(&mut self, property: TileIndex, count: u8) {
        let Some(entry) = self.registry.get_mut(property) else { return };
        entry.buildings = count;
        let owner = entry.owner.clone();

        if let Some(player) = owner.and_then(|id| self.player_mut(&id)) {
            if count == 0 {
                player.buildings.remove(&property);
            } else {
                player.buildings.insert(property, count);
            }
        }
    }

    pub fn set_mortgaged(&mut self, property: TileIndex, mortgaged: bool) {
        if let Some(entry) = self.registry.get_mut(property) {
            entry.mortgaged = mortgaged;
        }
    }
}
