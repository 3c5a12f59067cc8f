use crate::{
    state::TurnPhase,
    types::{Cash, GameId, PlayerId, TileIndex},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recoverable, side-effect-free rejection of a player action.
/// The state passed to the action is returned to the caller untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rejection", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Cash, available: Cash },

    #[error("Action not permitted in phase {phase:?}")]
    InvalidState { phase: TurnPhase },

    #[error("Tile {property} is not part of a monopoly held by the player")]
    NotAMonopoly { property: TileIndex },

    #[error("Building on tile {property} would break even build-up")]
    UnevenBuildup { property: TileIndex },

    #[error("Tile {property} or one of its group is mortgaged")]
    PropertyMortgaged { property: TileIndex },

    #[error("Tile {property} is already owned")]
    AlreadyOwned { property: TileIndex },

    #[error("Player does not own tile {property}")]
    NotOwner { property: TileIndex },

    #[error("Game is already over")]
    GameAlreadyOver,

    #[error("It is not {player}'s turn")]
    NotYourTurn { player: PlayerId },

    #[error("Unknown player '{player}'")]
    UnknownPlayer { player: PlayerId },

    #[error("Player '{player}' is bankrupt")]
    PlayerBankrupt { player: PlayerId },

    #[error("Tile {tile} is not an ownable property")]
    NotAProperty { tile: TileIndex },

    #[error("Tile {property} cannot carry buildings")]
    NotBuildable { property: TileIndex },

    #[error("Player is not standing on tile {property}")]
    NotOnProperty { property: TileIndex },

    #[error("Tile {property} already has a hotel")]
    MaxBuildings { property: TileIndex },

    #[error("Tile {property} has no buildings to sell")]
    NoBuildings { property: TileIndex },

    #[error("Tile {property} has buildings and cannot be mortgaged")]
    HasBuildings { property: TileIndex },

    #[error("Tile {property} is not mortgaged")]
    NotMortgaged { property: TileIndex },

    #[error("Player is not in jail")]
    NotInJail,

    #[error("Player holds no jail-escape card")]
    NoJailCard,

    #[error("Outstanding debt of {amount} must be settled first")]
    DebtOutstanding { amount: Cash },

    #[error("No debt is outstanding")]
    NoDebtOutstanding,

    #[error("Player '{player}' already joined")]
    DuplicatePlayer { player: PlayerId },

    #[error("Game is full ({max} players)")]
    TooManyPlayers { max: usize },

    #[error("Need at least {min} players, have {have}")]
    NotEnoughPlayers { min: usize, have: usize },
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Action rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Game '{game_id}' not found")]
    GameNotFound { game_id: GameId },

    #[error("Invalid board: {reason}")]
    InvalidBoard { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
