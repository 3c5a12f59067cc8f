//! Shared primitive types used across the entire engine.

/// The canonical game identifier. Every action is addressed by one.
pub type GameId = String;

/// A validated player identity, supplied by the caller.
pub type PlayerId = String;

/// A board position, 0..BOARD_SIZE. Ownable tiles are addressed by index too.
pub type TileIndex = u8;

/// Cash amounts. Signed so a shortfall can be computed without wrapping.
pub type Cash = i64;

/// The global turn counter.
pub type TurnNumber = u64;

/// Number of tiles on every board.
pub const BOARD_SIZE: u8 = 40;
