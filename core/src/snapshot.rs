//! Snapshot serialization: full game state to/from JSON.
//!
//! A snapshot captures everything needed to resume a game from that turn
//! without replaying its command log.

use crate::{
    error::{GameError, GameResult},
    state::GameState,
    types::{GameId, TurnNumber},
};
use serde::{Deserialize, Serialize};

/// Bumped whenever the serialized shape of GameState changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Turns between routine snapshots in long sessions.
pub const SNAPSHOT_INTERVAL: TurnNumber = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version:      u32,
    pub game_id:      GameId,
    pub turn_counter: TurnNumber,
    pub state:        GameState,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            version:      SNAPSHOT_VERSION,
            game_id:      state.game_id.clone(),
            turn_counter: state.turn_counter,
            state:        state.clone(),
        }
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GameError::Other(anyhow::anyhow!(
                "Snapshot version {} not supported (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}
