//! Win evaluation. Pure functions of a state; the engine applies the result.

use crate::{
    board::Board,
    config::GameConfig,
    state::{GameState, GameStatus, WealthRank, WinReason},
    types::{PlayerId, TurnNumber},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WinnerReport {
    InProgress { turn_counter: TurnNumber },
    Winner { player: PlayerId, reason: WinReason },
    Draw { rankings: Vec<WealthRank> },
}

impl WinnerReport {
    /// The report for a terminal status, None while the game runs.
    pub fn from_status(status: &GameStatus) -> Option<Self> {
        match status {
            GameStatus::GameOver { winner, reason } => Some(Self::Winner {
                player: winner.clone(),
                reason: *reason,
            }),
            GameStatus::Drawn { rankings } => Some(Self::Draw { rankings: rankings.clone() }),
            GameStatus::Lobby | GameStatus::InProgress => None,
        }
    }
}

/// The terminal status the state has reached, if any.
///
/// Priority: last player standing, then property dominance in turn
/// order, then a draw once `max_turns` turns have been played.
pub fn evaluate(state: &GameState, board: &Board, config: &GameConfig) -> Option<GameStatus> {
    if !state.initialized || state.players.is_empty() {
        return None;
    }

    let mut active = state.active_players();
    if let (Some(last), None) = (active.next(), active.next()) {
        return Some(GameStatus::GameOver {
            winner: last.id.clone(),
            reason: WinReason::LastPlayerStanding,
        });
    }

    if let Some(dominant) = state
        .active_players()
        .find(|p| p.owned.len() >= config.win_property_threshold)
    {
        return Some(GameStatus::GameOver {
            winner: dominant.id.clone(),
            reason: WinReason::PropertyDominance,
        });
    }

    if state.turn_counter >= config.max_turns {
        return Some(GameStatus::Drawn { rankings: rankings(state, board) });
    }

    None
}

/// Non-bankrupt players by total wealth, richest first. Ties keep turn
/// order.
pub fn rankings(state: &GameState, board: &Board) -> Vec<WealthRank> {
    let mut ranks: Vec<WealthRank> = state
        .active_players()
        .map(|player| {
            let (property_value, building_value) = player
                .owned
                .iter()
                .filter_map(|&id| board.property(id).map(|def| (id, def)))
                .fold((0, 0), |(face, built), (id, def)| {
                    let count = state.registry.buildings_on(id);
                    (face + def.price, built + def.building_value(count))
                });
            WealthRank {
                player: player.id.clone(),
                cash: player.cash,
                property_value,
                building_value,
                total: player.cash + property_value + building_value,
            }
        })
        .collect();
    ranks.sort_by(|a, b| b.total.cmp(&a.total));
    ranks
}
