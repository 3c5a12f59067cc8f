//! Economic invariants: bug detectors, not gameplay limits.
//!
//! Every state the engine returns must pass these checks. They are run by
//! the property tests after every accepted action and by the runner at
//! the end of a session.

use crate::{
    board::{Board, PropertyKind},
    registry::MAX_BUILDINGS,
    state::GameState,
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    pub message: String,
}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all invariants. Returns every violation found, empty if all hold.
#[must_use]
pub fn check_invariants(state: &GameState, board: &Board) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for player in &state.players {
        if player.cash < 0 {
            violations.push(violation(format!("Player {} has negative cash {}", player.id, player.cash)));
        }
        if player.bankrupt && (!player.owned.is_empty() || player.cash != 0) {
            violations.push(violation(format!(
                "Bankrupt player {} still holds {} tiles and {} cash",
                player.id,
                player.owned.len(),
                player.cash
            )));
        }
        for &id in &player.owned {
            if state.registry.owner_of(id) != Some(player.id.as_str()) {
                violations.push(violation(format!(
                    "Player {} lists tile {id} but the registry disagrees",
                    player.id
                )));
            }
        }
    }

    let mut groups: BTreeMap<_, Vec<u8>> = BTreeMap::new();
    for property in state.registry.iter() {
        let Some(def) = board.property(property.id) else {
            violations.push(violation(format!("Registry holds non-property tile {}", property.id)));
            continue;
        };
        groups.entry(def.group).or_default().push(property.buildings);

        if property.mortgaged && property.buildings > 0 {
            violations.push(violation(format!(
                "Tile {} is mortgaged with {} buildings",
                property.id, property.buildings
            )));
        }
        if property.buildings > MAX_BUILDINGS
            || (property.buildings > 0 && def.kind() != PropertyKind::Street)
        {
            violations.push(violation(format!(
                "Tile {} carries an impossible {} buildings",
                property.id, property.buildings
            )));
        }

        match property.owner.as_deref() {
            Some(owner) => {
                let Some(player) = state.player(owner) else {
                    violations.push(violation(format!("Tile {} owned by unknown {owner}", property.id)));
                    continue;
                };
                if !player.owned.contains(&property.id) {
                    violations.push(violation(format!(
                        "Tile {} owned by {owner} but missing from their set",
                        property.id
                    )));
                }
                if player.building_count(property.id) != property.buildings {
                    violations.push(violation(format!(
                        "Tile {} has {} buildings but {owner}'s index says {}",
                        property.id,
                        property.buildings,
                        player.building_count(property.id)
                    )));
                }
                if property.buildings > 0 && !state.registry.has_monopoly(board, owner, def.group) {
                    violations.push(violation(format!(
                        "Tile {} has buildings without a monopoly on {:?}",
                        property.id, def.group
                    )));
                }
            }
            None => {
                if property.mortgaged || property.buildings > 0 {
                    violations.push(violation(format!("Unowned tile {} is not pristine", property.id)));
                }
            }
        }
    }

    for (group, counts) in &groups {
        let min = counts.iter().min().copied().unwrap_or(0);
        let max = counts.iter().max().copied().unwrap_or(0);
        if max - min > 1 {
            violations.push(violation(format!("Group {group:?} built unevenly: {counts:?}")));
        }
    }

    if !state.players.is_empty() {
        let expected = (state.turn_index % state.players.len() as u64) as usize;
        if state.actor_index != expected {
            violations.push(violation(format!(
                "Actor index {} but turn index {} implies {expected}",
                state.actor_index, state.turn_index
            )));
        }
    }

    let held = state.total_player_cash();
    let expected = state.bank.expected_player_cash();
    if held != expected {
        violations.push(violation(format!(
            "Players hold {held} but the bank ledger accounts for {expected}"
        )));
    }

    violations
}
