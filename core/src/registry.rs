//! Property registry: ownership, mortgages and buildings per tile.
//!
//! RULE: Monopoly status is recomputed from ownership on every query.
//! Nothing here caches it, so a change of owner is visible immediately
//! to building permissions.
//!
//! The registry is the authoritative copy of building counts. The
//! per-player `buildings` map in the ledger is a derived index, kept in
//! step by the `GameState` helpers that mutate both.

use crate::{
    board::{Board, ColorGroup, PropertyDef, PropertyKind},
    error::Rejection,
    types::{Cash, PlayerId, TileIndex},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_BUILDINGS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState {
    pub id:        TileIndex,
    pub owner:     Option<PlayerId>,
    pub mortgaged: bool,
    /// 0 = none, 1–4 = houses, 5 = hotel.
    pub buildings: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRegistry {
    properties: BTreeMap<TileIndex, PropertyState>,
}

impl PropertyRegistry {
    pub fn new(board: &Board) -> Self {
        let properties = board
            .ownable()
            .map(|id| (id, PropertyState { id, owner: None, mortgaged: false, buildings: 0 }))
            .collect();
        Self { properties }
    }

    pub fn get(&self, id: TileIndex) -> Option<&PropertyState> {
        self.properties.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TileIndex) -> Option<&mut PropertyState> {
        self.properties.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyState> {
        self.properties.values()
    }

    pub fn owner_of(&self, id: TileIndex) -> Option<&str> {
        self.get(id).and_then(|p| p.owner.as_deref())
    }

    pub fn buildings_on(&self, id: TileIndex) -> u8 {
        self.get(id).map_or(0, |p| p.buildings)
    }

    pub fn owned_by<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a PropertyState> + 'a {
        self.properties
            .values()
            .filter(move |p| p.owner.as_deref() == Some(player))
    }

    pub fn count_in_group(&self, board: &Board, player: &str, group: ColorGroup) -> usize {
        board
            .group_members(group)
            .iter()
            .filter(|&&id| self.owner_of(id) == Some(player))
            .count()
    }

    /// True iff `player` owns every tile of `group`.
    pub fn has_monopoly(&self, board: &Board, player: &str, group: ColorGroup) -> bool {
        let members = board.group_members(group);
        !members.is_empty() && self.count_in_group(board, player, group) == members.len()
    }

    pub fn group_mortgaged(&self, board: &Board, group: ColorGroup) -> bool {
        board
            .group_members(group)
            .iter()
            .any(|&id| self.get(id).is_some_and(|p| p.mortgaged))
    }

    fn group_counts(&self, board: &Board, group: ColorGroup) -> (u8, u8) {
        let counts = board.group_members(group).iter().map(|&id| self.buildings_on(id));
        let min = counts.clone().min().unwrap_or(0);
        let max = counts.max().unwrap_or(0);
        (min, max)
    }

    /// Rent owed by a visitor. Zero for unowned or mortgaged tiles.
    /// `dice_total` only matters for utilities.
    pub fn rent_due(&self, board: &Board, id: TileIndex, dice_total: u8) -> Cash {
        let (Some(def), Some(state)) = (board.property(id), self.get(id)) else {
            return 0;
        };
        let Some(owner) = state.owner.as_deref() else {
            return 0;
        };
        if state.mortgaged {
            return 0;
        }

        match def.kind() {
            PropertyKind::Street => {
                if state.buildings > 0 {
                    def.rent[usize::from(state.buildings.min(MAX_BUILDINGS))]
                } else if self.has_monopoly(board, owner, def.group) {
                    def.rent[0] * 2
                } else {
                    def.rent[0]
                }
            }
            PropertyKind::Railroad => {
                let owned = self.count_in_group(board, owner, def.group).clamp(1, 6);
                def.rent[owned - 1]
            }
            PropertyKind::Utility => {
                let owned = self.count_in_group(board, owner, def.group).clamp(1, 6);
                def.rent[owned - 1] * Cash::from(dice_total)
            }
        }
    }

    fn owned_property<'a>(
        &'a self,
        board: &'a Board,
        player: &str,
        id: TileIndex,
    ) -> Result<(&'a PropertyDef, &'a PropertyState), Rejection> {
        let (Some(def), Some(state)) = (board.property(id), self.get(id)) else {
            return Err(Rejection::NotAProperty { tile: id });
        };
        if state.owner.as_deref() != Some(player) {
            return Err(Rejection::NotOwner { property: id });
        }
        Ok((def, state))
    }

    /// Validate one more building on `id`; returns its cost.
    /// Funds are checked by the caller.
    pub fn check_build(&self, board: &Board, player: &str, id: TileIndex) -> Result<Cash, Rejection> {
        let (def, state) = self.owned_property(board, player, id)?;
        if def.kind() != PropertyKind::Street {
            return Err(Rejection::NotBuildable { property: id });
        }
        if !self.has_monopoly(board, player, def.group) {
            return Err(Rejection::NotAMonopoly { property: id });
        }
        if self.group_mortgaged(board, def.group) {
            return Err(Rejection::PropertyMortgaged { property: id });
        }
        if state.buildings >= MAX_BUILDINGS {
            return Err(Rejection::MaxBuildings { property: id });
        }
        let (min, _) = self.group_counts(board, def.group);
        if state.buildings > min {
            return Err(Rejection::UnevenBuildup { property: id });
        }
        Ok(def.build_cost(state.buildings))
    }

    /// Validate selling one building back; returns the refund.
    /// The most-built tiles in the group must be reduced first.
    pub fn check_sell(&self, board: &Board, player: &str, id: TileIndex) -> Result<Cash, Rejection> {
        let (def, state) = self.owned_property(board, player, id)?;
        if def.kind() != PropertyKind::Street {
            return Err(Rejection::NotBuildable { property: id });
        }
        if state.buildings == 0 {
            return Err(Rejection::NoBuildings { property: id });
        }
        let (_, max) = self.group_counts(board, def.group);
        if state.buildings < max {
            return Err(Rejection::UnevenBuildup { property: id });
        }
        Ok(def.sell_value(state.buildings))
    }

    /// Validate mortgaging; returns the loan credited.
    pub fn check_mortgage(&self, board: &Board, player: &str, id: TileIndex) -> Result<Cash, Rejection> {
        let (def, state) = self.owned_property(board, player, id)?;
        if state.mortgaged {
            return Err(Rejection::PropertyMortgaged { property: id });
        }
        if state.buildings > 0 {
            return Err(Rejection::HasBuildings { property: id });
        }
        Ok(def.mortgage_value())
    }

    /// Validate lifting a mortgage; returns principal plus interest.
    pub fn check_unmortgage(
        &self,
        board: &Board,
        player: &str,
        id: TileIndex,
        interest_percent: Cash,
    ) -> Result<Cash, Rejection> {
        let (def, state) = self.owned_property(board, player, id)?;
        if !state.mortgaged {
            return Err(Rejection::NotMortgaged { property: id });
        }
        Ok(unmortgage_cost(def.mortgage_value(), interest_percent))
    }

    /// Unmortgaged tiles without buildings, ascending.
    pub fn mortgageable(&self, board: &Board, player: &str) -> Vec<TileIndex> {
        self.owned_by(player)
            .filter(|p| self.check_mortgage(board, player, p.id).is_ok())
            .map(|p| p.id)
            .collect()
    }

    /// Tiles where a building may be sold right now, ascending.
    pub fn sellable(&self, board: &Board, player: &str) -> Vec<TileIndex> {
        self.owned_by(player)
            .filter(|p| self.check_sell(board, player, p.id).is_ok())
            .map(|p| p.id)
            .collect()
    }

    /// Cash the player could raise by selling every building and
    /// mortgaging every tile.
    pub fn liquidation_value(&self, board: &Board, player: &str) -> Cash {
        self.owned_by(player)
            .filter_map(|p| board.property(p.id).map(|def| (def, p)))
            .map(|(def, p)| {
                let buildings: Cash = (1..=p.buildings).map(|c| def.sell_value(c)).sum();
                let loan = if p.mortgaged { 0 } else { def.mortgage_value() };
                buildings + loan
            })
            .sum()
    }
}

/// Principal plus interest, interest rounded up.
pub fn unmortgage_cost(principal: Cash, interest_percent: Cash) -> Cash {
    principal + (principal * interest_percent + 99) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn give(registry: &mut PropertyRegistry, id: TileIndex, owner: &str) {
        if let Some(p) = registry.get_mut(id) {
            p.owner = Some(owner.into());
        }
    }

    #[test]
    fn monopoly_requires_whole_group() {
        let board = Board::standard();
        let mut registry = PropertyRegistry::new(&board);
        give(&mut registry, 1, "alice");
        assert!(!registry.has_monopoly(&board, "alice", ColorGroup::Brown));
        give(&mut registry, 3, "alice");
        assert!(registry.has_monopoly(&board, "alice", ColorGroup::Brown));
        give(&mut registry, 3, "bob");
        assert!(!registry.has_monopoly(&board, "alice", ColorGroup::Brown));
    }

    #[test]
    fn street_rent_doubles_on_monopoly_and_follows_schedule() {
        let board = Board::standard();
        let mut registry = PropertyRegistry::new(&board);
        give(&mut registry, 1, "alice");
        assert_eq!(registry.rent_due(&board, 1, 7), 2);
        give(&mut registry, 3, "alice");
        assert_eq!(registry.rent_due(&board, 1, 7), 4);
        if let Some(p) = registry.get_mut(1) {
            p.buildings = 3;
        }
        assert_eq!(registry.rent_due(&board, 1, 7), 90);
    }

    #[test]
    fn railroad_and_utility_rent_scale_with_holdings() {
        let board = Board::standard();
        let mut registry = PropertyRegistry::new(&board);
        give(&mut registry, 5, "bob");
        assert_eq!(registry.rent_due(&board, 5, 7), 25);
        give(&mut registry, 15, "bob");
        give(&mut registry, 25, "bob");
        assert_eq!(registry.rent_due(&board, 5, 7), 100);

        give(&mut registry, 12, "bob");
        assert_eq!(registry.rent_due(&board, 12, 7), 28);
        give(&mut registry, 28, "bob");
        assert_eq!(registry.rent_due(&board, 12, 7), 70);
    }

    #[test]
    fn mortgaged_tiles_collect_nothing() {
        let board = Board::standard();
        let mut registry = PropertyRegistry::new(&board);
        give(&mut registry, 39, "bob");
        if let Some(p) = registry.get_mut(39) {
            p.mortgaged = true;
        }
        assert_eq!(registry.rent_due(&board, 39, 4), 0);
    }

    #[test]
    fn build_and_sell_checks_read_board_costs() {
        let board = Board::standard();
        let mut registry = PropertyRegistry::new(&board);
        give(&mut registry, 37, "carol");
        assert_eq!(registry.check_build(&board, "carol", 37), Err(Rejection::NotAMonopoly { property: 37 }));
        give(&mut registry, 39, "carol");
        assert_eq!(registry.check_build(&board, "carol", 37), Ok(200));
        assert_eq!(registry.check_build(&board, "bob", 37), Err(Rejection::NotOwner { property: 37 }));

        if let Some(p) = registry.get_mut(39) {
            p.buildings = 1;
        }
        assert_eq!(registry.check_build(&board, "carol", 39), Err(Rejection::UnevenBuildup { property: 39 }));
        assert_eq!(registry.check_sell(&board, "carol", 39), Ok(100));
        assert_eq!(registry.check_sell(&board, "carol", 37), Err(Rejection::NoBuildings { property: 37 }));
        assert_eq!(registry.sellable(&board, "carol"), vec![39]);
    }

    #[test]
    fn unmortgage_interest_rounds_up() {
        assert_eq!(unmortgage_cost(30, 10), 33);
        assert_eq!(unmortgage_cost(35, 10), 39);
        assert_eq!(unmortgage_cost(100, 0), 100);
    }
}
