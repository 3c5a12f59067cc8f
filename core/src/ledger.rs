//! Player ledger: cash, position, jail status and holdings per player.
//!
//! Only the engine mutates ledgers. Every cash movement between a player
//! and the bank is mirrored in `BankLedger`, so total money in play is
//! always accountable.

use crate::{
    error::Rejection,
    types::{Cash, PlayerId, TileIndex, BOARD_SIZE},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id:         PlayerId,
    pub cash:       Cash,
    pub position:   TileIndex,
    /// Remaining escape attempts. 0 = not in jail.
    pub jail_turns: u8,
    pub owned:      BTreeSet<TileIndex>,
    /// Derived index of building counts; the registry holds the
    /// authoritative copy.
    pub buildings:  BTreeMap<TileIndex, u8>,
    pub jail_cards: u8,
    pub bankrupt:   bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, starting_cash: Cash) -> Self {
        Self {
            id,
            cash: starting_cash,
            position: 0,
            jail_turns: 0,
            owned: BTreeSet::new(),
            buildings: BTreeMap::new(),
            jail_cards: 0,
            bankrupt: false,
        }
    }

    pub fn can_afford(&self, amount: Cash) -> bool {
        self.cash >= amount
    }

    pub fn credit(&mut self, amount: Cash) {
        self.cash += amount;
    }

    /// Voluntary debit. Leaves cash untouched when it cannot be covered.
    pub fn pay(&mut self, amount: Cash) -> Result<(), Rejection> {
        if !self.can_afford(amount) {
            return Err(Rejection::InsufficientFunds {
                needed:    amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    pub fn in_jail(&self) -> bool {
        self.jail_turns > 0
    }

    pub fn send_to_jail(&mut self, jail: TileIndex, attempts: u8) {
        self.position = jail;
        self.jail_turns = attempts.max(1);
    }

    pub fn release_from_jail(&mut self) {
        self.jail_turns = 0;
    }

    /// Move forward, returning whether Go was passed or landed on.
    pub fn advance(&mut self, steps: u8) -> bool {
        let target = u16::from(self.position) + u16::from(steps);
        self.position = (target % u16::from(BOARD_SIZE)) as TileIndex;
        target >= u16::from(BOARD_SIZE)
    }

    pub fn building_count(&self, property: TileIndex) -> u8 {
        self.buildings.get(&property).copied().unwrap_or(0)
    }
}

/// Money flowing between players and the bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankLedger {
    /// Starting cash handed out at join.
    pub seeded:   Cash,
    /// Salaries, card payouts, mortgage loans, building sell-backs.
    pub paid_out: Cash,
    /// Purchases, taxes, fines, building costs, mortgage repayments.
    pub paid_in:  Cash,
}

impl BankLedger {
    /// Cash that should be held by players right now.
    pub fn expected_player_cash(&self) -> Cash {
        self.seeded + self.paid_out - self.paid_in
    }
}
