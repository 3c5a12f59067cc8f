//! Involuntary debits: immediate settlement, mandatory liquidation and
//! bankruptcy.
//!
//! RULES:
//!   - Cash never goes negative. A debit either settles in full or
//!     nothing moves.
//!   - A debt the debtor cannot cover from cash becomes a PendingDebt.
//!     The engine offers the liquidation options but never picks them.
//!   - A debt that cash plus full liquidation cannot cover bankrupts the
//!     debtor at once.

use crate::{
    board::Board,
    event::GameEvent,
    state::{Creditor, DebtReason, GameState, PendingDebt},
    types::{Cash, PlayerId, TileIndex},
};
use serde::{Deserialize, Serialize};

/// Returned to the caller when a debt is left pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationNotice {
    pub debtor:       PlayerId,
    pub owed:         Cash,
    pub shortfall:    Cash,
    pub mortgageable: Vec<TileIndex>,
    pub sellable:     Vec<TileIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    Paid,
    Pending(LiquidationNotice),
    Bankrupt,
}

/// Move `amount` from `debtor` to `creditor`. The caller has checked the
/// debtor can cover it.
fn transfer(state: &mut GameState, debtor: &str, creditor: &Creditor, amount: Cash) {
    if let Some(player) = state.player_mut(debtor) {
        player.cash -= amount;
    }
    match creditor {
        Creditor::Bank => state.bank.paid_in += amount,
        Creditor::Player(id) => {
            if let Some(player) = state.player_mut(id) {
                player.credit(amount);
            }
        }
    }
}

pub fn liquidation_notice(state: &GameState, board: &Board, debtor: &str, owed: Cash) -> LiquidationNotice {
    let cash = state.player(debtor).map_or(0, |p| p.cash);
    LiquidationNotice {
        debtor:       debtor.to_string(),
        owed,
        shortfall:    (owed - cash).max(0),
        mortgageable: state.registry.mortgageable(board, debtor),
        sellable:     state.registry.sellable(board, debtor),
    }
}

/// Charge an involuntary debit.
pub(crate) fn charge(
    state: &mut GameState,
    board: &Board,
    debtor: &str,
    creditor: Creditor,
    amount: Cash,
    reason: DebtReason,
    events: &mut Vec<GameEvent>,
) -> ChargeOutcome {
    let Some(cash) = state.player(debtor).map(|p| p.cash) else {
        return ChargeOutcome::Paid;
    };

    if cash >= amount {
        transfer(state, debtor, &creditor, amount);
        return ChargeOutcome::Paid;
    }

    let reachable = cash + state.registry.liquidation_value(board, debtor);
    if reachable < amount {
        log::info!(
            "game={} turn={} debt: {debtor} cannot cover {amount} (reachable {reachable})",
            state.game_id,
            state.turn_counter
        );
        bankrupt(state, board, debtor, creditor, events);
        return ChargeOutcome::Bankrupt;
    }

    let notice = liquidation_notice(state, board, debtor, amount);
    events.push(GameEvent::DebtOutstanding {
        debtor:    debtor.to_string(),
        creditor:  creditor.clone(),
        amount,
        shortfall: notice.shortfall,
        reason,
    });
    state.pending_debt = Some(PendingDebt {
        debtor: debtor.to_string(),
        creditor,
        amount,
        reason,
    });
    ChargeOutcome::Pending(notice)
}

/// Settle the pending debt if the debtor can now cover it.
/// Returns true when a debt was settled.
pub(crate) fn try_settle(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let Some(debt) = state.pending_debt.clone() else {
        return false;
    };
    let covered = state.player(&debt.debtor).is_some_and(|p| p.can_afford(debt.amount));
    if !covered {
        return false;
    }

    transfer(state, &debt.debtor, &debt.creditor, debt.amount);
    state.pending_debt = None;
    if debt.reason == DebtReason::JailFine {
        events.push(GameEvent::JailFinePaid { player: debt.debtor.clone(), amount: debt.amount, forced: true });
    }
    events.push(GameEvent::DebtSettled {
        debtor:   debt.debtor,
        creditor: debt.creditor,
        amount:   debt.amount,
        reason:   debt.reason,
    });
    true
}

/// Bankrupt `debtor` in favour of `creditor`.
///
/// Buildings are sold back to the bank first. All cash then goes to the
/// creditor. Properties go to a player creditor with their mortgage flags,
/// or back to the unowned pool for the bank. The player keeps their slot
/// in the turn order.
pub(crate) fn bankrupt(
    state: &mut GameState,
    board: &Board,
    debtor: &str,
    creditor: Creditor,
    events: &mut Vec<GameEvent>,
) {
    let Some(owned) = state.player(debtor).map(|p| p.owned.clone()) else {
        return;
    };

    let mut refund = 0;
    for &property in &owned {
        let count = state.registry.buildings_on(property);
        if count == 0 {
            continue;
        }
        if let Some(def) = board.property(property) {
            refund += (1..=count).map(|c| def.sell_value(c)).sum::<Cash>();
        }
        state.set_buildings(property, 0);
    }

    let cash = match state.player_mut(debtor) {
        Some(player) => {
            player.credit(refund);
            player.cash
        }
        None => 0,
    };
    state.bank.paid_out += refund;
    transfer(state, debtor, &creditor, cash);

    for &property in &owned {
        match &creditor {
            Creditor::Player(id) => state.assign_property(property, id),
            Creditor::Bank => state.release_property(property),
        }
        events.push(GameEvent::PropertyTransferred {
            property,
            from: debtor.to_string(),
            to:   match &creditor {
                Creditor::Player(id) => Some(id.clone()),
                Creditor::Bank => None,
            },
        });
    }

    if let Some(player) = state.player_mut(debtor) {
        player.bankrupt = true;
        player.jail_turns = 0;
        player.jail_cards = 0;
    }
    if state.pending_debt.as_ref().is_some_and(|d| d.debtor == debtor) {
        state.pending_debt = None;
    }

    log::info!(
        "game={} turn={} bankruptcy: {debtor} out, {cash} to {:?}",
        state.game_id,
        state.turn_counter,
        creditor
    );
    events.push(GameEvent::PlayerBankrupt {
        player: debtor.to_string(),
        creditor,
        cash,
    });
}
