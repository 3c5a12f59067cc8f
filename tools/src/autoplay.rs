//! A simple automatic player, used by batch mode.
//!
//! Buys whatever it lands on while keeping a cash reserve, builds evenly
//! on monopolies, liquidates cheapest-first when in debt.

use monopoly_core::{
    board::Board,
    command::GameCommand,
    dice::DiceConfig,
    state::{GameState, TurnPhase},
    types::{Cash, TurnNumber},
};

const PURCHASE_RESERVE: Cash = 100;
const BUILD_RESERVE: Cash = 250;

/// Dice index for the next roll. Table dice follow the turn counter
/// modulo the table length; other sources take a running roll count so
/// no two rolls in a session share an index.
pub fn roll_index(dice: &DiceConfig, turn_counter: TurnNumber, rolls: u64) -> u64 {
    match dice {
        DiceConfig::Table => turn_counter % 11,
        DiceConfig::Seeded { .. } | DiceConfig::Secure => rolls,
    }
}

/// The command the current actor should issue next.
pub fn next_command(board: &Board, state: &GameState, roll_index: u64) -> GameCommand {
    let Some(actor) = state.current_actor() else {
        return GameCommand::AdvanceTurn;
    };
    if actor.bankrupt {
        return GameCommand::AdvanceTurn;
    }

    if state.pending_debt.is_some() {
        let registry = &state.registry;
        if let Some(&property) = registry.sellable(board, &actor.id).first() {
            return GameCommand::SellBuilding { property };
        }
        if let Some(property) = registry
            .mortgageable(board, &actor.id)
            .into_iter()
            .min_by_key(|&id| board.property(id).map_or(0, |def| def.price))
        {
            return GameCommand::MortgageProperty { property };
        }
        return GameCommand::DeclareBankruptcy;
    }

    match state.phase {
        TurnPhase::AwaitingJailResolution if actor.in_jail() && actor.jail_cards > 0 => GameCommand::UseJailCard,
        TurnPhase::AwaitingJailResolution | TurnPhase::AwaitingMove => GameCommand::RollAndMove { roll_index },
        TurnPhase::AwaitingTileResolution => GameCommand::ResolveTile,
        TurnPhase::AwaitingBuildDecision => build_decision(board, state),
        TurnPhase::AwaitingCardResolution | TurnPhase::AwaitingWinCheck | TurnPhase::TurnAdvance => {
            GameCommand::AdvanceTurn
        }
    }
}

fn build_decision(board: &Board, state: &GameState) -> GameCommand {
    let Some(actor) = state.current_actor() else {
        return GameCommand::AdvanceTurn;
    };
    let position = actor.position;

    if let Some(def) = board.property(position) {
        if state.registry.owner_of(position).is_none() && actor.cash - def.price >= PURCHASE_RESERVE {
            return GameCommand::PurchaseProperty { property: position };
        }
    }

    let cheapest_build = actor
        .owned
        .iter()
        .filter_map(|&id| {
            state
                .registry
                .check_build(board, &actor.id, id)
                .ok()
                .map(|cost| (cost, id))
        })
        .min();
    if let Some((cost, property)) = cheapest_build {
        if actor.cash - cost >= BUILD_RESERVE {
            return GameCommand::BuildOnProperty { property };
        }
    }

    GameCommand::AdvanceTurn
}
