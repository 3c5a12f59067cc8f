//! Debt and bankruptcy tests: liquidation, concession and asset transfer.

mod common;

use common::*;
use monopoly_core::{
    board::TileKind,
    engine::TileEffect,
    error::Rejection,
    event::GameEvent,
    state::{Creditor, DebtReason, GameStatus, TurnPhase, WinReason},
};

/// Index 0 of the roll table is (1, 2).
const THREE: u64 = 0;

#[test]
fn unpayable_tax_bankrupts_and_skips_the_player() {
    let engine = engine_with_tile(4, |kind| *kind = TileKind::Tax { amount: 50 });
    let mut state = start(&engine, &["alice", "bob", "carol"]);
    set_cash(&mut state, "alice", 40);

    // (2, 2): Go to the tax tile.
    let moved = engine.roll_and_move(&state, "alice", 2).unwrap();
    assert_eq!(moved.detail.to, 4);
    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    assert_eq!(resolved.detail, TileEffect::Bankrupt { amount: 50 });

    let alice = resolved.state.player("alice").unwrap();
    assert!(alice.bankrupt);
    assert_eq!(alice.cash, 0);
    assert_eq!(resolved.state.phase, TurnPhase::TurnAdvance);
    assert_eq!(resolved.state.status, GameStatus::InProgress);
    assert!(resolved.events.iter().any(|e| matches!(
        e,
        GameEvent::PlayerBankrupt { player, creditor: Creditor::Bank, cash: 40 } if player == "alice"
    )));
    assert_consistent(&engine, &resolved.state);

    let mut state = engine.advance_turn(&resolved.state, "alice").unwrap().state;
    assert_eq!(state.current_actor().unwrap().id, "bob");

    for expected in ["carol", "bob", "carol"] {
        let actor = state.current_actor().unwrap().id.clone();
        set_phase(&mut state, TurnPhase::TurnAdvance);
        let advanced = engine.advance_turn(&state, &actor).unwrap();
        assert_eq!(advanced.detail.next_actor.as_deref(), Some(expected));
        state = advanced.state;
    }
    assert_consistent(&engine, &state);
}

#[test]
fn pending_debt_blocks_play_until_liquidated() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob"]);
    give(&mut state, "alice", &[5]);
    set_cash(&mut state, "alice", 10);
    place(&mut state, "alice", 35);

    let moved = engine.roll_and_move(&state, "alice", THREE).unwrap();
    assert_eq!(moved.detail.to, 38);
    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    let TileEffect::Liquidation { notice } = &resolved.detail else {
        panic!("expected liquidation, got {:?}", resolved.detail);
    };
    assert_eq!(notice.owed, 100);
    assert_eq!(notice.shortfall, 90);
    assert_eq!(notice.mortgageable, vec![5]);
    assert!(notice.sellable.is_empty());

    let debt = resolved.state.pending_debt.as_ref().unwrap();
    assert_eq!(debt.creditor, Creditor::Bank);
    assert_eq!(debt.reason, DebtReason::Tax { tile: 38 });
    assert_eq!(cash(&resolved.state, "alice"), 10);

    assert_eq!(
        engine.advance_turn(&resolved.state, "alice").unwrap_err(),
        Rejection::DebtOutstanding { amount: 100 }
    );
    assert_eq!(
        engine.purchase_property(&resolved.state, "alice", 38).unwrap_err(),
        Rejection::DebtOutstanding { amount: 100 }
    );

    let mortgaged = engine.mortgage_property(&resolved.state, "alice", 5).unwrap();
    assert!(mortgaged.detail.debt_settled);
    assert_eq!(mortgaged.detail.cash_after, 10);
    assert!(mortgaged.state.pending_debt.is_none());
    assert!(mortgaged.events.iter().any(|e| matches!(e, GameEvent::DebtSettled { amount: 100, .. })));
    assert_consistent(&engine, &mortgaged.state);

    let advanced = engine.advance_turn(&mortgaged.state, "alice").unwrap();
    assert_eq!(advanced.detail.next_actor.as_deref(), Some("bob"));
}

#[test]
fn conceding_hands_everything_to_the_player_creditor() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob"]);
    give(&mut state, "alice", &[1]);
    give(&mut state, "bob", &[39]);
    set_cash(&mut state, "alice", 20);
    place(&mut state, "alice", 36);

    let moved = engine.roll_and_move(&state, "alice", THREE).unwrap();
    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    assert!(matches!(resolved.detail, TileEffect::Liquidation { .. }));

    let err = engine.declare_bankruptcy(&state, "alice").unwrap_err();
    assert_eq!(err, Rejection::NoDebtOutstanding);

    let conceded = engine.declare_bankruptcy(&resolved.state, "alice").unwrap();
    assert_eq!(conceded.detail.creditor, Creditor::Player("bob".into()));
    assert_eq!(cash(&conceded.state, "bob"), 1520);
    assert_eq!(conceded.state.registry.owner_of(1), Some("bob"));
    assert!(conceded.state.player("alice").unwrap().owned.is_empty());
    assert_eq!(
        conceded.state.status,
        GameStatus::GameOver { winner: "bob".into(), reason: WinReason::LastPlayerStanding }
    );
    assert_consistent(&engine, &conceded.state);

    assert_eq!(
        engine.declare_bankruptcy(&conceded.state, "alice").unwrap_err(),
        Rejection::GameAlreadyOver
    );
}

#[test]
fn player_creditor_inherits_mortgages() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob", "carol"]);
    give(&mut state, "alice", &[1, 3]);
    state.set_mortgaged(1, true);
    give(&mut state, "bob", &[39]);
    set_cash(&mut state, "alice", 0);
    place(&mut state, "alice", 36);

    let moved = engine.roll_and_move(&state, "alice", THREE).unwrap();
    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    assert_eq!(resolved.detail, TileEffect::Bankrupt { amount: 50 });

    let registry = &resolved.state.registry;
    assert_eq!(registry.owner_of(1), Some("bob"));
    assert_eq!(registry.owner_of(3), Some("bob"));
    assert!(registry.get(1).unwrap().mortgaged);
    assert!(!registry.get(3).unwrap().mortgaged);
    assert_eq!(resolved.state.status, GameStatus::InProgress);
    assert_consistent(&engine, &resolved.state);
}

#[test]
fn buildings_are_sold_back_before_transfer() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob", "carol"]);
    give(&mut state, "alice", &[1, 3]);
    state.set_buildings(1, 1);
    state.set_buildings(3, 1);
    give(&mut state, "bob", &[37, 39]);
    state.set_buildings(37, 5);
    state.set_buildings(39, 5);
    set_cash(&mut state, "alice", 0);
    place(&mut state, "alice", 36);

    let moved = engine.roll_and_move(&state, "alice", THREE).unwrap();
    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    assert_eq!(resolved.detail, TileEffect::Bankrupt { amount: 2000 });

    assert_eq!(cash(&resolved.state, "bob"), 1550);
    assert_eq!(resolved.state.registry.buildings_on(1), 0);
    assert_eq!(resolved.state.registry.buildings_on(3), 0);
    assert_eq!(resolved.state.registry.owner_of(1), Some("bob"));
    assert_eq!(resolved.state.bank.paid_out, 50);
    assert_consistent(&engine, &resolved.state);
}

#[test]
fn bank_creditor_returns_tiles_to_the_pool() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob", "carol"]);
    give(&mut state, "alice", &[1]);
    state.set_mortgaged(1, true);
    set_cash(&mut state, "alice", 0);
    place(&mut state, "alice", 35);

    let moved = engine.roll_and_move(&state, "alice", THREE).unwrap();
    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    assert_eq!(resolved.detail, TileEffect::Bankrupt { amount: 100 });

    let tile = resolved.state.registry.get(1).unwrap();
    assert_eq!(tile.owner, None);
    assert!(!tile.mortgaged);
    assert!(resolved.events.iter().any(|e| matches!(
        e,
        GameEvent::PropertyTransferred { property: 1, to: None, .. }
    )));
    assert_consistent(&engine, &resolved.state);
}

#[test]
fn bankrupt_players_cannot_act() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob", "carol"]);
    state.players[0].bankrupt = true;
    set_cash(&mut state, "alice", 0);

    assert_eq!(
        engine.roll_and_move(&state, "alice", THREE).unwrap_err(),
        Rejection::PlayerBankrupt { player: "alice".into() }
    );
    let advanced = engine.advance_turn(&state, "alice").unwrap();
    assert_eq!(advanced.detail.next_actor.as_deref(), Some("bob"));
}
