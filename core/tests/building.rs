//! Building tests: monopolies, even build-up, hotels and sell-back.

mod common;

use common::*;
use monopoly_core::{
    board::TileKind,
    error::Rejection,
    state::TurnPhase,
};

const MEDITERRANEAN: u8 = 1;
const BALTIC: u8 = 3;

fn brown_monopoly(engine: &monopoly_core::engine::GameEngine) -> monopoly_core::state::GameState {
    let mut state = start(engine, &["alice", "bob"]);
    give(&mut state, "alice", &[MEDITERRANEAN, BALTIC]);
    set_phase(&mut state, TurnPhase::AwaitingBuildDecision);
    state
}

#[test]
fn even_buildup_across_brown_group() {
    let engine = engine();
    let state = brown_monopoly(&engine);

    let first = engine.build_on_property(&state, "alice", MEDITERRANEAN).unwrap();
    assert_eq!(first.detail.buildings, 1);
    assert_eq!(first.detail.amount, 50);
    assert_eq!(cash(&first.state, "alice"), 1450);

    let err = engine.build_on_property(&first.state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::UnevenBuildup { property: MEDITERRANEAN });

    let second = engine.build_on_property(&first.state, "alice", BALTIC).unwrap();
    let third = engine.build_on_property(&second.state, "alice", MEDITERRANEAN).unwrap();
    assert_eq!(third.state.registry.buildings_on(MEDITERRANEAN), 2);
    assert_eq!(third.state.registry.buildings_on(BALTIC), 1);
    assert_eq!(third.state.player("alice").unwrap().building_count(MEDITERRANEAN), 2);
    assert_eq!(cash(&third.state, "alice"), 1350);
    assert_consistent(&engine, &third.state);
}

#[test]
fn building_needs_the_whole_group() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob"]);
    give(&mut state, "alice", &[MEDITERRANEAN]);
    give(&mut state, "bob", &[BALTIC]);
    set_phase(&mut state, TurnPhase::AwaitingBuildDecision);

    let err = engine.build_on_property(&state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::NotAMonopoly { property: MEDITERRANEAN });

    let err = engine.build_on_property(&state, "alice", BALTIC).unwrap_err();
    assert_eq!(err, Rejection::NotOwner { property: BALTIC });
}

#[test]
fn mortgaged_group_member_blocks_building() {
    let engine = engine();
    let state = brown_monopoly(&engine);
    let mortgaged = engine.mortgage_property(&state, "alice", BALTIC).unwrap();

    let err = engine.build_on_property(&mortgaged.state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::PropertyMortgaged { property: MEDITERRANEAN });
}

#[test]
fn railroads_and_utilities_take_no_buildings() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob"]);
    give(&mut state, "alice", &[5, 15, 25, 35, 12, 28]);
    set_phase(&mut state, TurnPhase::AwaitingBuildDecision);

    assert_eq!(
        engine.build_on_property(&state, "alice", 5).unwrap_err(),
        Rejection::NotBuildable { property: 5 }
    );
    assert_eq!(
        engine.build_on_property(&state, "alice", 12).unwrap_err(),
        Rejection::NotBuildable { property: 12 }
    );
    assert_eq!(
        engine.build_on_property(&state, "alice", 4).unwrap_err(),
        Rejection::NotAProperty { tile: 4 }
    );
}

#[test]
fn fifth_building_is_a_hotel_at_hotel_cost() {
    let engine = engine_with_tile(MEDITERRANEAN as usize, |kind| {
        if let TileKind::Property(def) = kind {
            def.hotel_cost = 120;
        }
    });
    let mut state = brown_monopoly(&engine);

    for _ in 0..4 {
        for property in [MEDITERRANEAN, BALTIC] {
            state = engine.build_on_property(&state, "alice", property).unwrap().state;
        }
    }
    assert_eq!(cash(&state, "alice"), 1100);

    let hotel = engine.build_on_property(&state, "alice", MEDITERRANEAN).unwrap();
    assert_eq!(hotel.detail.amount, 120);
    assert_eq!(hotel.detail.buildings, 5);
    assert_eq!(cash(&hotel.state, "alice"), 980);

    let err = engine.build_on_property(&hotel.state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::MaxBuildings { property: MEDITERRANEAN });
    assert_consistent(&engine, &hotel.state);
}

#[test]
fn unaffordable_building_changes_nothing() {
    let engine = engine();
    let mut state = brown_monopoly(&engine);
    set_cash(&mut state, "alice", 40);

    let before = state.clone();
    let err = engine.build_on_property(&state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::InsufficientFunds { needed: 50, available: 40 });
    assert_eq!(state, before);
}

#[test]
fn building_only_during_build_decision() {
    let engine = engine();
    let mut state = brown_monopoly(&engine);
    set_phase(&mut state, TurnPhase::AwaitingJailResolution);

    let err = engine.build_on_property(&state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::InvalidState { phase: TurnPhase::AwaitingJailResolution });
}

#[test]
fn selling_follows_even_rule_in_reverse() {
    let engine = engine();
    let mut state = brown_monopoly(&engine);
    for property in [MEDITERRANEAN, BALTIC, MEDITERRANEAN] {
        state = engine.build_on_property(&state, "alice", property).unwrap().state;
    }
    assert_eq!(cash(&state, "alice"), 1350);

    let err = engine.sell_building(&state, "alice", BALTIC).unwrap_err();
    assert_eq!(err, Rejection::UnevenBuildup { property: BALTIC });

    let sold = engine.sell_building(&state, "alice", MEDITERRANEAN).unwrap();
    assert_eq!(sold.detail.amount, 25);
    assert_eq!(sold.detail.buildings, 1);
    assert!(!sold.detail.debt_settled);
    assert_eq!(cash(&sold.state, "alice"), 1375);

    let sold = engine.sell_building(&sold.state, "alice", BALTIC).unwrap();
    let sold = engine.sell_building(&sold.state, "alice", MEDITERRANEAN).unwrap();
    let err = engine.sell_building(&sold.state, "alice", MEDITERRANEAN).unwrap_err();
    assert_eq!(err, Rejection::NoBuildings { property: MEDITERRANEAN });
    assert_consistent(&engine, &sold.state);
}

#[test]
fn houses_raise_rent() {
    let engine = engine();
    let mut state = start(&engine, &["alice", "bob"]);
    give(&mut state, "bob", &[MEDITERRANEAN, BALTIC]);
    state.set_buildings(MEDITERRANEAN, 2);
    state.set_buildings(BALTIC, 2);
    place(&mut state, "alice", 39);

    // (1, 1) from Boardwalk wraps past Go onto Mediterranean.
    let moved = engine.roll_and_move(&state, "alice", 4).unwrap();
    assert_eq!(moved.detail.to, MEDITERRANEAN);
    assert!(moved.detail.passed_go);

    let resolved = engine.resolve_tile(&moved.state, "alice").unwrap();
    assert_eq!(cash(&resolved.state, "alice"), 1500 + 200 - 30);
    assert_eq!(cash(&resolved.state, "bob"), 1530);
    assert_consistent(&engine, &resolved.state);
}
