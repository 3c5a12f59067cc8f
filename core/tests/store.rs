//! Store tests: schema, event log, snapshots and command log.

mod common;

use common::*;
use monopoly_core::{
    command::{CommandRecord, GameCommand},
    config::GameConfig,
    error::GameError,
    event::GameEvent,
    snapshot::{GameSnapshot, SNAPSHOT_VERSION},
    store::GameStore,
};

fn store() -> GameStore {
    let store = GameStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

#[test]
fn config_round_trips() {
    let store = store();
    let config = GameConfig { jail_fine: 75, max_turns: 120, ..GameConfig::default_test() };
    store.insert_game("g1", 7, &config).unwrap();

    assert_eq!(store.game_config("g1").unwrap(), config);
    assert!(matches!(store.game_config("missing"), Err(GameError::GameNotFound { .. })));
}

#[test]
fn events_are_appended_in_order() {
    let engine = engine();
    let store = store();
    store.insert_game("test-game", 0, engine.config()).unwrap();

    let state = start(&engine, &["alice", "bob"]);
    let moved = engine.roll_and_move(&state, "alice", 6).unwrap();
    store.append_events("test-game", 0, &moved.events).unwrap();

    let entries = store.events_for_game("test-game").unwrap();
    assert_eq!(entries.len(), moved.events.len());
    assert_eq!(entries[0].event_type, "dice_rolled");
    assert_eq!(entries[0].seq, 0);

    let decoded: Vec<GameEvent> = entries
        .iter()
        .map(|e| serde_json::from_str(&e.payload).unwrap())
        .collect();
    assert_eq!(decoded, moved.events);
}

#[test]
fn latest_snapshot_restores_state() {
    let engine = engine();
    let store = store();
    store.insert_game("test-game", 0, engine.config()).unwrap();

    let state = start(&engine, &["alice", "bob"]);
    store.save_snapshot(&GameSnapshot::capture(&state)).unwrap();
    let moved = engine.roll_and_move(&state, "alice", 6).unwrap();
    store.save_snapshot(&GameSnapshot::capture(&moved.state)).unwrap();

    let latest = store.latest_snapshot("test-game").unwrap().unwrap();
    assert_eq!(latest.version, SNAPSHOT_VERSION);
    assert_eq!(latest.state, moved.state);

    let resumed = engine.resolve_tile(&latest.state, "alice").unwrap();
    assert_eq!(resumed.state.phase, monopoly_core::state::TurnPhase::AwaitingBuildDecision);
    assert!(store.latest_snapshot("other").unwrap().is_none());
}

#[test]
fn snapshot_rejects_unknown_version() {
    let engine = engine();
    let state = start(&engine, &["alice", "bob"]);
    let mut snapshot = GameSnapshot::capture(&state);
    snapshot.version = SNAPSHOT_VERSION + 1;
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(GameSnapshot::from_json(&json).is_err());
}

#[test]
fn commands_are_counted_with_rejections() {
    let store = store();
    store.insert_game("g1", 0, &GameConfig::default_test()).unwrap();

    let record = |command, rejected: Option<&str>| CommandRecord {
        game_id: "g1".into(),
        turn: 0,
        actor: "alice".into(),
        command,
        rejected: rejected.map(str::to_string),
    };
    store.record_command(&record(GameCommand::RollAndMove { roll_index: 0 }, None)).unwrap();
    store.record_command(&record(GameCommand::ResolveTile, None)).unwrap();
    store
        .record_command(&record(GameCommand::AdvanceTurn, Some("Action not permitted")))
        .unwrap();

    assert_eq!(store.command_count("g1", false).unwrap(), 3);
    assert_eq!(store.command_count("g1", true).unwrap(), 1);
}

#[test]
fn unique_game_ids() {
    let store = store();
    let id = format!("game-{}", uuid::Uuid::new_v4());
    store.insert_game(&id, 0, &GameConfig::default_test()).unwrap();
    assert!(store.insert_game(&id, 0, &GameConfig::default_test()).is_err());
}
