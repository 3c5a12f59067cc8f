//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use monopoly_core::{
    board::{Board, TileKind},
    config::GameConfig,
    dice::TableDice,
    engine::GameEngine,
    invariants::check_invariants,
    state::{GameState, TurnPhase},
    types::{Cash, TileIndex},
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Standard board, default rules, table dice.
pub fn engine() -> GameEngine {
    init_logging();
    GameEngine::build_test()
}

pub fn engine_with(config: GameConfig) -> GameEngine {
    init_logging();
    GameEngine::new(config, Board::standard(), Box::new(TableDice))
}

/// Standard board with one tile replaced.
pub fn engine_with_tile(index: usize, edit: impl FnOnce(&mut TileKind)) -> GameEngine {
    init_logging();
    let mut tiles = Board::standard().tiles().to_vec();
    edit(&mut tiles[index].kind);
    let board = Board::from_tiles(tiles).expect("valid board");
    GameEngine::new(GameConfig::default_test(), board, Box::new(TableDice))
}

pub fn start(engine: &GameEngine, players: &[&str]) -> GameState {
    engine.start_test_game(players).expect("start game")
}

pub fn place(state: &mut GameState, player: &str, tile: TileIndex) {
    state.player_mut(player).expect("player").position = tile;
}

/// Overwrite a player's cash, keeping the bank ledger balanced.
pub fn set_cash(state: &mut GameState, player: &str, cash: Cash) {
    let p = state.player_mut(player).expect("player");
    let delta = cash - p.cash;
    p.cash = cash;
    state.bank.seeded += delta;
}

pub fn give(state: &mut GameState, player: &str, tiles: &[TileIndex]) {
    for &tile in tiles {
        state.assign_property(tile, player);
    }
}

pub fn set_phase(state: &mut GameState, phase: TurnPhase) {
    state.phase = phase;
}

pub fn cash(state: &GameState, player: &str) -> Cash {
    state.player(player).expect("player").cash
}

pub fn assert_consistent(engine: &GameEngine, state: &GameState) {
    let violations = check_invariants(state, engine.board());
    assert!(violations.is_empty(), "invariants broken: {violations:?}");
}
