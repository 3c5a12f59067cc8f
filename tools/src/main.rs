//! game-runner: headless session runner for monopoly-core.
//!
//! Usage:
//!   game-runner --seed 12345 --players 4 --max-turns 400 --db game.db
//!   game-runner --config rules.json --ipc-mode

mod autoplay;

use anyhow::Result;
use monopoly_core::{
    command::{ActionReport, CommandRecord, GameCommand},
    config::GameConfig,
    engine::{ActionResult, GameEngine},
    event::GameEvent,
    invariants::check_invariants,
    snapshot::{GameSnapshot, SNAPSHOT_INTERVAL},
    state::GameState,
    store::GameStore,
    win::WinnerReport,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    Create {
        #[serde(default)]
        game_id:   Option<String>,
        players:   Vec<String>,
        #[serde(default)]
        deck_seed: u64,
    },
    Command {
        actor:   String,
        command: GameCommand,
    },
    GetState,
    CheckWinner,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let players = parse_arg(&args, "--players", 4usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");

    let mut config = match string_arg(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    config.max_turns = parse_arg(&args, "--max-turns", config.max_turns);

    if !ipc_mode {
        println!("monopoly-core game-runner");
        println!("  started:   {}", chrono::Utc::now().to_rfc3339());
        println!("  seed:      {seed}");
        println!("  players:   {players}");
        println!("  max turns: {}", config.max_turns);
        println!("  db:        {db}");
        println!();
    }

    let store = GameStore::open(db)?;
    store.migrate()?;
    let engine = GameEngine::build(config)?;

    if ipc_mode {
        run_ipc_loop(&engine, &store)?;
    } else {
        let game_id = format!("game-{}", uuid::Uuid::new_v4());
        let state = run_batch(&engine, &store, &game_id, seed, players)?;
        print_summary(&engine, &store, &state)?;
    }

    Ok(())
}

/// Create, join and start a game, persisting each step.
fn open_game(
    engine: &GameEngine,
    store: &GameStore,
    game_id: &str,
    players: &[String],
    deck_seed: u64,
) -> Result<GameState> {
    store.insert_game(game_id, deck_seed, engine.config())?;
    let created = engine.create_game(game_id.to_string());
    store.append_events(game_id, 0, &created.events)?;

    let mut state = created.state;
    for player in players {
        let joined = engine.join_game(&state, player)?;
        store.append_events(game_id, 0, &joined.events)?;
        state = joined.state;
    }
    let started = engine.start_game(&state, deck_seed)?;
    store.append_events(game_id, 0, &started.events)?;
    store.save_snapshot(&GameSnapshot::capture(&started.state))?;
    Ok(started.state)
}

/// Apply one command and persist it, accepted or rejected.
fn submit(
    engine: &GameEngine,
    store: &GameStore,
    state: &GameState,
    actor: &str,
    command: GameCommand,
) -> Result<ActionResult<ActionReport>> {
    let result = engine.apply(state, actor, &command);
    store.record_command(&CommandRecord {
        game_id: state.game_id.clone(),
        turn: state.turn_counter,
        actor: actor.to_string(),
        command,
        rejected: result.as_ref().err().map(|r| r.to_string()),
    })?;
    if let Ok(outcome) = &result {
        store.append_events(&state.game_id, state.turn_counter, &outcome.events)?;
        let turn_changed = outcome.state.turn_counter != state.turn_counter;
        if (turn_changed && outcome.state.turn_counter % SNAPSHOT_INTERVAL == 0) || outcome.state.status.is_terminal() {
            store.save_snapshot(&GameSnapshot::capture(&outcome.state))?;
        }
    }
    Ok(result)
}

fn run_batch(engine: &GameEngine, store: &GameStore, game_id: &str, seed: u64, players: usize) -> Result<GameState> {
    let names: Vec<String> = (1..=players).map(|i| format!("p{i}")).collect();
    let mut state = open_game(engine, store, game_id, &names, seed)?;

    let step_limit = engine.config().max_turns.saturating_mul(32).max(64);
    let mut rolls = 0u64;
    let mut steps = 0u64;

    while !state.status.is_terminal() {
        steps += 1;
        if steps > step_limit {
            anyhow::bail!("Session stalled after {steps} steps at turn {}", state.turn_counter);
        }

        let Some(actor) = state.current_actor().map(|p| p.id.clone()) else {
            anyhow::bail!("Game {game_id} has no players");
        };
        let index = autoplay::roll_index(&engine.config().dice, state.turn_counter, rolls);
        let command = autoplay::next_command(engine.board(), &state, index);
        if matches!(command, GameCommand::RollAndMove { .. }) {
            rolls += 1;
        }

        match submit(engine, store, &state, &actor, command)? {
            Ok(outcome) => state = outcome.state,
            Err(rejection) => {
                log::warn!("{actor}: {} rejected ({rejection}), ending turn", command.name());
                match submit(engine, store, &state, &actor, GameCommand::AdvanceTurn)? {
                    Ok(outcome) => state = outcome.state,
                    Err(rejection) => anyhow::bail!("{actor} cannot end turn: {rejection}"),
                }
            }
        }
    }

    for violation in check_invariants(&state, engine.board()) {
        log::warn!("{violation}");
    }
    Ok(state)
}

fn run_ipc_loop(engine: &GameEngine, store: &GameStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut game: Option<GameState> = None;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let response = match request {
            IpcRequest::Quit => break,
            IpcRequest::Create { game_id, players, deck_seed } => {
                let game_id = game_id.unwrap_or_else(|| format!("game-{}", uuid::Uuid::new_v4()));
                match open_game(engine, store, &game_id, &players, deck_seed) {
                    Ok(state) => {
                        let response = serde_json::json!({ "ok": true, "state": state });
                        game = Some(state);
                        response
                    }
                    Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
                }
            }
            IpcRequest::Command { actor, command } => match &game {
                None => serde_json::json!({ "ok": false, "error": "no game created" }),
                Some(state) => match submit(engine, store, state, &actor, command)? {
                    Ok(outcome) => {
                        let response = serde_json::json!({
                            "ok": true,
                            "report": outcome.detail,
                            "events": outcome.events,
                            "state": outcome.state,
                        });
                        game = Some(outcome.state);
                        response
                    }
                    Err(rejection) => serde_json::json!({
                        "ok": false,
                        "rejection": rejection,
                        "state": state,
                    }),
                },
            },
            IpcRequest::GetState => serde_json::json!({ "ok": game.is_some(), "state": game }),
            IpcRequest::CheckWinner => match &game {
                None => serde_json::json!({ "ok": false, "error": "no game created" }),
                Some(state) => serde_json::json!({
                    "ok": true,
                    "winner": engine.check_winner(state),
                    "state": state,
                }),
            },
        };

        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(engine: &GameEngine, store: &GameStore, state: &GameState) -> Result<()> {
    let commands = store.command_count(&state.game_id, false)?;
    let rejected = store.command_count(&state.game_id, true)?;
    let events = store.events_for_game(&state.game_id)?;
    let bankruptcies = events
        .iter()
        .filter_map(|e| serde_json::from_str::<GameEvent>(&e.payload).ok())
        .filter(|e| matches!(e, GameEvent::PlayerBankrupt { .. }))
        .count();

    println!("=== GAME SUMMARY ===");
    println!("  game_id:      {}", state.game_id);
    println!("  turns played: {}", state.turn_counter);
    println!("  commands:     {commands} ({rejected} rejected)");
    println!("  events:       {}", events.len());
    println!("  bankruptcies: {bankruptcies}");
    match engine.check_winner(state) {
        WinnerReport::Winner { player, reason } => println!("  result:       {player} wins ({reason:?})"),
        WinnerReport::Draw { rankings } => {
            println!("  result:       draw");
            for (place, rank) in rankings.iter().enumerate() {
                println!("    {}. {} worth {}", place + 1, rank.player, rank.total);
            }
        }
        WinnerReport::InProgress { turn_counter } => println!("  result:       unfinished at turn {turn_counter}"),
    }

    println!();
    println!("=== PLAYERS ===");
    for player in &state.players {
        println!(
            "  {:<4} cash {:>6} | tiles {:>2} | buildings {:>2}{}",
            player.id,
            player.cash,
            player.owned.len(),
            player.buildings.values().map(|&c| u32::from(c)).sum::<u32>(),
            if player.bankrupt { " | bankrupt" } else { "" }
        );
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
