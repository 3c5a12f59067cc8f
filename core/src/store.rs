//! SQLite persistence adapter.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never touches it; callers persist the values actions return.

use crate::{
    command::CommandRecord,
    config::GameConfig,
    error::{GameError, GameResult},
    event::{event_type_name, EventLogEntry, GameEvent},
    snapshot::GameSnapshot,
    types::TurnNumber,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct GameStore {
    conn: Connection,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl GameStore {
    /// Open (or create) the game database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_games.sql"))?;
        Ok(())
    }

    // ── Game ───────────────────────────────────────────────────

    pub fn insert_game(&self, game_id: &str, deck_seed: u64, config: &GameConfig) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO game (game_id, deck_seed, config_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![game_id, deck_seed as i64, serde_json::to_string(config)?, now()],
        )?;
        Ok(())
    }

    pub fn game_config(&self, game_id: &str) -> GameResult<GameConfig> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT config_json FROM game WHERE game_id = ?1",
                params![game_id],
                |row| row.get(0),
            )
            .optional()?;
        let json = json.ok_or_else(|| GameError::GameNotFound { game_id: game_id.to_string() })?;
        Ok(serde_json::from_str(&json)?)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, snapshot: &GameSnapshot) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot (game_id, turn, state_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![snapshot.game_id, snapshot.turn_counter as i64, snapshot.to_json()?, now()],
        )?;
        Ok(())
    }

    /// The most recently saved snapshot of a game.
    pub fn latest_snapshot(&self, game_id: &str) -> GameResult<Option<GameSnapshot>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM snapshot WHERE game_id = ?1 ORDER BY id DESC LIMIT 1",
                params![game_id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| GameSnapshot::from_json(&j)).transpose()
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_events(&self, game_id: &str, turn: TurnNumber, events: &[GameEvent]) -> GameResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO event_log (game_id, turn, seq, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (seq, event) in events.iter().enumerate() {
            stmt.execute(params![
                game_id,
                turn as i64,
                seq as i64,
                event_type_name(event),
                serde_json::to_string(event)?,
                now(),
            ])?;
        }
        Ok(())
    }

    pub fn events_for_game(&self, game_id: &str) -> GameResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, game_id, turn, seq, event_type, payload
             FROM event_log WHERE game_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![game_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    game_id:    row.get(1)?,
                    turn:       row.get::<_, i64>(2)? as u64,
                    seq:        row.get::<_, i64>(3)? as u32,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Command log ────────────────────────────────────────────

    pub fn record_command(&self, record: &CommandRecord) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO command_log (game_id, turn, actor, command_json, rejected, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.game_id,
                record.turn as i64,
                record.actor,
                serde_json::to_string(&record.command)?,
                record.rejected,
                now(),
            ],
        )?;
        Ok(())
    }

    /// Commands recorded for a game. `rejected` selects refused ones only.
    pub fn command_count(&self, game_id: &str, rejected: bool) -> GameResult<u64> {
        let sql = if rejected {
            "SELECT COUNT(*) FROM command_log WHERE game_id = ?1 AND rejected IS NOT NULL"
        } else {
            "SELECT COUNT(*) FROM command_log WHERE game_id = ?1"
        };
        let count: i64 = self.conn.query_row(sql, params![game_id], |row| row.get(0))?;
        Ok(count as u64)
    }
}
