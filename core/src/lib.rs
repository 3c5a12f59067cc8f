//! monopoly-core: a deterministic, turn-based property-trading engine.
//!
//! The engine is pure. Every action takes a `GameState` value and returns
//! the next one, so callers own persistence and may run independent games
//! on separate threads without coordination.

pub mod board;
pub mod cards;
pub mod command;
pub mod config;
pub mod debt;
pub mod dice;
pub mod engine;
pub mod error;
pub mod event;
pub mod invariants;
pub mod ledger;
pub mod registry;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod types;
pub mod win;
