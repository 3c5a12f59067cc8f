use crate::{dice::DiceConfig, types::{Cash, TurnNumber}};
use serde::{Deserialize, Serialize};

/// Rules and economics for one game. Every field has a default, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_cash: Cash,
    pub go_salary: Cash,
    pub jail_fine: Cash,
    /// Escape attempts granted on entering jail. The last one forces the fine.
    pub max_jail_turns: u8,
    pub auto_pay_jail_fine: bool,
    pub win_property_threshold: usize,
    /// Global turn count at which the game is drawn.
    pub max_turns: TurnNumber,
    pub mortgage_interest_percent: Cash,
    pub min_players: usize,
    pub max_players: usize,
    pub dice: DiceConfig,
    /// Optional JSON board replacing the standard layout.
    pub board_path: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_cash: 1500,
            go_salary: 200,
            jail_fine: 50,
            max_jail_turns: 3,
            auto_pay_jail_fine: false,
            win_property_threshold: 20,
            max_turns: 400,
            mortgage_interest_percent: 10,
            min_players: 2,
            max_players: 8,
            dice: DiceConfig::Table,
            board_path: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        if config.min_players < 1 || config.min_players > config.max_players {
            anyhow::bail!(
                "Invalid player bounds in {path}: min {} max {}",
                config.min_players,
                config.max_players
            );
        }
        Ok(config)
    }

    /// Defaults with table dice, for tests.
    pub fn default_test() -> Self {
        Self { dice: DiceConfig::Table, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "jail_fine": 75, "dice": { "mode": "seeded", "seed": 9 } }"#)
                .unwrap();
        assert_eq!(config.jail_fine, 75);
        assert_eq!(config.dice, DiceConfig::Seeded { seed: 9 });
        assert_eq!(config.starting_cash, 1500);
        assert_eq!(config.max_turns, 400);
    }
}
