use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Seed of the first game; game `n` uses `seed + n`.
    pub seed: u64,
    pub games: u32,
    pub players: usize,
    /// Upper bound on phase advances per game.
    pub max_steps: u32,
    /// Keep every game's round log in the result, not just the summary.
    pub keep_games: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            games: 100,
            players: 4,
            max_steps: 64,
            keep_games: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AutoplayConfig =
            serde_json::from_str(r#"{"games": 5, "players": 2}"#).expect("parse");
        assert_eq!((config.games, config.players), (5, 2));
        assert_eq!(config.seed, AutoplayConfig::default().seed);
        assert_eq!(config.max_steps, 64);
    }
}
