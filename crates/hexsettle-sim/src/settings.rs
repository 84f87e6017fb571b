//! Simulation settings read from the environment.

use anyhow::{bail, Context};
use hexsettle_core::{BotDifficulty, GameConfig};

/// Turns played when `HEXSETTLE_TURNS` is unset
pub const DEFAULT_TURNS: u32 = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub config: GameConfig,
    pub turns: u32,
    pub difficulty: BotDifficulty,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup. `HEXSETTLE_CONFIG` names a JSON
    /// config file; the other variables override single fields of it.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("HEXSETTLE_CONFIG") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                serde_json::from_str(&raw).with_context(|| format!("parsing config file {path}"))?
            }
            None => GameConfig::default(),
        };

        if let Some(seed) = lookup("HEXSETTLE_SEED") {
            config.seed = Some(seed.parse().context("HEXSETTLE_SEED")?);
        }
        if let Some(players) = lookup("HEXSETTLE_PLAYERS") {
            config.players = players.parse().context("HEXSETTLE_PLAYERS")?;
        }

        let turns = match lookup("HEXSETTLE_TURNS") {
            Some(turns) => turns.parse().context("HEXSETTLE_TURNS")?,
            None => DEFAULT_TURNS,
        };

        let difficulty = match lookup("HEXSETTLE_DIFFICULTY").as_deref() {
            None | Some("medium") => BotDifficulty::Medium,
            Some("easy") => BotDifficulty::Easy,
            Some(other) => bail!("unknown difficulty {other:?}, expected easy or medium"),
        };

        config.validate()?;
        Ok(Self {
            config,
            turns,
            difficulty,
        })
    }
}
