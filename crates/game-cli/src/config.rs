use std::net::SocketAddr;
use std::path::PathBuf;

use contracts::{Difficulty, GameConfig};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::CliError;

pub const CONFIG_FILE: &str = "traitors.toml";
pub const ENV_PREFIX: &str = "TRAITORS_";

/// Settings layered from defaults, `traitors.toml`, then `TRAITORS_*` env.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub difficulty: String,
    pub num_traitors: usize,
    pub seed: Option<u32>,
    pub human_id: Option<String>,
    pub analysis_mode: bool,
    pub reveal_delay_ms: u64,
    pub log_filter: String,
    pub bind_addr: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            difficulty: "medium".to_string(),
            num_traitors: 3,
            seed: None,
            human_id: None,
            analysis_mode: true,
            reveal_delay_ms: 400,
            log_filter: "warn".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl CliConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(CliConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, CliError> {
        Ok(figment.extract()?)
    }

    pub fn difficulty(&self) -> Result<Difficulty, CliError> {
        self.difficulty.parse().map_err(CliError::Config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, CliError> {
        self.bind_addr
            .parse()
            .map_err(|_| CliError::Config(format!("invalid bind_addr: {}", self.bind_addr)))
    }

    /// The configured seed, or a fresh one when none is set.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(rand::random::<u32>)
    }

    pub fn game_config(&self, human_id: String, seed: u32) -> Result<GameConfig, CliError> {
        Ok(GameConfig {
            game_id: format!("game_{seed:010}"),
            seed,
            human_id,
            difficulty: self.difficulty()?,
            num_traitors: self.num_traitors,
            analysis_mode: self.analysis_mode,
            ..GameConfig::default()
        })
    }
}
