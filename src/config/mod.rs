pub mod engine;
pub mod resolve;

pub use engine::{DotConfig, EngineConfig, PathLimits, RankDir};
pub use resolve::{load_engine_config, resolve_config, resolve_config_with_override};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
