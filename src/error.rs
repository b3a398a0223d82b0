use thiserror::Error;

use crate::config::ConfigError;
use crate::graph::GraphError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
