use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{ConfigError, EngineConfig};

pub const CONFIG_FILE_NAME: &str = ".digraph.toml";
pub const CONFIG_ENV_VAR: &str = "DIGRAPH_CONFIG";

/// Finds the engine config for `start`, honoring `DIGRAPH_CONFIG`.
///
/// Returns the default config when no file is found.
pub fn resolve_config(start: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    resolve_config_with_override(start, None)
}

pub fn resolve_config_with_override(
    start: impl AsRef<Path>,
    config_path: Option<PathBuf>,
) -> Result<EngineConfig, ConfigError> {
    if let Some(path) = config_path {
        return load_engine_config(&path);
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return load_engine_config(Path::new(&path));
    }

    match find_config_from(start.as_ref()) {
        Some(path) => load_engine_config(&path),
        None => {
            debug!(start = %start.as_ref().display(), "no engine config found, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
