use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub dot: DotConfig,
    #[serde(default)]
    pub paths: PathLimits,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dot.name.trim().is_empty() {
            return Err(ConfigError::Invalid("dot.name must not be empty".to_string()));
        }
        if self.paths.max_paths == Some(0) {
            return Err(ConfigError::Invalid(
                "paths.max_paths must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotConfig {
    #[serde(default = "default_graph_name")]
    pub name: String,
    #[serde(default)]
    pub rankdir: Option<RankDir>,
    #[serde(default = "default_true")]
    pub show_weights: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            name: default_graph_name(),
            rankdir: None,
            show_weights: true,
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RankDir {
    Tb,
    Lr,
    Bt,
    Rl,
}

impl RankDir {
    pub fn as_str(self) -> &'static str {
        match self {
            RankDir::Tb => "TB",
            RankDir::Lr => "LR",
            RankDir::Bt => "BT",
            RankDir::Rl => "RL",
        }
    }
}

/// Budget for simple-path enumeration. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLimits {
    /// Maximum number of edges in a returned path.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Stop after this many paths have been found.
    #[serde(default)]
    pub max_paths: Option<usize>,
}

impl PathLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn depth_allows(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    pub fn is_exhausted(&self, found: usize) -> bool {
        self.max_paths.map_or(false, |max| found >= max)
    }
}

fn default_graph_name() -> String {
    "G".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, EngineConfig, PathLimits, RankDir};

    #[test]
    fn empty_toml_yields_defaults() {
        let config: EngineConfig = toml::from_str("").expect("parse empty config");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.dot.name, "G");
        assert!(config.dot.show_weights);
        assert_eq!(config.paths, PathLimits::unbounded());
    }

    #[test]
    fn parses_dot_and_path_sections() {
        let config: EngineConfig = toml::from_str(
            "[dot]\nname = \"deps\"\nrankdir = \"LR\"\nshow_labels = false\n\n[paths]\nmax_depth = 4\n",
        )
        .expect("parse config");
        assert_eq!(config.dot.name, "deps");
        assert_eq!(config.dot.rankdir, Some(RankDir::Lr));
        assert!(!config.dot.show_labels);
        assert!(config.dot.show_weights);
        assert_eq!(config.paths.max_depth, Some(4));
        assert_eq!(config.paths.max_paths, None);
    }

    #[test]
    fn validate_rejects_zero_path_budget() {
        let mut config = EngineConfig::default();
        config.paths.max_paths = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn path_limits_checks() {
        let limits = PathLimits {
            max_depth: Some(2),
            max_paths: Some(3),
        };
        assert!(limits.depth_allows(2));
        assert!(!limits.depth_allows(3));
        assert!(!limits.is_exhausted(2));
        assert!(limits.is_exhausted(3));
        assert!(PathLimits::unbounded().depth_allows(usize::MAX));
    }
}
