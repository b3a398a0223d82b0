use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use digraph::config::{load_engine_config, resolve_config_with_override, ConfigError, RankDir};
use digraph::{get_paths_bounded, to_dot, Graph};

struct TestDir {
    root: PathBuf,
}

impl TestDir {
    fn new(prefix: &str) -> Self {
        let root = unique_temp_dir(prefix);
        fs::create_dir_all(root.join("nested").join("deeper")).expect("create test dirs");
        Self { root }
    }

    fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::write(&path, contents).expect("write config");
        path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("digraph-{prefix}-{pid}-{nanos}"))
}

#[test]
fn config_is_found_in_an_ancestor_directory() {
    let dir = TestDir::new("ancestor");
    dir.write(
        ".digraph.toml",
        "[dot]\nname = \"deps\"\nrankdir = \"LR\"\n\n[paths]\nmax_paths = 1\n",
    );

    let config = resolve_config_with_override(dir.root.join("nested").join("deeper"), None)
        .expect("resolve config");
    assert_eq!(config.dot.name, "deps");
    assert_eq!(config.dot.rankdir, Some(RankDir::Lr));

    let graph = Graph::new()
        .add_edge("a", "b")
        .add_edge("a", "c")
        .add_edge("b", "d")
        .add_edge("c", "d");
    assert_eq!(get_paths_bounded(&graph, &"a", &"d", &config.paths).len(), 1);
    let dot = to_dot(&graph, &config.dot).expect("render dot");
    assert!(dot.starts_with("digraph \"deps\" {\n  rankdir=LR;\n"));
}

#[test]
fn explicit_path_wins_over_discovered_file() {
    let dir = TestDir::new("override");
    dir.write(".digraph.toml", "[dot]\nname = \"discovered\"\n");
    let explicit = dir.write("explicit.toml", "[dot]\nname = \"explicit\"\n");

    let config =
        resolve_config_with_override(&dir.root, Some(explicit)).expect("resolve explicit config");
    assert_eq!(config.dot.name, "explicit");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = TestDir::new("missing");
    let result = load_engine_config(&dir.root.join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
}

#[test]
fn malformed_and_invalid_configs_are_rejected() {
    let dir = TestDir::new("invalid");
    let broken = dir.write("broken.toml", "[dot\nname = ");
    match load_engine_config(&broken) {
        Err(ConfigError::Toml { path, .. }) => assert_eq!(path, broken),
        other => panic!("expected toml error, got {other:?}"),
    }

    let zero = dir.write("zero.toml", "[paths]\nmax_paths = 0\n");
    assert!(matches!(load_engine_config(&zero), Err(ConfigError::Invalid(_))));

    let unknown_rankdir = dir.write("rankdir.toml", "[dot]\nrankdir = \"SIDEWAYS\"\n");
    assert!(matches!(
        load_engine_config(&unknown_rankdir),
        Err(ConfigError::Toml { .. })
    ));
}
