//! Environment variable overrides.
//!
//! Kept in its own test binary: it mutates the process environment, which would
//! leak into the file-layer tests if they ran in the same process.

use std::env;
use std::fs;

use tempfile::TempDir;

use guesstree::config::Settings;

#[test]
fn given_env_vars_when_load_then_override_config_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("guesstree.toml");
    fs::write(
        &config_path,
        "seed_animal = \"owl\"\nmax_line_len = 64\n",
    )
    .unwrap();
    let tree_file = temp.path().join("from-env.txt");
    env::set_var("GUESSTREE_TREE_FILE", &tree_file);
    env::set_var("GUESSTREE_SEED_ANIMAL", "ferret");

    // Act
    let settings = Settings::load_from(Some(&config_path));
    env::remove_var("GUESSTREE_TREE_FILE");
    env::remove_var("GUESSTREE_SEED_ANIMAL");
    let settings = settings.expect("load settings");

    // Assert
    assert_eq!(settings.tree_file, tree_file);
    assert_eq!(settings.seed_animal, "ferret");
    assert_eq!(settings.max_line_len, 64, "file value not overridden by env");
}
