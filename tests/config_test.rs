//! Integration tests for Settings config loading with layered precedence.
//!
//! Precedence:
//! - Defaults → Config file: REPLACE per field (unspecified fields keep the default)
//! - Any → Env vars: REPLACE (explicit user override, see `config_env_test.rs`)
//!
//! Note: These tests pass explicit config files from temp directories, never the
//! user's global config.

use std::fs;

use tempfile::TempDir;

use guesstree::application::ApplicationError;
use guesstree::config::Settings;

// ============================================================
// Settings::load_from() file layer
// ============================================================

#[test]
fn given_no_config_file_when_load_then_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("guesstree.toml");

    // Act
    let settings = Settings::load_from(Some(&missing)).expect("load settings");

    // Assert
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_config_file_with_some_fields_when_load_then_only_those_replaced() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("guesstree.toml");
    let tree_file = temp.path().join("zoo.txt");
    let config = format!(
        "tree_file = {:?}\nseed_animal = \"owl\"\n",
        tree_file.display().to_string()
    );
    fs::write(&config_path, config).unwrap();

    // Act
    let settings = Settings::load_from(Some(&config_path)).expect("load settings");

    // Assert
    assert_eq!(settings.tree_file, tree_file);
    assert_eq!(settings.seed_animal, "owl");
    assert_eq!(
        settings.max_line_len,
        Settings::default().max_line_len,
        "unspecified field keeps its default"
    );
}

#[test]
fn given_tilde_in_tree_file_when_load_then_expanded() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("guesstree.toml");
    fs::write(&config_path, "tree_file = \"~/animals.txt\"\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&config_path)).expect("load settings");

    // Assert
    assert!(
        !settings.tree_file.to_string_lossy().starts_with('~'),
        "tilde should be expanded: {}",
        settings.tree_file.display()
    );
    assert!(settings.tree_file.ends_with("animals.txt"));
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("guesstree.toml");
    fs::write(&config_path, "seed_animal = [unclosed\n").unwrap();

    // Act
    let result = Settings::load_from(Some(&config_path));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_blank_seed_animal_when_load_then_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("guesstree.toml");
    fs::write(&config_path, "seed_animal = \"   \"\n").unwrap();

    // Act
    let result = Settings::load_from(Some(&config_path));

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => {
            assert!(message.contains("seed_animal"), "message: {}", message)
        }
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn given_seed_longer_than_line_bound_when_load_then_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("guesstree.toml");
    fs::write(
        &config_path,
        "seed_animal = \"hippopotamus\"\nmax_line_len = 5\n",
    )
    .unwrap();

    // Act
    let result = Settings::load_from(Some(&config_path));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

// ============================================================
// Rendering and overrides
// ============================================================

#[test]
fn given_settings_when_rendered_as_toml_then_parses_back() {
    // Arrange
    let settings = Settings {
        seed_animal: "owl".into(),
        max_line_len: 64,
        ..Default::default()
    };

    // Act
    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    // Assert
    assert_eq!(parsed, settings);
}

#[test]
fn given_command_line_file_when_overriding_then_replaces_tree_file() {
    let settings = Settings::default().with_tree_file("/tmp/custom.txt");

    assert_eq!(settings.tree_file, std::path::PathBuf::from("/tmp/custom.txt"));
}
