//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/guesstree/guesstree.toml`
//! 3. Environment variables: `GUESSTREE_*` prefix
//! 4. Command line flags (applied by the CLI)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{validate_text, DEFAULT_MAX_LINE_LEN, DEFAULT_SEED};

/// File name used when no data directory can be determined.
pub const FALLBACK_TREE_FILE: &str = "animalGame.txt";

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree_file: Option<PathBuf>,
    pub seed_animal: Option<String>,
    pub max_line_len: Option<usize>,
}

/// Unified configuration for guesstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// File the tree is loaded from and saved to
    pub tree_file: PathBuf,
    /// Animal a brand-new tree guesses (default: "cat")
    pub seed_animal: String,
    /// Longest question or animal name, in bytes
    pub max_line_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tree_file: default_tree_file(),
            seed_animal: DEFAULT_SEED.to_string(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Default tree location (`<XDG data dir>/guesstree/animals.txt`).
fn default_tree_file() -> PathBuf {
    ProjectDirs::from("", "", "guesstree")
        .map(|dirs| dirs.data_dir().join("animals.txt"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_TREE_FILE))
}

/// Get the XDG config directory for guesstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "guesstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("guesstree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence from the global config location.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `config_file` as the config file layer.
    ///
    /// A missing file is skipped; a file that cannot be parsed is an error.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file (scalars replace defaults)
        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current)?;

        // Expand ~ and $VAR in path-like fields
        current.expand_paths();

        current.validate()?;
        Ok(current)
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree_file: overlay
                .tree_file
                .clone()
                .unwrap_or_else(|| self.tree_file.clone()),
            seed_animal: overlay
                .seed_animal
                .clone()
                .unwrap_or_else(|| self.seed_animal.clone()),
            max_line_len: overlay.max_line_len.unwrap_or(self.max_line_len),
        }
    }

    /// Apply GUESSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("GUESSTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("tree_file") {
            settings.tree_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("seed_animal") {
            settings.seed_animal = val;
        }
        if let Ok(val) = config.get_string("max_line_len") {
            settings.max_line_len = val.trim().parse().map_err(|e| ApplicationError::Config {
                message: format!("GUESSTREE_MAX_LINE_LEN={}: {}", val, e),
            })?;
        }

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.tree_file.to_string_lossy().into_owned();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.tree_file = PathBuf::from(expanded.into_owned());
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_line_len == 0 {
            return Err(ApplicationError::Config {
                message: "max_line_len must be at least 1".into(),
            });
        }
        if self.tree_file.as_os_str().is_empty() {
            return Err(ApplicationError::Config {
                message: "tree_file must not be empty".into(),
            });
        }
        validate_text(self.seed_animal.clone()).map_err(|e| ApplicationError::Config {
            message: format!("seed_animal: {}", e),
        })?;
        if self.seed_animal.len() > self.max_line_len {
            return Err(ApplicationError::Config {
                message: format!("seed_animal is longer than {} bytes", self.max_line_len),
            });
        }
        Ok(())
    }

    /// Replace the tree file (command line override).
    pub fn with_tree_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tree_file = path.into();
        self.expand_paths();
        self
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_validating_then_ok() {
        let settings = Settings::default();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.seed_animal, "cat");
        assert_eq!(settings.max_line_len, DEFAULT_MAX_LINE_LEN);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            seed_animal: Some("owl".into()),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.seed_animal, "owl");
        assert_eq!(merged.tree_file, base.tree_file);
        assert_eq!(merged.max_line_len, base.max_line_len);
    }

    #[test]
    fn given_zero_line_length_when_validating_then_config_error() {
        let settings = Settings {
            max_line_len: 0,
            ..Default::default()
        };

        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }
}
