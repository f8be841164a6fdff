//! Configuration management for flogical.
//!
//! This module provides the [`Config`] struct which controls how source is read.
//! Settings are layered, each layer replacing what it sets:
//! 1. built-in defaults
//! 2. `flogical.toml` files: the home directory, then every ancestor of the
//!    input from the root down (or one explicit `--config` file)
//! 3. CLI flags
//! 4. an in-file `! flogical: --tab-width 4` directive

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::parser::stream::{DEFAULT_MAX_CONTINUATION_LINES, DEFAULT_TAB_WIDTH};
use crate::parser::StreamSettings;

/// Config file names looked up in each directory; a later name wins over an earlier one
const CONFIG_FILE_NAMES: &[&str] = &["flogical.toml", ".flogical.toml"];

/// Home directory (`HOME`, or `USERPROFILE` on Windows)
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Config files present directly in `dir`, in lookup order
fn config_files_in(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    CONFIG_FILE_NAMES
        .iter()
        .map(move |name| dir.join(name))
        .filter(|path| path.is_file())
}

fn default_tab_width() -> usize {
    DEFAULT_TAB_WIDTH
}
fn default_true() -> bool {
    true
}
fn default_max_continuation_lines() -> usize {
    DEFAULT_MAX_CONTINUATION_LINES
}

/// Main configuration struct for flogical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Tab stop width used when expanding tabs (default: 8)
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Treat `!$` lines as conditionally compiled code (default: true)
    #[serde(default = "default_true")]
    pub sentinel: bool,

    /// Maximum pieces in one logical statement (default: 10000)
    #[serde(default = "default_max_continuation_lines")]
    pub max_continuation_lines: usize,
}

/// One config file as written: a field left out stays `None` and does not
/// replace the value it is merged over
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub tab_width: Option<usize>,
    pub sentinel: Option<bool>,
    pub max_continuation_lines: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tab_width: DEFAULT_TAB_WIDTH,
            sentinel: true,
            max_continuation_lines: DEFAULT_MAX_CONTINUATION_LINES,
        }
    }
}

impl Config {
    /// Maximum reasonable tab width
    const MAX_TAB_WIDTH: usize = 16;

    /// Check value bounds, returning a message for the first violation
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.tab_width == 0 {
            return Some("tab_width must be at least 1".to_string());
        }
        if self.tab_width > Self::MAX_TAB_WIDTH {
            return Some(format!(
                "tab_width {} exceeds maximum of {}",
                self.tab_width,
                Self::MAX_TAB_WIDTH
            ));
        }
        if self.max_continuation_lines == 0 {
            return Some("max_continuation_lines must be at least 1".to_string());
        }
        None
    }

    /// Settings handed to the input stream
    #[must_use]
    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            tab_width: self.tab_width,
            sentinel: self.sentinel,
            max_continuation_lines: self.max_continuation_lines,
        }
    }

    /// Load an explicit config file over the defaults
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Load configuration from TOML text
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let mut loaded = Self::default();
        loaded.apply_partial(&toml::from_str(contents)?);
        Ok(loaded)
    }

    /// Overlay the fields a config file sets
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.tab_width {
            self.tab_width = v;
        }
        if let Some(v) = partial.sentinel {
            self.sentinel = v;
        }
        if let Some(v) = partial.max_continuation_lines {
            self.max_continuation_lines = v;
        }
    }

    /// Find the config files that apply to `start_path`
    ///
    /// The home directory comes first, then every ancestor of the file's
    /// directory from the filesystem root down. A path that does not exist
    /// is looked up from the current directory instead.
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = home_dir()
            .map(|home| config_files_in(&home).collect())
            .unwrap_or_default();

        let base = if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else {
            std::env::current_dir().ok()
        };
        let Some(base) = base else {
            return found;
        };

        let lineage: Vec<&Path> = base.ancestors().collect();
        for dir in lineage.into_iter().rev() {
            for path in config_files_in(dir) {
                if !found.contains(&path) {
                    found.push(path);
                }
            }
        }
        found
    }

    /// Merge every discovered config file over the defaults
    ///
    /// Settings from a more specific file replace those of a less specific
    /// one. Unreadable or invalid files are skipped with a warning.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        Self::discover_config_files(start_path)
            .iter()
            .fold(Self::default(), |mut config, path| {
                let partial = std::fs::read_to_string(path)
                    .map_err(anyhow::Error::from)
                    .and_then(|text| Ok(toml::from_str::<PartialConfig>(&text)?));
                match partial {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => warn!("skipping config file {}: {e}", path.display()),
                }
                config
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tab_width, 8);
        assert!(config.sentinel);
        assert_eq!(config.max_continuation_lines, 10_000);
        assert_eq!(config.stream_settings(), StreamSettings::default());
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str("tab_width = 4\nsentinel = false\n").unwrap();
        assert_eq!(config.tab_width, 4);
        assert!(!config.sentinel);
        // Unset fields keep their defaults
        assert_eq!(config.max_continuation_lines, 10_000);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_type() {
        assert!(Config::from_toml_str("tab_width = \"wide\"\n").is_err());
    }

    #[test]
    fn test_config_apply_partial_preserves_unset() {
        let mut base = Config {
            tab_width: 2,
            ..Default::default()
        };

        let partial = PartialConfig {
            max_continuation_lines: Some(50),
            ..Default::default()
        };

        base.apply_partial(&partial);
        assert_eq!(base.tab_width, 2);
        assert_eq!(base.max_continuation_lines, 50);
        assert!(base.sentinel);
    }

    #[test]
    fn test_discovered_files_merge() {
        let root = std::env::temp_dir().join(format!("flogical-config-{}", std::process::id()));
        let nested = root.join("src");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("flogical.toml"), "tab_width = 4\nsentinel = false\n").unwrap();
        std::fs::write(nested.join("flogical.toml"), "tab_width = 2\n").unwrap();
        let source = nested.join("main.f90");
        std::fs::write(&source, "end\n").unwrap();

        let config = Config::from_discovered_files(&source);
        // Nearest file wins for tab_width; the outer file still sets sentinel
        assert_eq!(config.tab_width, 2);
        assert!(!config.sentinel);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_from_discovered_files_nonexistent_path() {
        let path = PathBuf::from("/nonexistent/unique/path/file.f90");
        let config = Config::from_discovered_files(&path);
        assert!(config.validate().is_none());
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_none());
    }

    #[test]
    fn test_validate_tab_width() {
        let config = Config {
            tab_width: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("tab_width"));

        let config = Config {
            tab_width: 40,
            ..Default::default()
        };
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_validate_max_continuation_lines() {
        let config = Config {
            max_continuation_lines: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap()
            .contains("max_continuation_lines"));
    }
}
