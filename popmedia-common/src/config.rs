//! Configuration loading and compiled defaults
//!
//! Settings resolve in this priority order (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (`POPMEDIA_*`)
//! 3. TOML config file
//! 4. OS-dependent compiled defaults
//!
//! This module owns tiers 3 and 4. The first two are applied by the binary
//! on top of whatever [`TomlConfig`] returns.
//!
//! A missing TOML file is never fatal: a warning is logged and every field
//! falls back to its compiled default. A file that exists but cannot be
//! parsed is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable that points at an explicit TOML config file
pub const CONFIG_PATH_ENV: &str = "POPMEDIA_CONFIG";

/// File name of the HTML report inside the backup root
pub const REPORT_FILE_NAME: &str = "popmedia-report.html";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to the PinUP catalog database (`PUPDatabase.db`)
    pub database_path: Option<PathBuf>,

    /// Media root walked for assets (the emulator's `POPMedia` folder)
    pub media_root: Option<PathBuf>,

    /// Root under which archived assets are mirrored
    pub backup_root: Option<PathBuf>,

    /// HTML report destination
    pub report_path: Option<PathBuf>,

    /// Inclusion threshold for similarity scores, in `(0, 1]`
    pub threshold: Option<f64>,

    /// Confidence (percent) at or above which the top match is renamed
    pub strong_match_confidence: Option<f64>,

    /// Recognized media extensions, without the leading dot
    pub extensions: Option<Vec<String>>,

    /// Substring matched against emulator names in the catalog
    pub emulator_filter: Option<String>,

    /// Similarity algorithm (`sequence` or `levenshtein`)
    pub scorer: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    /// PinUP system folder holding the database and `POPMedia`
    pub system_root: PathBuf,
    pub database_path: PathBuf,
    pub media_root: PathBuf,
    pub backup_root: PathBuf,
    pub threshold: f64,
    pub strong_match_confidence: f64,
    pub extensions: Vec<String>,
    pub emulator_filter: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        Self::for_system_root(default_system_root())
    }

    /// Defaults derived from an explicit PinUP system folder
    pub fn for_system_root(system_root: PathBuf) -> Self {
        Self {
            database_path: system_root.join("PUPDatabase.db"),
            media_root: system_root.join("POPMedia").join("Visual Pinball X"),
            backup_root: system_root.join("POPMediaBackup"),
            system_root,
            threshold: 0.90,
            strong_match_confidence: 95.0,
            extensions: ["jpg", "mp4", "png", "apng"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            emulator_filter: "Visual Pinball".to_string(),
        }
    }
}

/// Get OS-dependent default PinUP system folder
fn default_system_root() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from("C:\\vPinball\\PinUPSystem")
    } else {
        // ~/.local/share/popmedia (or ~/Library/Application Support/popmedia)
        dirs::data_local_dir()
            .map(|d| d.join("popmedia"))
            .unwrap_or_else(|| PathBuf::from("./popmedia_data"))
    }
}

/// Default TOML config location: `<config dir>/popmedia/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("popmedia").join("config.toml"))
}

/// Resolve which TOML file to read
///
/// Explicit path (CLI) wins, then `POPMEDIA_CONFIG`, then the platform
/// default location.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Load TOML configuration with graceful degradation
///
/// `None` or a path that does not exist yields [`TomlConfig::default`].
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config directory available on this platform, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
    })?;
    let config: TomlConfig = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e))
    })?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert_eq!(LoggingConfig::default().level, "info");
        assert!(LoggingConfig::default().file.is_none());
    }

    #[test]
    fn test_defaults_derive_from_system_root() {
        let defaults = CompiledDefaults::for_system_root(PathBuf::from("/pinup"));
        assert_eq!(defaults.database_path, PathBuf::from("/pinup/PUPDatabase.db"));
        assert_eq!(
            defaults.media_root,
            PathBuf::from("/pinup/POPMedia/Visual Pinball X")
        );
        assert_eq!(defaults.backup_root, PathBuf::from("/pinup/POPMediaBackup"));
        assert_eq!(defaults.threshold, 0.90);
        assert_eq!(defaults.strong_match_confidence, 95.0);
        assert_eq!(defaults.extensions, vec!["jpg", "mp4", "png", "apng"]);
    }

    #[test]
    fn test_partial_toml_keeps_other_fields_unset() {
        let config: TomlConfig = toml::from_str("threshold = 0.85\n").unwrap();
        assert_eq!(config.threshold, Some(0.85));
        assert!(config.media_root.is_none());
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
