//! Run configuration for popmedia-match
//!
//! Provides multi-tier resolution with CLI/ENV → TOML → compiled default
//! priority. CLI flags and their `POPMEDIA_*` environment variables are
//! merged by clap before they arrive here as [`ConfigOverrides`].

use popmedia_common::config::{CompiledDefaults, TomlConfig, REPORT_FILE_NAME};
use popmedia_common::{Error, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::services::{RunMode, ScorerKind};
use crate::workflow::PipelineConfig;

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub names_file: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
    pub backup_root: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub emulator_filter: Option<String>,
    pub scorer: Option<ScorerKind>,
    pub apply: bool,
}

/// Where canonical names come from
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    /// PinUP Popper SQLite catalog
    Database(PathBuf),
    /// Plain text file, one name per line
    NameList(PathBuf),
}

/// Fully resolved run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub catalog: CatalogSource,
    pub media_root: PathBuf,
    pub backup_root: PathBuf,
    pub report_path: PathBuf,
    pub threshold: f64,
    pub strong_match_confidence: f64,
    pub extensions: Vec<String>,
    pub emulator_filter: String,
    pub scorer: ScorerKind,
    pub mode: RunMode,
}

impl RunConfig {
    /// Merge overrides over TOML over compiled defaults, then validate
    ///
    /// A names file, when given, replaces the database as catalog. The
    /// report defaults to the backup root actually in use.
    pub fn resolve(
        toml: &TomlConfig,
        defaults: &CompiledDefaults,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let catalog = match overrides.names_file {
            Some(path) => CatalogSource::NameList(path),
            None => CatalogSource::Database(
                overrides
                    .database_path
                    .or_else(|| toml.database_path.clone())
                    .unwrap_or_else(|| defaults.database_path.clone()),
            ),
        };

        let media_root = overrides
            .media_root
            .or_else(|| toml.media_root.clone())
            .unwrap_or_else(|| defaults.media_root.clone());
        let backup_root = overrides
            .backup_root
            .or_else(|| toml.backup_root.clone())
            .unwrap_or_else(|| defaults.backup_root.clone());
        let report_path = overrides
            .report_path
            .or_else(|| toml.report_path.clone())
            .unwrap_or_else(|| backup_root.join(REPORT_FILE_NAME));

        let scorer = match (overrides.scorer, toml.scorer.as_deref()) {
            (Some(kind), _) => kind,
            (None, Some(name)) => name
                .parse::<ScorerKind>()
                .map_err(|e| Error::Config(format!("Invalid scorer in TOML: {}", e)))?,
            (None, None) => ScorerKind::default(),
        };

        let config = Self {
            catalog,
            media_root,
            backup_root,
            report_path,
            threshold: overrides
                .threshold
                .or(toml.threshold)
                .unwrap_or(defaults.threshold),
            strong_match_confidence: toml
                .strong_match_confidence
                .unwrap_or(defaults.strong_match_confidence),
            extensions: toml
                .extensions
                .clone()
                .unwrap_or_else(|| defaults.extensions.clone()),
            emulator_filter: overrides
                .emulator_filter
                .or_else(|| toml.emulator_filter.clone())
                .unwrap_or_else(|| defaults.emulator_filter.clone()),
            scorer,
            mode: if overrides.apply {
                RunMode::Apply
            } else {
                RunMode::Simulate
            },
        };

        config.validate()?;
        debug!("Resolved run configuration: {:?}", config);
        info!(
            "Mode: {}, threshold: {:.2}, scorer: {}",
            config.mode, config.threshold, config.scorer
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "Threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if !(self.strong_match_confidence > 0.0 && self.strong_match_confidence <= 100.0) {
            return Err(Error::InvalidInput(format!(
                "Strong match confidence must be in (0, 100], got {}",
                self.strong_match_confidence
            )));
        }
        if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(Error::InvalidInput(
                "No media extensions configured".to_string(),
            ));
        }
        if self.media_root.starts_with(&self.backup_root) {
            return Err(Error::InvalidInput(format!(
                "Media root {} must not lie inside backup root {}",
                self.media_root.display(),
                self.backup_root.display()
            )));
        }
        Ok(())
    }

    /// Settings the pipeline needs
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            media_root: self.media_root.clone(),
            backup_root: self.backup_root.clone(),
            extensions: self.extensions.clone(),
            threshold: self.threshold,
            strong_match_confidence: self.strong_match_confidence,
            mode: self.mode,
        }
    }
}
