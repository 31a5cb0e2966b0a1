//! popmedia-match - PinUP media reconciler
//!
//! Matches loosely-named media files under a `POPMedia` tree against the
//! table names in the PinUP Popper catalog, then renames, links or archives
//! them. Runs in simulate mode unless `--apply` is given; either way an HTML
//! report of every decision is written.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use popmedia_common::config::{
    load_toml_config, resolve_config_path, CompiledDefaults, LoggingConfig,
};
use popmedia_match::config::{CatalogSource, ConfigOverrides, RunConfig};
use popmedia_match::services::{
    write_report, CanonicalNameSource, CatalogListing, NameListSource, PupDatabaseSource,
    ReportMeta, ScorerKind,
};
use popmedia_match::workflow::Pipeline;

/// Command-line arguments for popmedia-match
#[derive(Parser, Debug)]
#[command(name = "popmedia-match")]
#[command(about = "Reconcile PinUP media file names against the table catalog")]
#[command(version)]
struct Args {
    /// Rename, link and move files (default: simulate only)
    #[arg(long, env = "POPMEDIA_APPLY")]
    apply: bool,

    /// Debug logging, including every comparison scoring 0.80 or more
    #[arg(long, env = "POPMEDIA_DEBUG")]
    debug: bool,

    /// Inclusion threshold for matches, in (0, 1]
    #[arg(long, env = "POPMEDIA_THRESHOLD")]
    threshold: Option<f64>,

    /// Media tree to reconcile
    #[arg(long, env = "POPMEDIA_MEDIA_ROOT")]
    media_root: Option<PathBuf>,

    /// Where archived media and the report go
    #[arg(long, env = "POPMEDIA_BACKUP_ROOT")]
    backup_root: Option<PathBuf>,

    /// PinUP Popper catalog (PUPDatabase.db)
    #[arg(long, env = "POPMEDIA_DATABASE")]
    database: Option<PathBuf>,

    /// Read canonical names from a text file instead of the catalog
    #[arg(long, env = "POPMEDIA_NAMES_FILE")]
    names_file: Option<PathBuf>,

    /// Report location (default: <backup root>/popmedia-report.html)
    #[arg(long, env = "POPMEDIA_REPORT")]
    report: Option<PathBuf>,

    /// Emulator name filter for catalog lookups
    #[arg(long, env = "POPMEDIA_EMULATOR")]
    emulator: Option<String>,

    /// Similarity scorer
    #[arg(long, value_enum, env = "POPMEDIA_SCORER")]
    scorer: Option<ScorerKind>,

    /// TOML configuration file
    #[arg(long, env = "POPMEDIA_CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            names_file: self.names_file.clone(),
            media_root: self.media_root.clone(),
            backup_root: self.backup_root.clone(),
            report_path: self.report.clone(),
            threshold: self.threshold,
            emulator_filter: self.emulator.clone(),
            scorer: self.scorer,
            apply: self.apply,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = load_toml_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&toml_config.logging, args.debug)?;

    info!("Starting popmedia-match v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let defaults = CompiledDefaults::for_current_platform();
    debug!("PinUP system root default: {}", defaults.system_root.display());
    let config = RunConfig::resolve(&toml_config, &defaults, args.overrides())
        .context("Invalid configuration")?;

    let listing = load_canonical_names(&config).await?;
    if !listing.warnings.is_empty() {
        warn!(
            "Catalog read with {} schema warning(s); results may be incomplete",
            listing.warnings.len()
        );
    }
    if listing.names.is_empty() {
        warn!("No canonical names available; every asset will be archived as unmatched");
    }

    let scorer = config.scorer.build();
    let output = Pipeline::new(config.pipeline_config(), scorer.as_ref())
        .run(&listing.names)
        .context("Reconciliation failed")?;

    // Counts are shown even if the report cannot be written
    println!("{}", output.tally);

    let meta = ReportMeta::new(config.mode, &config.media_root, &config.backup_root);
    write_report(&config.report_path, &output.records(), &output.tally, &meta)
        .with_context(|| {
            format!("Failed to write report {}", config.report_path.display())
        })?;

    println!("Report: {}", config.report_path.display());
    Ok(())
}

async fn load_canonical_names(config: &RunConfig) -> Result<CatalogListing> {
    match &config.catalog {
        CatalogSource::Database(path) => {
            let source = PupDatabaseSource::open(path, &config.emulator_filter)
                .await
                .with_context(|| format!("Failed to open catalog {}", path.display()))?;
            Ok(source.list_canonical_names().await.context("Failed to read catalog")?)
        }
        CatalogSource::NameList(path) => Ok(NameListSource::new(path)
            .list_canonical_names()
            .await
            .context("Failed to read name list")?),
    }
}

/// Install the fmt subscriber
///
/// `RUST_LOG` wins over the configured level; `--debug` raises this crate
/// to debug on top of either.
fn init_tracing(logging: &LoggingConfig, debug: bool) -> Result<()> {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if debug {
        filter = filter.add_directive("popmedia_match=debug".parse()?);
    }

    let registry = tracing_subscriber::registry().with(filter);
    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
