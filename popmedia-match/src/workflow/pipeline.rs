//! Reconciliation pipeline
//!
//! # Stages
//! 1. **Enumerate**: snapshot media assets below the media root
//! 2. **Plan**: score every asset against the canonical names (no I/O)
//! 3. **Execute**: apply or simulate each plan in enumeration order
//! 4. **Tally**: fold the outcomes into per-category counts
//!
//! # Error Handling
//! Only enumeration can fail the run. Action failures are isolated to
//! their record and show up as `Left` or `Skipped`.

use std::path::PathBuf;
use tracing::info;

use crate::error::MatchResult;
use crate::models::{ActionRecord, AssetOutcome, AssetPlan};
use crate::services::{
    ActionExecutor, FileScanner, MatchPlanner, PlannerConfig, RunMode, Scorer, Tally,
};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub media_root: PathBuf,
    pub backup_root: PathBuf,
    /// Recognized media extensions, without leading dot
    pub extensions: Vec<String>,
    /// Inclusion threshold in `(0, 1]`
    pub threshold: f64,
    /// Top confidence (percent) required to rename
    pub strong_match_confidence: f64,
    pub mode: RunMode,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One entry per enumerated asset, in enumeration order
    pub outcomes: Vec<AssetOutcome>,
    pub tally: Tally,
}

impl RunOutput {
    /// All action records, asset by asset
    pub fn records(&self) -> Vec<ActionRecord> {
        self.outcomes
            .iter()
            .flat_map(|outcome| outcome.records.iter().cloned())
            .collect()
    }
}

/// Reconciliation pipeline
pub struct Pipeline<'a> {
    config: PipelineConfig,
    scorer: &'a dyn Scorer,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig, scorer: &'a dyn Scorer) -> Self {
        Self { config, scorer }
    }

    /// Run all stages against `canonical_names`
    pub fn run(&self, canonical_names: &[String]) -> MatchResult<RunOutput> {
        info!(
            "Starting {} run: {} canonical names, media root {}",
            self.config.mode,
            canonical_names.len(),
            self.config.media_root.display()
        );

        // Stage 1: Enumerate
        let mut scanner = FileScanner::new(&self.config.extensions);
        if self.config.backup_root.starts_with(&self.config.media_root) {
            scanner = scanner.exclude(&self.config.backup_root);
        }
        let assets = scanner.scan(&self.config.media_root)?;

        // Stage 2: Plan
        let planner = MatchPlanner::new(
            canonical_names,
            self.scorer,
            PlannerConfig {
                threshold: self.config.threshold,
                strong_match_confidence: self.config.strong_match_confidence,
                media_root: self.config.media_root.clone(),
                backup_root: self.config.backup_root.clone(),
            },
        );
        let plans: Vec<AssetPlan> = assets.iter().map(|asset| planner.plan(asset)).collect();
        info!(
            "Planned {} actions for {} assets",
            plans.iter().map(|plan| plan.actions().count()).sum::<usize>(),
            plans.len()
        );

        // Stage 3: Execute
        let mut executor = ActionExecutor::new(self.config.mode);
        let outcomes: Vec<AssetOutcome> = plans.iter().map(|plan| executor.execute(plan)).collect();

        // Stage 4: Tally
        let tally = Tally::from_outcomes(&outcomes);
        info!(
            "Run complete: {} processed, {} renamed, {} linked, {} backed up, {} left",
            tally.total.processed,
            tally.total.renamed,
            tally.total.linked,
            tally.total.backed_up,
            tally.total.left
        );

        Ok(RunOutput { outcomes, tally })
    }
}
