//! Match planner
//!
//! Scores each asset against every canonical name and turns the ranked
//! matches into a plan: rename to the best name, hard-link under the
//! runner-up names, or archive. Planning never touches the filesystem.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{ActionKind, ActionLabel, AssetPlan, MediaAsset, PlannedAction};
use crate::services::normalizer::normalize;
use crate::services::scorer::Scorer;

/// Scores at or above this are traced at debug level
const TRACE_SCORE_FLOOR: f64 = 0.80;

/// A canonical name that cleared the inclusion threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub canonical_name: String,
    /// Similarity in `[0, 1]`
    pub score: f64,
    /// Position of the name in the source listing
    pub rank: usize,
}

impl Match {
    /// Score as a percentage
    pub fn confidence(&self) -> f64 {
        self.score * 100.0
    }
}

/// Planner thresholds and roots
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Inclusion threshold in `(0, 1]`
    pub threshold: f64,
    /// Top confidence (percent) required to rename
    pub strong_match_confidence: f64,
    pub media_root: PathBuf,
    pub backup_root: PathBuf,
}

/// Match planner
///
/// Canonical names are normalized once at construction; each asset is
/// then compared against all of them.
pub struct MatchPlanner<'a> {
    /// `(canonical, normalized)` in source order
    names: Vec<(String, String)>,
    scorer: &'a dyn Scorer,
    config: PlannerConfig,
}

impl<'a> MatchPlanner<'a> {
    pub fn new(canonical_names: &[String], scorer: &'a dyn Scorer, config: PlannerConfig) -> Self {
        let names = canonical_names
            .iter()
            .map(|name| (name.clone(), normalize(name)))
            .collect();

        Self {
            names,
            scorer,
            config,
        }
    }

    /// Canonical names scoring at or above the threshold, best first
    ///
    /// Equal scores keep source order.
    pub fn find_matches(&self, asset: &MediaAsset) -> Vec<Match> {
        let normalized = normalize(&asset.base_name);

        let mut matches: Vec<Match> = Vec::new();
        for (rank, (canonical, canonical_normalized)) in self.names.iter().enumerate() {
            let score = self.scorer.score(&normalized, canonical_normalized);

            if score >= TRACE_SCORE_FLOOR {
                debug!(
                    asset = %asset.base_name,
                    canonical = %canonical,
                    score,
                    "Comparison"
                );
            }

            if score >= self.config.threshold {
                matches.push(Match {
                    canonical_name: canonical.clone(),
                    score,
                    rank,
                });
            }
        }

        // sort_by is stable, so ties stay in rank order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }

    /// Plan actions for one asset
    pub fn plan(&self, asset: &MediaAsset) -> AssetPlan {
        let matches = self.find_matches(asset);

        let Some(top) = matches.first() else {
            debug!("No close matches for {}", asset.path.display());
            return AssetPlan {
                asset: asset.clone(),
                primary: Some(self.archive(asset, None, ActionLabel::NoCloseMatches)),
                links: Vec::new(),
            };
        };

        if top.confidence() < self.config.strong_match_confidence {
            debug!(
                "Best match for {} is {} at {:.2}%, below strong-match cutoff",
                asset.path.display(),
                top.canonical_name,
                top.confidence()
            );
            return AssetPlan {
                asset: asset.clone(),
                primary: Some(self.archive(
                    asset,
                    Some(top.canonical_name.clone()),
                    ActionLabel::BelowThreshold(top.confidence()),
                )),
                links: Vec::new(),
            };
        }

        let rename_destination = asset.sibling_named(&top.canonical_name);
        let primary = (rename_destination != asset.path).then(|| PlannedAction {
            kind: ActionKind::Rename,
            canonical_name: Some(top.canonical_name.clone()),
            source: asset.path.clone(),
            destination: rename_destination,
            label: ActionLabel::Confidence(top.confidence()),
        });

        let links = matches[1..]
            .iter()
            .map(|alternate| PlannedAction {
                kind: ActionKind::Link,
                canonical_name: Some(alternate.canonical_name.clone()),
                source: asset.path.clone(),
                destination: asset.sibling_named(&alternate.canonical_name),
                label: ActionLabel::Confidence(alternate.confidence()),
            })
            .collect();

        AssetPlan {
            asset: asset.clone(),
            primary,
            links,
        }
    }

    fn archive(
        &self,
        asset: &MediaAsset,
        canonical_name: Option<String>,
        label: ActionLabel,
    ) -> PlannedAction {
        PlannedAction {
            kind: ActionKind::Archive,
            canonical_name,
            source: asset.path.clone(),
            destination: mirrored_path(
                &self.config.media_root,
                &self.config.backup_root,
                &asset.path,
            ),
            label,
        }
    }
}

/// `path` relative to `media_root`, re-rooted under `backup_root`
///
/// Paths outside the media root keep only their file name.
pub fn mirrored_path(media_root: &Path, backup_root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(media_root) {
        Ok(relative) => backup_root.join(relative),
        Err(_) => backup_root.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}
