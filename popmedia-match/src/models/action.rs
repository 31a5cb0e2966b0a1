//! Planned actions and their realized outcomes

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::asset::MediaAsset;

/// What to do with an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Rename,
    Link,
    Archive,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Rename => "Rename",
            ActionKind::Link => "Link",
            ActionKind::Archive => "Archive",
        };
        f.write_str(s)
    }
}

/// Confidence or reason attached to an action
///
/// Confidences are percentages (`score * 100`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActionLabel {
    /// Strong match
    Confidence(f64),
    /// Nothing cleared the inclusion threshold
    NoCloseMatches,
    /// Best match cleared the threshold but not the strong-match cutoff
    BelowThreshold(f64),
    /// Destination already present at execution time
    DestinationExists(f64),
    /// Source no longer present at execution time
    SourceMissing(f64),
    /// Filesystem operation failed
    Failed(String),
}

impl ActionLabel {
    /// Confidence carried by the label, if any
    pub fn confidence(&self) -> Option<f64> {
        match self {
            ActionLabel::Confidence(c)
            | ActionLabel::BelowThreshold(c)
            | ActionLabel::DestinationExists(c)
            | ActionLabel::SourceMissing(c) => Some(*c),
            ActionLabel::NoCloseMatches | ActionLabel::Failed(_) => None,
        }
    }
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionLabel::Confidence(c) => write!(f, "{:.2}%", c),
            ActionLabel::NoCloseMatches => f.write_str("no close matches found"),
            ActionLabel::BelowThreshold(c) => write!(f, "below threshold ({:.2}%)", c),
            ActionLabel::DestinationExists(c) => write!(f, "destination exists ({:.2}%)", c),
            ActionLabel::SourceMissing(c) => write!(f, "source missing ({:.2}%)", c),
            ActionLabel::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// An action computed by the planner, before execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedAction {
    pub kind: ActionKind,
    pub canonical_name: Option<String>,
    pub source: PathBuf,
    /// For archives, the mirrored path before collision resolution
    pub destination: PathBuf,
    pub label: ActionLabel,
}

/// Everything planned for one asset
///
/// `primary` is `None` when the asset already carries its canonical name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetPlan {
    pub asset: MediaAsset,
    pub primary: Option<PlannedAction>,
    pub links: Vec<PlannedAction>,
}

impl AssetPlan {
    /// Primary action followed by link attempts
    pub fn actions(&self) -> impl Iterator<Item = &PlannedAction> {
        self.primary.iter().chain(self.links.iter())
    }
}

/// How an action resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Renamed,
    Linked,
    BackedUp,
    /// Asset stays where it was
    Left,
    /// Link not realized; not tallied
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Renamed => "Renamed",
            Outcome::Linked => "Linked",
            Outcome::BackedUp => "BackedUp",
            Outcome::Left => "Left",
            Outcome::Skipped => "Skipped",
        };
        f.write_str(s)
    }
}

/// An executed (or simulated) action, one report row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub canonical_name: Option<String>,
    pub source: PathBuf,
    /// Final destination (collision-resolved for archives)
    pub destination: PathBuf,
    pub label: ActionLabel,
    pub outcome: Outcome,
}

/// Records produced for one asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetOutcome {
    pub asset: MediaAsset,
    pub records: Vec<ActionRecord>,
}
