//! Action executor
//!
//! Carries out planned actions in apply mode, or predicts them in simulate
//! mode. Every destination is probed immediately before the action it
//! guards; a failing action only affects its own record.
//!
//! In simulate mode nothing on disk changes. Moves and links already
//! simulated in this run are kept in an overlay that existence probes
//! consult before the real filesystem, so a simulated run reports what an
//! apply run over the same tree would do.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::FileSystemError;
use crate::models::{
    ActionKind, ActionLabel, ActionRecord, AssetOutcome, AssetPlan, Outcome, PlannedAction,
};

/// Whether actions touch the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Report what would happen
    #[default]
    Simulate,
    /// Rename, link and move files
    Apply,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Simulate => f.write_str("simulate"),
            RunMode::Apply => f.write_str("apply"),
        }
    }
}

/// Paths created or removed by simulated actions
#[derive(Debug, Default)]
struct SimulatedFs {
    created: HashSet<PathBuf>,
    removed: HashSet<PathBuf>,
}

impl SimulatedFs {
    fn exists(&self, path: &Path) -> bool {
        if self.created.contains(path) {
            return true;
        }
        if self.removed.contains(path) {
            return false;
        }
        path_exists(path)
    }

    fn record_create(&mut self, path: &Path) {
        self.removed.remove(path);
        self.created.insert(path.to_path_buf());
    }

    fn record_move(&mut self, from: &Path, to: &Path) {
        self.created.remove(from);
        self.removed.insert(from.to_path_buf());
        self.record_create(to);
    }
}

/// Existence without following symlinks
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// First free variant of `path`: `path` itself, then `stem_1.ext`,
/// `stem_2.ext`, ...
pub fn ensure_unique_filename(path: &Path) -> PathBuf {
    unique_filename(path, path_exists)
}

fn unique_filename(path: &Path, exists: impl Fn(&Path) -> bool) -> PathBuf {
    if !exists(path) {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter: u64 = 1;
    loop {
        let file_name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = path.with_file_name(file_name);
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Move a file, copying then removing when a plain rename cannot cross
/// filesystems
fn move_file(from: &Path, to: &Path) -> Result<(), FileSystemError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) if rename_err.kind() == ErrorKind::CrossesDevices => {
            debug!("Rename crosses devices, copying {} instead", from.display());
            fs::copy(from, to).map_err(|e| FileSystemError::io("copy", from, e))?;
            fs::remove_file(from).map_err(|e| FileSystemError::io("remove", from, e))?;
            Ok(())
        }
        Err(rename_err) => Err(FileSystemError::io("move", from, rename_err)),
    }
}

/// Executes asset plans in enumeration order
pub struct ActionExecutor {
    mode: RunMode,
    overlay: SimulatedFs,
}

impl ActionExecutor {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            overlay: SimulatedFs::default(),
        }
    }

    /// Execute the primary action, then the link attempts
    pub fn execute(&mut self, plan: &AssetPlan) -> AssetOutcome {
        let records = plan
            .actions()
            .map(|action| match action.kind {
                ActionKind::Rename => self.rename(action),
                ActionKind::Link => self.link(action),
                ActionKind::Archive => self.archive(action),
            })
            .collect();

        AssetOutcome {
            asset: plan.asset.clone(),
            records,
        }
    }

    fn exists(&self, path: &Path) -> bool {
        match self.mode {
            RunMode::Simulate => self.overlay.exists(path),
            RunMode::Apply => path_exists(path),
        }
    }

    fn rename(&mut self, action: &PlannedAction) -> ActionRecord {
        let confidence = action.label.confidence().unwrap_or_default();

        if !self.exists(&action.source) {
            warn!("Rename source missing: {}", action.source.display());
            return record(
                action,
                &action.destination,
                ActionLabel::SourceMissing(confidence),
                Outcome::Left,
            );
        }

        if self.exists(&action.destination) {
            debug!(
                "Leaving {}: {} already exists",
                action.source.display(),
                action.destination.display()
            );
            return record(
                action,
                &action.destination,
                ActionLabel::DestinationExists(confidence),
                Outcome::Left,
            );
        }

        match self.mode {
            RunMode::Apply => {
                if let Err(e) = fs::rename(&action.source, &action.destination) {
                    let err = FileSystemError::io("rename", &action.source, e);
                    warn!("{}", err);
                    return record(
                        action,
                        &action.destination,
                        ActionLabel::Failed(err.to_string()),
                        Outcome::Left,
                    );
                }
                info!(
                    "Renamed {} -> {}",
                    action.source.display(),
                    action.destination.display()
                );
            }
            RunMode::Simulate => {
                self.overlay.record_move(&action.source, &action.destination);
                debug!(
                    "Would rename {} -> {}",
                    action.source.display(),
                    action.destination.display()
                );
            }
        }

        record(action, &action.destination, action.label.clone(), Outcome::Renamed)
    }

    fn link(&mut self, action: &PlannedAction) -> ActionRecord {
        let confidence = action.label.confidence().unwrap_or_default();

        if !self.exists(&action.source) {
            debug!("Skipping link, source gone: {}", action.source.display());
            return record(
                action,
                &action.destination,
                ActionLabel::SourceMissing(confidence),
                Outcome::Skipped,
            );
        }

        if self.exists(&action.destination) {
            debug!("Skipping link, {} already exists", action.destination.display());
            return record(
                action,
                &action.destination,
                ActionLabel::DestinationExists(confidence),
                Outcome::Skipped,
            );
        }

        match self.mode {
            RunMode::Apply => {
                if let Err(e) = fs::hard_link(&action.source, &action.destination) {
                    let err = FileSystemError::io("hard link", &action.destination, e);
                    warn!("{}", err);
                    return record(
                        action,
                        &action.destination,
                        ActionLabel::Failed(err.to_string()),
                        Outcome::Skipped,
                    );
                }
                info!(
                    "Linked {} -> {}",
                    action.destination.display(),
                    action.source.display()
                );
            }
            RunMode::Simulate => {
                self.overlay.record_create(&action.destination);
                debug!(
                    "Would link {} -> {}",
                    action.destination.display(),
                    action.source.display()
                );
            }
        }

        record(action, &action.destination, action.label.clone(), Outcome::Linked)
    }

    fn archive(&mut self, action: &PlannedAction) -> ActionRecord {
        if !self.exists(&action.source) {
            let err = FileSystemError::SourceMissing(action.source.clone());
            warn!("{}", err);
            return record(
                action,
                &action.destination,
                ActionLabel::Failed(err.to_string()),
                Outcome::Left,
            );
        }

        let destination = match self.mode {
            RunMode::Simulate => {
                unique_filename(&action.destination, |p| self.overlay.exists(p))
            }
            RunMode::Apply => ensure_unique_filename(&action.destination),
        };

        match self.mode {
            RunMode::Apply => {
                if let Err(err) = archive_file(&action.source, &destination) {
                    warn!("{}", err);
                    return record(
                        action,
                        &destination,
                        ActionLabel::Failed(err.to_string()),
                        Outcome::Left,
                    );
                }
                info!(
                    "Backed up {} -> {}",
                    action.source.display(),
                    destination.display()
                );
            }
            RunMode::Simulate => {
                self.overlay.record_move(&action.source, &destination);
                debug!(
                    "Would back up {} -> {}",
                    action.source.display(),
                    destination.display()
                );
            }
        }

        record(action, &destination, action.label.clone(), Outcome::BackedUp)
    }
}

fn archive_file(source: &Path, destination: &Path) -> Result<(), FileSystemError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| FileSystemError::io("create directory", parent, e))?;
    }
    move_file(source, destination)
}

fn record(
    action: &PlannedAction,
    destination: &Path,
    label: ActionLabel,
    outcome: Outcome,
) -> ActionRecord {
    ActionRecord {
        kind: action.kind,
        canonical_name: action.canonical_name.clone(),
        source: action.source.clone(),
        destination: destination.to_path_buf(),
        label,
        outcome,
    }
}
