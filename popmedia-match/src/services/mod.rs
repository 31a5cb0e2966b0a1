//! Pipeline stages
//!
//! Leaves first: normalizer and scorer are pure, the catalog and scanner
//! gather input, the planner decides, the executor acts, tally and report
//! summarize.

pub mod action_executor;
pub mod catalog;
pub mod file_scanner;
pub mod match_planner;
pub mod normalizer;
pub mod report;
pub mod scorer;
pub mod tally;

pub use action_executor::{ensure_unique_filename, ActionExecutor, RunMode};
pub use catalog::{CanonicalNameSource, CatalogListing, NameListSource, PupDatabaseSource};
pub use file_scanner::{FileScanner, ScanError};
pub use match_planner::{Match, MatchPlanner, PlannerConfig};
pub use normalizer::normalize;
pub use report::{write_report, ReportMeta};
pub use scorer::{NormalizedLevenshtein, Scorer, ScorerKind, SequenceRatio};
pub use tally::{OutcomeCounts, Tally};
