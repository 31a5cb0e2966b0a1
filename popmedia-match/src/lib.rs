//! popmedia-match library interface
//!
//! Reconciles loosely-named PinUP media assets against the canonical table
//! names of a catalog: each asset is renamed, linked under alternate names,
//! or archived, and every decision lands in an HTML audit report.
//!
//! The run is a single synchronous batch:
//! enumerate ([`services::file_scanner`]) → plan ([`services::match_planner`])
//! → execute ([`services::action_executor`]) → tally and report
//! ([`services::tally`], [`services::report`]).

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{DataSourceError, FileSystemError, MatchError, ReportWriteError};
