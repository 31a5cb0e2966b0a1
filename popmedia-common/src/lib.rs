//! # POPMedia Common Library
//!
//! Shared code for the POPMedia tooling including:
//! - Error types
//! - TOML configuration loading and compiled defaults
//! - Read-only access to the PinUP catalog database

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
