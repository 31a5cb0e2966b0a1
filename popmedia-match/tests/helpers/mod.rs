//! Test Helper Utilities
//!
//! Shared utilities for testing popmedia-match

#![allow(dead_code)]

pub mod catalog_db;
pub mod media_tree;

// Re-export commonly used items
pub use catalog_db::{create_catalog_db, create_catalog_db_with_schema};
pub use media_tree::{names, MediaTree};
