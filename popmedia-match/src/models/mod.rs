//! Data model shared by the pipeline stages

pub mod action;
pub mod asset;

pub use action::{
    ActionKind, ActionLabel, ActionRecord, AssetOutcome, AssetPlan, Outcome, PlannedAction,
};
pub use asset::{Category, MediaAsset};
