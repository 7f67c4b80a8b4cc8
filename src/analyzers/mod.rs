//! Per-feature aggregation and engagement scoring.
//!
//! This module groups usage rows by feature, merges the per-feature
//! summaries, scores each feature against the table-wide maxima and
//! ranks the result.

pub mod aggregate;
pub mod analyzer;
pub mod merge;
pub mod rank;
pub mod score;
pub mod types;
pub mod utility;
