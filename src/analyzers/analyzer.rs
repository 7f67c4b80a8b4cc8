use crate::analyzers::aggregate::aggregate_features;
use crate::analyzers::merge::merge_aggregates;
use crate::analyzers::rank::rank_features;
use crate::analyzers::score::{ENGAGEMENT_WEIGHTS, score_features};
use crate::analyzers::types::{ScoredFeature, UsageTable};
use crate::loader::load_usage;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Runs aggregation, merge, scoring and ranking over an already loaded table.
///
/// The returned rows are ranked by engagement score, highest first.
#[tracing::instrument(skip(table), fields(source = %table.source))]
pub fn summarize(table: &UsageTable) -> Result<Vec<ScoredFeature>> {
    let aggregates = aggregate_features(table);
    let merged = merge_aggregates(&aggregates)?;
    let scored = score_features(merged, &ENGAGEMENT_WEIGHTS);
    let ranked = rank_features(scored);

    info!(features = ranked.len(), "Ranked features by engagement");
    Ok(ranked)
}

/// Loads a usage file and ranks its features.
pub fn analyze(path: &Path, sheet: Option<&str>) -> Result<Vec<ScoredFeature>> {
    let table = load_usage(path, sheet)?;
    summarize(&table)
}
