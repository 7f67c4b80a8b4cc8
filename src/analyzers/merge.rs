use crate::analyzers::types::{FeatureAggregates, FeatureSummary, GroupedMetric};
use crate::error::EngagementError;
use std::collections::HashMap;

/// Inner-joins the three per-feature summaries on `feature_name`.
///
/// Rows follow the order of the sessions summary. The three key sets come
/// from the same input and should be identical; if they diverge the merge
/// fails with [`EngagementError::KeyMismatch`] rather than dropping rows.
pub fn merge_aggregates(
    aggregates: &FeatureAggregates,
) -> Result<Vec<FeatureSummary>, EngagementError> {
    let durations = index_by_feature(&aggregates.mean_duration);
    let satisfaction = index_by_feature(&aggregates.mean_satisfaction);

    let total = aggregates.total_sessions.groups.len();
    if durations.len() != total || satisfaction.len() != total {
        let extra = durations
            .keys()
            .chain(satisfaction.keys())
            .find(|k| {
                !aggregates
                    .total_sessions
                    .groups
                    .iter()
                    .any(|(name, _)| name == *k)
            })
            .map(|k| k.to_string())
            .unwrap_or_default();
        return Err(EngagementError::KeyMismatch(extra));
    }

    aggregates
        .total_sessions
        .groups
        .iter()
        .map(|(feature, sessions)| {
            let lookup = |index: &HashMap<&str, f64>| {
                index
                    .get(feature.as_str())
                    .copied()
                    .ok_or_else(|| EngagementError::KeyMismatch(feature.clone()))
            };

            Ok(FeatureSummary {
                feature_name: feature.clone(),
                sessions: *sessions,
                avg_duration_mins: lookup(&durations)?,
                satisfaction_score: lookup(&satisfaction)?,
            })
        })
        .collect()
}

fn index_by_feature(metric: &GroupedMetric) -> HashMap<&str, f64> {
    metric
        .groups
        .iter()
        .map(|(name, value)| (name.as_str(), *value))
        .collect()
}
