use crate::analyzers::types::ScoredFeature;
use std::cmp::Ordering;

/// Orders two scores for a descending ranking; NaN sorts after every number.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Sorts scored features by `engagement_score`, highest first.
///
/// The sort is stable: tied features keep the order they arrived in.
pub fn rank_features(mut features: Vec<ScoredFeature>) -> Vec<ScoredFeature> {
    features.sort_by(|a, b| descending_nan_last(a.engagement_score, b.engagement_score));
    features
}
