use crate::analyzers::types::{FeatureAggregates, GroupedMetric, MetricColumn, UsageTable};
use crate::analyzers::utility::{mean, sum};
use std::collections::BTreeMap;
use tracing::debug;

/// How a metric column is reduced within one feature group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
}

impl Reduction {
    fn apply(self, values: &[Option<f64>]) -> f64 {
        match self {
            Reduction::Sum => sum(values),
            Reduction::Mean => mean(values),
        }
    }
}

/// Groups `table` by `feature_name` and reduces a single metric column.
///
/// Groups come back sorted by feature name. Rows without a feature name
/// belong to no group. Every named feature appears exactly once, even when
/// all of its values for `column` are blank.
pub fn group_by_feature(
    table: &UsageTable,
    column: MetricColumn,
    reduction: Reduction,
) -> GroupedMetric {
    let mut series: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();

    for record in &table.records {
        let Some(feature) = record.feature_name.as_deref() else {
            continue;
        };
        series
            .entry(feature)
            .or_default()
            .push(record.metric(column));
    }

    let groups = series
        .into_iter()
        .map(|(feature, values)| (feature.to_string(), reduction.apply(&values)))
        .collect();

    GroupedMetric { column, groups }
}

/// Computes the three per-feature summaries: total sessions, mean duration and mean satisfaction.
#[tracing::instrument(skip(table), fields(source = %table.source, rows = table.len()))]
pub fn aggregate_features(table: &UsageTable) -> FeatureAggregates {
    let aggregates = FeatureAggregates {
        total_sessions: group_by_feature(table, MetricColumn::Sessions, Reduction::Sum),
        mean_duration: group_by_feature(table, MetricColumn::AvgDurationMins, Reduction::Mean),
        mean_satisfaction: group_by_feature(
            table,
            MetricColumn::SatisfactionScore,
            Reduction::Mean,
        ),
    };

    debug!(
        features = aggregates.total_sessions.groups.len(),
        "Aggregated usage by feature"
    );

    aggregates
}
