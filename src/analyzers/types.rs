//! Data types used by the engagement pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header of the grouping column.
pub const FEATURE_COLUMN: &str = "feature_name";

/// Columns every usage dataset must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    FEATURE_COLUMN,
    MetricColumn::Sessions.name(),
    MetricColumn::AvgDurationMins.name(),
    MetricColumn::SatisfactionScore.name(),
];

/// A single observation row read from the usage spreadsheet.
///
/// Blank cells load as `None` and are skipped by the aggregations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsageRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    pub feature_name: Option<String>,
    pub sessions: Option<f64>,
    pub avg_duration_mins: Option<f64>,
    pub satisfaction_score: Option<f64>,
}

impl UsageRecord {
    /// Returns the value held in `column`.
    pub fn metric(&self, column: MetricColumn) -> Option<f64> {
        match column {
            MetricColumn::Sessions => self.sessions,
            MetricColumn::AvgDurationMins => self.avg_duration_mins,
            MetricColumn::SatisfactionScore => self.satisfaction_score,
        }
    }
}

/// The numeric columns that feed the engagement score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricColumn {
    Sessions,
    AvgDurationMins,
    SatisfactionScore,
}

impl MetricColumn {
    pub const ALL: [MetricColumn; 3] = [
        MetricColumn::Sessions,
        MetricColumn::AvgDurationMins,
        MetricColumn::SatisfactionScore,
    ];

    /// Header name of the column in the input dataset.
    pub const fn name(self) -> &'static str {
        match self {
            MetricColumn::Sessions => "sessions",
            MetricColumn::AvgDurationMins => "avg_duration_mins",
            MetricColumn::SatisfactionScore => "satisfaction_score",
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything read from one input file.
#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    pub source: String,
    pub records: Vec<UsageRecord>,
}

impl UsageTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One per-group reduction of a single metric column, ordered by feature name.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMetric {
    pub column: MetricColumn,
    pub groups: Vec<(String, f64)>,
}

/// The three per-feature reductions produced by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAggregates {
    pub total_sessions: GroupedMetric,
    pub mean_duration: GroupedMetric,
    pub mean_satisfaction: GroupedMetric,
}

/// Merged per-feature metrics, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub feature_name: String,
    pub sessions: f64,
    pub avg_duration_mins: f64,
    pub satisfaction_score: f64,
}

impl FeatureSummary {
    pub fn metric(&self, column: MetricColumn) -> f64 {
        match column {
            MetricColumn::Sessions => self.sessions,
            MetricColumn::AvgDurationMins => self.avg_duration_mins,
            MetricColumn::SatisfactionScore => self.satisfaction_score,
        }
    }
}

/// A feature summary extended with its composite engagement score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFeature {
    #[serde(flatten)]
    pub summary: FeatureSummary,
    pub engagement_score: f64,
}

impl ScoredFeature {
    pub fn feature_name(&self) -> &str {
        &self.summary.feature_name
    }
}
