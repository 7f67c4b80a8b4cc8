use crate::analyzers::types::{FeatureSummary, MetricColumn, ScoredFeature};
use crate::analyzers::utility::column_max;
use serde::Serialize;
use tracing::warn;

/// Relative weight of each normalized metric in the engagement score.
/// The weights sum to 1.0, so a feature that leads every metric scores exactly [`SCORE_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngagementWeights {
    pub sessions: f64,
    pub avg_duration_mins: f64,
    pub satisfaction_score: f64,
}

impl EngagementWeights {
    pub fn weight(&self, column: MetricColumn) -> f64 {
        match column {
            MetricColumn::Sessions => self.sessions,
            MetricColumn::AvgDurationMins => self.avg_duration_mins,
            MetricColumn::SatisfactionScore => self.satisfaction_score,
        }
    }
}

pub const ENGAGEMENT_WEIGHTS: EngagementWeights = EngagementWeights {
    sessions: 0.5,
    avg_duration_mins: 0.3,
    satisfaction_score: 0.2,
};

/// Multiplier that turns the weighted ratio sum into a percentage.
pub const SCORE_SCALE: f64 = 100.0;

/// Column maxima over the whole merged table, used as normalization denominators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMaxima {
    pub sessions: f64,
    pub avg_duration_mins: f64,
    pub satisfaction_score: f64,
}

impl ColumnMaxima {
    pub fn from_summaries(summaries: &[FeatureSummary]) -> Self {
        let max_of = |column| column_max(summaries.iter().map(|s| s.metric(column)));
        Self {
            sessions: max_of(MetricColumn::Sessions),
            avg_duration_mins: max_of(MetricColumn::AvgDurationMins),
            satisfaction_score: max_of(MetricColumn::SatisfactionScore),
        }
    }

    pub fn get(&self, column: MetricColumn) -> f64 {
        match column {
            MetricColumn::Sessions => self.sessions,
            MetricColumn::AvgDurationMins => self.avg_duration_mins,
            MetricColumn::SatisfactionScore => self.satisfaction_score,
        }
    }

    /// Columns whose maximum cannot normalize anything (zero or NaN).
    pub fn degenerate_columns(&self) -> Vec<MetricColumn> {
        MetricColumn::ALL
            .into_iter()
            .filter(|c| {
                let max = self.get(*c);
                max == 0.0 || max.is_nan()
            })
            .collect()
    }
}

/// Computes one feature's score against the table-wide maxima.
///
/// A zero or NaN maximum makes its term NaN, and the NaN carries into the score.
pub fn engagement_score(
    summary: &FeatureSummary,
    maxima: &ColumnMaxima,
    weights: &EngagementWeights,
) -> f64 {
    let weighted: f64 = MetricColumn::ALL
        .into_iter()
        .map(|c| summary.metric(c) / maxima.get(c) * weights.weight(c))
        .sum();

    weighted * SCORE_SCALE
}

/// Extends every summary row with its engagement score.
#[tracing::instrument(skip_all, fields(features = summaries.len()))]
pub fn score_features(
    summaries: Vec<FeatureSummary>,
    weights: &EngagementWeights,
) -> Vec<ScoredFeature> {
    let maxima = ColumnMaxima::from_summaries(&summaries);

    if !summaries.is_empty() {
        for column in maxima.degenerate_columns() {
            warn!(
                column = %column,
                max = maxima.get(column),
                "Normalization denominator is zero or missing; scores will be NaN"
            );
        }
    }

    summaries
        .into_iter()
        .map(|summary| {
            let engagement_score = engagement_score(&summary, &maxima, weights);
            ScoredFeature {
                summary,
                engagement_score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, sessions: f64, duration: f64, satisfaction: f64) -> FeatureSummary {
        FeatureSummary {
            feature_name: name.to_string(),
            sessions,
            avg_duration_mins: duration,
            satisfaction_score: satisfaction,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = ENGAGEMENT_WEIGHTS;
        let total = w.sessions + w.avg_duration_mins + w.satisfaction_score;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_leader_on_every_metric_scores_100() {
        let scored = score_features(
            vec![
                summary("lead", 50.0, 9.0, 4.8),
                summary("other", 10.0, 3.0, 2.0),
            ],
            &ENGAGEMENT_WEIGHTS,
        );

        assert_eq!(scored[0].engagement_score, 100.0);
        assert!(scored[1].engagement_score < 100.0);
    }

    #[test]
    fn test_single_feature_scores_100() {
        let scored = score_features(vec![summary("only", 3.0, 1.5, 2.0)], &ENGAGEMENT_WEIGHTS);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].engagement_score, 100.0);
    }

    #[test]
    fn test_satisfaction_breaks_tie() {
        let scored = score_features(
            vec![summary("A", 30.0, 6.0, 4.0), summary("B", 30.0, 6.0, 5.0)],
            &ENGAGEMENT_WEIGHTS,
        );

        // A: (0.5 + 0.3 + 0.8 * 0.2) * 100 = 96
        assert!((scored[0].engagement_score - 96.0).abs() < 1e-9);
        assert_eq!(scored[1].engagement_score, 100.0);
    }

    #[test]
    fn test_zero_column_yields_nan_score() {
        let scored = score_features(
            vec![summary("A", 0.0, 6.0, 4.0), summary("B", 0.0, 3.0, 5.0)],
            &ENGAGEMENT_WEIGHTS,
        );

        assert!(scored.iter().all(|s| s.engagement_score.is_nan()));
    }

    #[test]
    fn test_degenerate_columns() {
        let maxima = ColumnMaxima::from_summaries(&[summary("A", 0.0, f64::NAN, 4.0)]);
        assert_eq!(
            maxima.degenerate_columns(),
            vec![MetricColumn::Sessions, MetricColumn::AvgDurationMins]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(score_features(Vec::new(), &ENGAGEMENT_WEIGHTS).is_empty());
    }
}
