//! Output formatting for ranked feature summaries.
//!
//! Supports fixed-width text tables and pretty-printed JSON.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

use crate::analyzers::score::{ENGAGEMENT_WEIGHTS, EngagementWeights};
use crate::analyzers::types::ScoredFeature;

const HEADERS: [&str; 6] = [
    "rank",
    "feature_name",
    "sessions",
    "avg_duration_mins",
    "satisfaction_score",
    "engagement_score",
];

/// Session totals print as integers when they are whole numbers.
pub fn format_sessions(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format_metric(value)
    }
}

/// Means and scores print with six decimals; NaN prints as `NaN`.
pub fn format_metric(value: f64) -> String {
    format!("{value:.6}")
}

/// Renders ranked rows as a fixed-width table, one line per feature.
///
/// Ranks start at 1. Text columns are left-aligned, numeric columns right-aligned.
pub fn render_table(rows: &[ScoredFeature]) -> String {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            [
                (i + 1).to_string(),
                row.feature_name().to_string(),
                format_sessions(row.summary.sessions),
                format_metric(row.summary.avg_duration_mins),
                format_metric(row.summary.satisfaction_score),
                format_metric(row.engagement_score),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for line in &cells {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths.iter().copied())
        .enumerate()
        .map(|(col, (cell, width))| {
            if col == 1 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect();
    out.push_str(parts.join("  ").trim_end());
    out.push('\n');
}

/// Writes the top-`top` table followed by the full ranked table.
pub fn write_tables<W: Write>(out: &mut W, ranked: &[ScoredFeature], top: usize) -> Result<()> {
    let shown = &ranked[..top.min(ranked.len())];
    debug!(top, shown = shown.len(), total = ranked.len(), "Writing report tables");

    writeln!(out, "Top {top} Engaging Features:")?;
    write!(out, "{}", render_table(shown))?;
    writeln!(out)?;
    writeln!(out, "Feature Usage Summary:")?;
    write!(out, "{}", render_table(ranked))?;
    out.flush()?;
    Ok(())
}

/// JSON document emitted by `--format json`.
#[derive(Debug, Serialize)]
pub struct EngagementReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub weights: EngagementWeights,
    pub top: &'a [ScoredFeature],
    pub features: &'a [ScoredFeature],
}

impl<'a> EngagementReport<'a> {
    pub fn new(ranked: &'a [ScoredFeature], top: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            weights: ENGAGEMENT_WEIGHTS,
            top: &ranked[..top.min(ranked.len())],
            features: ranked,
        }
    }
}

/// Writes the ranked report as pretty-printed JSON. NaN scores become `null`.
pub fn write_json<W: Write>(out: &mut W, ranked: &[ScoredFeature], top: usize) -> Result<()> {
    let report = EngagementReport::new(ranked, top);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
