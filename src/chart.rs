//! Engagement bar chart and the targets it can be rendered to.
//!
//! [`BarChart`] is the backend-independent chart model. [`RenderTarget`]
//! draws it: [`TerminalChart`] writes text bars to a terminal, [`SvgFile`]
//! and [`PngFile`] save an image through `plotters`.

use anyhow::{Result, ensure};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

use crate::analyzers::score::SCORE_SCALE;
use crate::analyzers::types::ScoredFeature;

pub const CHART_TITLE: &str = "Feature Engagement Score (%)";
pub const Y_AXIS_LABEL: &str = "Engagement Score (%)";
/// Sky blue.
pub const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);
pub const DEFAULT_SIZE: (u32, u32) = (900, 500);

/// Font family every chart label is drawn with.
const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Registers the bundled font with plotters once per process.
///
/// Image backends rasterise text themselves, so without a registered font
/// no caption or axis label can be drawn.
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    ensure!(ok, "bundled chart font could not be loaded");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// A single-series bar chart, one bar per feature in ranking order.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub color: RGBColor,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn from_ranked(ranked: &[ScoredFeature]) -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            y_label: Y_AXIS_LABEL.to_string(),
            color: BAR_COLOR,
            bars: ranked
                .iter()
                .map(|f| Bar {
                    label: f.feature_name().to_string(),
                    value: f.engagement_score,
                })
                .collect(),
        }
    }

    /// Top of the value axis: the nominal score ceiling, or the largest bar if it overshoots.
    pub fn value_ceiling(&self) -> f64 {
        self.bars
            .iter()
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold(SCORE_SCALE, f64::max)
    }
}

/// Somewhere a [`BarChart`] can be drawn.
pub trait RenderTarget {
    fn render(&mut self, chart: &BarChart) -> Result<()>;
}

/// Horizontal text bars for a terminal. Nothing is written to disk.
pub struct TerminalChart<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TerminalChart<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 50 }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalChart<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> RenderTarget for TerminalChart<W> {
    fn render(&mut self, chart: &BarChart) -> Result<()> {
        let ceiling = chart.value_ceiling();
        let label_width = chart
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(self.out, "{}", chart.title)?;
        writeln!(self.out, "{}", chart.y_label)?;
        for bar in &chart.bars {
            let label = &bar.label;
            if bar.value.is_finite() {
                let len = (bar.value.max(0.0) / ceiling * self.width as f64).round() as usize;
                writeln!(
                    self.out,
                    "{label:>label_width$} | {} {:.2}",
                    "█".repeat(len),
                    bar.value
                )?;
            } else {
                writeln!(self.out, "{label:>label_width$} | {}", bar.value)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Saves the chart as an SVG image.
pub struct SvgFile {
    pub path: PathBuf,
    pub size: (u32, u32),
}

impl RenderTarget for SvgFile {
    fn render(&mut self, chart: &BarChart) -> Result<()> {
        ensure!(!chart.bars.is_empty(), "no features to chart");
        create_parent_dir(&self.path)?;

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        draw_bar_chart(&root, chart)?;

        info!(path = %self.path.display(), "Chart saved as SVG");
        Ok(())
    }
}

/// Saves the chart as a PNG image.
pub struct PngFile {
    pub path: PathBuf,
    pub size: (u32, u32),
}

impl RenderTarget for PngFile {
    fn render(&mut self, chart: &BarChart) -> Result<()> {
        ensure!(!chart.bars.is_empty(), "no features to chart");
        create_parent_dir(&self.path)?;

        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        draw_bar_chart(&root, chart)?;

        info!(path = %self.path.display(), "Chart saved as PNG");
        Ok(())
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn draw_bar_chart<DB>(root: &DrawingArea<DB, Shift>, chart: &BarChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    ensure_font()?;
    root.fill(&WHITE)?;

    let count = u32::try_from(chart.bars.len())?;
    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title.as_str(), (FONT_FAMILY, 24))
        .margin(15)
        .x_label_area_size(140)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..count).into_segmented(), 0f64..chart.value_ceiling() * 1.05)?;

    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => chart
            .bars
            .get(*i as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    // Feature names read bottom-to-top under their bars.
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(chart.bars.len())
        .x_label_formatter(&label_of)
        .x_label_style(
            (FONT_FAMILY, 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc(chart.y_label.as_str())
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(chart.color.filled())
            .margin(10)
            .data(
                chart
                    .bars
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.value.is_finite())
                    .map(|(i, b)| (i as u32, b.value)),
            ),
    )?;

    root.present()?;
    Ok(())
}
