//! Chart rendering for analysis results
//!
//! Charts are plain PNG rasters drawn with the `image` crate. Metric panels
//! sit in a 2×2 grid in metric order (CPU, Memory / Network, Temperature).

mod canvas;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::anomaly::MetricAnomalies;
use crate::error::Result;
use crate::models::{Metric, ObservationTable};
use crate::patterns::TimePatterns;
use crate::stats::moments;
use crate::thresholds::Threshold;
use canvas::{diverging_color, grid, Canvas, Panel, Scale, CRITICAL, SERIES, WARNING};

pub const TIMESERIES_CHART: &str = "performance_timeseries.png";
pub const DISTRIBUTION_CHART: &str = "performance_distributions.png";
pub const CORRELATION_CHART: &str = "correlation_heatmap.png";
pub const HOURLY_CHART: &str = "hourly_patterns.png";
pub const ANOMALY_CHART: &str = "anomaly_detection.png";

const GRID_WIDTH: u32 = 1500;
const GRID_HEIGHT: u32 = 1000;
const HISTOGRAM_BINS: usize = 30;

/// Results a renderer draws from
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub table: &'a ObservationTable,
    pub patterns: &'a TimePatterns,
    pub thresholds: &'a BTreeMap<Metric, Threshold>,
    pub anomalies: &'a BTreeMap<Metric, MetricAnomalies>,
}

/// Turns analysis results into chart files
pub trait ChartRenderer {
    /// Render every chart, returning the written paths
    fn render(&self, input: &ChartInput<'_>) -> Result<Vec<PathBuf>>;
}

/// Writes PNG charts into an output directory
pub struct PngChartRenderer {
    output_dir: PathBuf,
}

impl PngChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write(&self, name: &str, canvas: &Canvas, written: &mut Vec<PathBuf>) -> Result<()> {
        let path = self.output_dir.join(name);
        canvas.save(&path)?;
        debug!(path = %path.display(), "Chart written");
        written.push(path);
        Ok(())
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, input: &ChartInput<'_>) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::new();
        self.write(TIMESERIES_CHART, &timeseries_chart(input.table), &mut written)?;
        self.write(DISTRIBUTION_CHART, &distribution_chart(input.table), &mut written)?;
        self.write(CORRELATION_CHART, &correlation_chart(input.table), &mut written)?;

        if input.patterns.hourly.is_empty() {
            debug!("No hourly data available for plotting");
        } else {
            self.write(HOURLY_CHART, &hourly_chart(input.patterns), &mut written)?;
        }

        self.write(ANOMALY_CHART, &anomaly_chart(input), &mut written)?;
        Ok(written)
    }
}

fn metric_slot(metric: Metric) -> usize {
    Metric::ALL.iter().position(|m| *m == metric).unwrap_or(0)
}

/// X coordinate per row: the timestamp in seconds, or the row index when
/// the table has no usable timestamps
fn row_positions(table: &ObservationTable) -> Vec<Option<f64>> {
    let has_times = table.rows().iter().any(|r| r.timestamp.is_some());
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if has_times {
                r.timestamp.map(|ts| ts.and_utc().timestamp() as f64)
            } else {
                Some(i as f64)
            }
        })
        .collect()
}

/// (row, x, y) for every row with both a position and a reading
fn series_points(
    table: &ObservationTable,
    positions: &[Option<f64>],
    metric: Metric,
) -> Vec<(usize, f64, f64)> {
    table
        .indexed_values(metric)
        .filter_map(|(row, value)| Some((row, positions[row]?, value?)))
        .collect()
}

fn plot_series(
    canvas: &mut Canvas,
    panel: &Panel,
    points: &[(usize, f64, f64)],
    x_scale: &Scale,
    y_scale: &Scale,
    color: image::Rgba<u8>,
) {
    let pixels: Vec<(u32, u32)> = points
        .iter()
        .map(|&(_, x, y)| panel.point(x_scale.ratio(x), y_scale.ratio(y)))
        .collect();
    canvas.draw_polyline(&pixels, color);
}

fn timeseries_chart(table: &ObservationTable) -> Canvas {
    let mut canvas = Canvas::new(GRID_WIDTH, GRID_HEIGHT);
    let panels = grid(GRID_WIDTH, GRID_HEIGHT, 2, 2);
    let positions = row_positions(table);

    for &metric in table.metrics() {
        let slot = metric_slot(metric);
        let panel = panels[slot];
        canvas.draw_panel(&panel);

        let points = series_points(table, &positions, metric);
        let (Some(x_scale), Some(y_scale)) = (
            Scale::fit(points.iter().map(|p| p.1)),
            Scale::fit(points.iter().map(|p| p.2)),
        ) else {
            continue;
        };
        plot_series(&mut canvas, &panel, &points, &x_scale, &y_scale, SERIES[slot]);
    }

    canvas
}

/// Bin counts over `[min, max]`, the last bin closed on the right
fn histogram(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    if values.is_empty() || bins == 0 {
        return counts;
    }

    let (min, max) = (moments::min(values), moments::max(values));
    let width = (max - min) / bins as f64;
    for &v in values {
        let idx = if width > 0.0 {
            (((v - min) / width) as usize).min(bins - 1)
        } else {
            bins / 2
        };
        counts[idx] += 1;
    }
    counts
}

fn distribution_chart(table: &ObservationTable) -> Canvas {
    let mut canvas = Canvas::new(GRID_WIDTH, GRID_HEIGHT);
    let panels = grid(GRID_WIDTH, GRID_HEIGHT, 2, 2);

    for &metric in table.metrics() {
        let slot = metric_slot(metric);
        let panel = panels[slot];
        canvas.draw_panel(&panel);

        let counts = histogram(&table.values(metric), HISTOGRAM_BINS);
        let tallest = counts.iter().copied().max().unwrap_or(0);
        if tallest == 0 {
            continue;
        }

        let bar_width = panel.width() / HISTOGRAM_BINS as f64;
        for (i, &count) in counts.iter().enumerate() {
            let x0 = panel.left + (i as f64 * bar_width) as u32;
            let x1 = panel.left + ((i + 1) as f64 * bar_width) as u32;
            let height = (count as f64 / tallest as f64 * panel.height()) as u32;
            canvas.fill_rect(x0 + 1, panel.bottom - height, x1, panel.bottom, SERIES[slot]);
        }
    }

    canvas
}

/// Pairwise Pearson correlations over rows where both metrics have readings
pub fn correlation_matrix(table: &ObservationTable) -> Vec<Vec<f64>> {
    let metrics = table.metrics();
    metrics
        .iter()
        .map(|&a| {
            metrics
                .iter()
                .map(|&b| {
                    let pairs: Vec<(f64, f64)> = table
                        .rows()
                        .iter()
                        .filter_map(|r| Some((r.value(a)?, r.value(b)?)))
                        .collect();
                    moments::pearson(&pairs)
                })
                .collect()
        })
        .collect()
}

fn correlation_chart(table: &ObservationTable) -> Canvas {
    const SIZE: u32 = 800;
    const MARGIN: u32 = 60;

    let mut canvas = Canvas::new(SIZE, SIZE);
    let matrix = correlation_matrix(table);
    if matrix.is_empty() {
        return canvas;
    }

    let cell = (SIZE - 2 * MARGIN) / matrix.len() as u32;
    for (i, row) in matrix.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let x0 = MARGIN + j as u32 * cell;
            let y0 = MARGIN + i as u32 * cell;
            canvas.fill_rect(x0 + 1, y0 + 1, x0 + cell, y0 + cell, diverging_color(r));
        }
    }

    canvas
}

fn hourly_chart(patterns: &TimePatterns) -> Canvas {
    let mut canvas = Canvas::new(GRID_WIDTH, GRID_HEIGHT);
    let panels = grid(GRID_WIDTH, GRID_HEIGHT, 2, 2);
    let x_scale = Scale::new(0.0, 23.0);

    for metric in Metric::ALL {
        let means = patterns.hourly_means(metric);
        if means.is_empty() {
            continue;
        }
        let slot = metric_slot(metric);
        let panel = panels[slot];
        canvas.draw_panel(&panel);

        let Some(y_scale) = Scale::fit(means.iter().map(|m| m.1)) else {
            continue;
        };
        let pixels: Vec<(u32, u32)> = means
            .iter()
            .map(|&(hour, mean)| panel.point(x_scale.ratio(f64::from(hour)), y_scale.ratio(mean)))
            .collect();
        canvas.draw_polyline(&pixels, SERIES[slot]);
        for &(x, y) in &pixels {
            canvas.draw_marker(x, y, 3, SERIES[slot]);
        }
    }

    canvas
}

fn anomaly_chart(input: &ChartInput<'_>) -> Canvas {
    let mut canvas = Canvas::new(GRID_WIDTH, GRID_HEIGHT);
    let panels = grid(GRID_WIDTH, GRID_HEIGHT, 2, 2);
    let positions = row_positions(input.table);

    for (&metric, threshold) in input.thresholds {
        if !input.table.has_metric(metric) {
            continue;
        }
        let slot = metric_slot(metric);
        let panel = panels[slot];
        canvas.draw_panel(&panel);

        let points = series_points(input.table, &positions, metric);
        let y_values = points
            .iter()
            .map(|p| p.2)
            .chain([threshold.warning, threshold.critical]);
        let (Some(x_scale), Some(y_scale)) =
            (Scale::fit(points.iter().map(|p| p.1)), Scale::fit(y_values))
        else {
            continue;
        };

        plot_series(&mut canvas, &panel, &points, &x_scale, &y_scale, SERIES[0]);

        let (_, warning_y) = panel.point(0.0, y_scale.ratio(threshold.warning));
        let (_, critical_y) = panel.point(0.0, y_scale.ratio(threshold.critical));
        canvas.draw_dashed_hline(&panel, warning_y, WARNING);
        canvas.draw_dashed_hline(&panel, critical_y, CRITICAL);

        if let Some(found) = input.anomalies.get(&metric) {
            for &(row, x, y) in &points {
                if found.critical_rows.binary_search(&row).is_ok() {
                    let (px, py) = panel.point(x_scale.ratio(x), y_scale.ratio(y));
                    canvas.draw_marker(px, py, 3, CRITICAL);
                }
            }
        }
    }

    canvas
}
