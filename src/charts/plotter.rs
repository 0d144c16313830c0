//! Chart Plotter Module
//! Renders histograms and scatterplots of the joined indicators as SVG.

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use polars::prelude::{DataFrame, DataType};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::ChartSpec;

/// Chart size in pixels
pub const CHART_SIZE: (u32, u32) = (800, 480);

const BAR_COLOR: RGBColor = RGBColor(10, 132, 255); // #0a84ff
const POINT_COLOR: RGBColor = RGBColor(14, 165, 233); // #0ea5e9

/// Bin count bounds for histograms
const MIN_BINS: usize = 12;
const MAX_BINS: usize = 28;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to draw chart: {0}")]
    Draw(#[from] DrawingAreaErrorKind<std::io::Error>),
    #[error("Failed to write chart '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One histogram bar covering `[x0, x1)`; the last bin also holds its upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

pub struct ChartPlotter;

impl ChartPlotter {
    /// Render one chart from the merged table and write it to its output path.
    ///
    /// Returns `None` without writing anything when the plotted columns hold
    /// no finite values.
    pub fn render(
        df: &DataFrame,
        chart: &ChartSpec,
        year: i64,
    ) -> Result<Option<PathBuf>, ChartError> {
        let svg = match chart {
            ChartSpec::Histogram {
                column,
                title,
                x_label,
                ..
            } => {
                let values: Vec<f64> = Self::column_values(df, column)
                    .into_iter()
                    .flatten()
                    .collect();
                if values.is_empty() {
                    return Ok(None);
                }
                let bins = Self::histogram_bins(&values);
                Self::draw_histogram(&bins, &format!("{title} ({year})"), x_label)?
            }
            ChartSpec::Scatter {
                x,
                y,
                title,
                x_label,
                y_label,
                ..
            } => {
                let points = Self::scatter_points(df, x, y);
                if points.is_empty() {
                    return Ok(None);
                }
                Self::draw_scatter(&points, &format!("{title} ({year})"), x_label, y_label)?
            }
        };

        let path = chart.output();
        Self::write_svg(path, &svg)?;
        debug!(path = %path.display(), "chart written");
        Ok(Some(path.to_path_buf()))
    }

    /// Per-row numeric values of a column; missing, non-numeric and
    /// non-finite cells become `None`.
    pub fn column_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column)
            .ok()
            .and_then(|col| col.cast(&DataType::Float64).ok())
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| {
                        ca.into_iter()
                            .map(|v| v.filter(|v| v.is_finite()))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Rows where both columns hold a finite value.
    pub fn scatter_points(df: &DataFrame, x: &str, y: &str) -> Vec<(f64, f64)> {
        Self::column_values(df, x)
            .into_iter()
            .zip(Self::column_values(df, y))
            .filter_map(|(x, y)| Some((x?, y?)))
            .collect()
    }

    /// Equal-width bins over the value extent, about `sqrt(n)` of them.
    pub fn histogram_bins(values: &[f64]) -> Vec<Bin> {
        if values.is_empty() {
            return Vec::new();
        }

        let (min, max) = Self::extent(values);
        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let count = ((values.len() as f64).sqrt().round() as usize).clamp(MIN_BINS, MAX_BINS);
        let width = (hi - lo) / count as f64;

        let mut bins: Vec<Bin> = (0..count)
            .map(|i| Bin {
                x0: lo + i as f64 * width,
                x1: lo + (i + 1) as f64 * width,
                count: 0,
            })
            .collect();

        for v in values {
            let idx = (((v - lo) / width).floor() as usize).min(count - 1);
            bins[idx].count += 1;
        }
        bins
    }

    fn extent(values: &[f64]) -> (f64, f64) {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Extent widened by 5% on each side so edge points stay inside the plot.
    fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
        let values: Vec<f64> = values.collect();
        let (min, max) = Self::extent(&values);
        let pad = if min == max { 0.5 } else { (max - min) * 0.05 };
        (min - pad)..(max + pad)
    }

    fn draw_histogram(bins: &[Bin], title: &str, x_label: &str) -> Result<String, ChartError> {
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return Ok(String::new());
        };
        let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64 * 1.08;

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 16))
                .margin(14)
                .x_label_area_size(44)
                .y_label_area_size(52)
                .build_cartesian_2d(first.x0..last.x1, 0f64..y_max.max(1.0))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(6)
                .y_labels(5)
                .x_desc(x_label)
                .y_desc("Countries")
                .draw()?;

            chart.draw_series(bins.iter().map(|bin| {
                Rectangle::new([(bin.x0, 0.0), (bin.x1, bin.count as f64)], BAR_COLOR.filled())
            }))?;

            root.present()?;
        }
        Ok(svg)
    }

    fn draw_scatter(
        points: &[(f64, f64)],
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Result<String, ChartError> {
        let x_range = Self::padded_range(points.iter().map(|p| p.0));
        let y_range = Self::padded_range(points.iter().map(|p| p.1));

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 16))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(55)
                .build_cartesian_2d(x_range, y_range)?;

            chart
                .configure_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_desc(x_label)
                .y_desc(y_label)
                .draw()?;

            chart.draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, POINT_COLOR.mix(0.55).filled())),
            )?;

            root.present()?;
        }
        Ok(svg)
    }

    fn write_svg(path: &Path, svg: &str) -> Result<(), ChartError> {
        let io_error = |source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, svg).map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;
    use tempfile::TempDir;

    fn joined() -> DataFrame {
        df!(
            "Entity" => ["Chad", "France", "Kenya", "Peru"],
            "Code" => ["TCD", "FRA", "KEN", "PER"],
            "GDP per capita" => [Some(1_500.0), Some(45_000.0), None, Some(13_100.0)],
            "Life expectancy" => [Some(52.5), Some(82.3), Some(61.4), Some(f64::NAN)]
        )
        .unwrap()
    }

    #[test]
    fn bins_cover_every_value() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64 * 0.5).collect();
        let bins = ChartPlotter::histogram_bins(&values);

        assert_eq!(bins.len(), MAX_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].x0, 0.0);
        assert!((bins[bins.len() - 1].x1 - 499.5).abs() < 1e-9);
    }

    #[test]
    fn few_values_still_get_minimum_bins() {
        let bins = ChartPlotter::histogram_bins(&[1.0, 2.0, 3.0, 10.0]);
        assert_eq!(bins.len(), MIN_BINS);
        // maximum lands in the last bin
        assert_eq!(bins[MIN_BINS - 1].count, 1);
        assert_eq!(bins[0].count, 1);
    }

    #[test]
    fn identical_values_share_one_bin() {
        let bins = ChartPlotter::histogram_bins(&[7.0, 7.0, 7.0]);
        assert_eq!(bins.iter().filter(|b| b.count > 0).count(), 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert!(ChartPlotter::histogram_bins(&[]).is_empty());
    }

    #[test]
    fn scatter_skips_rows_missing_either_value() {
        let points = ChartPlotter::scatter_points(&joined(), "Life expectancy", "GDP per capita");
        assert_eq!(points, [(52.5, 1_500.0), (82.3, 45_000.0)]);
    }

    #[test]
    fn renders_histogram_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("charts").join("gdp.svg");
        let chart = ChartSpec::Histogram {
            column: "GDP per capita".to_string(),
            title: "Distribution of GDP per Capita".to_string(),
            x_label: "GDP per Capita (USD)".to_string(),
            output: output.clone(),
        };

        let written = ChartPlotter::render(&joined(), &chart, 2022).unwrap();
        assert_eq!(written, Some(output.clone()));

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Distribution of GDP per Capita (2022)"));
    }

    #[test]
    fn renders_scatter_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("scatter.svg");
        let chart = ChartSpec::Scatter {
            x: "Life expectancy".to_string(),
            y: "GDP per capita".to_string(),
            title: "Life Expectancy vs GDP per Capita".to_string(),
            x_label: "Life Expectancy (Years)".to_string(),
            y_label: "GDP per Capita (USD)".to_string(),
            output: output.clone(),
        };

        ChartPlotter::render(&joined(), &chart, 2022).unwrap();
        let svg = fs::read_to_string(&output).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn empty_column_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("empty.svg");
        let chart = ChartSpec::Histogram {
            column: "GDP per capita".to_string(),
            title: "Distribution of GDP per Capita".to_string(),
            x_label: "GDP per Capita (USD)".to_string(),
            output: output.clone(),
        };

        let written = ChartPlotter::render(&joined().head(Some(0)), &chart, 2022).unwrap();
        assert_eq!(written, None);
        assert!(!output.exists());
    }
}
