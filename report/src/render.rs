use std::path::Path;

use plotly::common::{Marker, MarkerSymbol, Mode};
use plotly::layout::{Axis, AxisType};
use plotly::{Layout, Plot, Scatter};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::{ReportError, Result};
use crate::graph::{AxisScale, Chart, Series, SeriesStyle};

const LOG_TARGET: &str = "subtyping-report::render";

const FONT: &str = "sans-serif";
const FONT_SIZE: u32 = 20;
const DEFAULT_MARGIN: u32 = 24;
const MARKER_SIZE: u32 = 5;
const LINE_WIDTH: u32 = 2;
// Fraction of the data span added on each side of an axis.
const RANGE_MARGIN: f64 = 0.05;

/// Draws a [`Chart`] to a file.
pub trait ChartRenderer {
    /// File extension of the produced images, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, chart: &Chart, path: &Path) -> Result<()>;
}

/// Static SVG output through plotters.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl ChartRenderer for SvgRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, chart: &Chart, path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|err| ReportError::render(path, err))?;

        let log_y = chart.y_scale == AxisScale::Log;
        let x_values = chart.series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
        let (x_min, x_max) = linear_bounds(x_values);
        let margin = chart
            .padding
            .map_or(DEFAULT_MARGIN, |pad| (pad * f64::from(FONT_SIZE)).round() as u32);

        let mut builder = ChartBuilder::on(&root);
        builder
            .caption(&chart.title, (FONT, FONT_SIZE + 8).into_font())
            .margin(margin)
            .x_label_area_size(FONT_SIZE * 3)
            .y_label_area_size(FONT_SIZE * 4);

        let y_values = chart.series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
        if log_y {
            let (y_min, y_max) = log_bounds(y_values);
            let mut ctx = builder
                .build_cartesian_2d(x_min..x_max, (y_min..y_max).log_scale())
                .map_err(|err| ReportError::render(path, err))?;
            draw_chart(&mut ctx, chart, true).map_err(|err| ReportError::render(path, err))?;
        } else {
            let (y_min, y_max) = linear_bounds(y_values);
            let mut ctx = builder
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(|err| ReportError::render(path, err))?;
            draw_chart(&mut ctx, chart, false).map_err(|err| ReportError::render(path, err))?;
        }

        root.present().map_err(|err| ReportError::render(path, err))
    }
}

fn draw_chart<'a, DB, Y>(
    ctx: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    chart: &Chart,
    log_y: bool,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend + 'a,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let log_formatter = |y: &f64| format!("{y:.0e}");
    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style((FONT, FONT_SIZE).into_font())
        .label_style((FONT, FONT_SIZE - 4).into_font());
    if log_y {
        mesh.y_label_formatter(&log_formatter);
    }
    mesh.draw()?;

    for (idx, series) in chart.series.iter().enumerate() {
        let style = Palette99::pick(idx).stroke_width(LINE_WIDTH);
        let points = visible_points(series, log_y);

        match series.style {
            SeriesStyle::Line => {
                let anno = ctx.draw_series(LineSeries::new(points, style))?;
                if let Some(label) = &series.label {
                    anno.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], style)
                    });
                }
            }
            SeriesStyle::Cross => {
                let anno = ctx.draw_series(
                    points
                        .into_iter()
                        .map(|point| Cross::new(point, MARKER_SIZE, style)),
                )?;
                if let Some(label) = &series.label {
                    anno.label(label.as_str())
                        .legend(move |(x, y)| Cross::new((x + 10, y), MARKER_SIZE, style));
                }
            }
            SeriesStyle::Circle => {
                let fill = style.filled();
                let anno = ctx.draw_series(
                    points
                        .into_iter()
                        .map(|point| Circle::new(point, MARKER_SIZE, fill)),
                )?;
                if let Some(label) = &series.label {
                    anno.label(label.as_str())
                        .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_SIZE, fill));
                }
            }
        }
    }

    if chart.has_legend() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font((FONT, FONT_SIZE - 4).into_font())
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

// Non-positive values cannot be placed on a log axis and are masked.
fn visible_points(series: &Series, log_y: bool) -> Vec<(f64, f64)> {
    if !log_y {
        return series.points.clone();
    }

    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .copied()
        .filter(|&(_, y)| y > 0.0)
        .collect();
    let masked = series.points.len() - points.len();
    if masked > 0 {
        tracing::warn!(
            target: LOG_TARGET,
            series = series.label.as_deref().unwrap_or_default(),
            masked,
            "Dropping non-positive values from logarithmic axis",
        );
    }
    points
}

fn linear_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let Some((min, max)) = min_max(values) else {
        return (0.0, 1.0);
    };
    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.5 };
        return (min - pad, max + pad);
    }

    let pad = (max - min) * RANGE_MARGIN;
    (min - pad, max + pad)
}

fn log_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let Some((min, max)) = min_max(values.filter(|v| *v > 0.0)) else {
        return (1e-3, 1.0);
    };
    let (lo, hi) = (min.log10(), max.log10());
    if lo == hi {
        return (10f64.powf(lo - 1.0), 10f64.powf(hi + 1.0));
    }

    let pad = (hi - lo) * RANGE_MARGIN;
    (10f64.powf(lo - pad), 10f64.powf(hi + pad))
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Interactive HTML output through plotly.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl ChartRenderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, chart: &Chart, path: &Path) -> Result<()> {
        let mut plot = Plot::new();

        for series in &chart.series {
            let (xs, ys): (Vec<f64>, Vec<f64>) = series.points.iter().copied().unzip();
            let trace = Scatter::new(xs, ys);
            let trace = match series.style {
                SeriesStyle::Line => trace.mode(Mode::Lines),
                SeriesStyle::Cross => trace
                    .mode(Mode::Markers)
                    .marker(Marker::new().symbol(MarkerSymbol::X)),
                SeriesStyle::Circle => trace.mode(Mode::Markers),
            };
            let trace = match &series.label {
                Some(label) => trace.name(label.as_str()),
                None => trace.show_legend(false),
            };
            plot.add_trace(trace);
        }

        let y_type = match chart.y_scale {
            AxisScale::Linear => AxisType::Linear,
            AxisScale::Log => AxisType::Log,
        };
        plot.set_layout(
            Layout::new()
                .title(chart.title.as_str())
                .x_axis(Axis::new().title(chart.x_label.as_str()))
                .y_axis(Axis::new().title(chart.y_label.as_str()).type_(y_type)),
        );

        std::fs::write(path, plot.to_html()).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
