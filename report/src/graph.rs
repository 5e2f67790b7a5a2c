//! Chart construction from result tables.
//!
//! Charts are plain values: building one never touches a drawing backend, and
//! each [`Chart`] is rendered independently by a [`crate::render::ChartRenderer`].

use std::collections::{BTreeMap, HashMap};

use crate::error::{ReportError, Result};
use crate::models::{Outcome, ResultTable};

const LOG_TARGET: &str = "subtyping-report::graph";

/// Iteration count for tables holding one trial per row.
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Algorithm plotted on the x axis of comparison charts.
pub const DEFAULT_X_ALGORITHM: &str = "inductive";
/// Algorithm plotted on the y axis of comparison charts.
pub const DEFAULT_Y_ALGORITHM: &str = "coinductive";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    /// Points joined in order.
    Line,
    /// Unconnected "x" markers.
    Cross,
    /// Unconnected filled dots.
    Circle,
}

/// One drawable series. Series without a label are left out of the legend.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(label: Option<String>, style: SeriesStyle, points: Vec<(f64, f64)>) -> Self {
        Self {
            label,
            style,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_scale: AxisScale,
    /// Padding around the plot area, in multiples of the font size.
    /// `None` keeps the renderer's default margins.
    pub padding: Option<f64>,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            y_scale: AxisScale::Linear,
            padding: None,
            series: Vec::new(),
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn find_series(&self, label: &str) -> Option<&Series> {
        self.series
            .iter()
            .find(|series| series.label.as_deref() == Some(label))
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|series| series.points.len()).sum()
    }

    pub fn has_legend(&self) -> bool {
        self.series.iter().any(|series| series.label.is_some())
    }
}

/// Runs of a single algorithm split by outcome, as `(k, seconds)` pairs in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmRuns {
    pub algorithm: String,
    pub successes: Vec<(u64, f64)>,
    pub timeouts: Vec<(u64, f64)>,
}

/// Group rows by algorithm in a single pass, keeping first-appearance order.
pub fn group_by_algorithm(table: &ResultTable, iterations: u32) -> Vec<AlgorithmRuns> {
    let mut groups: Vec<AlgorithmRuns> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in table.rows() {
        let slot = *index.entry(row.algorithm.as_str()).or_insert_with(|| {
            groups.push(AlgorithmRuns {
                algorithm: row.algorithm.clone(),
                successes: Vec::new(),
                timeouts: Vec::new(),
            });
            groups.len() - 1
        });

        let point = (row.k, row.time_seconds(iterations));
        match row.success {
            Outcome::Success => groups[slot].successes.push(point),
            Outcome::Timeout => groups[slot].timeouts.push(point),
        }
    }

    groups
}

/// Line/timeout chart: per algorithm, a line through successful runs and "x"
/// markers at timed-out runs, on a logarithmic time axis.
pub fn plot(table: &ResultTable, title: &str, iterations: u32) -> Chart {
    let mut chart = Chart::new(title, "k", "time (s)");
    chart.y_scale = AxisScale::Log;

    for runs in group_by_algorithm(table, iterations) {
        if !runs.successes.is_empty() {
            chart.series.push(Series::new(
                Some(format!("{} successes", runs.algorithm)),
                SeriesStyle::Line,
                mean_by_k(&runs.successes),
            ));
        }
        if !runs.timeouts.is_empty() {
            chart.series.push(Series::new(
                Some(format!("{} timeouts", runs.algorithm)),
                SeriesStyle::Cross,
                runs.timeouts
                    .iter()
                    .map(|&(k, seconds)| (k as f64, seconds))
                    .collect(),
            ));
        }
    }

    tracing::debug!(
        target: LOG_TARGET,
        title,
        series = chart.series.len(),
        points = chart.point_count(),
        "Built line chart",
    );

    chart
}

// Sorted by k, repeated k values collapse to their mean.
fn mean_by_k(points: &[(u64, f64)]) -> Vec<(f64, f64)> {
    let mut buckets: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for &(k, seconds) in points {
        let bucket = buckets.entry(k).or_insert((0.0, 0));
        bucket.0 += seconds;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(k, (sum, count))| (k as f64, sum / count as f64))
        .collect()
}

/// Result times reshaped to one row per `k` and one column per algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    algorithms: Vec<String>,
    rows: BTreeMap<u64, HashMap<String, f64>>,
}

impl PivotTable {
    /// Reshape `table`, failing on any repeated `(algorithm, k)` pair.
    pub fn from_table(table: &ResultTable, iterations: u32) -> Result<Self> {
        let mut algorithms: Vec<String> = Vec::new();
        let mut rows: BTreeMap<u64, HashMap<String, f64>> = BTreeMap::new();

        for row in table.rows() {
            let columns = rows.entry(row.k).or_default();
            if columns.contains_key(&row.algorithm) {
                return Err(ReportError::ReshapeCollision {
                    path: table.source().to_path_buf(),
                    algorithm: row.algorithm.clone(),
                    k: row.k,
                });
            }
            columns.insert(row.algorithm.clone(), row.time_seconds(iterations));

            if !algorithms.contains(&row.algorithm) {
                algorithms.push(row.algorithm.clone());
            }
        }

        Ok(Self { algorithms, rows })
    }

    /// Column names in first-appearance order.
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    /// Distinct `k` values, ascending.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.rows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, k: u64, algorithm: &str) -> Option<f64> {
        self.rows.get(&k)?.get(algorithm).copied()
    }

    /// `(k, x, y)` for every `k` where both columns hold a value.
    pub fn pairs(&self, x: &str, y: &str) -> Vec<(u64, f64, f64)> {
        self.rows
            .iter()
            .filter_map(|(&k, columns)| Some((k, *columns.get(x)?, *columns.get(y)?)))
            .collect()
    }
}

/// Head-to-head scatter of inductive against coinductive times at matching `k`.
pub fn plot_scatter(table: &ResultTable, title: &str, iterations: u32) -> Result<Chart> {
    plot_comparison(
        table,
        title,
        iterations,
        DEFAULT_X_ALGORITHM,
        DEFAULT_Y_ALGORITHM,
    )
}

/// Scatter of algorithm `x` against algorithm `y` at matching `k`. Other
/// algorithms in the table are ignored.
pub fn plot_comparison(
    table: &ResultTable,
    title: &str,
    iterations: u32,
    x: &str,
    y: &str,
) -> Result<Chart> {
    let pivot = PivotTable::from_table(table, iterations)?;
    let points: Vec<(f64, f64)> = pivot
        .pairs(x, y)
        .into_iter()
        .map(|(_, x_seconds, y_seconds)| (x_seconds, y_seconds))
        .collect();

    let dropped = pivot.len() - points.len();
    if dropped > 0 {
        tracing::debug!(
            target: LOG_TARGET,
            title,
            dropped,
            "Skipping k values missing one of the compared algorithms",
        );
    }

    let mut chart = Chart::new(title, x, y);
    chart.series.push(Series::new(None, SeriesStyle::Circle, points));

    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultRow;

    fn table(rows: &[(&str, u64, f64, u8)]) -> ResultTable {
        let rows = rows
            .iter()
            .map(|&(algorithm, k, time, success)| {
                let outcome = if success == 1 {
                    Outcome::Success
                } else {
                    Outcome::Timeout
                };
                ResultRow::new(algorithm, k, time, outcome)
            })
            .collect();
        ResultTable::new("results_test.txt", rows)
    }

    #[test]
    fn plot_splits_successes_and_timeouts() {
        let table = table(&[("A", 1, 1e9, 1), ("A", 2, 2e9, 0)]);
        let chart = plot(&table, "Runtime", DEFAULT_ITERATIONS);

        assert_eq!(chart.title, "Runtime");
        assert_eq!(chart.x_label, "k");
        assert_eq!(chart.y_label, "time (s)");
        assert_eq!(chart.y_scale, AxisScale::Log);
        assert_eq!(chart.series.len(), 2);

        let successes = chart.find_series("A successes").unwrap();
        assert_eq!(successes.style, SeriesStyle::Line);
        assert_eq!(successes.points, vec![(1.0, 1.0)]);

        let timeouts = chart.find_series("A timeouts").unwrap();
        assert_eq!(timeouts.style, SeriesStyle::Cross);
        assert_eq!(timeouts.points, vec![(2.0, 2.0)]);
    }

    #[test]
    fn plot_omits_empty_series() {
        let table = table(&[
            ("inductive", 1, 10.0, 1),
            ("inductive", 2, 20.0, 1),
            ("coinductive", 1, 10.0, 0),
            ("other", 1, 5.0, 1),
            ("other", 2, 5.0, 0),
        ]);
        let chart = plot(&table, "t", 1);

        let labels: Vec<_> = chart
            .series
            .iter()
            .map(|series| series.label.as_deref().unwrap())
            .collect();
        assert_eq!(
            labels,
            vec![
                "inductive successes",
                "coinductive timeouts",
                "other successes",
                "other timeouts",
            ]
        );
    }

    #[test]
    fn plot_of_empty_table_has_no_series() {
        let chart = plot(&table(&[]), "empty", 1);
        assert!(chart.series.is_empty());
        assert!(!chart.has_legend());
    }

    #[test]
    fn success_line_is_sorted_and_averaged_by_k() {
        let table = table(&[
            ("A", 3, 3e9, 1),
            ("A", 1, 1e9, 1),
            ("A", 3, 5e9, 1),
            ("A", 2, 2e9, 1),
        ]);
        let chart = plot(&table, "t", 1);
        assert_eq!(
            chart.find_series("A successes").unwrap().points,
            vec![(1.0, 1.0), (2.0, 2.0), (3.0, 4.0)]
        );
    }

    #[test]
    fn iterations_normalize_time() {
        let table = table(&[("A", 1, 1e9, 1)]);
        let chart = plot(&table, "t", 10_000);
        assert_eq!(chart.find_series("A successes").unwrap().points, vec![(1.0, 1e-4)]);
    }

    #[test]
    fn grouping_is_single_pass_and_ordered() {
        let table = table(&[("B", 1, 1e9, 0), ("A", 1, 2e9, 1), ("B", 2, 3e9, 1)]);
        let groups = group_by_algorithm(&table, 1);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].algorithm, "B");
        assert_eq!(groups[0].successes, vec![(2, 3.0)]);
        assert_eq!(groups[0].timeouts, vec![(1, 1.0)]);
        assert_eq!(groups[1].algorithm, "A");
        assert_eq!(groups[1].successes, vec![(1, 2.0)]);
        assert!(groups[1].timeouts.is_empty());
    }

    #[test]
    fn pivot_drops_unmatched_k() {
        let table = table(&[
            ("inductive", 1, 1000.0, 1),
            ("coinductive", 1, 2000.0, 1),
            ("inductive", 2, 500.0, 1),
        ]);
        let pivot = PivotTable::from_table(&table, 1).unwrap();

        assert_eq!(pivot.keys().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(pivot.get(1, "inductive"), Some(1e-6));
        assert_eq!(pivot.get(1, "coinductive"), Some(2e-6));
        assert_eq!(pivot.get(2, "inductive"), Some(5e-7));
        assert_eq!(pivot.get(2, "coinductive"), None);
        assert_eq!(pivot.pairs("inductive", "coinductive"), vec![(1, 1e-6, 2e-6)]);

        let chart = plot_scatter(&table, "Runtime", 1).unwrap();
        assert_eq!(chart.x_label, "inductive");
        assert_eq!(chart.y_label, "coinductive");
        assert_eq!(chart.y_scale, AxisScale::Linear);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].style, SeriesStyle::Circle);
        assert_eq!(chart.series[0].points, vec![(1e-6, 2e-6)]);
        assert!(!chart.has_legend());
    }

    #[test]
    fn pivot_collision_is_an_error() {
        let table = table(&[("inductive", 1, 100.0, 1), ("inductive", 1, 200.0, 1)]);

        match plot_scatter(&table, "t", 1).unwrap_err() {
            ReportError::ReshapeCollision { path, algorithm, k } => {
                assert_eq!(path.to_str(), Some("results_test.txt"));
                assert_eq!(algorithm, "inductive");
                assert_eq!(k, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extra_algorithms_become_ignored_columns() {
        let table = table(&[
            ("inductive", 1, 1e9, 1),
            ("naive", 1, 9e9, 0),
            ("coinductive", 1, 2e9, 1),
            ("naive", 2, 9e9, 0),
        ]);
        let pivot = PivotTable::from_table(&table, 1).unwrap();
        assert_eq!(pivot.algorithms(), &["inductive", "naive", "coinductive"]);

        let chart = plot_scatter(&table, "t", 1).unwrap();
        assert_eq!(chart.point_count(), 1);
        assert_eq!(chart.series[0].points, vec![(1.0, 2.0)]);
    }

    #[test]
    fn comparison_axes_follow_requested_algorithms() {
        let table = table(&[
            ("a", 1, 1e9, 1),
            ("b", 1, 3e9, 1),
            ("a", 2, 2e9, 1),
            ("b", 2, 4e9, 1),
        ]);
        let chart = plot_comparison(&table, "t", 1, "b", "a").unwrap();

        assert_eq!(chart.x_label, "b");
        assert_eq!(chart.y_label, "a");
        assert_eq!(chart.series[0].points, vec![(3.0, 1.0), (4.0, 2.0)]);
    }
}
