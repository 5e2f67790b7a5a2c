//! # subtyping-report
//!
//! Renders runtime charts from the result tables written by the subtyping
//! benchmarks.
//!
//! Each result table is a CSV file with the columns `algorithm`, `k`, `time`
//! (nanoseconds) and `success` (`1` for a completed run, `0` for a timeout).
//! Two chart kinds are produced:
//!
//! - a timeline of time against `k`, one line per algorithm through its
//!   successful runs, with timeouts marked by crosses on a log time axis;
//! - a head-to-head scatter of two algorithms' times at matching `k`.
//!
//! ## Usage
//! ```sh
//! generate-graphs --input-dir results --output-dir graphs
//! ```

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod paths;
pub mod render;
pub mod report;

pub use crate::config::{ChartKind, ReportConfig, ReportJob};
pub use error::{ReportError, Result};
pub use graph::{plot, plot_comparison, plot_scatter, Chart, PivotTable};
pub use models::{Outcome, ResultRow, ResultTable};
pub use paths::ReportPaths;
pub use render::{ChartRenderer, HtmlRenderer, SvgRenderer};
pub use report::generate_reports;

/// Install the stderr logger. `verbosity` raises the default level above WARN;
/// `RUST_LOG` still takes precedence.
pub fn setup_logger(verbosity: u8) -> tracing::subscriber::DefaultGuard {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
                .with_writer(std::io::stderr)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .set_default()
}
