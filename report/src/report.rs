use std::path::PathBuf;

use crate::config::{ChartKind, ReportConfig, ReportJob};
use crate::error::Result;
use crate::graph::{self, Chart};
use crate::models::ResultTable;
use crate::paths::ReportPaths;
use crate::render::ChartRenderer;

const LOG_TARGET: &str = "subtyping-report::report";

/// Build the chart described by `job` from an already loaded table.
pub fn build_chart(job: &ReportJob, table: &ResultTable) -> Result<Chart> {
    let chart = match job.kind {
        ChartKind::Timeline => graph::plot(table, &job.title, job.iterations),
        ChartKind::Comparison => graph::plot_comparison(
            table,
            &job.title,
            job.iterations,
            &job.x_algorithm,
            &job.y_algorithm,
        )?,
    };

    Ok(match job.tight_layout {
        Some(padding) => chart.with_padding(padding),
        None => chart,
    })
}

/// Load, plot and save a single job with every renderer. Returns the written files.
pub fn run_job(
    job: &ReportJob,
    paths: &ReportPaths,
    renderers: &[&dyn ChartRenderer],
) -> Result<Vec<PathBuf>> {
    let input = paths.input_file(&job.input);
    tracing::info!(
        target: LOG_TARGET,
        path = %input.display(),
        kind = ?job.kind,
        iterations = job.iterations,
        "Loading results",
    );

    let table = ResultTable::from_path(&input)?;
    let chart = build_chart(job, &table)?;

    let mut written = Vec::with_capacity(renderers.len());
    for renderer in renderers {
        let output = paths.output_file(&job.output, renderer.extension());
        renderer.render(&chart, &output)?;

        tracing::info!(
            target: LOG_TARGET,
            path = %output.display(),
            "Saved chart",
        );
        written.push(output);
    }

    Ok(written)
}

/// Run every configured job in order, stopping at the first failure.
///
/// Charts saved before a failure are left in place.
pub fn generate_reports(
    config: &ReportConfig,
    paths: &ReportPaths,
    renderers: &[&dyn ChartRenderer],
) -> Result<Vec<PathBuf>> {
    config.validate()?;
    paths.create_output_dir()?;

    let mut written = Vec::new();
    for job in &config.jobs {
        written.extend(run_job(job, paths, renderers)?);
    }

    tracing::info!(
        target: LOG_TARGET,
        jobs = config.jobs.len(),
        files = written.len(),
        "Report complete",
    );

    Ok(written)
}
