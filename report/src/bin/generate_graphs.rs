use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use subtyping_report::{
    generate_reports, setup_logger, ChartRenderer, HtmlRenderer, ReportConfig, ReportPaths,
    SvgRenderer,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the `results_*.txt` tables.
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Directory the charts are written to. Created if missing.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// TOML job manifest replacing the built-in report.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write interactive HTML charts.
    #[arg(long)]
    html: bool,

    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = setup_logger(args.verbose);

    let config = match &args.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("failed to load report manifest {}", path.display()))?,
        None => ReportConfig::default(),
    };
    let paths = ReportPaths::new(args.input_dir, args.output_dir);

    let svg = SvgRenderer::default();
    let mut renderers: Vec<&dyn ChartRenderer> = vec![&svg];
    if args.html {
        renderers.push(&HtmlRenderer);
    }

    let written =
        generate_reports(&config, &paths, &renderers).context("report generation failed")?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
