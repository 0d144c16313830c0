//! Indicator Join - command line entry point
//!
//! Runs one pipeline end to end and prints what it wrote.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use indicator_join::logging::init_logging;
use indicator_join::{Pipeline, PipelineConfig, Preset, RunReport};

#[derive(Parser, Debug)]
#[command(name = "indicator_join", version, about)]
struct Cli {
    /// Built-in pipeline to run
    #[arg(short, long, value_enum, default_value_t = Preset::Level1)]
    preset: Preset,

    /// TOML pipeline definition, used instead of the preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the target year
    #[arg(short, long)]
    year: Option<i64>,

    /// Override the output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading pipeline definition {}", path.display()))?,
        None => PipelineConfig::preset(cli.preset),
    };
    if let Some(year) = cli.year {
        config.year = year;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.no_charts {
        config.charts.clear();
    }

    let report = Pipeline::new(config)
        .run()
        .context("pipeline run failed")?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!(
        "Wrote {} rows x {} columns for {} to {}",
        report.output.rows,
        report.output.columns,
        report.year,
        report.output.path.display()
    );

    for chart in &report.charts {
        println!("Chart written to {}", chart.display());
    }
}
