//! CLI entry point: runs benchmarks against a configured target and
//! compares capture files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use vitalscope::capture;
use vitalscope::compare;
use vitalscope::config::Config;
use vitalscope::driver::ChromiumoxideDriver;
use vitalscope::engine::benchmark;
use vitalscope::reporter::{OutputFormat, Report, Reporter};

#[derive(Parser)]
#[command(name = "vitalscope", version, about = "Headless-browser web performance measurement and comparison toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the runtime benchmark engine against a configured target.
    Benchmark {
        /// Path to a TOML run configuration.
        #[arg(long)]
        config: PathBuf,
        #[arg(long, value_enum, default_value = "console")]
        format: Format,
        /// Write the report to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare two capture files (benchmark, journey, or static).
    Compare {
        baseline: PathBuf,
        current: PathBuf,
        #[arg(long, value_enum, default_value = "console")]
        format: Format,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    JsonPretty,
    Console,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
            Format::Console => OutputFormat::Console,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Benchmark {
            config,
            format,
            output,
        } => run_benchmark(config, format.into(), output).await,
        Command::Compare {
            baseline,
            current,
            format,
            output,
        } => run_compare(baseline, current, format.into(), output),
    }
}

async fn run_benchmark(
    config_path: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = Config::from_file(&config_path)
        .with_context(|| format!("failed to load config: {}", config_path.display()))?;

    let driver = ChromiumoxideDriver::launch()
        .await
        .context("failed to launch browser")?;

    let result = benchmark::run(
        &driver,
        &config.target.base_url,
        config.target.runs,
        config.device.into(),
        config.network.to_network_config(),
    )
    .await
    .context("benchmark run failed")?;

    driver.close().await.context("failed to close browser")?;

    let reporter = Reporter::new(format);
    let report = Report::Benchmark(&result);
    match output {
        Some(path) => reporter.write_to_file(&report, path)?,
        None => reporter.report(&report)?,
    }
    Ok(())
}

fn run_compare(
    baseline_path: PathBuf,
    current_path: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let baseline = capture::load(&baseline_path)
        .with_context(|| format!("failed to load {}", baseline_path.display()))?;
    let current = capture::load(&current_path)
        .with_context(|| format!("failed to load {}", current_path.display()))?;

    let result = compare::compare(&baseline.data, &current.data)
        .context("comparison failed")?;

    let reporter = Reporter::new(format);
    let report = Report::Comparison(&result);
    match output {
        Some(path) => reporter.write_to_file(&report, path)?,
        None => reporter.report(&report)?,
    }
    Ok(())
}
