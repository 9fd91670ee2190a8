//! Result reporting: renders typed capture and comparison results as JSON
//! or human-readable console text. Rendering beyond these two formats is an
//! external collaborator's job, not this crate's.

mod console;
mod json;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;

use crate::capture::{JourneyResult, RuntimeBenchmark};
use crate::compare::ComparisonResult;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Anything the reporter knows how to render.
pub enum Report<'a> {
    Benchmark(&'a RuntimeBenchmark),
    Journey(&'a JourneyResult),
    Comparison(&'a ComparisonResult),
}

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    Console,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Console
    }
}

/// Renders a [`Report`] in a configured [`OutputFormat`].
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn report(&self, report: &Report) -> Result<()> {
        let output = self.format_report(report)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, report: &Report, path: P) -> Result<()> {
        let output = self.format_report(report)?;
        fs::write(path, output)?;
        Ok(())
    }

    pub fn format_report(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{
        AggregatedCwv, AggregatedExtended, AggregatedJavascript, AggregatedResources,
        AggregatedSsr, DeviceConfig, HydrationFramework, RunMetadata,
    };
    use crate::stats::aggregate;

    fn sample_benchmark() -> RuntimeBenchmark {
        RuntimeBenchmark {
            meta: RunMetadata {
                url: "https://example.com".to_string(),
                captured_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
                runs: 3,
                device: DeviceConfig::default(),
                network: None,
            },
            cwv: AggregatedCwv {
                lcp: Some(aggregate(&[1200.0, 1300.0, 1400.0])),
                fcp: Some(aggregate(&[500.0, 550.0, 600.0])),
                cls: aggregate(&[0.01, 0.02, 0.01]),
                ttfb: Some(aggregate(&[100.0, 110.0, 120.0])),
            },
            extended: AggregatedExtended {
                tbt: aggregate(&[10.0, 20.0, 30.0]),
                dom_content_loaded: aggregate(&[800.0, 850.0, 900.0]),
                load: aggregate(&[1500.0, 1600.0, 1700.0]),
            },
            resources: AggregatedResources {
                total_transfer: aggregate(&[100000.0, 110000.0, 120000.0]),
                total_count: aggregate(&[20.0, 22.0, 24.0]),
                by_type: Default::default(),
            },
            javascript: AggregatedJavascript {
                main_thread_blocking: aggregate(&[10.0, 20.0, 30.0]),
                long_tasks: aggregate(&[1.0, 2.0, 1.0]),
                heap_size: aggregate(&[5_000_000.0, 5_200_000.0, 5_100_000.0]),
            },
            ssr: AggregatedSsr {
                hydration_framework: HydrationFramework::Next,
                rsc_payload_size: None,
                rsc_chunk_count: None,
                next_data_size: None,
                react_router_data_size: None,
            },
            runs: vec![],
        }
    }

    #[test]
    fn json_report_contains_url() {
        let benchmark = sample_benchmark();
        let reporter = Reporter::new(OutputFormat::Json);
        let output = reporter
            .format_report(&Report::Benchmark(&benchmark))
            .unwrap();
        assert!(output.contains("example.com"));
    }

    #[test]
    fn console_report_contains_url_and_metrics() {
        let benchmark = sample_benchmark();
        let reporter = Reporter::new(OutputFormat::Console);
        let output = reporter
            .format_report(&Report::Benchmark(&benchmark))
            .unwrap();
        assert!(output.contains("example.com"));
        assert!(output.contains("LCP"));
    }

    #[test]
    fn default_format_is_console() {
        assert_eq!(Reporter::default().format, OutputFormat::Console);
    }
}
