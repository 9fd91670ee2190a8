//! Console reporter: human-readable output with ASCII tables, styled after
//! a benchmark-summary layout.

use std::fmt::Write;

use anyhow::Result;

use crate::capture::{AggregatedStep, JourneyResult, RuntimeBenchmark};
use crate::compare::{ComparisonResult, PercentileDiff, ScalarDiff};
use crate::stats::AggregatedMetric;

use super::Report;

pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(report: &Report) -> Result<String> {
        match report {
            Report::Benchmark(b) => Self::format_benchmark(b),
            Report::Journey(j) => Self::format_journey(j),
            Report::Comparison(c) => Self::format_comparison(c),
        }
    }

    fn format_benchmark(benchmark: &RuntimeBenchmark) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                    RUNTIME BENCHMARK                          ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "URL:       {}", benchmark.meta.url)?;
        writeln!(output, "Runs:      {}", benchmark.meta.runs)?;
        writeln!(output, "Captured:  {}", benchmark.meta.captured_at)?;
        writeln!(output)?;

        writeln!(output, "  ┌─────────┬─────────┬─────────┬─────────┬─────────┐")?;
        writeln!(output, "  │ Metric  │   Min   │  Median │   P75   │   P95   │")?;
        writeln!(output, "  ├─────────┼─────────┼─────────┼─────────┼─────────┤")?;
        if let Some(lcp) = &benchmark.cwv.lcp {
            Self::format_metric_row(&mut output, "LCP", lcp, "ms")?;
        }
        if let Some(fcp) = &benchmark.cwv.fcp {
            Self::format_metric_row(&mut output, "FCP", fcp, "ms")?;
        }
        Self::format_metric_row(&mut output, "CLS", &benchmark.cwv.cls, "")?;
        if let Some(ttfb) = &benchmark.cwv.ttfb {
            Self::format_metric_row(&mut output, "TTFB", ttfb, "ms")?;
        }
        Self::format_metric_row(&mut output, "TBT", &benchmark.extended.tbt, "ms")?;
        writeln!(output, "  └─────────┴─────────┴─────────┴─────────┴─────────┘")?;
        writeln!(output)?;

        writeln!(
            output,
            "Resources: {:.0} requests, {:.0} bytes transferred",
            benchmark.resources.total_count.median, benchmark.resources.total_transfer.median
        )?;
        writeln!(
            output,
            "JS:        {:.0} long tasks, {:.1}ms blocking, {:.0} bytes heap",
            benchmark.javascript.long_tasks.median,
            benchmark.javascript.main_thread_blocking.median,
            benchmark.javascript.heap_size.median
        )?;
        writeln!(output, "SSR:       {:?}", benchmark.ssr.hydration_framework)?;
        writeln!(output)?;

        Ok(output)
    }

    fn format_journey(journey: &JourneyResult) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                    JOURNEY RESULT                             ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Journey:      {}", journey.name)?;
        writeln!(output, "Description:  {}", journey.description)?;
        writeln!(output, "Base URL:     {}", journey.base_url)?;
        writeln!(output, "Repetitions:  {}", journey.repetitions)?;
        writeln!(output)?;

        writeln!(output, "Steps:")?;
        for step in &journey.steps {
            Self::format_step(&mut output, step)?;
        }
        writeln!(output)?;

        writeln!(output, "Cumulative:")?;
        writeln!(
            output,
            "  Total duration:   median {:.1}ms",
            journey.cumulative.total_duration.median
        )?;
        writeln!(
            output,
            "  Total transfer:   median {:.0} bytes",
            journey.cumulative.total_transferred.median
        )?;
        writeln!(
            output,
            "  Cache hit rate:   median {:.1}%",
            journey.cumulative.cache_hit_rate.median
        )?;
        writeln!(
            output,
            "  Memory high water: median {:.0} bytes",
            journey.cumulative.memory_high_water.median
        )?;
        writeln!(output)?;

        Ok(output)
    }

    fn format_step(output: &mut String, step: &AggregatedStep) -> Result<()> {
        writeln!(
            output,
            "  • {} [{:?}] — median {:.1}ms",
            step.name, step.navigation_type, step.duration.median
        )?;
        if let Some(cwv) = &step.cwv {
            if let Some(lcp) = &cwv.lcp {
                writeln!(output, "      LCP median {:.1}ms", lcp.median)?;
            }
            writeln!(output, "      CLS median {:.4}", cwv.cls.median)?;
        }
        Ok(())
    }

    fn format_comparison(comparison: &ComparisonResult) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                    COMPARISON                                 ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        match comparison {
            ComparisonResult::Benchmark(b) => {
                if let Some(lcp) = &b.cwv.lcp {
                    Self::format_percentile_diff(&mut output, "LCP", lcp)?;
                }
                Self::format_percentile_diff(&mut output, "CLS", &b.cwv.cls)?;
                Self::format_percentile_diff(&mut output, "TBT", &b.extended.tbt)?;
                Self::format_percentile_diff(
                    &mut output,
                    "Total transfer",
                    &b.resources.total_transfer,
                )?;
                Self::format_percentile_diff(&mut output, "Heap size", &b.javascript.heap_size)?;
            }
            ComparisonResult::Static(s) => {
                Self::format_scalar_diff(&mut output, "Total bundle (raw)", &s.bundles.total.raw)?;
                Self::format_scalar_diff(&mut output, "JS bundle (raw)", &s.bundles.js.raw)?;
                Self::format_scalar_diff(&mut output, "CSS bundle (raw)", &s.bundles.css.raw)?;
                Self::format_scalar_diff(&mut output, "Routes", &s.routes)?;
            }
            ComparisonResult::Journey => {
                writeln!(output, "Journey comparison is not computed by this engine.")?;
            }
        }
        writeln!(output)?;

        Ok(output)
    }

    fn format_metric_row(
        output: &mut String,
        name: &str,
        metric: &AggregatedMetric,
        unit: &str,
    ) -> Result<()> {
        let fmt = |v: f64| -> String {
            if unit == "ms" {
                format!("{:.0}", v)
            } else if v < 1.0 {
                format!("{:.4}", v)
            } else {
                format!("{:.2}", v)
            }
        };
        writeln!(
            output,
            "  │ {:^7} │ {:>7} │ {:>7} │ {:>7} │ {:>7} │",
            name,
            fmt(metric.min),
            fmt(metric.median),
            fmt(metric.p75),
            fmt(metric.p95)
        )?;
        Ok(())
    }

    fn format_percentile_diff(output: &mut String, name: &str, diff: &PercentileDiff) -> Result<()> {
        let symbol = if diff.median.improved { "▲" } else { "▼" };
        writeln!(
            output,
            "  {:<16} median {:+.1}% ({}) p75 {:+.1}% p95 {:+.1}%",
            name,
            diff.median.percent_diff,
            symbol,
            diff.p75.percent_diff,
            diff.p95.percent_diff
        )?;
        Ok(())
    }

    fn format_scalar_diff(output: &mut String, name: &str, diff: &ScalarDiff) -> Result<()> {
        let symbol = if diff.improved { "▲" } else { "▼" };
        writeln!(
            output,
            "  {:<20} {:+.1}% ({})",
            name, diff.percent_diff, symbol
        )?;
        Ok(())
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
    fn benchmark_format_contains_url_and_table() {
        let output = ConsoleReporter::format(&Report::Benchmark(&sample_benchmark())).unwrap();
        assert!(output.contains("example.com"));
        assert!(output.contains("LCP"));
        assert!(output.contains("CLS"));
    }

    #[test]
    fn comparison_format_of_benchmark_shows_direction_arrows() {
        let baseline = sample_benchmark();
        let current = sample_benchmark();
        let comparison =
            ComparisonResult::Benchmark(crate::compare::compare_benchmarks(&baseline, &current));
        let output = ConsoleReporter::format(&Report::Comparison(&comparison)).unwrap();
        assert!(output.contains("LCP"));
    }

    #[test]
    fn journey_comparison_reports_out_of_scope() {
        let output =
            ConsoleReporter::format(&Report::Comparison(&ComparisonResult::Journey)).unwrap();
        assert!(output.contains("not computed"));
    }
}
