//! JSON reporter: serializes any [`Report`] via the types' own `Serialize`
//! impls, so the wire format always matches the capture file format.

use anyhow::Result;

use super::Report;

pub struct JsonReporter;

impl JsonReporter {
    pub fn format(report: &Report, pretty: bool) -> Result<String> {
        let value = match report {
            Report::Benchmark(b) => serde_json::to_value(b)?,
            Report::Journey(j) => serde_json::to_value(j)?,
            Report::Comparison(c) => serde_json::to_value(c)?,
        };

        let mut text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{
        AggregatedCwv, AggregatedExtended, AggregatedJavascript, AggregatedResources,
        AggregatedSsr, DeviceConfig, HydrationFramework, RunMetadata, RuntimeBenchmark,
    };
    use crate::stats::aggregate;

    fn sample() -> RuntimeBenchmark {
        RuntimeBenchmark {
            meta: RunMetadata {
                url: "https://example.com".to_string(),
                captured_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
                runs: 1,
                device: DeviceConfig::default(),
                network: None,
            },
            cwv: AggregatedCwv {
                lcp: None,
                fcp: None,
                cls: aggregate(&[0.0]),
                ttfb: None,
            },
            extended: AggregatedExtended {
                tbt: aggregate(&[0.0]),
                dom_content_loaded: aggregate(&[0.0]),
                load: aggregate(&[0.0]),
            },
            resources: AggregatedResources {
                total_transfer: aggregate(&[0.0]),
                total_count: aggregate(&[0.0]),
                by_type: Default::default(),
            },
            javascript: AggregatedJavascript {
                main_thread_blocking: aggregate(&[0.0]),
                long_tasks: aggregate(&[0.0]),
                heap_size: aggregate(&[0.0]),
            },
            ssr: AggregatedSsr {
                hydration_framework: HydrationFramework::None,
                rsc_payload_size: None,
                rsc_chunk_count: None,
                next_data_size: None,
                react_router_data_size: None,
            },
            runs: vec![],
        }
    }

    #[test]
    fn compact_json_is_single_line() {
        let benchmark = sample();
        let output = JsonReporter::format(&Report::Benchmark(&benchmark), false).unwrap();
        assert_eq!(output.trim().lines().count(), 1);
    }

    #[test]
    fn pretty_json_spans_multiple_lines() {
        let benchmark = sample();
        let output = JsonReporter::format(&Report::Benchmark(&benchmark), true).unwrap();
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn round_trips_lcp_absence() {
        let benchmark = sample();
        let output = JsonReporter::format(&Report::Benchmark(&benchmark), false).unwrap();
        assert!(!output.contains("\"lcp\""));
    }
}
