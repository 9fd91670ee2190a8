//! Benchmark engine: repeats the single-run engine N times against one URL
//! and aggregates the results into a [`RuntimeBenchmark`].
//!
//! Replaces `runner::BenchmarkRunner`'s scenario/step model with the
//! N-repeated-single-run model of the runtime measurement engine.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::capture::{
    AggregatedCwv, AggregatedExtended, AggregatedJavascript, AggregatedResources, AggregatedSsr,
    DeviceConfig, HydrationFramework, NetworkConfig, RawRunRecord, ResourceType,
    ResourceTypeTotals, RunMetadata, RuntimeBenchmark,
};
use crate::driver::BrowserDriver;
use crate::error::BrowserError;
use crate::stats::{aggregate, aggregate_nullable};

use super::single_run;

/// Launches one browser tab per run against `url`, aggregating `runs`
/// single-run measurements into a [`RuntimeBenchmark`].
///
/// On any run's error the benchmark propagates the error immediately; it
/// does not attempt partial aggregation.
#[instrument(skip(driver, device, network))]
pub async fn run(
    driver: &dyn BrowserDriver,
    url: &str,
    runs: u32,
    device: DeviceConfig,
    network: Option<NetworkConfig>,
) -> Result<RuntimeBenchmark, BrowserError> {
    if runs < 1 {
        return Err(BrowserError::InvalidArgument(
            "benchmark run count must be >= 1".to_string(),
        ));
    }

    info!("running benchmark: {} ({} runs)", url, runs);

    let mut records = Vec::with_capacity(runs as usize);
    for i in 0..runs {
        let tab = driver.new_tab(&device).await?;
        let record = single_run::run(tab.as_ref(), url, network.as_ref()).await;
        if let Err(e) = tab.close().await {
            warn!("failed to close page after run {}: {}", i, e);
        }
        records.push(record?);
    }

    Ok(aggregate_records(url, device, network, records))
}

fn aggregate_records(
    url: &str,
    device: DeviceConfig,
    network: Option<NetworkConfig>,
    runs: Vec<RawRunRecord>,
) -> RuntimeBenchmark {
    let lcp = aggregate_nullable(&runs.iter().map(|r| r.cwv.lcp).collect::<Vec<_>>());
    let fcp = aggregate_nullable(&runs.iter().map(|r| r.cwv.fcp).collect::<Vec<_>>());
    let cls = aggregate(&runs.iter().map(|r| r.cwv.cls).collect::<Vec<_>>());
    let ttfb = aggregate_nullable(&runs.iter().map(|r| r.cwv.ttfb).collect::<Vec<_>>());

    let tbt = aggregate(
        &runs
            .iter()
            .map(|r| r.blocking.total_blocking_time)
            .collect::<Vec<_>>(),
    );
    let dom_content_loaded = aggregate(
        &runs
            .iter()
            .map(|r| r.timing.dom_content_loaded)
            .collect::<Vec<_>>(),
    );
    let load = aggregate(&runs.iter().map(|r| r.timing.load).collect::<Vec<_>>());

    let total_transfer = aggregate(
        &runs
            .iter()
            .map(|r| r.resources.total_transfer as f64)
            .collect::<Vec<_>>(),
    );
    let total_count = aggregate(
        &runs
            .iter()
            .map(|r| r.resources.total_count as f64)
            .collect::<Vec<_>>(),
    );
    let by_type = aggregate_by_type(&runs);

    let main_thread_blocking = aggregate(
        &runs
            .iter()
            .map(|r| r.blocking.total_blocking_time)
            .collect::<Vec<_>>(),
    );
    let long_tasks = aggregate(
        &runs
            .iter()
            .map(|r| r.blocking.long_task_count as f64)
            .collect::<Vec<_>>(),
    );
    let heap_size = aggregate(&runs.iter().map(|r| r.heap_bytes as f64).collect::<Vec<_>>());

    let hydration_framework = runs
        .first()
        .map(|r| r.ssr.hydration_framework)
        .unwrap_or(HydrationFramework::None);
    let rsc_payload_size = aggregate_if_any_nonzero(&runs, |r| r.ssr.rsc_payload_size as f64);
    let rsc_chunk_count = aggregate_if_any_nonzero(&runs, |r| r.ssr.rsc_chunk_count as f64);
    let next_data_size = aggregate_if_any_nonzero(&runs, |r| r.ssr.next_data_size as f64);
    let react_router_data_size =
        aggregate_if_any_nonzero(&runs, |r| r.ssr.react_router_data_size as f64);

    RuntimeBenchmark {
        meta: RunMetadata {
            url: url.to_string(),
            captured_at: Utc::now(),
            runs: runs.len() as u32,
            device,
            network,
        },
        cwv: AggregatedCwv {
            lcp,
            fcp,
            cls,
            ttfb,
        },
        extended: AggregatedExtended {
            tbt,
            dom_content_loaded,
            load,
        },
        resources: AggregatedResources {
            total_transfer,
            total_count,
            by_type,
        },
        javascript: AggregatedJavascript {
            main_thread_blocking,
            long_tasks,
            heap_size,
        },
        ssr: AggregatedSsr {
            hydration_framework,
            rsc_payload_size,
            rsc_chunk_count,
            next_data_size,
            react_router_data_size,
        },
        runs,
    }
}

fn aggregate_by_type(
    runs: &[RawRunRecord],
) -> BTreeMap<ResourceType, ResourceTypeTotals> {
    let mut totals: BTreeMap<ResourceType, ResourceTypeTotals> = BTreeMap::new();
    let mut seen_any: BTreeMap<ResourceType, bool> = BTreeMap::new();

    for run in runs {
        for (ty, bucket) in &run.resources.by_type {
            let entry = totals.entry(*ty).or_default();
            entry.count += bucket.count;
            entry.transfer += bucket.transfer;
            entry.decoded += bucket.decoded;
            if bucket.count > 0 {
                seen_any.insert(*ty, true);
            }
        }
    }

    totals
        .into_iter()
        .filter(|(ty, _)| *seen_any.get(ty).unwrap_or(&false))
        .collect()
}

fn aggregate_if_any_nonzero(
    runs: &[RawRunRecord],
    extract: impl Fn(&RawRunRecord) -> f64,
) -> Option<crate::stats::AggregatedMetric> {
    let values: Vec<f64> = runs.iter().map(extract).collect();
    if values.iter().any(|v| *v != 0.0) {
        Some(aggregate(&values))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{BlockingRecord, CwvRecord, ResourcesRecord, SsrRecord, TimingRecord};

    fn sample_run(lcp: Option<f64>, rsc: u64) -> RawRunRecord {
        RawRunRecord {
            cwv: CwvRecord {
                lcp,
                fcp: Some(800.0),
                cls: 0.01,
                ttfb: Some(120.0),
            },
            resources: ResourcesRecord {
                total_transfer: 1000,
                total_count: 5,
                from_cache: 1,
                by_type: BTreeMap::new(),
            },
            timing: TimingRecord {
                dom_content_loaded: 500.0,
                load: 700.0,
            },
            blocking: BlockingRecord {
                total_blocking_time: 30.0,
                long_task_count: 1,
            },
            heap_bytes: 1_000_000,
            ssr: SsrRecord {
                rsc_payload_size: rsc,
                ..SsrRecord::default()
            },
        }
    }

    struct NullDriver;
    #[async_trait::async_trait]
    impl crate::driver::BrowserDriver for NullDriver {
        async fn new_tab(
            &self,
            _device: &DeviceConfig,
        ) -> Result<Box<dyn crate::driver::Tab>, BrowserError> {
            unimplemented!()
        }
        async fn close(self: Box<Self>) -> Result<(), BrowserError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn zero_runs_rejected_with_typed_error() {
        let driver = NullDriver;
        let err = run(&driver, "https://example.com", 0, DeviceConfig::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn ssr_fields_omitted_when_all_zero() {
        let runs = vec![sample_run(Some(1000.0), 0), sample_run(Some(1200.0), 0)];
        let benchmark = aggregate_records("https://example.com", DeviceConfig::default(), None, runs);
        assert!(benchmark.ssr.rsc_payload_size.is_none());
    }

    #[test]
    fn ssr_fields_present_when_any_nonzero() {
        let runs = vec![sample_run(Some(1000.0), 0), sample_run(Some(1200.0), 512)];
        let benchmark = aggregate_records("https://example.com", DeviceConfig::default(), None, runs);
        assert!(benchmark.ssr.rsc_payload_size.is_some());
    }

    #[test]
    fn nullable_lcp_aggregates_only_present_runs() {
        let runs = vec![sample_run(None, 0), sample_run(Some(1500.0), 0)];
        let benchmark = aggregate_records("https://example.com", DeviceConfig::default(), None, runs);
        let lcp = benchmark.cwv.lcp.unwrap();
        assert_eq!(lcp.values, vec![1500.0]);
    }
}
