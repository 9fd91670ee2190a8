//! Journey runner: executes a named sequence of steps for M repetitions,
//! aggregating both per-step and cumulative metrics across runs.

use std::time::Instant;

use chrono::Utc;
use futures::future::BoxFuture;
use tracing::{info, instrument, warn};

use crate::capture::{
    AggregatedStep, AggregatedStepCwv, CumulativeMetrics, DeviceConfig, JourneyResult,
    NavigationType, StepCaptureData, StepRecord,
};
use crate::driver::{BrowserDriver, Tab};
use crate::error::BrowserError;
use crate::stats::{aggregate, aggregate_nullable};

use super::capture::CaptureScope;
use super::navigation::NavigationTracker;

pub type StepFuture<'a> = BoxFuture<'a, Result<(), BrowserError>>;
type StepHandler =
    Box<dyn for<'a> Fn(&'a dyn Tab, &'a mut CaptureScope<'a>) -> StepFuture<'a> + Send + Sync>;

/// Registers steps during journey construction. Handed to the builder
/// closure passed to [`JourneyDefinition::new`].
#[derive(Default)]
pub struct JourneyCtx {
    steps: Vec<(String, StepHandler)>,
}

impl JourneyCtx {
    pub fn step<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: for<'a> Fn(&'a dyn Tab, &'a mut CaptureScope<'a>) -> StepFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.steps.push((name.into(), Box::new(handler)));
    }
}

/// A named, reusable sequence of browser interactions. Construction is
/// synchronous: the builder closure registers steps by calling
/// [`JourneyCtx::step`]; step bodies are what run asynchronously.
pub struct JourneyDefinition {
    pub name: String,
    pub description: String,
    build: Box<dyn Fn(&mut JourneyCtx) + Send + Sync>,
}

impl JourneyDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        build: impl Fn(&mut JourneyCtx) + Send + Sync + 'static,
    ) -> Self {
        JourneyDefinition {
            name: name.into(),
            description: description.into(),
            build: Box::new(build),
        }
    }

    fn steps(&self) -> Vec<(String, StepHandler)> {
        let mut ctx = JourneyCtx::default();
        (self.build)(&mut ctx);
        ctx.steps
    }
}

/// Runs `journey` for `repetitions` independent repetitions, each against a
/// fresh page and a fresh [`NavigationTracker`], and aggregates the result.
#[instrument(skip(driver, journey, device))]
pub async fn run(
    driver: &dyn BrowserDriver,
    journey: &JourneyDefinition,
    base_url: &str,
    device: DeviceConfig,
    repetitions: u32,
) -> Result<JourneyResult, BrowserError> {
    if repetitions < 1 {
        return Err(BrowserError::InvalidArgument(
            "journey repetition count must be >= 1".to_string(),
        ));
    }

    info!(
        "running journey '{}' against {} ({} repetitions)",
        journey.name, base_url, repetitions
    );

    let steps = journey.steps();
    let mut raw_runs: Vec<Vec<StepRecord>> = Vec::with_capacity(repetitions as usize);
    let mut cumulative_samples: Vec<(f64, f64, f64, f64, f64)> =
        Vec::with_capacity(repetitions as usize);

    for i in 0..repetitions {
        let tab = driver.new_tab(&device).await?;
        let result = run_repetition(tab.as_ref(), &steps, base_url).await;
        if let Err(e) = tab.close().await {
            warn!("failed to close page after repetition {}: {}", i, e);
        }
        let step_records = result?;
        cumulative_samples.push(cumulative_sample(&step_records));
        raw_runs.push(step_records);
    }

    let cumulative = CumulativeMetrics {
        total_duration: aggregate(&cumulative_samples.iter().map(|s| s.0).collect::<Vec<_>>()),
        total_transferred: aggregate(&cumulative_samples.iter().map(|s| s.1).collect::<Vec<_>>()),
        total_cls: aggregate(&cumulative_samples.iter().map(|s| s.2).collect::<Vec<_>>()),
        memory_high_water: aggregate(&cumulative_samples.iter().map(|s| s.3).collect::<Vec<_>>()),
        cache_hit_rate: aggregate(&cumulative_samples.iter().map(|s| s.4).collect::<Vec<_>>()),
    };

    let aggregated_steps = aggregate_steps(&steps, &raw_runs);

    Ok(JourneyResult {
        name: journey.name.clone(),
        description: journey.description.clone(),
        base_url: base_url.to_string(),
        captured_at: Utc::now(),
        repetitions,
        steps: aggregated_steps,
        cumulative,
        raw_runs,
    })
}

async fn run_repetition(
    tab: &dyn Tab,
    steps: &[(String, StepHandler)],
    base_url: &str,
) -> Result<Vec<StepRecord>, BrowserError> {
    tab.goto(base_url, crate::driver::LoadCondition::NetworkIdle)
        .await?;

    let mut tracker = NavigationTracker::new();
    let clock = Instant::now();
    let mut records = Vec::with_capacity(steps.len());

    for (name, handler) in steps {
        let mut data = StepCaptureData::default();
        let start_time = clock.elapsed().as_secs_f64() * 1000.0;
        {
            let mut scope = CaptureScope::new(tab, &mut tracker, &mut data);
            handler(tab, &mut scope).await?;
        }
        let end_time = clock.elapsed().as_secs_f64() * 1000.0;
        tracker.finalize_step(tab).await?;

        records.push(StepRecord {
            name: name.clone(),
            start_time,
            end_time,
            data,
        });
    }

    Ok(records)
}

/// (total_duration, total_transferred, total_cls, memory_high_water, cache_hit_rate)
fn cumulative_sample(records: &[StepRecord]) -> (f64, f64, f64, f64, f64) {
    let total_duration: f64 = records.iter().map(|r| r.end_time - r.start_time).sum();

    let total_transferred: f64 = records
        .iter()
        .filter_map(|r| r.data.resources.as_ref())
        .map(|res| res.total_transfer as f64)
        .sum();

    let total_cls: f64 = records
        .iter()
        .filter_map(|r| r.data.cwv.as_ref())
        .map(|cwv| cwv.cls)
        .sum();

    let memory_high_water = records
        .iter()
        .filter_map(|r| r.data.memory)
        .map(|m| m as f64)
        .fold(0.0_f64, f64::max);

    let total_from_cache: u64 = records
        .iter()
        .filter_map(|r| r.data.resources.as_ref())
        .map(|res| res.from_cache)
        .sum();
    let total_loaded: u64 = records
        .iter()
        .filter_map(|r| r.data.resources.as_ref())
        .map(|res| res.total_count)
        .sum();
    let cache_hit_rate = if total_loaded == 0 {
        0.0
    } else {
        (total_from_cache as f64 / total_loaded as f64) * 100.0
    };

    (
        total_duration,
        total_transferred,
        total_cls,
        memory_high_water,
        cache_hit_rate,
    )
}

fn aggregate_steps(
    steps: &[(String, StepHandler)],
    raw_runs: &[Vec<StepRecord>],
) -> Vec<AggregatedStep> {
    steps
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            let per_rep: Vec<&StepRecord> = raw_runs
                .iter()
                .filter_map(|run| run.get(i))
                .collect();

            let duration = aggregate(
                &per_rep
                    .iter()
                    .map(|r| r.end_time - r.start_time)
                    .collect::<Vec<_>>(),
            );

            let cwv = if per_rep.iter().any(|r| r.data.cwv.is_some()) {
                let lcp = aggregate_nullable(
                    &per_rep
                        .iter()
                        .map(|r| r.data.cwv.as_ref().and_then(|c| c.lcp))
                        .collect::<Vec<_>>(),
                );
                let cls = aggregate(
                    &per_rep
                        .iter()
                        .map(|r| r.data.cwv.as_ref().map(|c| c.cls).unwrap_or(0.0))
                        .collect::<Vec<_>>(),
                );
                Some(AggregatedStepCwv { lcp, cls })
            } else {
                None
            };

            let navigation_type = per_rep
                .iter()
                .find_map(|r| r.data.navigation.as_ref().map(|n| n.nav_type))
                .unwrap_or(NavigationType::None);

            AggregatedStep {
                name: name.clone(),
                duration,
                cwv,
                navigation_type,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        name: &str,
        start: f64,
        end: f64,
        cls: Option<f64>,
        transfer: u64,
        from_cache: u64,
        total_count: u64,
    ) -> StepRecord {
        let mut data = StepCaptureData::default();
        if let Some(cls) = cls {
            data.cwv = Some(crate::capture::CwvRecord {
                lcp: None,
                fcp: None,
                cls,
                ttfb: None,
            });
        }
        data.resources = Some(crate::capture::ResourcesRecord {
            total_transfer: transfer,
            total_count,
            from_cache,
            by_type: Default::default(),
        });
        StepRecord {
            name: name.to_string(),
            start_time: start,
            end_time: end,
            data,
        }
    }

    struct NullDriver;
    #[async_trait::async_trait]
    impl BrowserDriver for NullDriver {
        async fn new_tab(&self, _device: &DeviceConfig) -> Result<Box<dyn Tab>, BrowserError> {
            unimplemented!()
        }
        async fn close(self: Box<Self>) -> Result<(), BrowserError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn zero_repetitions_rejected_with_typed_error() {
        let driver = NullDriver;
        let journey = JourneyDefinition::new("noop", "does nothing", |_ctx| {});
        let err = run(&driver, &journey, "https://example.com", DeviceConfig::default(), 0)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn cumulative_sample_computes_cache_hit_rate() {
        let records = vec![
            record("load", 0.0, 100.0, Some(0.02), 1000, 4, 5),
            record("click", 100.0, 150.0, None, 0, 0, 0),
        ];
        let (duration, transferred, cls, _mem, hit_rate) = cumulative_sample(&records);
        assert_eq!(duration, 150.0);
        assert_eq!(transferred, 1000.0);
        assert_eq!(cls, 0.02);
        assert_eq!(hit_rate, 80.0);
    }

    #[test]
    fn cumulative_sample_zero_loaded_yields_zero_hit_rate() {
        let records = vec![record("load", 0.0, 10.0, None, 0, 0, 0)];
        let (_, _, _, _, hit_rate) = cumulative_sample(&records);
        assert_eq!(hit_rate, 0.0);
    }

    #[test]
    fn aggregate_steps_omits_cwv_when_never_captured() {
        let steps: Vec<(String, StepHandler)> = vec![(
            "load".to_string(),
            Box::new(|_tab, _scope| Box::pin(async { Ok(()) })) as StepHandler,
        )];
        let runs = vec![vec![record("load", 0.0, 100.0, None, 0, 0, 0)]];
        let aggregated = aggregate_steps(&steps, &runs);
        assert!(aggregated[0].cwv.is_none());
    }

    #[test]
    fn aggregate_steps_includes_cwv_when_any_run_captured() {
        let steps: Vec<(String, StepHandler)> = vec![(
            "load".to_string(),
            Box::new(|_tab, _scope| Box::pin(async { Ok(()) })) as StepHandler,
        )];
        let runs = vec![
            vec![record("load", 0.0, 100.0, None, 0, 0, 0)],
            vec![record("load", 0.0, 100.0, Some(0.05), 0, 0, 0)],
        ];
        let aggregated = aggregate_steps(&steps, &runs);
        let cwv = aggregated[0].cwv.as_ref().unwrap();
        assert_eq!(cwv.cls.values, vec![0.0, 0.05]);
    }
}
