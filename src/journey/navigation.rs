//! Navigation tracker: a state machine classifying each journey step as
//! initial / none / soft / hard, carried across the steps of one journey
//! run.

use serde::Deserialize;
use tracing::instrument;

use crate::capture::{NavigationData, NavigationTrigger, NavigationType};
use crate::driver::Tab;
use crate::error::BrowserError;

fn timing_probe_expression() -> &'static str {
    r#"
(function() {
    const nav = performance.getEntriesByType('navigation')[0];
    return {
        url: location.href,
        navType: nav ? nav.type : 'navigate',
        requestStart: nav ? nav.requestStart : 0,
        loadEventEnd: nav ? nav.loadEventEnd : 0,
        startTime: nav ? nav.startTime : 0
    };
})()
"#
}

#[derive(Debug, Clone, Deserialize)]
struct TimingReading {
    url: String,
    #[serde(rename = "navType")]
    nav_type: String,
    #[serde(rename = "requestStart")]
    request_start: f64,
    #[serde(rename = "loadEventEnd")]
    load_event_end: f64,
    #[serde(rename = "startTime")]
    start_time: f64,
}

async fn read_timing(tab: &dyn Tab) -> Result<TimingReading, BrowserError> {
    let value = tab.evaluate(timing_probe_expression()).await?;
    serde_json::from_value(value)
        .map_err(|e| BrowserError::CdpError(format!("invalid navigation timing payload: {e}")))
}

fn trigger_for_hard(nav_type: &str) -> NavigationTrigger {
    match nav_type {
        "back_forward" => NavigationTrigger::BackForward,
        "reload" => NavigationTrigger::Reload,
        _ => NavigationTrigger::Link,
    }
}

/// Stateful classifier for one journey repetition. A fresh tracker is
/// created per repetition; it must never be reused across repetitions.
#[derive(Debug, Default)]
pub struct NavigationTracker {
    previous_url: Option<String>,
    previous_request_start: Option<f64>,
    step_index: u32,
    last_reading: Option<TimingReading>,
}

impl NavigationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current document's timing and classifies it against the
    /// tracker's existing baseline, without updating that baseline — only
    /// [`finalize_step`](Self::finalize_step) does that.
    #[instrument(skip(self, tab))]
    pub async fn capture_and_classify(
        &mut self,
        tab: &dyn Tab,
    ) -> Result<NavigationData, BrowserError> {
        let reading = read_timing(tab).await?;
        let data = self.classify(&reading);
        self.last_reading = Some(reading);
        Ok(data)
    }

    fn classify(&self, reading: &TimingReading) -> NavigationData {
        let duration = reading.load_event_end - reading.start_time;

        if self.step_index == 0 || self.previous_url.is_none() {
            return NavigationData {
                nav_type: NavigationType::Initial,
                trigger: Some(NavigationTrigger::Link),
                prefetch_status: None,
                duration,
            };
        }

        let previous_url = self.previous_url.as_deref().unwrap();
        if reading.url == previous_url {
            return NavigationData {
                nav_type: NavigationType::None,
                trigger: None,
                prefetch_status: None,
                duration: 0.0,
            };
        }

        let previous_request_start = self.previous_request_start;
        if previous_request_start != Some(reading.request_start) {
            NavigationData {
                nav_type: NavigationType::Hard,
                trigger: Some(trigger_for_hard(&reading.nav_type)),
                prefetch_status: None,
                duration,
            }
        } else {
            NavigationData {
                nav_type: NavigationType::Soft,
                trigger: Some(NavigationTrigger::Programmatic),
                prefetch_status: None,
                duration: 0.0,
            }
        }
    }

    /// Must be invoked at the end of every step, even if the step never
    /// called [`capture_and_classify`](Self::capture_and_classify). Reuses
    /// the step's capture reading if one was taken; otherwise performs a
    /// fresh timing read, so the next step is classified against the
    /// latest observed state rather than a stale baseline.
    #[instrument(skip(self, tab))]
    pub async fn finalize_step(&mut self, tab: &dyn Tab) -> Result<(), BrowserError> {
        let reading = match self.last_reading.take() {
            Some(r) => r,
            None => read_timing(tab).await?,
        };

        self.previous_url = Some(reading.url);
        self.previous_request_start = Some(reading.request_start);
        self.step_index += 1;
        Ok(())
    }
}
