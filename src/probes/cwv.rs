//! Core Web Vitals + TTFB probe.
//!
//! Grounded on the `metrics::web_vitals` PerformanceObserver setup,
//! restructured around state written onto `window` rather than the
//! console-log bridge: the probe polls the page rather than subscribing to
//! CDP console events, so it needs no event-listener plumbing in the
//! [`crate::driver::Tab`] trait.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{instrument, trace};

use crate::capture::CwvRecord;
use crate::driver::Tab;
use crate::error::BrowserError;

const SETTLE_DELAY_MS: u64 = 500;
const HARD_CAP: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Script injected via [`Tab::inject_before_navigation`] so the observers
/// are live before the first paint of the next navigation.
pub fn init_script() -> &'static str {
    r#"
(function() {
    if (window.__vitalscopeCwv) return;
    const state = { lcp: null, cls: 0, ready: false };
    window.__vitalscopeCwv = state;

    try {
        const lcpObserver = new PerformanceObserver((list) => {
            const entries = list.getEntries();
            const last = entries[entries.length - 1];
            state.lcp = last.renderTime || last.loadTime;
        });
        lcpObserver.observe({ type: 'largest-contentful-paint', buffered: true });
    } catch (e) {}

    try {
        const clsObserver = new PerformanceObserver((list) => {
            for (const entry of list.getEntries()) {
                if (!entry.hadRecentInput) {
                    state.cls += entry.value;
                }
            }
        });
        clsObserver.observe({ type: 'layout-shift', buffered: true });
    } catch (e) {}

    const markReady = () => setTimeout(() => { state.ready = true; }, 500);
    if (document.readyState === 'complete') {
        markReady();
    } else {
        window.addEventListener('load', markReady);
    }
})();
"#
}

fn capture_expression() -> &'static str {
    r#"
(function() {
    const state = window.__vitalscopeCwv || { lcp: null, cls: 0, ready: false };
    const nav = performance.getEntriesByType('navigation')[0];
    const paint = performance.getEntriesByType('paint')
        .find((p) => p.name === 'first-contentful-paint');
    return {
        ready: document.readyState === 'complete' && !!state.ready,
        lcp: state.lcp,
        fcp: paint ? paint.startTime : null,
        cls: state.cls || 0,
        ttfb: nav ? (nav.responseStart - nav.requestStart) : null
    };
})()
"#
}

#[derive(Debug, Deserialize)]
struct CwvPoll {
    ready: bool,
    lcp: Option<f64>,
    fcp: Option<f64>,
    cls: f64,
    ttfb: Option<f64>,
}

/// Waits for the page to settle (load + ~500ms) or a 5s hard cap, then
/// returns whatever CWV state has accumulated so far.
///
/// Observer types the browser doesn't support degrade silently to absent
/// values rather than erroring — the page-side script already swallows
/// those `PerformanceObserver` constructor exceptions.
#[instrument(skip(tab))]
pub async fn collect(tab: &dyn Tab) -> Result<CwvRecord, BrowserError> {
    let start = Instant::now();
    let mut last = CwvPoll {
        ready: false,
        lcp: None,
        fcp: None,
        cls: 0.0,
        ttfb: None,
    };

    loop {
        let value = tab.evaluate(capture_expression()).await?;
        last = serde_json::from_value(value).map_err(|e| {
            BrowserError::CdpError(format!("invalid CWV probe payload: {e}"))
        })?;

        if last.ready {
            trace!("CWV settled after {:?}", start.elapsed());
            break;
        }

        if start.elapsed() + POLL_INTERVAL >= HARD_CAP {
            trace!("CWV hit hard cap after {:?}", start.elapsed());
            break;
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }

    let _ = SETTLE_DELAY_MS;
    Ok(CwvRecord {
        lcp: last.lcp,
        fcp: last.fcp,
        cls: last.cls,
        ttfb: last.ttfb,
    })
}
