//! Single-run engine: orchestrates one measurement in a fresh page.
//!
//! Grounded on `runner.rs::run_iteration`'s orchestration (throttle → inject
//! → navigate → collect → clear → close), generalized to the strict
//! seven-step sequence and full probe set the runtime measurement engine
//! requires.

use tracing::instrument;

use crate::capture::{NetworkConfig, RawRunRecord};
use crate::driver::{LoadCondition, Tab};
use crate::error::BrowserError;
use crate::probes::{cwv, longtask, resources, ssr, timing};

/// Runs the strict seven-step single-run sequence against `tab`, which must
/// be a fresh page. Any probe failure short-circuits the run.
#[instrument(skip(tab, network))]
pub async fn run(
    tab: &dyn Tab,
    url: &str,
    network: Option<&NetworkConfig>,
) -> Result<RawRunRecord, BrowserError> {
    // 1. Inject long-task observer before navigation.
    tab.inject_before_navigation(longtask::init_script()).await?;
    // CWV observers must also be live before the first paint.
    tab.inject_before_navigation(cwv::init_script()).await?;

    // 2. Open control channel; enable performance metrics.
    let control = tab.control_channel().await?;
    control.enable_performance_metrics().await?;

    // 3. Apply network emulation if configured.
    if network.is_some() {
        control.emulate_network(network).await?;
    }

    // 4. Clear browser cache.
    control.clear_cache().await?;

    // 5. Navigate, waiting for network-idle.
    tab.goto(url, LoadCondition::NetworkIdle).await?;

    // 6. Run capture probes in fixed order: CWV -> resources -> timing -> heap -> blocking -> SSR.
    let cwv_record = cwv::collect(tab).await?;
    let resources_record = resources::collect(tab).await?;
    let timing_record = timing::collect(tab).await?;
    let heap_bytes = control.heap_usage_bytes().await?;
    let blocking_record = longtask::collect(tab).await?;
    let ssr_record = ssr::collect(tab).await?;

    // 7. Return the RawRunRecord.
    Ok(RawRunRecord {
        cwv: cwv_record,
        resources: resources_record,
        timing: timing_record,
        blocking: blocking_record,
        heap_bytes,
        ssr: ssr_record,
    })
}
