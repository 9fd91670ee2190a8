//! Document-level timing marks (`domContentLoadedEventEnd`, `loadEventEnd`),
//! both relative to navigation start.

use serde::Deserialize;
use tracing::instrument;

use crate::capture::TimingRecord;
use crate::driver::Tab;
use crate::error::BrowserError;

fn capture_expression() -> &'static str {
    r#"
(function() {
    const nav = performance.getEntriesByType('navigation')[0];
    if (!nav) {
        return { domContentLoaded: 0, load: 0 };
    }
    return {
        domContentLoaded: nav.domContentLoadedEventEnd,
        load: nav.loadEventEnd
    };
})()
"#
}

#[derive(Debug, Deserialize)]
struct TimingPoll {
    #[serde(rename = "domContentLoaded")]
    dom_content_loaded: f64,
    load: f64,
}

#[instrument(skip(tab))]
pub async fn collect(tab: &dyn Tab) -> Result<TimingRecord, BrowserError> {
    let value = tab.evaluate(capture_expression()).await?;
    let poll: TimingPoll = serde_json::from_value(value)
        .map_err(|e| BrowserError::CdpError(format!("invalid timing probe payload: {e}")))?;

    Ok(TimingRecord {
        dom_content_loaded: poll.dom_content_loaded,
        load: poll.load,
    })
}
