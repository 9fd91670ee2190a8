//! Long-task probe: an init-time observer buffers long tasks in the page's
//! JS heap; capture time reads both that buffer and the standard entry list
//! and de-duplicates by `(startTime, duration)`.

use serde::Deserialize;
use tracing::instrument;

use crate::capture::BlockingRecord;
use crate::driver::Tab;
use crate::error::BrowserError;

const LONG_TASK_THRESHOLD_MS: f64 = 50.0;

/// Injected before navigation so no long task is missed between navigation
/// start and the capture-time read.
pub fn init_script() -> &'static str {
    r#"
(function() {
    if (window.__vitalscopeLongTasks) return;
    const buffer = [];
    window.__vitalscopeLongTasks = buffer;
    try {
        const observer = new PerformanceObserver((list) => {
            for (const entry of list.getEntries()) {
                buffer.push({ startTime: entry.startTime, duration: entry.duration });
            }
        });
        observer.observe({ type: 'longtask', buffered: true });
    } catch (e) {}
})();
"#
}

fn capture_expression() -> &'static str {
    r#"
(function() {
    const buffered = window.__vitalscopeLongTasks || [];
    const standard = performance.getEntriesByType('longtask')
        .map((e) => ({ startTime: e.startTime, duration: e.duration }));

    const seen = new Set();
    const tasks = [];
    for (const task of [...buffered, ...standard]) {
        const key = task.startTime.toFixed(2) + ':' + task.duration.toFixed(2);
        if (seen.has(key)) continue;
        seen.add(key);
        tasks.push(task);
    }
    return tasks;
})()
"#
}

#[derive(Debug, Deserialize)]
struct LongTaskEntry {
    #[allow(dead_code)]
    #[serde(rename = "startTime")]
    start_time: f64,
    duration: f64,
}

/// Reads and de-duplicates the long-task buffer, deriving total blocking
/// time as `sum(max(0, duration - 50ms))`.
#[instrument(skip(tab))]
pub async fn collect(tab: &dyn Tab) -> Result<BlockingRecord, BrowserError> {
    let value = tab.evaluate(capture_expression()).await?;
    let tasks: Vec<LongTaskEntry> = serde_json::from_value(value)
        .map_err(|e| BrowserError::CdpError(format!("invalid long-task probe payload: {e}")))?;

    let total_blocking_time = tasks
        .iter()
        .map(|t| (t.duration - LONG_TASK_THRESHOLD_MS).max(0.0))
        .sum();

    Ok(BlockingRecord {
        total_blocking_time,
        long_task_count: tasks.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_time_floors_at_zero() {
        let tasks = vec![
            LongTaskEntry {
                start_time: 0.0,
                duration: 40.0,
            },
            LongTaskEntry {
                start_time: 100.0,
                duration: 120.0,
            },
        ];
        let tbt: f64 = tasks
            .iter()
            .map(|t| (t.duration - LONG_TASK_THRESHOLD_MS).max(0.0))
            .sum();
        assert_eq!(tbt, 70.0); // 0 from the 40ms task, 70 from the 120ms task
    }

    #[test]
    fn init_script_is_idempotent_guard() {
        assert!(init_script().contains("if (window.__vitalscopeLongTasks) return;"));
    }
}
