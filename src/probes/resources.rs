//! Resource-timing probe: totals, per-type rollups, and cache-status
//! inference over `performance.getEntriesByType('resource')`.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::instrument;

use crate::capture::{ResourceType, ResourceTypeTotals, ResourcesRecord};
use crate::driver::Tab;
use crate::error::BrowserError;

fn capture_expression() -> &'static str {
    r#"
(function() {
    function inferType(entry) {
        const init = entry.initiatorType;
        const url = entry.name;
        if (entry.entryType === 'navigation') return 'document';
        if (init === 'script') return 'script';
        if (init === 'link' && /\.css(\?|$)/.test(url)) return 'stylesheet';
        if (init === 'css') return 'stylesheet';
        if (init === 'img' || /\.(png|jpe?g|gif|webp|svg|avif)(\?|$)/.test(url)) return 'image';
        if (/\.(woff2?|ttf|otf|eot)(\?|$)/.test(url)) return 'font';
        if (init === 'fetch' || init === 'xmlhttprequest') return 'fetch';
        return 'other';
    }

    function inferCache(entry) {
        if (entry.transferSize === 0 && entry.decodedBodySize > 0) {
            return entry.duration < 1 ? 'memory' : 'disk';
        }
        return 'network';
    }

    const byType = {};
    let totalTransfer = 0;
    let totalCount = 0;
    let fromCache = 0;

    const nav = performance.getEntriesByType('navigation')[0];
    const resources = performance.getEntriesByType('resource');
    const entries = nav ? [nav, ...resources] : resources;

    for (const entry of entries) {
        const type = inferType(entry);
        const cache = inferCache(entry);
        const bucket = byType[type] || { count: 0, transfer: 0, decoded: 0 };
        bucket.count += 1;
        bucket.transfer += entry.transferSize || 0;
        bucket.decoded += entry.decodedBodySize || 0;
        byType[type] = bucket;

        totalTransfer += entry.transferSize || 0;
        totalCount += 1;
        if (cache !== 'network') {
            fromCache += 1;
        }
    }

    return { totalTransfer, totalCount, fromCache, byType };
})()
"#
}

#[derive(Debug, Deserialize)]
struct ResourcesPoll {
    #[serde(rename = "totalTransfer")]
    total_transfer: u64,
    #[serde(rename = "totalCount")]
    total_count: u64,
    #[serde(rename = "fromCache")]
    from_cache: u64,
    #[serde(rename = "byType")]
    by_type: HashMap<String, ResourceTypeTotals>,
}

fn parse_resource_type(key: &str) -> ResourceType {
    match key {
        "script" => ResourceType::Script,
        "stylesheet" => ResourceType::Stylesheet,
        "image" => ResourceType::Image,
        "font" => ResourceType::Font,
        "fetch" => ResourceType::Fetch,
        "document" => ResourceType::Document,
        _ => ResourceType::Other,
    }
}

/// Reads resource + navigation timing entries and produces the rollup the
/// single-run engine stores as [`ResourcesRecord`].
#[instrument(skip(tab))]
pub async fn collect(tab: &dyn Tab) -> Result<ResourcesRecord, BrowserError> {
    let value = tab.evaluate(capture_expression()).await?;
    let poll: ResourcesPoll = serde_json::from_value(value)
        .map_err(|e| BrowserError::CdpError(format!("invalid resource probe payload: {e}")))?;

    let by_type = poll
        .by_type
        .into_iter()
        .map(|(k, v)| (parse_resource_type(&k), v))
        .collect();

    Ok(ResourcesRecord {
        total_transfer: poll.total_transfer,
        total_count: poll.total_count,
        from_cache: poll.from_cache,
        by_type,
    })
}
