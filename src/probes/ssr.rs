//! SSR/hydration probe: inspects the document's root element and inline
//! `<script>` content for framework-specific hydration markers.

use serde::Deserialize;
use tracing::instrument;

use crate::capture::{HydrationFramework, SsrRecord};
use crate::driver::Tab;
use crate::error::BrowserError;

const ROOT_SELECTORS: &[&str] = &["#__next", "#root", "#app", "[data-reactroot]", "body > div"];

fn capture_expression() -> String {
    let selectors = ROOT_SELECTORS
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"
(function() {{
    const selectors = [{selectors}];
    let root = null;
    for (const sel of selectors) {{
        const el = document.querySelector(sel);
        if (el && el.children.length > 0) {{
            root = el;
            break;
        }}
    }}

    const childCount = root ? root.children.length : 0;
    const textLength = root ? (root.textContent || '').length : 0;
    const hasContent = textLength > 50 || childCount > 2;

    let inlineScriptSize = 0;
    let inlineScriptCount = 0;
    let framework = 'none';
    let hydrationPayloadSize = 0;
    let nextDataSize = 0;
    let reactRouterDataSize = 0;
    let rscPayloadSize = 0;
    let rscChunkCount = 0;

    const scripts = document.querySelectorAll('script:not([src])');
    for (const script of scripts) {{
        const content = script.textContent || '';
        if (content.length === 0) continue;

        inlineScriptCount += 1;
        inlineScriptSize += content.length;

        if (content.includes('self.__next_f')) {{
            framework = 'next';
            rscPayloadSize += content.length;
            rscChunkCount += 1;
        }}
        if (content.includes('__NEXT_DATA__')) {{
            framework = 'next';
            nextDataSize += content.length;
        }}
        if (content.includes('__reactRouterContext')) {{
            framework = 'react-router';
            reactRouterDataSize += content.length;
        }}
        if (content.includes('__remixContext')) {{
            framework = 'remix';
            reactRouterDataSize += content.length;
        }}
        if (framework === 'none' && (content.includes('hydrateRoot') || content.includes('__REACT_DEVTOOLS_GLOBAL_HOOK__'))) {{
            framework = 'unknown';
            hydrationPayloadSize += content.length;
        }}
    }}

    return {{
        hasContent,
        inlineScriptSize,
        inlineScriptCount,
        hydrationFramework: framework,
        hydrationPayloadSize,
        nextDataSize,
        reactRouterDataSize,
        rscPayloadSize,
        rscChunkCount
    }};
}})()
"#
    )
}

#[derive(Debug, Deserialize)]
struct SsrPoll {
    #[serde(rename = "hasContent")]
    has_content: bool,
    #[serde(rename = "inlineScriptSize")]
    inline_script_size: u64,
    #[serde(rename = "inlineScriptCount")]
    inline_script_count: u64,
    #[serde(rename = "hydrationFramework")]
    hydration_framework: String,
    #[serde(rename = "hydrationPayloadSize")]
    hydration_payload_size: u64,
    #[serde(rename = "nextDataSize")]
    next_data_size: u64,
    #[serde(rename = "reactRouterDataSize")]
    react_router_data_size: u64,
    #[serde(rename = "rscPayloadSize")]
    rsc_payload_size: u64,
    #[serde(rename = "rscChunkCount")]
    rsc_chunk_count: u64,
}

fn parse_framework(s: &str) -> HydrationFramework {
    match s {
        "next" => HydrationFramework::Next,
        "react-router" => HydrationFramework::ReactRouter,
        "remix" => HydrationFramework::Remix,
        "unknown" => HydrationFramework::Unknown,
        _ => HydrationFramework::None,
    }
}

/// Tolerates a missing root element (`hasContent = false`) rather than
/// erroring; unrecognized frameworks degrade to `unknown` per the
/// navigation-type surface in the external interfaces section.
#[instrument(skip(tab))]
pub async fn collect(tab: &dyn Tab) -> Result<SsrRecord, BrowserError> {
    let value = tab.evaluate(&capture_expression()).await?;
    let poll: SsrPoll = serde_json::from_value(value)
        .map_err(|e| BrowserError::CdpError(format!("invalid SSR probe payload: {e}")))?;

    Ok(SsrRecord {
        has_content: poll.has_content,
        inline_script_size: poll.inline_script_size,
        inline_script_count: poll.inline_script_count,
        hydration_framework: parse_framework(&poll.hydration_framework),
        hydration_payload_size: poll.hydration_payload_size,
        next_data_size: poll.next_data_size,
        react_router_data_size: poll.react_router_data_size,
        rsc_payload_size: poll.rsc_payload_size,
        rsc_chunk_count: poll.rsc_chunk_count,
    })
}
