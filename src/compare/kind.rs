//! Capture kind detection: a total function over decoded JSON that never
//! panics and never loops, classifying a capture as benchmark, journey, or
//! static — or reporting it as unrecognized.

use serde_json::Value;

use crate::capture::CaptureKind;
use crate::error::LoadError;

/// Detects a capture's kind from its already-decoded top-level JSON object.
///
/// Structural, not schema-validating: only checks for the presence of the
/// handful of fields that distinguish the three kinds.
pub fn detect(value: &Value) -> Result<CaptureKind, LoadError> {
    let meta = value.get("meta");

    let has = |field: &str| meta.and_then(|m| m.get(field)).is_some();
    let top_has = |field: &str| value.get(field).is_some();

    if has("url") && has("runs") && top_has("cwv") {
        return Ok(CaptureKind::Benchmark);
    }
    if has("name") && has("baseUrl") && top_has("steps") {
        return Ok(CaptureKind::Journey);
    }
    if has("framework") && top_has("bundles") {
        return Ok(CaptureKind::Static);
    }

    Err(LoadError::UnknownFormat)
}
