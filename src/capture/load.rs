//! Loading capture files from disk: read, detect kind, and decode into a
//! [`CaptureFile`].

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::compare::kind;
use crate::error::LoadError;

use super::{CaptureData, CaptureFile, JourneyResult, RuntimeBenchmark, StaticAnalysis};

/// Loads and decodes a capture file, using its file stem as the label.
pub fn load(path: &Path) -> Result<CaptureFile, LoadError> {
    let content = fs::read_to_string(path)
        .map_err(|_| LoadError::FileNotFound(path.display().to_string()))?;

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| LoadError::InvalidJson(e.to_string()))?;

    let kind = kind::detect(&value)?;

    let data = match kind {
        crate::capture::CaptureKind::Benchmark => {
            let benchmark: RuntimeBenchmark = serde_json::from_value(value)
                .map_err(|e| LoadError::LoadFailed(e.to_string()))?;
            CaptureData::Benchmark(benchmark)
        }
        crate::capture::CaptureKind::Journey => {
            let journey: JourneyResult = serde_json::from_value(value)
                .map_err(|e| LoadError::LoadFailed(e.to_string()))?;
            CaptureData::Journey(journey)
        }
        crate::capture::CaptureKind::Static => {
            let static_analysis: StaticAnalysis = serde_json::from_value(value)
                .map_err(|e| LoadError::LoadFailed(e.to_string()))?;
            CaptureData::Static(static_analysis)
        }
    };

    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(CaptureFile {
        path: path.display().to_string(),
        label,
        kind,
        data,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn write_temp(content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "vitalscope-test-{}-{}.json",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load(Path::new("/nonexistent/path/capture.json")).unwrap_err();
        assert_eq!(err.code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn invalid_json_is_invalid_json_error() {
        let path = write_temp("not json at all {{{");
        let err = load(&path).unwrap_err();
        assert_eq!(err.code(), "INVALID_JSON");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn unrecognized_shape_is_unknown_format() {
        let path = write_temp(r#"{"meta": {"unrelated": true}}"#);
        let err = load(&path).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_FORMAT");
        fs::remove_file(&path).ok();
    }
}
