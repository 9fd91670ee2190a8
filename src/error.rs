//! Typed error model shared by every fallible operation in the crate.
//!
//! Every component returns a `Result<T, E>` drawn from a small closed set of
//! error variants rather than a single catch-all error type. Each variant
//! carries a `code` tag (see [`BrowserError::code`], [`LoadError::code`],
//! [`CompareError::code`]) so callers and formatters can match on a stable
//! identifier instead of parsing the display string.

use thiserror::Error;

/// Errors raised by the browser driver adapter, the single-run engine, the
/// benchmark engine, and the journey runner.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("timed out waiting for {what} after {elapsed_ms}ms")]
    Timeout { what: String, elapsed_ms: u64 },

    #[error("CDP call failed: {0}")]
    CdpError(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl BrowserError {
    /// Stable error tag for machine-readable reporting.
    pub fn code(&self) -> &'static str {
        match self {
            BrowserError::LaunchFailed(_) => "LAUNCH_FAILED",
            BrowserError::NavigationFailed(_) => "NAVIGATION_FAILED",
            BrowserError::Timeout { .. } => "TIMEOUT",
            BrowserError::CdpError(_) => "CDP_ERROR",
            BrowserError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }
}

/// Errors raised while loading or parsing a capture file, configuration
/// file, or journey definition.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("unrecognized capture format")]
    UnknownFormat,

    #[error("invalid journey definition: {0}")]
    InvalidJourney(String),

    #[error("failed to load capture: {0}")]
    LoadFailed(String),
}

impl LoadError {
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::FileNotFound(_) => "FILE_NOT_FOUND",
            LoadError::InvalidJson(_) => "INVALID_JSON",
            LoadError::UnknownFormat => "UNKNOWN_FORMAT",
            LoadError::InvalidJourney(_) => "INVALID_JOURNEY",
            LoadError::LoadFailed(_) => "LOAD_FAILED",
        }
    }
}

/// Errors raised by the comparison engine.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("captures are not the same kind: {baseline} vs {current}")]
    TypeMismatch {
        baseline: &'static str,
        current: &'static str,
    },

    #[error("failed to load capture for comparison: {0}")]
    LoadError(#[from] LoadError),
}

impl CompareError {
    pub fn code(&self) -> &'static str {
        match self {
            CompareError::TypeMismatch { .. } => "TYPE_MISMATCH",
            CompareError::LoadError(_) => "LOAD_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_error_codes() {
        assert_eq!(BrowserError::LaunchFailed("x".into()).code(), "LAUNCH_FAILED");
        assert_eq!(
            BrowserError::NavigationFailed("x".into()).code(),
            "NAVIGATION_FAILED"
        );
        assert_eq!(
            BrowserError::Timeout {
                what: "lcp".into(),
                elapsed_ms: 5000
            }
            .code(),
            "TIMEOUT"
        );
        assert_eq!(BrowserError::CdpError("x".into()).code(), "CDP_ERROR");
        assert_eq!(
            BrowserError::InvalidArgument("x".into()).code(),
            "INVALID_ARGUMENT"
        );
    }

    #[test]
    fn load_error_codes() {
        assert_eq!(LoadError::FileNotFound("x".into()).code(), "FILE_NOT_FOUND");
        assert_eq!(LoadError::InvalidJson("x".into()).code(), "INVALID_JSON");
        assert_eq!(LoadError::UnknownFormat.code(), "UNKNOWN_FORMAT");
        assert_eq!(
            LoadError::InvalidJourney("x".into()).code(),
            "INVALID_JOURNEY"
        );
        assert_eq!(LoadError::LoadFailed("x".into()).code(), "LOAD_FAILED");
    }

    #[test]
    fn compare_error_codes() {
        assert_eq!(
            CompareError::TypeMismatch {
                baseline: "benchmark",
                current: "journey"
            }
            .code(),
            "TYPE_MISMATCH"
        );
        assert_eq!(
            CompareError::LoadError(LoadError::UnknownFormat).code(),
            "LOAD_ERROR"
        );
    }
}
