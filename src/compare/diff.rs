//! Directional diff engine: per-metric comparisons with a declared
//! improvement direction, plus the benchmark- and static-analysis-level
//! comparisons built on top of it.

use serde::{Deserialize, Serialize};

use crate::capture::{
    AggregatedCwv, AggregatedExtended, AggregatedJavascript, AggregatedResources, AggregatedSsr,
    ByteSize, CaptureData, CaptureKind, RuntimeBenchmark, StaticAnalysis, StaticBundles,
};
use crate::error::CompareError;
use crate::stats::AggregatedMetric;

/// Whether a lower or higher value represents an improvement for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// A single directional diff between a baseline and current scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarDiff {
    pub baseline: f64,
    pub current: f64,
    pub absolute_diff: f64,
    pub percent_diff: f64,
    pub improved: bool,
}

/// Computes the directional diff between `baseline` and `current`.
pub fn calculate_diff(baseline: f64, current: f64, direction: Direction) -> ScalarDiff {
    let absolute_diff = current - baseline;
    let percent_diff = if baseline == 0.0 && current == 0.0 {
        0.0
    } else if baseline == 0.0 {
        100.0
    } else {
        (current - baseline) / baseline * 100.0
    };
    let improved = match direction {
        Direction::LowerIsBetter => current < baseline,
        Direction::HigherIsBetter => current > baseline,
    };
    ScalarDiff {
        baseline,
        current,
        absolute_diff,
        percent_diff,
        improved,
    }
}

/// A `{median, p75, p95}` triple of diffs between two aggregated metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileDiff {
    pub median: ScalarDiff,
    pub p75: ScalarDiff,
    pub p95: ScalarDiff,
}

fn percentile_diff(
    baseline: &AggregatedMetric,
    current: &AggregatedMetric,
    direction: Direction,
) -> PercentileDiff {
    PercentileDiff {
        median: calculate_diff(baseline.median, current.median, direction),
        p75: calculate_diff(baseline.p75, current.p75, direction),
        p95: calculate_diff(baseline.p95, current.p95, direction),
    }
}

fn nullable_percentile_diff(
    baseline: Option<&AggregatedMetric>,
    current: Option<&AggregatedMetric>,
    direction: Direction,
) -> Option<PercentileDiff> {
    match (baseline, current) {
        (Some(b), Some(c)) => Some(percentile_diff(b, c, direction)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwvComparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcp: Option<PercentileDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcp: Option<PercentileDiff>,
    pub cls: PercentileDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<PercentileDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedComparison {
    pub tbt: PercentileDiff,
    pub dom_content_loaded: PercentileDiff,
    pub load: PercentileDiff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesComparison {
    pub total_transfer: PercentileDiff,
    pub total_count: PercentileDiff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavascriptComparison {
    pub main_thread_blocking: PercentileDiff,
    pub long_tasks: PercentileDiff,
    pub heap_size: PercentileDiff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrComparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsc_payload_size: Option<PercentileDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub cwv: CwvComparison,
    pub extended: ExtendedComparison,
    pub resources: ResourcesComparison,
    pub javascript: JavascriptComparison,
    pub ssr: SsrComparison,
}

fn compare_cwv(baseline: &AggregatedCwv, current: &AggregatedCwv) -> CwvComparison {
    CwvComparison {
        lcp: nullable_percentile_diff(
            baseline.lcp.as_ref(),
            current.lcp.as_ref(),
            Direction::LowerIsBetter,
        ),
        fcp: nullable_percentile_diff(
            baseline.fcp.as_ref(),
            current.fcp.as_ref(),
            Direction::LowerIsBetter,
        ),
        cls: percentile_diff(&baseline.cls, &current.cls, Direction::LowerIsBetter),
        ttfb: nullable_percentile_diff(
            baseline.ttfb.as_ref(),
            current.ttfb.as_ref(),
            Direction::LowerIsBetter,
        ),
    }
}

fn compare_extended(
    baseline: &AggregatedExtended,
    current: &AggregatedExtended,
) -> ExtendedComparison {
    ExtendedComparison {
        tbt: percentile_diff(&baseline.tbt, &current.tbt, Direction::LowerIsBetter),
        dom_content_loaded: percentile_diff(
            &baseline.dom_content_loaded,
            &current.dom_content_loaded,
            Direction::LowerIsBetter,
        ),
        load: percentile_diff(&baseline.load, &current.load, Direction::LowerIsBetter),
    }
}

fn compare_resources(
    baseline: &AggregatedResources,
    current: &AggregatedResources,
) -> ResourcesComparison {
    ResourcesComparison {
        total_transfer: percentile_diff(
            &baseline.total_transfer,
            &current.total_transfer,
            Direction::LowerIsBetter,
        ),
        total_count: percentile_diff(
            &baseline.total_count,
            &current.total_count,
            Direction::LowerIsBetter,
        ),
    }
}

fn compare_javascript(
    baseline: &AggregatedJavascript,
    current: &AggregatedJavascript,
) -> JavascriptComparison {
    JavascriptComparison {
        main_thread_blocking: percentile_diff(
            &baseline.main_thread_blocking,
            &current.main_thread_blocking,
            Direction::LowerIsBetter,
        ),
        long_tasks: percentile_diff(
            &baseline.long_tasks,
            &current.long_tasks,
            Direction::LowerIsBetter,
        ),
        heap_size: percentile_diff(
            &baseline.heap_size,
            &current.heap_size,
            Direction::LowerIsBetter,
        ),
    }
}

fn compare_ssr(baseline: &AggregatedSsr, current: &AggregatedSsr) -> SsrComparison {
    SsrComparison {
        rsc_payload_size: nullable_percentile_diff(
            baseline.rsc_payload_size.as_ref(),
            current.rsc_payload_size.as_ref(),
            Direction::LowerIsBetter,
        ),
    }
}

pub fn compare_benchmarks(
    baseline: &RuntimeBenchmark,
    current: &RuntimeBenchmark,
) -> BenchmarkComparison {
    BenchmarkComparison {
        cwv: compare_cwv(&baseline.cwv, &current.cwv),
        extended: compare_extended(&baseline.extended, &current.extended),
        resources: compare_resources(&baseline.resources, &current.resources),
        javascript: compare_javascript(&baseline.javascript, &current.javascript),
        ssr: compare_ssr(&baseline.ssr, &current.ssr),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSizeComparison {
    pub raw: ScalarDiff,
    pub gzip: ScalarDiff,
}

fn compare_byte_size(baseline: &ByteSize, current: &ByteSize) -> ByteSizeComparison {
    ByteSizeComparison {
        raw: calculate_diff(baseline.raw as f64, current.raw as f64, Direction::LowerIsBetter),
        gzip: calculate_diff(
            baseline.gzip as f64,
            current.gzip as f64,
            Direction::LowerIsBetter,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticBundleComparison {
    pub total: ByteSizeComparison,
    pub js: ByteSizeComparison,
    pub css: ByteSizeComparison,
}

fn compare_bundles(baseline: &StaticBundles, current: &StaticBundles) -> StaticBundleComparison {
    StaticBundleComparison {
        total: compare_byte_size(&baseline.total, &current.total),
        js: compare_byte_size(&baseline.js, &current.js),
        css: compare_byte_size(&baseline.css, &current.css),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticComparison {
    pub bundles: StaticBundleComparison,
    pub routes: ScalarDiff,
}

pub fn compare_static(baseline: &StaticAnalysis, current: &StaticAnalysis) -> StaticComparison {
    StaticComparison {
        bundles: compare_bundles(&baseline.bundles, &current.bundles),
        routes: calculate_diff(
            baseline.routes as f64,
            current.routes as f64,
            Direction::HigherIsBetter,
        ),
    }
}

/// Tagged comparison result. Journey captures are kind-checked like any
/// other pair but carry no per-metric diff: journey comparison logic is not
/// part of this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonResult {
    Benchmark(BenchmarkComparison),
    Static(StaticComparison),
    Journey,
}

fn kind_of(data: &CaptureData) -> CaptureKind {
    match data {
        CaptureData::Benchmark(_) => CaptureKind::Benchmark,
        CaptureData::Journey(_) => CaptureKind::Journey,
        CaptureData::Static(_) => CaptureKind::Static,
    }
}

/// Compares two decoded captures of matching kind, returning `TYPE_MISMATCH`
/// when the baseline and current captures differ in kind.
pub fn compare(baseline: &CaptureData, current: &CaptureData) -> Result<ComparisonResult, CompareError> {
    let baseline_kind = kind_of(baseline);
    let current_kind = kind_of(current);
    if baseline_kind != current_kind {
        return Err(CompareError::TypeMismatch {
            baseline: baseline_kind.as_str(),
            current: current_kind.as_str(),
        });
    }

    match (baseline, current) {
        (CaptureData::Benchmark(b), CaptureData::Benchmark(c)) => {
            Ok(ComparisonResult::Benchmark(compare_benchmarks(b, c)))
        }
        (CaptureData::Static(b), CaptureData::Static(c)) => {
            Ok(ComparisonResult::Static(compare_static(b, c)))
        }
        (CaptureData::Journey(_), CaptureData::Journey(_)) => Ok(ComparisonResult::Journey),
        _ => unreachable!("kind check above guarantees matching variants"),
    }
}
