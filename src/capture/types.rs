//! The core data model: value records produced by the engines and consumed
//! by the reporter and comparison engine. All records are immutable once
//! produced.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::AggregatedMetric;

/// Size of an asset in three representations. `brotli` is estimated as
/// `round(gzip * 0.85)` when not measured directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSize {
    pub raw: u64,
    pub gzip: u64,
    pub brotli: u64,
}

impl ByteSize {
    pub fn new(raw: u64, gzip: u64) -> Self {
        let brotli = ((gzip as f64) * 0.85).round() as u64;
        ByteSize { raw, gzip, brotli }
    }
}

/// Emulated viewport and input characteristics for a browser tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            width: 1280,
            height: 720,
            device_scale_factor: 1.0,
            is_mobile: false,
            has_touch: false,
            user_agent: None,
        }
    }
}

/// CDP network emulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub download_throughput: f64,
    pub upload_throughput: f64,
    pub latency: f64,
}

/// Resource type, inferred deterministically from extension and initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Script,
    Stylesheet,
    Image,
    Font,
    Fetch,
    Document,
    Other,
}

/// How a resource was served, inferred from transfer/decoded size and
/// duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Memory,
    Disk,
    Network,
}

/// Per-resource-type rollup within one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeTotals {
    pub count: u64,
    pub transfer: u64,
    pub decoded: u64,
}

/// Core Web Vitals collected by the CWV probe for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwvRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcp: Option<f64>,
    pub cls: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<f64>,
}

/// Resource-timing rollup collected for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesRecord {
    pub total_transfer: u64,
    pub total_count: u64,
    pub from_cache: u64,
    pub by_type: BTreeMap<ResourceType, ResourceTypeTotals>,
}

/// Document-level timing marks for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRecord {
    pub dom_content_loaded: f64,
    pub load: f64,
}

/// Long-task derived blocking-time summary for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingRecord {
    pub total_blocking_time: f64,
    pub long_task_count: u64,
}

/// SSR/hydration family recognized in a runtime capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HydrationFramework {
    Next,
    ReactRouter,
    Remix,
    Unknown,
    None,
}

/// SSR/hydration inspection results for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrRecord {
    pub has_content: bool,
    pub inline_script_size: u64,
    pub inline_script_count: u64,
    pub hydration_framework: HydrationFramework,
    pub hydration_payload_size: u64,
    pub next_data_size: u64,
    pub react_router_data_size: u64,
    pub rsc_payload_size: u64,
    pub rsc_chunk_count: u64,
}

impl Default for SsrRecord {
    fn default() -> Self {
        SsrRecord {
            has_content: false,
            inline_script_size: 0,
            inline_script_count: 0,
            hydration_framework: HydrationFramework::None,
            hydration_payload_size: 0,
            next_data_size: 0,
            react_router_data_size: 0,
            rsc_payload_size: 0,
            rsc_chunk_count: 0,
        }
    }
}

/// Everything captured from one single-run engine execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRunRecord {
    pub cwv: CwvRecord,
    pub resources: ResourcesRecord,
    pub timing: TimingRecord,
    pub blocking: BlockingRecord,
    pub heap_bytes: u64,
    pub ssr: SsrRecord,
}

/// Metadata shared by runtime benchmark and journey captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub url: String,
    pub captured_at: DateTime<Utc>,
    pub runs: u32,
    pub device: DeviceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkConfig>,
}

/// Aggregated result of running the benchmark engine N times against one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeBenchmark {
    pub meta: RunMetadata,
    pub cwv: AggregatedCwv,
    pub extended: AggregatedExtended,
    pub resources: AggregatedResources,
    pub javascript: AggregatedJavascript,
    pub ssr: AggregatedSsr,
    pub runs: Vec<RawRunRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCwv {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcp: Option<AggregatedMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcp: Option<AggregatedMetric>,
    pub cls: AggregatedMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<AggregatedMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedExtended {
    pub tbt: AggregatedMetric,
    pub dom_content_loaded: AggregatedMetric,
    pub load: AggregatedMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResources {
    pub total_transfer: AggregatedMetric,
    pub total_count: AggregatedMetric,
    pub by_type: BTreeMap<ResourceType, ResourceTypeTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedJavascript {
    pub main_thread_blocking: AggregatedMetric,
    pub long_tasks: AggregatedMetric,
    pub heap_size: AggregatedMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSsr {
    pub hydration_framework: HydrationFramework,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsc_payload_size: Option<AggregatedMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsc_chunk_count: Option<AggregatedMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_data_size: Option<AggregatedMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub react_router_data_size: Option<AggregatedMetric>,
}

/// Navigation classification produced for one journey step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    Initial,
    Hard,
    Soft,
    None,
}

/// What caused a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationTrigger {
    Link,
    Programmatic,
    BackForward,
    Reload,
}

/// A navigation classification plus its observed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationData {
    #[serde(rename = "type")]
    pub nav_type: NavigationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<NavigationTrigger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_status: Option<String>,
    pub duration: f64,
}

/// Mutable capture surface for one journey step, frozen once the step ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCaptureData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwv: Option<CwvRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<f64>,
    pub custom: BTreeMap<String, f64>,
}

/// One named step's record across a journey repetition: start/end time plus
/// whatever the step captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub data: StepCaptureData,
}

/// Per-step aggregated results across M journey repetitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStep {
    pub name: String,
    pub duration: AggregatedMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwv: Option<AggregatedStepCwv>,
    pub navigation_type: NavigationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStepCwv {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcp: Option<AggregatedMetric>,
    pub cls: AggregatedMetric,
}

/// Cumulative per-repetition scalars, aggregated across M repetitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeMetrics {
    pub total_duration: AggregatedMetric,
    pub total_transferred: AggregatedMetric,
    pub total_cls: AggregatedMetric,
    pub memory_high_water: AggregatedMetric,
    pub cache_hit_rate: AggregatedMetric,
}

/// Result of running a JourneyDefinition for M repetitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    pub name: String,
    pub description: String,
    pub base_url: String,
    pub captured_at: DateTime<Utc>,
    pub repetitions: u32,
    pub steps: Vec<AggregatedStep>,
    pub cumulative: CumulativeMetrics,
    pub raw_runs: Vec<Vec<StepRecord>>,
}

/// Which of the three recognized kinds a capture file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Benchmark,
    Journey,
    Static,
}

impl CaptureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureKind::Benchmark => "benchmark",
            CaptureKind::Journey => "journey",
            CaptureKind::Static => "static",
        }
    }
}

/// Static bundle analysis, out of core scope: represented only as a typed
/// envelope so the comparison engine can diff bundle sizes and route counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticAnalysis {
    pub framework: String,
    pub bundles: StaticBundles,
    pub routes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticBundles {
    pub total: ByteSize,
    pub js: ByteSize,
    pub css: ByteSize,
}

/// The decoded payload inside a CaptureFile, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureData {
    Benchmark(RuntimeBenchmark),
    Journey(JourneyResult),
    Static(StaticAnalysis),
}

/// An opaque, labeled envelope around a decoded capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFile {
    pub path: String,
    pub label: String,
    pub kind: CaptureKind,
    pub data: CaptureData,
}
