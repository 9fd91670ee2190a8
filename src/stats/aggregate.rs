//! Rank-based aggregation over finite sequences of samples.
//!
//! This is deliberately simpler than an interpolated-percentile summary: the
//! benchmark and journey engines feed raw per-run sequences straight in, and
//! downstream comparison needs a deterministic, easily-reproduced index into
//! the sorted sequence rather than a smoothed statistic.

use serde::{Deserialize, Serialize};

/// A statistical summary of a finite sequence of samples.
///
/// `values` preserves the original input order (not the sorted order used to
/// derive the other fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    pub values: Vec<f64>,
}

impl AggregatedMetric {
    fn zero() -> Self {
        AggregatedMetric {
            median: 0.0,
            p75: 0.0,
            p95: 0.0,
            min: 0.0,
            max: 0.0,
            variance: 0.0,
            values: Vec::new(),
        }
    }
}

/// Index of the `p`th percentile in a sorted sequence of length `n`,
/// `ceil((p / 100) * n) - 1`.
fn rank_index(p: f64, n: usize) -> usize {
    let raw = (p / 100.0) * (n as f64);
    let idx = raw.ceil() as i64 - 1;
    idx.clamp(0, n as i64 - 1) as usize
}

/// Index of the median in a sorted sequence of length `n`, `ceil(n/2) - 1`.
fn median_index(n: usize) -> usize {
    let idx = (n as f64 / 2.0).ceil() as i64 - 1;
    idx.clamp(0, n as i64 - 1) as usize
}

fn population_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Aggregates a finite, possibly-empty sequence of samples.
///
/// Empty input produces an all-zero record rather than an error; a
/// single-value input has variance 0 and `min == median == max`.
pub fn aggregate(values: &[f64]) -> AggregatedMetric {
    if values.is_empty() {
        return AggregatedMetric::zero();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN sample"));

    let n = sorted.len();
    AggregatedMetric {
        median: sorted[median_index(n)],
        p75: sorted[rank_index(75.0, n)],
        p95: sorted[rank_index(95.0, n)],
        min: sorted[0],
        max: sorted[n - 1],
        variance: population_variance(&sorted),
        values: values.to_vec(),
    }
}

/// Aggregates a sequence of optional samples, dropping absent entries first.
///
/// Returns `None` iff every element is `None`.
pub fn aggregate_nullable(values: &[Option<f64>]) -> Option<AggregatedMetric> {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if present.is_empty() {
        None
    } else {
        Some(aggregate(&present))
    }
}
