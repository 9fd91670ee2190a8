//! Statistical aggregation over repeated measurement runs.
//!
//! # Examples
//!
//! ```
//! use vitalscope::stats::aggregate;
//!
//! let samples = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
//! let summary = aggregate(&samples);
//! assert_eq!(summary.median, 50.0);
//! assert_eq!(summary.p95, 100.0);
//! ```

pub mod aggregate;

pub use aggregate::{aggregate, aggregate_nullable, AggregatedMetric};
