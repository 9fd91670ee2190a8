//! A headless-browser web performance measurement and comparison toolkit.
//!
//! Drives a headless Chromium instance through controlled page loads and
//! scripted multi-step user journeys, collects low-level performance
//! telemetry (navigation timing, Core Web Vitals, resource timing, long
//! tasks, heap, SSR/hydration artifacts), aggregates repeated runs into
//! statistical summaries, and compares results across captures.
//!
//! # Example
//!
//! ```no_run
//! use vitalscope::capture::DeviceConfig;
//! use vitalscope::driver::ChromiumoxideDriver;
//! use vitalscope::engine::benchmark;
//! use vitalscope::reporter::{OutputFormat, Report, Reporter};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let driver = ChromiumoxideDriver::launch().await?;
//! let benchmark = benchmark::run(&driver, "https://example.com", 10, DeviceConfig::default(), None).await?;
//!
//! let reporter = Reporter::new(OutputFormat::Console);
//! reporter.report(&Report::Benchmark(&benchmark))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Runs are configured using TOML files:
//!
//! ```toml
//! network = "Fast3G"
//! journeys = ["checkout"]
//!
//! [target]
//! base_url = "https://example.com"
//! runs = 30
//!
//! [device]
//! width = 390
//! height = 844
//! is_mobile = true
//! ```

pub mod capture;
pub mod compare;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod journey;
pub mod probes;
pub mod reporter;
pub mod stats;

pub use config::Config;
pub use error::{BrowserError, CompareError, LoadError};
pub use reporter::{OutputFormat, Report, Reporter};
