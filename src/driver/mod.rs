//! Browser automation adapter boundary.
//!
//! [`BrowserDriver`], [`Tab`], and [`ControlChannel`] are the only interfaces
//! the rest of the crate sees. Every other module — probes, the single-run
//! and benchmark engines, the journey runner — is written against these
//! traits, never against `chromiumoxide` directly. The concrete
//! [`chromiumoxide_driver::ChromiumoxideDriver`] is the single place that
//! dependency is named.

pub mod chromiumoxide_driver;

use async_trait::async_trait;
use serde_json::Value;

use crate::capture::{DeviceConfig, NetworkConfig};
use crate::error::BrowserError;

pub use chromiumoxide_driver::ChromiumoxideDriver;

/// The load condition a navigation or wait should settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCondition {
    Load,
    NetworkIdle,
}

/// A capability-scoped control channel for one tab: cache, network shaping,
/// and heap introspection, kept separate from page-context evaluation since
/// these calls go directly over CDP rather than through page script.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    async fn enable_performance_metrics(&self) -> Result<(), BrowserError>;

    /// Applies network emulation, or clears it when `network` is `None`.
    async fn emulate_network(&self, network: Option<&NetworkConfig>) -> Result<(), BrowserError>;

    async fn clear_cache(&self) -> Result<(), BrowserError>;

    async fn heap_usage_bytes(&self) -> Result<u64, BrowserError>;
}

/// A single browser tab, configured for one device profile.
#[async_trait]
pub trait Tab: Send + Sync {
    /// Navigates to `url`, waiting for `condition` to settle.
    async fn goto(&self, url: &str, condition: LoadCondition) -> Result<(), BrowserError>;

    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError>;

    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError>;

    /// Evaluates a JSON-returning expression in the page context.
    async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError>;

    /// Injects a script to run before any script of the *next* navigation
    /// (`Page.addScriptToEvaluateOnNewDocument`).
    async fn inject_before_navigation(&self, script: &str) -> Result<(), BrowserError>;

    /// Opens this tab's control channel.
    async fn control_channel(&self) -> Result<Box<dyn ControlChannel>, BrowserError>;

    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// Launches and owns a headless browser process.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Opens a new tab configured with the given device profile.
    async fn new_tab(&self, device: &DeviceConfig) -> Result<Box<dyn Tab>, BrowserError>;

    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}
