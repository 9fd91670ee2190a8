//! The only module in this crate that names `chromiumoxide`.
//!
//! [`ChromiumoxideDriver`] and [`ChromiumoxideTab`] translate the
//! [`super::BrowserDriver`]/[`super::Tab`]/[`super::ControlChannel`] traits
//! into actual CDP calls, the way `runner.rs`, `metrics::web_vitals`, and
//! `throttling::*` drove the browser directly before this adapter existed.

#![allow(deprecated)] // EmulateNetworkConditionsParams is deprecated but still functional

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ClearBrowserCacheParams, ConnectionType, EmulateNetworkConditionsParams,
    SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::GetHeapUsageParams;
use chromiumoxide::Page;
use tracing::{debug, instrument};

use super::{BrowserDriver, ControlChannel, LoadCondition, Tab};
use crate::capture::{DeviceConfig, NetworkConfig};
use crate::error::BrowserError;

fn cdp_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::CdpError(e.to_string())
}

/// Owns the headless browser process and its background event-handler task.
pub struct ChromiumoxideDriver {
    browser: Browser,
    _handle: tokio::task::JoinHandle<()>,
}

impl ChromiumoxideDriver {
    /// Launches a headless browser with the default configuration.
    pub async fn launch() -> Result<Self, BrowserError> {
        Self::launch_with_config(
            BrowserConfig::builder()
                .build()
                .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?,
        )
        .await
    }

    #[instrument(skip(config))]
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self, BrowserError> {
        debug!("launching headless browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handle = tokio::spawn(async move {
            use futures::StreamExt;
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(ChromiumoxideDriver {
            browser,
            _handle: handle,
        })
    }
}

#[async_trait]
impl BrowserDriver for ChromiumoxideDriver {
    #[instrument(skip(self, device))]
    async fn new_tab(&self, device: &DeviceConfig) -> Result<Box<dyn Tab>, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(cdp_error)?;

        apply_device(&page, device).await?;

        Ok(Box::new(ChromiumoxideTab { page }))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        debug!("closing browser");
        Ok(())
    }
}

async fn apply_device(page: &Page, device: &DeviceConfig) -> Result<(), BrowserError> {
    let metrics = SetDeviceMetricsOverrideParams::builder()
        .width(device.width as i64)
        .height(device.height as i64)
        .device_scale_factor(device.device_scale_factor)
        .mobile(device.is_mobile)
        .build()
        .map_err(|e| BrowserError::CdpError(format!("device metrics params: {e}")))?;
    page.execute(metrics).await.map_err(cdp_error)?;

    let touch = SetTouchEmulationEnabledParams::builder()
        .enabled(device.has_touch)
        .build()
        .map_err(|e| BrowserError::CdpError(format!("touch emulation params: {e}")))?;
    page.execute(touch).await.map_err(cdp_error)?;

    if let Some(ua) = &device.user_agent {
        let params = SetUserAgentOverrideParams::new(ua.clone());
        page.execute(params).await.map_err(cdp_error)?;
    }

    Ok(())
}

struct ChromiumoxideTab {
    page: Page,
}

#[async_trait]
impl Tab for ChromiumoxideTab {
    #[instrument(skip(self))]
    async fn goto(&self, url: &str, condition: LoadCondition) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        match condition {
            LoadCondition::Load => {
                self.page
                    .wait_for_navigation()
                    .await
                    .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
            }
            LoadCondition::NetworkIdle => {
                self.page
                    .wait_for_navigation()
                    .await
                    .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
                // chromiumoxide has no native network-idle wait; the settle
                // delay lives in the CWV probe's own completion criterion.
            }
        }

        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::Timeout {
                what: format!("selector `{selector}`"),
                elapsed_ms: 0,
            })?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(cdp_error)?;
        element.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(cdp_error)?;
        element.type_str(text).await.map_err(cdp_error)?;
        Ok(())
    }

    #[instrument(skip(self, expression))]
    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self.page.evaluate(expression).await.map_err(cdp_error)?;
        result
            .into_value()
            .map_err(|e| BrowserError::CdpError(format!("could not decode evaluate result: {e}")))
    }

    #[instrument(skip(self, script))]
    async fn inject_before_navigation(&self, script: &str) -> Result<(), BrowserError> {
        let params = AddScriptToEvaluateOnNewDocumentParams::new(script.to_string());
        self.page.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn control_channel(&self) -> Result<Box<dyn ControlChannel>, BrowserError> {
        Ok(Box::new(ChromiumoxideControlChannel {
            page: self.page.clone(),
        }))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.page.close().await.map_err(cdp_error)?;
        Ok(())
    }
}

struct ChromiumoxideControlChannel {
    page: Page,
}

#[async_trait]
impl ControlChannel for ChromiumoxideControlChannel {
    async fn enable_performance_metrics(&self) -> Result<(), BrowserError> {
        use chromiumoxide::cdp::browser_protocol::performance::EnableParams;
        self.page
            .execute(EnableParams::default())
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    #[instrument(skip(self, network))]
    async fn emulate_network(&self, network: Option<&NetworkConfig>) -> Result<(), BrowserError> {
        let (download, upload, latency) = match network {
            Some(n) => (n.download_throughput, n.upload_throughput, n.latency),
            None => (-1.0, -1.0, 0.0),
        };

        let params = EmulateNetworkConditionsParams::builder()
            .offline(false)
            .latency(latency)
            .download_throughput(download)
            .upload_throughput(upload)
            .connection_type(if network.is_some() {
                ConnectionType::Cellular4g
            } else {
                ConnectionType::None
            })
            .build()
            .map_err(|e| BrowserError::CdpError(format!("network emulation params: {e}")))?;

        self.page.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn clear_cache(&self) -> Result<(), BrowserError> {
        self.page
            .execute(ClearBrowserCacheParams::default())
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    async fn heap_usage_bytes(&self) -> Result<u64, BrowserError> {
        let resp = self
            .page
            .execute(GetHeapUsageParams::default())
            .await
            .map_err(cdp_error)?;
        Ok(resp.result.used_size as u64)
    }
}
