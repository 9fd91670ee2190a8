//! Run configuration: which URL or journeys to measure, under what device
//! and network emulation, and how many runs/repetitions to take.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::capture::{DeviceConfig, NetworkConfig};

fn default_runs() -> u32 {
    10
}

fn default_repetitions() -> u32 {
    5
}

/// Top-level run configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub network: NetworkProfile,
    /// Journeys to run against `target.base_url`, by name. Journey bodies
    /// are defined in Rust, not TOML; this list only selects which
    /// registered journeys to execute.
    #[serde(default)]
    pub journeys: Vec<String>,
}

impl Config {
    /// Loads and parses a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parses a configuration document from a TOML string.
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("failed to parse TOML configuration")
    }
}

/// The benchmark target and how many times to measure it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub base_url: String,
    #[serde(default = "default_runs")]
    pub runs: u32,
    #[serde(default = "default_repetitions")]
    pub journey_repetitions: u32,
}

/// TOML-friendly mirror of [`DeviceConfig`]; converted at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        let d = DeviceConfig::default();
        DeviceSettings {
            width: d.width,
            height: d.height,
            device_scale_factor: d.device_scale_factor,
            is_mobile: d.is_mobile,
            has_touch: d.has_touch,
            user_agent: d.user_agent,
        }
    }
}

impl From<DeviceSettings> for DeviceConfig {
    fn from(s: DeviceSettings) -> Self {
        DeviceConfig {
            width: s.width,
            height: s.height,
            device_scale_factor: s.device_scale_factor,
            is_mobile: s.is_mobile,
            has_touch: s.has_touch,
            user_agent: s.user_agent,
        }
    }
}

/// Predefined network throttling profiles, converted to a [`NetworkConfig`]
/// at load time. `None` applies no emulation at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum NetworkProfile {
    /// Fast 3G network (1.6 Mbps down, 750 Kbps up, 562ms RTT).
    Fast3G,
    /// Slow 4G network (4 Mbps down, 3 Mbps up, 20ms RTT).
    Slow4G,
    /// No network (zero throughput).
    Offline,
    /// No throttling, no emulation applied.
    #[default]
    None,
}

impl NetworkProfile {
    pub fn download_bps(&self) -> Option<u64> {
        match self {
            NetworkProfile::Fast3G => Some(1_600_000 / 8),
            NetworkProfile::Slow4G => Some(4_000_000 / 8),
            NetworkProfile::Offline => Some(0),
            NetworkProfile::None => None,
        }
    }

    pub fn upload_bps(&self) -> Option<u64> {
        match self {
            NetworkProfile::Fast3G => Some(750_000 / 8),
            NetworkProfile::Slow4G => Some(3_000_000 / 8),
            NetworkProfile::Offline => Some(0),
            NetworkProfile::None => None,
        }
    }

    pub fn rtt_ms(&self) -> Option<u64> {
        match self {
            NetworkProfile::Fast3G => Some(562),
            NetworkProfile::Slow4G => Some(20),
            NetworkProfile::Offline => Some(0),
            NetworkProfile::None => None,
        }
    }

    /// Converts to the driver-level network config, or `None` when no
    /// emulation should be applied.
    pub fn to_network_config(self) -> Option<NetworkConfig> {
        match self {
            NetworkProfile::None => None,
            _ => Some(NetworkConfig {
                download_throughput: self.download_bps().unwrap_or(0) as f64,
                upload_throughput: self.upload_bps().unwrap_or(0) as f64,
                latency: self.rtt_ms().unwrap_or(0) as f64,
            }),
        }
    }
}
