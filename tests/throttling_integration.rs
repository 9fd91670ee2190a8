//! Integration tests for network emulation end to end: parsing a run
//! configuration's network profile and applying the resulting
//! [`NetworkConfig`] through the browser driver's control channel.

mod common;
use common::browser;

use vitalscope::capture::DeviceConfig;
use vitalscope::config::{Config, NetworkProfile};
use vitalscope::driver::{BrowserDriver, ChromiumoxideDriver};

#[test]
fn fast3g_profile_parses_from_config_and_converts() {
    let toml = r#"
        network = "Fast3G"

        [target]
        base_url = "https://example.com"
    "#;
    let config = Config::from_str(toml).expect("config should parse");
    assert_eq!(config.network, NetworkProfile::Fast3G);

    let network = config.network.to_network_config().expect("fast3g emulates");
    assert_eq!(network.download_throughput, 200_000.0);
    assert_eq!(network.upload_throughput, 93_750.0);
    assert_eq!(network.latency, 562.0);
}

#[test]
fn offline_profile_zeroes_throughput() {
    let network = NetworkProfile::Offline
        .to_network_config()
        .expect("offline still emulates, at zero throughput");
    assert_eq!(network.download_throughput, 0.0);
    assert_eq!(network.upload_throughput, 0.0);
}

#[tokio::test]
async fn network_profile_applies_through_control_channel() {
    skip_if_no_chrome!();

    let toml = r#"
        network = "Slow4G"

        [target]
        base_url = "https://example.com"
    "#;
    let config = Config::from_str(toml).expect("config should parse");
    let network = config.network.to_network_config();

    let driver = ChromiumoxideDriver::launch().await.expect("should launch");
    let tab = driver
        .new_tab(&DeviceConfig::default())
        .await
        .expect("should open tab");
    let control = tab
        .control_channel()
        .await
        .expect("should open control channel");

    control
        .emulate_network(network.as_ref())
        .await
        .expect("should apply slow4g emulation");

    tab.close().await.expect("should close tab");
    Box::new(driver).close().await.expect("should close browser");
}
