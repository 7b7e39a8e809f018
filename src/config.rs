//! System configuration parameters.
//!
//! Deadlines default to the values the deployed fleet runs with; they are
//! cellular-latency-scale, so a single request can legitimately take tens of
//! seconds end to end.

use serde::{Deserialize, Serialize};

/// AT-channel deadlines and UART settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemConfig {
    /// UART baud rate to the modem.
    pub baud: u32,
    /// Liveness probe (`AT`) deadline.
    pub probe_timeout_ms: u64,
    /// Deadline for each provisioning step.
    pub provision_timeout_ms: u64,
    /// Socket open / open confirmation / send prompt deadline.
    pub open_timeout_ms: u64,
    /// Send acknowledgement deadline.
    pub send_ack_timeout_ms: u64,
    /// Fixed response-collection window.
    pub collect_window_ms: u64,
    /// Socket close acknowledgement deadline.
    pub close_timeout_ms: u64,
    /// Modem power-down acknowledgement deadline.
    pub power_down_timeout_ms: u64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            baud: 115_200,
            probe_timeout_ms: 2_000,
            provision_timeout_ms: 5_000,
            open_timeout_ms: 60_000,
            send_ack_timeout_ms: 5_000,
            collect_window_ms: 5_000,
            close_timeout_ms: 10_000,
            power_down_timeout_ms: 5_000,
        }
    }
}

/// Top-level hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Cloud API host.
    pub api_host: String,
    /// Cloud API TLS port.
    pub api_port: u16,
    /// OAuth client id presented to the token-exchange endpoint.
    pub client_id: String,
    /// OAuth client secret presented to the token-exchange endpoint.
    pub client_secret: String,
    /// Seconds of deep sleep between duty cycles.
    pub sleep_secs: u32,
    /// Maximum provisioning attempts per wake before giving up until the
    /// next cycle.
    pub reprovision_threshold: u32,
    pub modem: ModemConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_host: "api.itemhub.io".into(),
            api_port: 443,
            client_id: String::new(),
            client_secret: String::new(),
            sleep_secs: 60,
            reprovision_threshold: 3,
            modem: ModemConfig::default(),
        }
    }
}

impl HubConfig {
    /// JSON body for the token-exchange request.
    pub fn auth_body(&self) -> String {
        serde_json::json!({
            "clientId": self.client_id,
            "clientSecret": self.client_secret,
        })
        .to_string()
    }
}
