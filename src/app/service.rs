//! Cloud workflows — the hexagonal core.
//!
//! [`HubService`] owns the request transport and exposes the four cloud
//! operations the duty-cycle loop runs: authenticate, heartbeat, switch
//! sync, sensor push — plus modem provisioning and the end-of-cycle sleep.
//! All I/O flows through port traits injected at construction or call
//! sites, so the whole service runs against the scripted mock modem in
//! `tests/integration/`.
//!
//! ```text
//!  SerialPort ──▶ ┌────────────────────────┐ ──▶ PinPort
//!                 │       HubService        │
//!      Clock ──▶  │  transport · workflows  │ ──▶ SleepPort
//!                 └────────────────────────┘
//! ```

use log::{info, warn};
use serde::Deserialize;

use crate::app::context::NetContext;
use crate::app::ports::{Clock, PinPort, SerialPort, SleepPort};
use crate::config::ModemConfig;
use crate::error::Result;
use crate::modem::response;
use crate::modem::transport::{HttpResponse, RequestSpec, Transport};
use crate::modem::{bootstrap, power};
use crate::pins::PinBank;

// ───────────────────────────────────────────────────────────────
// Wire payloads
// ───────────────────────────────────────────────────────────────

/// Result of the token-exchange workflow. Both fields are empty on any
/// failure — transport, framing or JSON.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub device_id: String,
}

impl AuthResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty() && self.device_id.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    token: String,
    #[serde(rename = "deviceId", default)]
    device_id: String,
}

/// One entry of the cloud's switch-state array.
#[derive(Debug, Deserialize)]
struct SwitchCommand {
    pin: String,
    value: u8,
}

// ───────────────────────────────────────────────────────────────
// HubService
// ───────────────────────────────────────────────────────────────

/// The workflow service. Owns the transport (and with it the serial
/// channel — one request in flight, ever).
pub struct HubService<S: SerialPort, C: Clock> {
    transport: Transport<S, C>,
    timing: ModemConfig,
}

impl<S: SerialPort, C: Clock> HubService<S, C> {
    pub fn new(serial: S, clock: C, timing: ModemConfig) -> Self {
        Self {
            transport: Transport::new(serial, clock, timing.clone()),
            timing,
        }
    }

    // ── Provisioning ──────────────────────────────────────────

    /// Run the one-shot modem bootstrap (network, DNS, TLS policy, CA).
    pub fn provision(&mut self, ca_cert: &[u8], ctx: &mut NetContext) -> Result<()> {
        bootstrap::provision(
            self.transport.channel_mut(),
            ca_cert,
            &self.timing,
            &mut ctx.retries,
        )
    }

    // ── Authenticate ──────────────────────────────────────────

    /// Exchange client credentials for a bearer token and device identity.
    pub fn authenticate(
        &mut self,
        host: &str,
        port: u16,
        body: &str,
        ctx: &mut NetContext,
    ) -> AuthResponse {
        info!("authenticate");
        let spec = RequestSpec::post("/api/v1/oauth/exchange-token-for-device", host, port)
            .with_body(body);
        let resp = match self.transport.request(&spec, &mut ctx.retries) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("authenticate transport failed: {e}");
                return AuthResponse::empty();
            }
        };
        let framed = match response::framed_body(&resp.body) {
            Ok(framed) => framed,
            Err(e) => {
                warn!("authenticate body framing failed: {e}");
                return AuthResponse::empty();
            }
        };
        match serde_json::from_slice::<AuthPayload>(framed) {
            Ok(payload) => AuthResponse {
                token: payload.token,
                device_id: payload.device_id,
            },
            Err(e) => {
                warn!("authenticate payload unreadable: {e}");
                AuthResponse::empty()
            }
        }
    }

    // ── Heartbeat ─────────────────────────────────────────────

    /// Tell the cloud this device is online. A 401/403 clears the stored
    /// device identity so the next cycle re-authenticates.
    pub fn heartbeat(&mut self, host: &str, port: u16, ctx: &mut NetContext) -> Result<HttpResponse> {
        info!("heartbeat");
        let NetContext { retries, creds } = ctx;
        let path = format!("/api/v1/my/devices/{}/online", creds.device_id);
        let spec = RequestSpec::post(&path, host, port).with_token(&creds.token);
        let resp = self.transport.request(&spec, retries)?;
        if resp.is_auth_rejected() {
            warn!("heartbeat rejected ({}), clearing device id", resp.status);
            creds.clear_device();
        }
        Ok(resp)
    }

    // ── Switch sync ───────────────────────────────────────────

    /// Pull the cloud's switch states and drive matching switch-mode pins.
    ///
    /// Entries match pins by exact name; an empty array is a no-op success.
    pub fn sync_switch_state(
        &mut self,
        host: &str,
        port: u16,
        pins: &PinBank,
        gpio: &mut impl PinPort,
        ctx: &mut NetContext,
    ) -> bool {
        info!("sync switch state");
        let NetContext { retries, creds } = ctx;
        let path = format!("/api/v1/my/devices/{}/switches", creds.device_id);
        let spec = RequestSpec::get(&path, host, port).with_token(&creds.token);
        let resp = match self.transport.request(&spec, retries) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("switch sync failed: {e}");
                return false;
            }
        };
        if resp.is_auth_rejected() {
            warn!("switch sync rejected ({}), clearing device id", resp.status);
            creds.clear_device();
            return false;
        }
        let framed = match response::framed_body(&resp.body) {
            Ok(framed) => framed,
            Err(e) => {
                warn!("switch sync body framing failed: {e}");
                return false;
            }
        };
        let commands: Vec<SwitchCommand> = match serde_json::from_slice(framed) {
            Ok(commands) => commands,
            Err(e) => {
                warn!("switch sync payload unreadable: {e}");
                return false;
            }
        };
        if commands.is_empty() {
            return true;
        }
        for pin in pins.switches() {
            for command in &commands {
                if command.pin == pin.name && command.value <= 1 {
                    if let Err(e) = gpio.set_level(pin.gpio, command.value == 1) {
                        warn!("pin {} drive failed: {e}", pin.name);
                    }
                }
            }
        }
        true
    }

    // ── Sensor push ───────────────────────────────────────────

    /// Post every sensor-mode pin's value individually.
    ///
    /// Success only if every post succeeded. A 401/403 clears the device
    /// identity and aborts the remaining posts.
    pub fn push_sensor_readings(
        &mut self,
        host: &str,
        port: u16,
        pins: &PinBank,
        ctx: &mut NetContext,
    ) -> bool {
        info!("push sensor readings");
        let NetContext { retries, creds } = ctx;
        let mut expected = 0u32;
        let mut sent = 0u32;
        for pin in pins.sensors() {
            expected += 1;
            let path = format!(
                "/api/v1/my/devices/{}/sensors/{}",
                creds.device_id, pin.name
            );
            let body = format!("{{\"value\":{}}}", pin.value);
            let spec = RequestSpec::post(&path, host, port)
                .with_token(&creds.token)
                .with_body(&body);
            match self.transport.request(&spec, retries) {
                Err(e) => {
                    warn!("sensor {} push failed: {e}", pin.name);
                }
                Ok(resp) if resp.is_auth_rejected() => {
                    warn!(
                        "sensor push rejected ({}), clearing device id",
                        resp.status
                    );
                    creds.clear_device();
                    return false;
                }
                Ok(_) => sent += 1,
            }
        }
        sent == expected
    }

    // ── Sleep ─────────────────────────────────────────────────

    /// Power the modem down and suspend the host for `seconds`.
    pub fn shutdown_and_sleep(
        &mut self,
        seconds: u32,
        sleeper: &mut impl SleepPort,
        ctx: &mut NetContext,
    ) -> Result<()> {
        power::shutdown_and_sleep(
            self.transport.channel_mut(),
            sleeper,
            seconds,
            &self.timing,
            &mut ctx.retries,
        )
    }
}
