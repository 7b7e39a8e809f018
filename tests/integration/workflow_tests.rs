//! Cloud workflows end to end: token exchange, heartbeat, switch sync,
//! sensor push, power-down.

use itemhub::adapters::HubPins;
use itemhub::app::{HubService, NetContext};
use itemhub::config::ModemConfig;
use itemhub::pins::{Pin, PinBank};

use crate::mock_modem::{http_payload, script_request, MockSleeper, ScriptedModem, TickClock};

const HOST: &str = "api.itemhub.io";
const PORT: u16 = 443;

fn service(modem: &ScriptedModem) -> HubService<ScriptedModem, TickClock> {
    HubService::new(modem.clone(), TickClock::new(), ModemConfig::default())
}

fn authed_ctx() -> NetContext {
    let mut ctx = NetContext::new();
    ctx.creds.token = "tok".into();
    ctx.creds.device_id = "dev-7".into();
    ctx
}

// ── Token exchange ────────────────────────────────────────────

#[test]
fn authenticate_success_returns_both_fields() {
    let payload = http_payload(
        "HTTP/1.1 200 OK",
        "{\"token\":\"tok\",\"deviceId\":\"dev-7\"}",
    );
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut ctx = NetContext::new();

    let auth = svc.authenticate(HOST, PORT, "{\"clientId\":\"c\",\"clientSecret\":\"s\"}", &mut ctx);

    assert_eq!(auth.token, "tok");
    assert_eq!(auth.device_id, "dev-7");
    assert!(modem.tx_contains("POST /api/v1/oauth/exchange-token-for-device HTTP/1.1"));
    // Token exchange itself is unauthenticated.
    assert!(!modem.tx_contains("Authorization"));
}

#[test]
fn authenticate_transport_failure_yields_empty_response() {
    let modem = ScriptedModem::new();
    let mut svc = service(&modem);
    let mut ctx = NetContext::new();

    let auth = svc.authenticate(HOST, PORT, "{}", &mut ctx);

    assert!(auth.is_empty());
    assert_eq!(ctx.retries.count(), 1);
}

#[test]
fn authenticate_unreadable_payload_yields_empty_response() {
    let payload = http_payload("HTTP/1.1 200 OK", "not json at all");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut ctx = NetContext::new();

    assert!(svc.authenticate(HOST, PORT, "{}", &mut ctx).is_empty());
    assert_eq!(ctx.retries.count(), 0);
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn heartbeat_posts_to_device_path_with_token() {
    let payload = http_payload("HTTP/1.1 200 OK", "{}");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut ctx = authed_ctx();

    let resp = svc.heartbeat(HOST, PORT, &mut ctx).unwrap();

    assert_eq!(resp.status, 200);
    assert!(modem.tx_contains("POST /api/v1/my/devices/dev-7/online HTTP/1.1"));
    assert!(modem.tx_contains("Authorization: Bearer tok"));
    assert!(ctx.creds.is_authenticated());
}

#[test]
fn heartbeat_rejection_clears_device_identity_only() {
    let payload = http_payload("HTTP/1.1 401 Unauthorized", "{}");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut ctx = authed_ctx();

    let resp = svc.heartbeat(HOST, PORT, &mut ctx).unwrap();

    assert_eq!(resp.status, 401);
    assert!(ctx.creds.device_id.is_empty());
    assert_eq!(ctx.creds.token, "tok");
    assert!(!ctx.creds.is_authenticated());
}

// ── Switch sync ───────────────────────────────────────────────

fn switch_bank() -> PinBank {
    PinBank::new(vec![
        Pin::switch(2, "D2"),
        Pin::switch(5, "D5"),
        Pin::sensor(4, "A0"),
    ])
}

#[test]
fn switch_sync_empty_array_is_a_noop_success() {
    let payload = http_payload("HTTP/1.1 200 OK", "[]");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut gpio = HubPins::new();
    let mut ctx = authed_ctx();

    assert!(svc.sync_switch_state(HOST, PORT, &switch_bank(), &mut gpio, &mut ctx));
    assert!(gpio.writes().is_empty());
    assert!(modem.tx_contains("GET /api/v1/my/devices/dev-7/switches HTTP/1.1"));
}

#[test]
fn switch_sync_drives_the_named_pin() {
    let payload = http_payload("HTTP/1.1 200 OK", "[{\"pin\":\"D2\",\"value\":0}]");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut gpio = HubPins::new();
    let mut ctx = authed_ctx();

    assert!(svc.sync_switch_state(HOST, PORT, &switch_bank(), &mut gpio, &mut ctx));
    // Only D2 (gpio 2) was addressed; D5 and the sensor stay untouched.
    assert_eq!(gpio.writes(), &[(2, false)]);
}

#[test]
fn switch_sync_drives_every_named_switch() {
    let payload = http_payload(
        "HTTP/1.1 200 OK",
        "[{\"pin\":\"D2\",\"value\":1},{\"pin\":\"D5\",\"value\":0}]",
    );
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut gpio = HubPins::new();
    let mut ctx = authed_ctx();

    assert!(svc.sync_switch_state(HOST, PORT, &switch_bank(), &mut gpio, &mut ctx));
    assert_eq!(gpio.writes(), &[(2, true), (5, false)]);
}

#[test]
fn switch_sync_rejection_clears_device_and_fails() {
    let payload = http_payload("HTTP/1.1 403 Forbidden", "[]");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut svc = service(&modem);
    let mut gpio = HubPins::new();
    let mut ctx = authed_ctx();

    assert!(!svc.sync_switch_state(HOST, PORT, &switch_bank(), &mut gpio, &mut ctx));
    assert!(ctx.creds.device_id.is_empty());
    assert!(gpio.writes().is_empty());
}

// ── Sensor push ───────────────────────────────────────────────

fn sensor_bank() -> PinBank {
    let mut a0 = Pin::sensor(4, "A0");
    a0.value = "17".into();
    let mut a1 = Pin::sensor(6, "A1");
    a1.value = "3".into();
    PinBank::new(vec![Pin::switch(2, "D2"), a0, a1])
}

#[test]
fn sensor_push_posts_each_sensor_value() {
    let ok = http_payload("HTTP/1.1 200 OK", "{}");
    let modem = script_request(script_request(ScriptedModem::new(), &ok), &ok);
    let mut svc = service(&modem);
    let mut ctx = authed_ctx();

    assert!(svc.push_sensor_readings(HOST, PORT, &sensor_bank(), &mut ctx));
    assert!(modem.tx_contains("POST /api/v1/my/devices/dev-7/sensors/A0 HTTP/1.1"));
    assert!(modem.tx_contains("POST /api/v1/my/devices/dev-7/sensors/A1 HTTP/1.1"));
    assert!(modem.tx_contains("{\"value\":17}"));
    assert!(modem.tx_contains("{\"value\":3}"));
}

#[test]
fn sensor_push_rejection_aborts_remaining_posts() {
    let rejected = http_payload("HTTP/1.1 403 Forbidden", "{}");
    let modem = script_request(ScriptedModem::new(), &rejected);
    let mut svc = service(&modem);
    let mut ctx = authed_ctx();

    assert!(!svc.push_sensor_readings(HOST, PORT, &sensor_bank(), &mut ctx));
    assert!(ctx.creds.device_id.is_empty());
    // The second sensor was never attempted.
    assert_eq!(modem.chunks_containing(" HTTP/1.1").len(), 1);
}

#[test]
fn sensor_push_partial_failure_is_not_success() {
    // First post answered, second starved.
    let ok = http_payload("HTTP/1.1 200 OK", "{}");
    let modem = script_request(ScriptedModem::new(), &ok)
        .on("AT+QSSLCLOSE", b"\r\nOK\r\n");
    let mut svc = service(&modem);
    let mut ctx = authed_ctx();

    assert!(!svc.push_sensor_readings(HOST, PORT, &sensor_bank(), &mut ctx));
    assert_eq!(ctx.retries.count(), 1);
}

// ── Power-down ────────────────────────────────────────────────

#[test]
fn shutdown_handshake_then_sleep() {
    let modem = ScriptedModem::new().on("AT+QPOWD=0", b"\r\nOK\r\n");
    let mut svc = service(&modem);
    let mut sleeper = MockSleeper::default();
    let mut ctx = authed_ctx();

    svc.shutdown_and_sleep(60, &mut sleeper, &mut ctx).unwrap();

    assert!(modem.tx_contains("AT+QPOWD=0"));
    assert_eq!(sleeper.slept, [60]);
    assert_eq!(ctx.retries.count(), 0);
}

#[test]
fn unacknowledged_shutdown_skips_the_sleep() {
    let modem = ScriptedModem::new();
    let mut svc = service(&modem);
    let mut sleeper = MockSleeper::default();
    let mut ctx = authed_ctx();

    svc.shutdown_and_sleep(60, &mut sleeper, &mut ctx).unwrap_err();

    assert!(sleeper.slept.is_empty());
    assert_eq!(ctx.retries.count(), 1);
}
