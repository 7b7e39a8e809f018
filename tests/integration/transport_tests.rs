//! Request transport state machine against the scripted modem.

use itemhub::app::RetryCounter;
use itemhub::config::ModemConfig;
use itemhub::error::{Error, FrameError, Step};
use itemhub::modem::response;
use itemhub::modem::{RequestSpec, SessionState, Transport};

use crate::mock_modem::{http_payload, script_request, ScriptedModem, TickClock};

fn transport(modem: &ScriptedModem) -> Transport<ScriptedModem, TickClock> {
    Transport::new(modem.clone(), TickClock::new(), ModemConfig::default())
}

#[test]
fn full_request_cycle_harvests_the_response() {
    let payload = http_payload("HTTP/1.1 200 OK", "{\"ok\":true}");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut t = transport(&modem);
    let mut retries = RetryCounter::new();

    let spec = RequestSpec::get("/api/v1/ping", "api.itemhub.io", 443);
    let resp = t.request(&spec, &mut retries).unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.declared_len, payload.len());
    assert_eq!(response::framed_body(&resp.body).unwrap(), b"{\"ok\":true}");
    assert_eq!(retries.count(), 0);
    assert_eq!(t.session(), SessionState::NotConnected);
    assert!(modem.tx_contains("AT+QSSLOPEN=1,0,\"api.itemhub.io\",443,0"));
    assert!(modem.tx_contains("AT+QSSLCLOSE=1,0"));
}

#[test]
fn advertised_send_length_equals_transmitted_bytes() {
    let payload = http_payload("HTTP/1.1 200 OK", "{}");
    let modem = script_request(ScriptedModem::new(), &payload);
    let mut t = transport(&modem);
    let mut retries = RetryCounter::new();

    let spec = RequestSpec::post("/api/v1/echo", "h.example", 443).with_body("{\"v\":1}");
    t.request(&spec, &mut retries).unwrap();

    let sent = &modem.chunks_containing(" HTTP/1.1")[0];
    let send_cmd = modem.chunks_containing("AT+QSSLSEND=1,0,")[0].clone();
    let cmd_text = String::from_utf8(send_cmd).unwrap();
    let advertised: usize = cmd_text
        .rsplit(',')
        .next()
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert_eq!(advertised, sent.len());
}

#[test]
fn send_timeout_still_closes_the_socket() {
    // Prompt arrives, the acknowledgement never does.
    let modem = ScriptedModem::new()
        .on("AT+QSSLOPEN", b"\r\nOK\r\n+QSSLOPEN: 1,0,0\r\n")
        .on("AT+QSSLSEND", b"> ")
        .on("AT+QSSLCLOSE", b"\r\nOK\r\n");
    let mut t = transport(&modem);
    let mut retries = RetryCounter::new();

    let spec = RequestSpec::get("/x", "h.example", 443);
    let err = t.request(&spec, &mut retries).unwrap_err();

    assert_eq!(err, Error::Timeout(Step::SendAck));
    assert_eq!(retries.count(), 1);
    assert_eq!(t.session(), SessionState::NotConnected);
    assert!(modem.tx_contains("AT+QSSLCLOSE=1,0"));
}

#[test]
fn open_timeout_bumps_counter_once() {
    let modem = ScriptedModem::new();
    let mut t = transport(&modem);
    let mut retries = RetryCounter::new();

    let err = t
        .request(&RequestSpec::get("/x", "h.example", 443), &mut retries)
        .unwrap_err();

    assert_eq!(err, Error::Timeout(Step::SocketOpen));
    assert_eq!(retries.count(), 1);
    assert!(modem.tx_contains("AT+QSSLCLOSE=1,0"));
}

#[test]
fn unparseable_receive_is_a_frame_error_and_counts_no_timeout() {
    // A full exchange whose collected bytes carry no receive tag.
    let modem = ScriptedModem::new()
        .on("AT+QSSLOPEN", b"\r\nOK\r\n+QSSLOPEN: 1,0,0\r\n")
        .on("AT+QSSLSEND", b"> ")
        .on(" HTTP/1.1", b"\r\n+QSSLSEND: 1,0\r\nnoise without a tag\r\n")
        .on("AT+QSSLCLOSE", b"\r\nOK\r\n");
    let mut t = transport(&modem);
    let mut retries = RetryCounter::new();

    let err = t
        .request(&RequestSpec::get("/x", "h.example", 443), &mut retries)
        .unwrap_err();

    assert_eq!(err, Error::Frame(FrameError::MissingRecvTag));
    assert_eq!(retries.count(), 0);
    assert_eq!(t.session(), SessionState::NotConnected);
}

#[test]
fn transport_is_reusable_after_a_failed_request() {
    let payload = http_payload("HTTP/1.1 200 OK", "{}");
    // First open is rejected; the retry is fully scripted.
    let modem = ScriptedModem::new()
        .on("AT+QSSLOPEN", b"\r\nERROR\r\n")
        .on("AT+QSSLCLOSE", b"\r\nOK\r\n");
    let modem = script_request(modem, &payload);
    let mut t = transport(&modem);
    let mut retries = RetryCounter::new();

    let spec = RequestSpec::get("/x", "h.example", 443);
    let err = t.request(&spec, &mut retries).unwrap_err();
    assert_eq!(err, Error::Timeout(Step::SocketOpen));
    assert_eq!(t.session(), SessionState::NotConnected);

    let resp = t.request(&spec, &mut retries).unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(retries.count(), 1);
}
