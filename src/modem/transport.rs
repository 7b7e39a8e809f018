//! Per-request TLS transport over the modem's socket primitives.
//!
//! One call to [`Transport::request`] drives the whole
//! open → send → receive → close cycle:
//!
//! ```text
//! Idle → OpeningSocket → AwaitingOpenConfirmation → AwaitingSendPrompt
//!      → Transmitting → AwaitingSendAck → CollectingResponse → close
//! ```
//!
//! There is a single exit path per request: whatever the outcome, the socket
//! close is attempted exactly once, and close failures are logged rather
//! than surfaced. The engine owns the serial channel exclusively; only one
//! request may be in flight.

use core::fmt::Write as _;

use log::{debug, warn};

use crate::app::context::RetryCounter;
use crate::config::ModemConfig;
use crate::error::{Error, Result, Step};
use crate::modem::channel::{AtChannel, Match};
use crate::modem::response;

use crate::app::ports::{Clock, SerialPort};

/// Capacity of the rendered request buffer.
pub const REQ_MAX: usize = 1024;

/// Capacity of the collected response buffer (and response bodies).
pub const RESP_MAX: usize = 2048;

/// Settle delay between the send prompt and the payload write.
const SEND_SETTLE_MS: u64 = 500;

const CLOSE_CMD: &str = "AT+QSSLCLOSE=1,0";

// ───────────────────────────────────────────────────────────────
// Request description
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Everything needed to render one HTTP request.
///
/// A body is only meaningful for POST; GET requests never carry a body or a
/// `Content-Length` header regardless of what the caller supplies.
#[derive(Debug, Clone, Copy)]
pub struct RequestSpec<'a> {
    pub method: Method,
    pub path: &'a str,
    pub host: &'a str,
    pub port: u16,
    /// Extra headers, emitted in order after the fixed set.
    pub extra_headers: &'a [(&'a str, &'a str)],
    token: Option<&'a str>,
    body: Option<&'a str>,
}

impl<'a> RequestSpec<'a> {
    pub fn get(path: &'a str, host: &'a str, port: u16) -> Self {
        Self::new(Method::Get, path, host, port)
    }

    pub fn post(path: &'a str, host: &'a str, port: u16) -> Self {
        Self::new(Method::Post, path, host, port)
    }

    fn new(method: Method, path: &'a str, host: &'a str, port: u16) -> Self {
        Self {
            method,
            path,
            host,
            port,
            extra_headers: &[],
            token: None,
            body: None,
        }
    }

    /// Attach a bearer token. An empty token attaches nothing.
    pub fn with_token(mut self, token: &'a str) -> Self {
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn with_body(mut self, body: &'a str) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_headers(mut self, headers: &'a [(&'a str, &'a str)]) -> Self {
        self.extra_headers = headers;
        self
    }

    /// Render the complete wire text, including the trailing terminator.
    ///
    /// The byte count advertised to the modem is taken from this buffer's
    /// length, and the buffer is transmitted unchanged, so the advertised
    /// count always equals the bytes written.
    pub fn render(&self) -> Result<heapless::Vec<u8, REQ_MAX>> {
        let mut buf: heapless::Vec<u8, REQ_MAX> = heapless::Vec::new();

        push(&mut buf, self.method.as_str().as_bytes())?;
        push(&mut buf, b" ")?;
        push(&mut buf, self.path.as_bytes())?;
        push(&mut buf, b" HTTP/1.1\nHost: ")?;
        push(&mut buf, self.host.as_bytes())?;
        push(
            &mut buf,
            b"\nUser-Agent: ItemHub\nContent-Type: application/json\nAccept: */*\n",
        )?;

        for (name, value) in self.extra_headers {
            push(&mut buf, name.as_bytes())?;
            push(&mut buf, b": ")?;
            push(&mut buf, value.as_bytes())?;
            push(&mut buf, b"\n")?;
        }

        if let Some(token) = self.token {
            push(&mut buf, b"Authorization: Bearer ")?;
            push(&mut buf, token.as_bytes())?;
            push(&mut buf, b"\n")?;
        }

        if self.method == Method::Post {
            let body = self.body.unwrap_or("");
            let mut len: heapless::String<10> = heapless::String::new();
            write!(len, "{}", body.len()).map_err(|_| Error::RequestTooLarge)?;
            push(&mut buf, b"Content-Length: ")?;
            push(&mut buf, len.as_bytes())?;
            push(&mut buf, b"\n\n")?;
            push(&mut buf, body.as_bytes())?;
        }

        push(&mut buf, b"\n")?;
        Ok(buf)
    }
}

fn push<const N: usize>(buf: &mut heapless::Vec<u8, N>, bytes: &[u8]) -> Result<()> {
    buf.extend_from_slice(bytes)
        .map_err(|()| Error::RequestTooLarge)
}

// ───────────────────────────────────────────────────────────────
// Response
// ───────────────────────────────────────────────────────────────

/// One harvested server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status; [`response::STATUS_UNDETERMINED`] when no status line
    /// was found.
    pub status: u16,
    /// The length the receive notification declared.
    pub declared_len: usize,
    /// Raw response text (status line, headers, framed body).
    pub body: heapless::Vec<u8, RESP_MAX>,
}

impl HttpResponse {
    /// Response text as UTF-8; empty if the payload is not valid UTF-8.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.body).unwrap_or("")
    }

    pub fn is_auth_rejected(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

// ───────────────────────────────────────────────────────────────
// Session + transport
// ───────────────────────────────────────────────────────────────

/// Lifecycle of the single TLS socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotConnected,
    Opening,
    Open,
    Closing,
}

/// The request transport engine. Owns the AT channel.
pub struct Transport<S: SerialPort, C: Clock> {
    chan: AtChannel<S, C>,
    session: SessionState,
    timing: ModemConfig,
}

impl<S: SerialPort, C: Clock> Transport<S, C> {
    pub fn new(serial: S, clock: C, timing: ModemConfig) -> Self {
        Self {
            chan: AtChannel::new(serial, clock),
            session: SessionState::NotConnected,
            timing,
        }
    }

    /// Borrow the underlying channel (bootstrap and power-down drive it
    /// directly between requests).
    pub fn channel_mut(&mut self) -> &mut AtChannel<S, C> {
        &mut self.chan
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Execute one request end to end.
    ///
    /// On success the session is back to `NotConnected`. On failure the
    /// close has still been attempted — a request never leaves a socket
    /// behind for the next call to trip over. Timeouts bump `retries`;
    /// framing failures do not.
    pub fn request(
        &mut self,
        spec: &RequestSpec<'_>,
        retries: &mut RetryCounter,
    ) -> Result<HttpResponse> {
        if self.session != SessionState::NotConnected {
            return Err(Error::SessionBusy);
        }
        let outcome = self.drive(spec, retries);
        self.close_best_effort();
        outcome
    }

    fn drive(
        &mut self,
        spec: &RequestSpec<'_>,
        retries: &mut RetryCounter,
    ) -> Result<HttpResponse> {
        self.session = SessionState::Opening;

        let mut open_cmd: heapless::String<160> = heapless::String::new();
        write!(
            open_cmd,
            "AT+QSSLOPEN=1,0,\"{}\",{},0",
            spec.host, spec.port
        )
        .map_err(|_| Error::RequestTooLarge)?;
        self.chan.send(&open_cmd)?;
        if !self
            .chan
            .wait_for(Match::Exact("OK"), self.timing.open_timeout_ms)
        {
            retries.note_timeout();
            return Err(Error::Timeout(Step::SocketOpen));
        }
        if !self
            .chan
            .wait_for(Match::Prefix("+QSSLOPEN"), self.timing.open_timeout_ms)
        {
            retries.note_timeout();
            return Err(Error::Timeout(Step::OpenConfirm));
        }
        self.session = SessionState::Open;
        debug!("TLS session open to {}:{}", spec.host, spec.port);

        let payload = spec.render()?;
        let mut send_cmd: heapless::String<32> = heapless::String::new();
        write!(send_cmd, "AT+QSSLSEND=1,0,{}", payload.len())
            .map_err(|_| Error::RequestTooLarge)?;
        self.chan.send(&send_cmd)?;
        if !self
            .chan
            .wait_for(Match::Exact(">"), self.timing.open_timeout_ms)
        {
            retries.note_timeout();
            return Err(Error::Timeout(Step::SendPrompt));
        }

        self.chan.pause(SEND_SETTLE_MS);
        self.chan.write_raw(&payload)?;
        if !self
            .chan
            .wait_for(Match::Prefix("+QSSLSEND"), self.timing.send_ack_timeout_ms)
        {
            retries.note_timeout();
            return Err(Error::Timeout(Step::SendAck));
        }

        let mut raw: heapless::Vec<u8, RESP_MAX> = heapless::Vec::new();
        self.chan
            .collect_for(self.timing.collect_window_ms, &mut raw);

        let frame = response::receive_frame(&raw)?;
        let status = response::status_code(frame.payload);
        let body = heapless::Vec::from_slice(frame.payload)
            .map_err(|()| Error::Frame(crate::error::FrameError::TruncatedPayload))?;

        Ok(HttpResponse {
            status,
            declared_len: frame.declared_len,
            body,
        })
    }

    /// The single close path. Close errors are logged, never propagated,
    /// and never bump the retry counter.
    fn close_best_effort(&mut self) {
        self.session = SessionState::Closing;
        match self.chan.send(CLOSE_CMD) {
            Ok(()) => {
                if !self
                    .chan
                    .wait_for(Match::Exact("OK"), self.timing.close_timeout_ms)
                {
                    warn!("socket close unacknowledged");
                }
            }
            Err(e) => warn!("socket close failed: {e}"),
        }
        self.session = SessionState::NotConnected;
    }
}
