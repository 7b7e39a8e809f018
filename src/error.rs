//! Unified error types for the hub firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! duty-cycle loop's error handling uniform. All variants are `Copy` so they
//! can be passed around without allocation.
//!
//! Failure taxonomy:
//! - [`Error::Timeout`] — no matching modem line arrived before a deadline.
//!   Each timeout bumps the shared retry counter by exactly one, at the call
//!   site that observed it.
//! - [`Error::Frame`] — the receive notification or one of its fields was
//!   missing or malformed. Never bumps the retry counter.
//! - [`Error::Serial`] — the byte channel itself failed.

use core::fmt;

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A `wait_for` deadline expired at the given step.
    Timeout(Step),
    /// The modem's receive notification could not be parsed.
    Frame(FrameError),
    /// A request was started while a TLS session is still live.
    SessionBusy,
    /// The serial channel returned an error.
    Serial(&'static str),
    /// The rendered request did not fit the transmit buffer.
    RequestTooLarge,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(step) => write!(f, "timeout at {step}"),
            Self::Frame(e) => write!(f, "receive parse: {e}"),
            Self::SessionBusy => write!(f, "a TLS session is already open"),
            Self::Serial(msg) => write!(f, "serial: {msg}"),
            Self::RequestTooLarge => write!(f, "request exceeds transmit buffer"),
        }
    }
}

/// Where a command/response deadline expired.
///
/// `Probe` through `CertAck` are bootstrap steps; the rest belong to the
/// per-request transport and the power controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Probe,
    DataContext,
    DnsConfig,
    TlsPolicy,
    CertPrompt,
    CertAck,
    SocketOpen,
    OpenConfirm,
    SendPrompt,
    SendAck,
    PowerDown,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Probe => "liveness probe",
            Self::DataContext => "data-context query",
            Self::DnsConfig => "DNS config",
            Self::TlsPolicy => "TLS policy",
            Self::CertPrompt => "CA upload prompt",
            Self::CertAck => "CA upload ack",
            Self::SocketOpen => "socket open",
            Self::OpenConfirm => "open confirmation",
            Self::SendPrompt => "send prompt",
            Self::SendAck => "send ack",
            Self::PowerDown => "modem power-down",
        };
        f.write_str(name)
    }
}

/// Receive-side framing failures.
///
/// Every field the framing code slices out has an explicit precondition, and
/// a missing precondition is a typed failure instead of an out-of-bounds
/// slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The `+QSSLURC: "recv",` tag never appeared in the collected bytes.
    MissingRecvTag,
    /// The decimal length field after the tag is absent or not a short
    /// digit run.
    BadLengthField,
    /// No opening quote before the payload.
    MissingPayloadQuote,
    /// Fewer payload bytes arrived than the notification declared.
    TruncatedPayload,
    /// No `keep-alive` marker in a framed HTTP response.
    MissingKeepAlive,
    /// The hex content-length line is absent or not a short hex digit run.
    BadHexLength,
    /// The framed body runs past the end of the response.
    BodyOutOfBounds,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingRecvTag => "receive tag missing",
            Self::BadLengthField => "bad declared length",
            Self::MissingPayloadQuote => "payload quote missing",
            Self::TruncatedPayload => "payload truncated",
            Self::MissingKeepAlive => "keep-alive marker missing",
            Self::BadHexLength => "bad hex content length",
            Self::BodyOutOfBounds => "body out of bounds",
        };
        f.write_str(name)
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
