//! Receive-side parsing of raw modem/HTTP text.
//!
//! The modem wraps server data in a `+QSSLURC: "recv",…` notification, and
//! the cloud answers with HTTP/1.1 responses whose body is framed behind a
//! `keep-alive` header and a hex length line. Each field extracted here has
//! an explicit precondition; a violated precondition is a typed
//! [`FrameError`], never an out-of-bounds slice.
//!
//! Length fields are capped at the handful-of-digits wire contract before
//! they reach [`parse_digits`](super::numeric::parse_digits), whose
//! documented contract excludes overflow handling.

use crate::error::FrameError;
use crate::modem::numeric::{all_decimal, all_lower_hex, parse_digits};

/// Vendor receive-notification tag, verbatim wire contract.
pub const RECV_TAG: &[u8] = b"+QSSLURC: \"recv\",";

/// Marker locating the hex content-length line in a framed response.
const KEEP_ALIVE: &[u8] = b"keep-alive";

/// Status sentinel meaning "undeterminable", not a genuine server error.
pub const STATUS_UNDETERMINED: u16 = 500;

/// Decimal length fields are at most five digits on this wire.
const MAX_DECIMAL_DIGITS: usize = 5;

/// Hex content-length fields are at most four digits on this wire.
const MAX_HEX_DIGITS: usize = 4;

/// A parsed receive notification: the declared length and exactly that many
/// payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveFrame<'a> {
    pub declared_len: usize,
    pub payload: &'a [u8],
}

/// Locate and slice the payload out of a collected receive buffer.
///
/// The decimal length sits between the second and third comma after the
/// tag; the payload starts immediately after the following quote and runs
/// for exactly the declared length.
pub fn receive_frame(raw: &[u8]) -> Result<ReceiveFrame<'_>, FrameError> {
    let tag = find(raw, RECV_TAG).ok_or(FrameError::MissingRecvTag)?;
    let after = &raw[tag + RECV_TAG.len()..];

    let c1 = find_byte(after, 0, b',').ok_or(FrameError::BadLengthField)?;
    let c2 = find_byte(after, c1 + 1, b',').ok_or(FrameError::BadLengthField)?;
    let c3 = find_byte(after, c2 + 1, b',').ok_or(FrameError::BadLengthField)?;
    let field = &after[c2 + 1..c3];
    if field.is_empty() || field.len() > MAX_DECIMAL_DIGITS || !all_decimal(field) {
        return Err(FrameError::BadLengthField);
    }
    let declared_len = parse_digits(field, 10) as usize;

    let quote = find_byte(after, 0, b'"').ok_or(FrameError::MissingPayloadQuote)?;
    let start = quote + 1;
    let payload = after
        .get(start..start + declared_len)
        .ok_or(FrameError::TruncatedPayload)?;

    Ok(ReceiveFrame {
        declared_len,
        payload,
    })
}

/// Extract the HTTP status code from raw response text.
///
/// The three status digits begin nine positions after the start of the
/// literal `HTTP/1.1`. A missing or malformed status line yields
/// [`STATUS_UNDETERMINED`].
pub fn status_code(raw: &[u8]) -> u16 {
    let Some(at) = find(raw, b"HTTP/1.1") else {
        return STATUS_UNDETERMINED;
    };
    match raw.get(at + 9..at + 12) {
        Some(digits) if all_decimal(digits) => parse_digits(digits, 10) as u16,
        _ => STATUS_UNDETERMINED,
    }
}

/// Extract the body from a fully framed HTTP response.
///
/// The lowercase-hex length field starts four characters past the end of the
/// `keep-alive` match and runs to the next line terminator (a trailing `\r`
/// is not part of the field); the body is the following `length` bytes.
pub fn framed_body(raw: &[u8]) -> Result<&[u8], FrameError> {
    let ka = find(raw, KEEP_ALIVE).ok_or(FrameError::MissingKeepAlive)?;
    let start = ka + KEEP_ALIVE.len() + 4;
    if start >= raw.len() {
        return Err(FrameError::BadHexLength);
    }

    let nl = find_byte(raw, start + 1, b'\n').ok_or(FrameError::BadHexLength)?;
    let mut field = &raw[start..nl];
    if let [head @ .., b'\r'] = field {
        field = head;
    }
    if field.is_empty() || field.len() > MAX_HEX_DIGITS || !all_lower_hex(field) {
        return Err(FrameError::BadHexLength);
    }
    let len = parse_digits(field, 16) as usize;

    raw.get(nl + 1..nl + 1 + len)
        .ok_or(FrameError::BodyOutOfBounds)
}

/// First occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn find_byte(haystack: &[u8], from: usize, byte: u8) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == byte)
        .map(|i| i + from)
}
