//! The AT-command transport engine for the Quectel BC26 cellular modem.
//!
//! - [`channel`] — command writer + deadline-driven line matcher.
//! - [`numeric`] — positional digit decoder for embedded numeric fields.
//! - [`bootstrap`] — one-shot network/TLS/CA provisioning.
//! - [`transport`] — the per-request open/send/receive/close state machine.
//! - [`response`] — receive-notification and HTTP framing extraction.
//! - [`power`] — graceful modem shutdown + timed host suspend.

pub mod bootstrap;
pub mod channel;
pub mod numeric;
pub mod power;
pub mod response;
pub mod transport;

pub use channel::{AtChannel, Match};
pub use transport::{HttpResponse, Method, RequestSpec, SessionState, Transport};
