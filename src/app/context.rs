//! Shared mutable state threaded through every transport operation.
//!
//! Bootstrap, transport and the workflows all share a timeout tally and the
//! device credentials. That state lives in an explicit [`NetContext`] owned
//! by the duty-cycle loop — no process-wide singleton — and is passed by
//! mutable reference, which the single-threaded control model makes
//! race-free by construction.

use log::warn;

// ───────────────────────────────────────────────────────────────
// Retry counter
// ───────────────────────────────────────────────────────────────

/// Counts command/response timeouts across bootstrap, transport and power
/// operations.
///
/// Contract: +1 per distinct `wait_for` timeout, recorded by the caller that
/// observed the timeout; reset to zero only by a fully successful bootstrap
/// run. Receive-parse failures do not count. The duty-cycle loop reads the
/// count to decide when to re-provision the modem.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetryCounter(u32);

impl RetryCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Record one command timeout.
    pub fn note_timeout(&mut self) {
        self.0 += 1;
        warn!("command timeout (retry count now {})", self.0);
    }

    /// Reset to zero. Only the bootstrap calls this, on full success.
    pub(crate) fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn count(&self) -> u32 {
        self.0
    }
}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

/// Bearer token and device identity from the authentication workflow.
///
/// Not persisted — a power cycle starts unauthenticated. Workflows clear
/// `device_id` when the cloud answers 401/403, which makes the duty-cycle
/// loop re-authenticate on its next pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub device_id: String,
}

impl Credentials {
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty() && !self.device_id.is_empty()
    }

    /// Forget the device identity after an auth rejection.
    pub fn clear_device(&mut self) {
        self.device_id.clear();
    }
}

// ───────────────────────────────────────────────────────────────
// NetContext
// ───────────────────────────────────────────────────────────────

/// Mutable context owned by the duty-cycle loop.
#[derive(Debug, Default)]
pub struct NetContext {
    pub retries: RetryCounter,
    pub creds: Credentials,
}

impl NetContext {
    pub fn new() -> Self {
        Self::default()
    }
}
