//! One-shot modem provisioning: network/DNS config, TLS policy, CA upload.
//!
//! Runs once per boot (and again whenever the duty-cycle loop decides the
//! retry count warrants a fresh start). Any step failing aborts the whole
//! sequence — there is no rollback; the caller re-runs from step one.
//!
//! Full success is the only event that resets the shared retry counter.

use log::{debug, info};

use crate::app::context::RetryCounter;
use crate::app::ports::{Clock, SerialPort};
use crate::config::ModemConfig;
use crate::error::{Error, Result, Step};
use crate::modem::channel::{AtChannel, Match};

/// Transmission-end control byte terminating the CA upload.
const CTRL_Z: u8 = 0x1a;

/// Settle between the upload prompt and the certificate bytes.
const CERT_PROMPT_SETTLE_MS: u64 = 500;

/// Settle between the certificate bytes and the end-of-transmission byte.
const CERT_EOF_SETTLE_MS: u64 = 50;

/// Settle after the opportunistic socket close.
const CLOSE_SETTLE_MS: u64 = 5_000;

/// Provision the modem for TLS traffic.
///
/// Steps (verbatim wire contract):
/// 1. `AT` → `OK` — liveness probe.
/// 2. `AT+CGPADDR=1` → `+CGPADDR:` — the data context has an address.
/// 3. `AT+QIDNSCFG=1,8.8.8.8` → `OK` — resolver.
/// 4. `AT+QSSLCFG=1,0,"seclevel",1` → `OK` — require server certificate.
/// 5. `AT+QSSLCFG=1,0,"cacert"` → `>`, then CA bytes, then Ctrl-Z → `OK…`.
/// 6. `AT+QSSLCLOSE=1,0` — opportunistic, unacknowledged.
pub fn provision<S: SerialPort, C: Clock>(
    chan: &mut AtChannel<S, C>,
    ca_cert: &[u8],
    timing: &ModemConfig,
    retries: &mut RetryCounter,
) -> Result<()> {
    debug!("modem bootstrap");

    chan.send("AT")?;
    if !chan.wait_for(Match::Exact("OK"), timing.probe_timeout_ms) {
        retries.note_timeout();
        return Err(Error::Timeout(Step::Probe));
    }

    chan.send("AT+CGPADDR=1")?;
    if !chan.wait_for(Match::Prefix("+CGPADDR:"), timing.provision_timeout_ms) {
        retries.note_timeout();
        return Err(Error::Timeout(Step::DataContext));
    }

    chan.send("AT+QIDNSCFG=1,8.8.8.8")?;
    if !chan.wait_for(Match::Exact("OK"), timing.provision_timeout_ms) {
        retries.note_timeout();
        return Err(Error::Timeout(Step::DnsConfig));
    }

    chan.send("AT+QSSLCFG=1,0,\"seclevel\",1")?;
    if !chan.wait_for(Match::Exact("OK"), timing.provision_timeout_ms) {
        retries.note_timeout();
        return Err(Error::Timeout(Step::TlsPolicy));
    }

    chan.send("AT+QSSLCFG=1,0,\"cacert\"")?;
    if !chan.wait_for(Match::Exact(">"), timing.provision_timeout_ms) {
        retries.note_timeout();
        return Err(Error::Timeout(Step::CertPrompt));
    }

    chan.pause(CERT_PROMPT_SETTLE_MS);
    chan.write_raw(ca_cert)?;
    chan.pause(CERT_EOF_SETTLE_MS);
    chan.write_raw(&[CTRL_Z])?;
    if !chan.wait_for(Match::Prefix("OK"), timing.provision_timeout_ms) {
        retries.note_timeout();
        return Err(Error::Timeout(Step::CertAck));
    }

    // Tear down any socket a previous run left behind; no acknowledgement
    // expected.
    chan.send("AT+QSSLCLOSE=1,0")?;
    chan.pause(CLOSE_SETTLE_MS);

    retries.reset();
    info!("modem provisioned, retry counter reset");
    Ok(())
}
