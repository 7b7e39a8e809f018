//! Graceful modem shutdown followed by a timed host suspend.

use log::{info, warn};

use crate::app::context::RetryCounter;
use crate::app::ports::{Clock, SerialPort, SleepPort};
use crate::config::ModemConfig;
use crate::error::{Error, Result, Step};
use crate::modem::channel::{AtChannel, Match};

/// Settle between the power-down acknowledgement and the suspend.
const POWER_DOWN_SETTLE_MS: u64 = 500;

/// Power the modem down, then suspend the host for `seconds`.
///
/// If the modem never acknowledges the shutdown the retry counter is bumped
/// and the host stays awake. Execution resumes at the call site after wake.
pub fn shutdown_and_sleep<S, C, P>(
    chan: &mut AtChannel<S, C>,
    sleeper: &mut P,
    seconds: u32,
    timing: &ModemConfig,
    retries: &mut RetryCounter,
) -> Result<()>
where
    S: SerialPort,
    C: Clock,
    P: SleepPort,
{
    chan.send("AT+QPOWD=0")?;
    if !chan.wait_for(Match::Exact("OK"), timing.power_down_timeout_ms) {
        warn!("modem power-down unacknowledged, skipping sleep");
        retries.note_timeout();
        return Err(Error::Timeout(Step::PowerDown));
    }

    chan.pause(POWER_DOWN_SETTLE_MS);
    info!("entering low-power state for {seconds}s");
    sleeper.sleep(seconds);
    Ok(())
}
