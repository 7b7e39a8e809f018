//! Port traits — the hexagonal boundary between domain logic and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ modem core / HubService (domain)
//! ```
//!
//! Driven adapters (UART, GPIO, sleep controller, monotonic timer) implement
//! these traits. The modem engine and the workflow layer consume them via
//! generics, so the domain core never touches hardware directly and runs
//! unmodified against the scripted mocks in `tests/integration/`.

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: modem UART ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Byte-level link to the cellular modem.
///
/// Reads are non-blocking: the AT channel busy-polls `available` /
/// `read_byte` against its own deadlines, so an adapter must never park the
/// calling thread waiting for data.
pub trait SerialPort {
    /// Error type for this channel.
    type Error: core::fmt::Debug;

    /// Write `data` to the modem, completely.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read one byte if one is ready, `None` otherwise.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Whether at least one byte is ready to read.
    fn available(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source for deadlines and settle pauses.
pub trait Clock {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Pin port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Digital drive of switch-mode pins.
///
/// The workflow layer addresses pins by GPIO number from the
/// [`Pin`](crate::pins::Pin) registry; sampling sensor pins is out of scope
/// here and handled by whoever fills in `Pin::value`.
pub trait PinPort {
    /// Drive a GPIO high or low.
    fn set_level(&mut self, gpio: u8, high: bool) -> Result<(), PinError>;
}

/// Errors from [`PinPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// The GPIO number is not driveable on this board.
    UnknownPin,
    /// The underlying GPIO write failed.
    WriteFailed,
}

impl core::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownPin => write!(f, "unknown pin"),
            Self::WriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sleep port (driven adapter: domain → power management)
// ───────────────────────────────────────────────────────────────

/// Timed low-power suspend of the host MCU.
///
/// Execution resumes at the call site after the wake event; there is no
/// callback. The modem is expected to be powered down before this is called.
pub trait SleepPort {
    /// Suspend for `seconds`, then resume.
    fn sleep(&mut self, seconds: u32);
}
