//! Platform adapters — the only modules that touch real hardware.
//!
//! Each adapter implements one port trait from [`crate::app::ports`].
//! On non-espidf targets the implementations fall back to host-side
//! simulation so the library builds and tests everywhere.

pub mod gpio;
pub mod sleep;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;

pub use gpio::HubPins;
pub use sleep::TimerSleep;
pub use time::MonotonicClock;
#[cfg(target_os = "espidf")]
pub use uart::Bc26Uart;
