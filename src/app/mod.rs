//! Application layer: port traits, shared network context, and the
//! workflow service that drives the cloud duty cycle.

pub mod context;
pub mod ports;
pub mod service;

pub use context::{Credentials, NetContext, RetryCounter};
pub use ports::{Clock, PinError, PinPort, SerialPort, SleepPort};
pub use service::{AuthResponse, HubService};
