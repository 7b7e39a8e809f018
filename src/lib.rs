//! ItemHub cellular hub library.
//!
//! HTTPS-over-AT transport for the Quectel BC26 NB-IoT modem plus the
//! cloud workflows built on it (token exchange, heartbeat, switch sync,
//! sensor push). Exposes the pure-logic modules for integration testing
//! and external inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod modem;
pub mod pins;

pub mod error;

// The adapter implementations are guarded by cfg attributes inside; the
// host side keeps simulation fallbacks so the crate builds everywhere.
pub mod adapters;
