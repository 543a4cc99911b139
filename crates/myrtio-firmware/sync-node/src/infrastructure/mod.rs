//! Infrastructure layer - ESP32 implementations of the sync ports
//!
//! Radio driver, background tasks and the per-node build configuration.

pub(crate) mod config;
pub(crate) mod drivers;
pub(crate) mod tasks;
