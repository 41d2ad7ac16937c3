#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dap;
pub mod hid;
pub mod relay;

// These modules depend on embassy/trouble-host features only available with embedded feature
#[cfg(feature = "embedded")]
pub mod ble;
#[cfg(feature = "serial")]
pub mod serial;
