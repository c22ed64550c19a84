//! ADB (Android Debug Bridge) module for device control
//!
//! This module provides:
//! - `runner`: External process execution, blocking or detached
//! - `session`: Raw per-identity bridge operations (screenshot, tap, swipe, size)

mod runner;
mod session;

pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use session::{
    parse_device_listing, parse_wm_size, DeviceEntry, DeviceInfo, DeviceSession,
    REMOTE_SCREENSHOT_PATH,
};
