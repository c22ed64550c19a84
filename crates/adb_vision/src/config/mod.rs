//! Configuration module for adb_vision
//!
//! This module contains:
//! - `reference`: Reference resolutions scripts are authored against
//! - `timing`: Timing configuration for bridge server handling
//! - `options`: Per-device construction options

mod options;
mod reference;
mod timing;

pub use options::{DeviceOptions, DEFAULT_EMULATOR_PORT};
pub use reference::{ReferenceConfig, REFERENCE_CONFIG};
pub use timing::{TimingConfig, TIMING_CONFIG};
