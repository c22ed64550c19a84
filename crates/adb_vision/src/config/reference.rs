//! Reference resolutions for emulator and phone targets

use crate::scale::Resolution;
use lazy_static::lazy_static;
use std::env;

/// Fixed coordinate spaces that automation scripts are written against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceConfig {
    /// 16:9 landscape
    pub emulator: Resolution,
    /// 9:20 phone, stored landscape-first
    pub phone: Resolution,
}

impl ReferenceConfig {
    pub const EMULATOR: Resolution = Resolution::new(1920, 1080);
    pub const PHONE: Resolution = Resolution::new(2400, 1080);

    pub fn new(emulator: Resolution, phone: Resolution) -> Self {
        Self { emulator, phone }
    }

    /// The built-in constants, ignoring the environment
    pub fn builtin() -> Self {
        Self::new(Self::EMULATOR, Self::PHONE)
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            emulator: env::var("ADB_VISION_EMULATOR_REFERENCE")
                .ok()
                .and_then(|v| Resolution::parse(&v).ok())
                .unwrap_or(Self::EMULATOR),
            phone: env::var("ADB_VISION_PHONE_REFERENCE")
                .ok()
                .and_then(|v| Resolution::parse(&v).ok())
                .unwrap_or(Self::PHONE),
        }
    }
}

lazy_static! {
    /// Process-wide default reference resolutions
    pub static ref REFERENCE_CONFIG: ReferenceConfig = ReferenceConfig::default();
}
