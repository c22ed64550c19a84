//! adb_vision: resolution-independent Android automation over adb
//!
//! This library provides:
//! - ADB sessions for screenshots, taps, swipes and size queries
//! - Phone and emulator targets that scale reference coordinates to native pixels
//! - Emulator port allocation and discovery
//! - OCR over captured screens, cropped in the same reference coordinates
//!
//! # Example
//!
//! ```no_run
//! use adb_vision::{Device, DeviceOptions, Emulator, OcrEngine, OcrImage};
//!
//! #[tokio::main]
//! async fn main() -> adb_vision::Result<()> {
//!     let options = DeviceOptions::emulator().with_device_count(1);
//!     let emulator = Emulator::new(&options).await?;
//!
//!     // Coordinates are in the 1920x1080 reference space
//!     emulator.tap(960.0, 540.0);
//!
//!     let engine = OcrEngine::locate(&options.search_root)?;
//!     let screen = OcrImage::from_device(&emulator, engine).await?;
//!     let words: Vec<String> = screen.crop(0.0, 0.0, 640.0, 120.0).extract_text().await?.collect();
//!     println!("{:?}", words);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Bridge tool access
pub mod adb;
pub mod locator;

// Core functionality
pub mod device;
pub mod ocr;
pub mod ports;
pub mod scale;

#[cfg(test)]
mod testing;

// Re-export commonly used types and functions
pub use error::{BridgeError, Result};

pub use config::{
    DeviceOptions, ReferenceConfig, TimingConfig, DEFAULT_EMULATOR_PORT, REFERENCE_CONFIG,
    TIMING_CONFIG,
};

pub use adb::{
    CommandOutput, CommandRunner, DeviceEntry, DeviceInfo, DeviceSession, SystemRunner,
    REMOTE_SCREENSHOT_PATH,
};

pub use locator::{find_executable, locate, platform_executable};

pub use device::{emulator_identity, open_device, Device, Emulator, Phone};

pub use ocr::{OcrEngine, OcrImage, Words};

pub use ports::{
    allocate, canonical_ports, generate_ports, parse_emulator_ports, PortRequest,
    MAX_EMULATOR_COUNT,
};

pub use scale::{Normalizer, Orientation, Resolution, ScaleFactors};
