//! Construction options shared by phone and emulator targets

use super::reference::{ReferenceConfig, REFERENCE_CONFIG};
use super::timing::TIMING_CONFIG;
use crate::scale::Orientation;
use std::path::PathBuf;
use std::time::Duration;

/// First console port the emulator hands out
pub const DEFAULT_EMULATOR_PORT: u16 = 5554;

/// Options for building a [`Phone`](crate::Phone) or [`Emulator`](crate::Emulator)
#[derive(Debug, Clone)]
pub struct DeviceOptions {
    /// Target emulator instances rather than a physical phone
    pub emulator: bool,
    /// 0 discovers live emulators, -1 uses `port` alone, n > 0 takes n canonical ports
    pub device_count: i32,
    /// Emulator console port driven by this session
    pub port: u16,
    /// Phone serial; discovered when `None`
    pub name: Option<String>,
    /// Interpret phone coordinates landscape-first
    pub landscape: bool,
    /// Root of the executable search
    pub search_root: PathBuf,
    /// Explicit adb executable, skipping the search
    pub adb_path: Option<PathBuf>,
    /// Where pulled screenshots are written
    pub screenshot_dir: PathBuf,
    pub references: ReferenceConfig,
    pub restart_delay: Duration,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            emulator: false,
            device_count: 1,
            port: DEFAULT_EMULATOR_PORT,
            name: None,
            landscape: false,
            search_root: cwd.clone(),
            adb_path: None,
            screenshot_dir: cwd,
            references: *REFERENCE_CONFIG,
            restart_delay: TIMING_CONFIG.server_restart_delay(),
        }
    }
}

impl DeviceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for emulator targets
    pub fn emulator() -> Self {
        Self::default().with_emulator(true)
    }

    /// Options for a physical phone
    pub fn phone() -> Self {
        Self::default().with_emulator(false)
    }

    pub fn with_emulator(mut self, emulator: bool) -> Self {
        self.emulator = emulator;
        self
    }

    pub fn with_device_count(mut self, count: i32) -> Self {
        self.device_count = count;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = root.into();
        self
    }

    pub fn with_adb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.adb_path = Some(path.into());
        self
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub fn with_references(mut self, references: ReferenceConfig) -> Self {
        self.references = references;
        self
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_landscape(self.landscape)
    }
}
