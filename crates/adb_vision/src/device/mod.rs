//! Device targets: physical phones and emulator instances
//!
//! Both variants hold their own session, identity and scale factors and
//! share the capability set of [`Device`]. Coordinates given to `tap` and
//! `swipe` are in the reference resolution and are scaled to native pixels
//! before dispatch.

mod emulator;
mod phone;

pub use emulator::{emulator_identity, Emulator};
pub use phone::{Phone, EMULATOR_MARKER};

use crate::adb::{DeviceInfo, DeviceSession};
use crate::config::DeviceOptions;
use crate::error::Result;
use crate::scale::{Orientation, Resolution, ScaleFactors};
use async_trait::async_trait;
use image::DynamicImage;

/// Operations shared by every device target
#[async_trait]
pub trait Device: Send + Sync {
    /// Identity passed to `adb -s`
    fn identity(&self) -> &str;

    fn scale(&self) -> ScaleFactors;

    fn orientation(&self) -> Orientation;

    fn session(&self) -> &DeviceSession;

    async fn screenshot(&self) -> Result<DynamicImage> {
        self.session().screenshot(self.identity()).await
    }

    /// Tap at reference coordinates; returns without waiting for the device
    fn tap(&self, x: f64, y: f64) {
        let (px, py) = self.scale().to_pixels(x, y);
        self.session().tap(self.identity(), px, py);
    }

    /// Swipe between reference coordinates; returns without waiting for the device
    fn swipe(&self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let scale = self.scale();
        let (px1, py1) = scale.to_pixels(x1, y1);
        let (px2, py2) = scale.to_pixels(x2, y2);
        self.session().swipe(self.identity(), px1, py1, px2, py2);
    }

    /// Native resolution, largest axis first
    async fn resolution(&self) -> Result<Resolution> {
        self.session().resolution(self.identity()).await
    }

    async fn info(&self) -> Result<DeviceInfo> {
        self.session()
            .info(self.identity(), self.scale(), self.orientation())
            .await
    }
}

/// Build the variant selected by `options.emulator`
pub async fn open_device(options: &DeviceOptions) -> Result<Box<dyn Device>> {
    if options.emulator {
        Ok(Box::new(Emulator::new(options).await?))
    } else {
        Ok(Box::new(Phone::new(options).await?))
    }
}
