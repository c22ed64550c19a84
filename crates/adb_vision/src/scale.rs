//! Resolution normalization between a device's native pixels and the
//! reference resolution scripts are authored against.

use crate::error::{BridgeError, Result};
use serde::Serialize;
use std::fmt;

/// A screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `WxH` token such as `1080x2400`
    pub fn parse(token: &str) -> Result<Self> {
        let (w, h) = token
            .trim()
            .split_once('x')
            .ok_or_else(|| BridgeError::Parse(format!("expected WxH, got {:?}", token)))?;

        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| BridgeError::Parse(format!("bad width in {:?}: {}", token, e)))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| BridgeError::Parse(format!("bad height in {:?}: {}", token, e)))?;

        Ok(Self { width, height })
    }

    /// Largest axis first
    pub fn sorted_desc(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            self.swapped()
        }
    }

    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How a device's reported size maps onto the reference axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    /// Actual and reference axes line up as given
    #[default]
    Landscape,
    /// Actual size is portrait-first while the reference is stored
    /// landscape-first, so the actual axes are swapped before dividing
    Portrait,
}

impl Orientation {
    pub fn from_landscape(landscape: bool) -> Self {
        if landscape {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn is_landscape(self) -> bool {
        self == Self::Landscape
    }
}

/// Per-device multipliers from reference coordinates to native pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactors {
    /// Build factors, rejecting anything that is not finite and positive
    pub fn new(sx: f64, sy: f64) -> Result<Self> {
        if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
            return Err(BridgeError::Parse(format!(
                "scale factors must be positive, got ({}, {})",
                sx, sy
            )));
        }
        Ok(Self { sx, sy })
    }

    pub const fn identity() -> Self {
        Self { sx: 1.0, sy: 1.0 }
    }

    /// Reference coordinates to native coordinates, unrounded
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.sx, y * self.sy)
    }

    /// Native coordinates back to reference coordinates
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.sx, y / self.sy)
    }

    /// Reference coordinates to integral native pixels.
    ///
    /// Rounds half away from zero, which is what `f64::round` does.
    pub fn to_pixels(&self, x: f64, y: f64) -> (i32, i32) {
        let (nx, ny) = self.apply(x, y);
        (nx.round() as i32, ny.round() as i32)
    }
}

/// Derives [`ScaleFactors`] for a reference resolution and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    reference: Resolution,
    orientation: Orientation,
}

impl Normalizer {
    pub fn new(reference: Resolution, orientation: Orientation) -> Self {
        Self {
            reference,
            orientation,
        }
    }

    /// Compute the factors for a device reporting `actual`
    pub fn factors(&self, actual: Resolution) -> Result<ScaleFactors> {
        if self.reference.width == 0 || self.reference.height == 0 {
            return Err(BridgeError::Parse(format!(
                "reference resolution {} has a zero axis",
                self.reference
            )));
        }
        if actual.width == 0 || actual.height == 0 {
            return Err(BridgeError::Parse(format!(
                "device resolution {} has a zero axis",
                actual
            )));
        }

        let actual = match self.orientation {
            Orientation::Landscape => actual,
            Orientation::Portrait => actual.swapped(),
        };

        ScaleFactors::new(
            actual.width as f64 / self.reference.width as f64,
            actual.height as f64 / self.reference.height as f64,
        )
    }
}
