//! Screen text extraction through the tesseract executable
//!
//! An [`OcrImage`] keeps the scale factors of the device that captured it, so
//! crop regions are given in the same reference coordinates as taps and swipes.

use crate::adb::{CommandRunner, SystemRunner};
use crate::device::Device;
use crate::error::{BridgeError, Result};
use crate::locator::{locate, platform_executable};
use crate::scale::ScaleFactors;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::Builder;
use tracing::{debug, info};

/// Handle on the tesseract executable
#[derive(Debug, Clone)]
pub struct OcrEngine {
    tesseract: PathBuf,
    language: Option<String>,
    runner: Arc<dyn CommandRunner>,
}

impl OcrEngine {
    /// Search `root` for tesseract
    pub fn locate(root: &Path) -> Result<Self> {
        let tesseract = locate(&platform_executable("tesseract"), root)?;
        Ok(Self::with_path(tesseract))
    }

    pub fn with_path(tesseract: impl Into<PathBuf>) -> Self {
        Self {
            tesseract: tesseract.into(),
            language: None,
            runner: Arc::new(SystemRunner),
        }
    }

    /// Tesseract language code passed as `-l`, e.g. `eng`
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn path(&self) -> &Path {
        &self.tesseract
    }

    /// Raw text tesseract reads from `image`
    pub async fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let input = Builder::new().prefix("adb-vision-ocr-").suffix(".png").tempfile()?;
        image.save_with_format(input.path(), image::ImageFormat::Png)?;

        let mut args = vec![input.path().to_string_lossy().into_owned(), "stdout".to_string()];
        if let Some(language) = &self.language {
            args.push("-l".to_string());
            args.push(language.clone());
        }

        debug!("tesseract {}", args.join(" "));
        let output = self.runner.output(&self.tesseract, &args).await?;
        if !output.success {
            return Err(BridgeError::Transfer(format!(
                "tesseract failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

/// A captured screen plus the factors of the device that produced it
#[derive(Debug, Clone)]
pub struct OcrImage {
    image: DynamicImage,
    scale: ScaleFactors,
    engine: OcrEngine,
}

impl OcrImage {
    pub fn new(image: DynamicImage, scale: ScaleFactors, engine: OcrEngine) -> Self {
        Self {
            image,
            scale,
            engine,
        }
    }

    /// Take a screenshot of `device` and keep its scale factors
    pub async fn from_device(device: &dyn Device, engine: OcrEngine) -> Result<Self> {
        let image = device.screenshot().await?;
        Ok(Self::new(image, device.scale(), engine))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn scale(&self) -> ScaleFactors {
        self.scale
    }

    /// Crop to a region given in reference coordinates.
    ///
    /// Corners may come in any order; the region is clamped to the image.
    pub fn crop(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> OcrImage {
        let (ax, ay) = self.scale.to_pixels(x1, y1);
        let (bx, by) = self.scale.to_pixels(x2, y2);

        let clamp_x = |v: i32| v.clamp(0, self.image.width() as i32) as u32;
        let clamp_y = |v: i32| v.clamp(0, self.image.height() as i32) as u32;

        let (left, right) = (clamp_x(ax.min(bx)), clamp_x(ax.max(bx)));
        let (top, bottom) = (clamp_y(ay.min(by)), clamp_y(ay.max(by)));

        debug!(
            "Crop ({}, {}) -> ({}, {}) maps to pixels {}x{}+{}+{}",
            x1,
            y1,
            x2,
            y2,
            right - left,
            bottom - top,
            left,
            top
        );

        OcrImage {
            image: self.image.crop_imm(left, top, right - left, bottom - top),
            scale: self.scale,
            engine: self.engine.clone(),
        }
    }

    /// Whitespace-delimited words tesseract reads from the image
    pub async fn extract_text(&self) -> Result<Words> {
        let text = self.engine.recognize(&self.image).await?;
        let words = Words::from_text(&text);
        info!("OCR read {} words", words.len());
        Ok(words)
    }
}

/// Tokens read from an image, consumed once
#[derive(Debug)]
pub struct Words {
    inner: std::vec::IntoIter<String>,
}

impl Words {
    pub fn from_text(text: &str) -> Self {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        Self {
            inner: tokens.into_iter(),
        }
    }
}

impl Iterator for Words {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Words {}
