//! Physical phone target

use super::Device;
use crate::adb::{CommandRunner, DeviceSession};
use crate::config::DeviceOptions;
use crate::error::{BridgeError, Result};
use crate::scale::{Normalizer, Orientation, ScaleFactors};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Substring that marks emulator entries in `adb devices`
pub const EMULATOR_MARKER: &str = "emulator";

/// A USB or network-attached phone addressed by serial
#[derive(Debug)]
pub struct Phone {
    session: DeviceSession,
    identity: String,
    orientation: Orientation,
    scale: ScaleFactors,
}

impl Phone {
    /// Locate adb, restart its server and attach to the phone
    pub async fn new(options: &DeviceOptions) -> Result<Self> {
        let session = DeviceSession::start(options).await?;
        Self::with_session(session, options).await
    }

    /// Like [`Phone::new`] with an explicit adb path and runner
    pub async fn with_runner(
        adb: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
        options: &DeviceOptions,
    ) -> Result<Self> {
        let session = DeviceSession::open(adb, runner, options).await?;
        Self::with_session(session, options).await
    }

    /// Resolve the phone identity on an open session and derive its scale factors
    pub async fn with_session(session: DeviceSession, options: &DeviceOptions) -> Result<Self> {
        let identity = match &options.name {
            Some(name) => name.clone(),
            None => discover(&session).await?,
        };

        let orientation = options.orientation();
        // Landscape compares largest-first; portrait keeps the reported order
        // so the normalizer can swap it onto the landscape reference.
        let actual = match orientation {
            Orientation::Landscape => session.resolution(&identity).await?,
            Orientation::Portrait => session.raw_size(&identity).await?,
        };
        let scale = Normalizer::new(options.references.phone, orientation).factors(actual)?;

        info!(
            "Phone {} size {} -> scale sx={}, sy={}",
            identity, actual, scale.sx, scale.sy
        );

        Ok(Self {
            session,
            identity,
            orientation,
            scale,
        })
    }
}

/// First non-emulator identity listed by adb
async fn discover(session: &DeviceSession) -> Result<String> {
    let phones: Vec<String> = session
        .devices()
        .await?
        .into_iter()
        .map(|entry| entry.identity)
        .filter(|identity| !identity.contains(EMULATOR_MARKER))
        .collect();

    match phones.as_slice() {
        [] => Err(BridgeError::NoDevice(
            "no phone listed by adb devices".to_string(),
        )),
        [only] => Ok(only.clone()),
        [first, ..] => {
            warn!(
                "Multiple phones connected ({}), using {}",
                phones.join(", "),
                first
            );
            Ok(first.clone())
        }
    }
}

#[async_trait]
impl Device for Phone {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn scale(&self) -> ScaleFactors {
        self.scale
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn session(&self) -> &DeviceSession {
        &self.session
    }
}
