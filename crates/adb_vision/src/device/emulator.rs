//! Emulator instance target

use super::Device;
use crate::adb::{CommandRunner, DeviceSession};
use crate::config::DeviceOptions;
use crate::error::{BridgeError, Result};
use crate::ports::{generate_ports, PortRequest};
use crate::scale::{Normalizer, Orientation, Resolution, ScaleFactors};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// adb identity of the emulator listening on `port`
pub fn emulator_identity(port: u16) -> String {
    format!("emulator-{}", port)
}

/// One emulator instance, attached alongside every allocated port
#[derive(Debug)]
pub struct Emulator {
    session: DeviceSession,
    identity: String,
    ports: Vec<u16>,
    scale: ScaleFactors,
}

impl Emulator {
    /// Locate adb, restart its server and attach to the emulators
    pub async fn new(options: &DeviceOptions) -> Result<Self> {
        ensure_emulator_mode(options)?;
        let session = DeviceSession::start(options).await?;
        Self::attach(session, options).await
    }

    /// Like [`Emulator::new`] with an explicit adb path and runner
    pub async fn with_runner(
        adb: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
        options: &DeviceOptions,
    ) -> Result<Self> {
        ensure_emulator_mode(options)?;
        let session = DeviceSession::open(adb, runner, options).await?;
        Self::attach(session, options).await
    }

    /// Allocate ports on an open session, connect and probe each, then
    /// derive scale factors for the emulator on `options.port`
    pub async fn with_session(session: DeviceSession, options: &DeviceOptions) -> Result<Self> {
        ensure_emulator_mode(options)?;
        Self::attach(session, options).await
    }

    async fn attach(session: DeviceSession, options: &DeviceOptions) -> Result<Self> {
        let request = PortRequest::from_count(options.device_count, options.port)?;
        let ports = generate_ports(request, &session).await?;
        info!("Ports: {:?}", ports);

        let mut probed = Vec::with_capacity(ports.len());
        for &port in &ports {
            session.connect(&format!("127.0.0.1:{}", port)).await?;
            let resolution = probe(&session, port).await?;
            probed.push((port, resolution));
        }

        let identity = emulator_identity(options.port);
        let actual = match probed.iter().find(|(port, _)| *port == options.port) {
            Some((_, resolution)) => *resolution,
            None => session.resolution(&identity).await?,
        };
        let scale =
            Normalizer::new(options.references.emulator, Orientation::Landscape).factors(actual)?;

        info!(
            "Emulator {} size {} -> scale sx={}, sy={}",
            identity, actual, scale.sx, scale.sy
        );

        Ok(Self {
            session,
            identity,
            ports,
            scale,
        })
    }

    /// Every port attached during construction
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }
}

fn ensure_emulator_mode(options: &DeviceOptions) -> Result<()> {
    if !options.emulator {
        return Err(BridgeError::UnsupportedMode(
            "emulator target requires the emulator flag; use Phone for physical devices"
                .to_string(),
        ));
    }
    Ok(())
}

/// Resolution query used to confirm a freshly connected emulator answers
async fn probe(session: &DeviceSession, port: u16) -> Result<Resolution> {
    let identity = emulator_identity(port);
    session.resolution(&identity).await.map_err(|e| match e {
        BridgeError::Connectivity(msg) => BridgeError::Connectivity(msg),
        other => BridgeError::Connectivity(format!("probe of {} failed: {}", identity, other)),
    })
}

#[async_trait]
impl Device for Emulator {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn scale(&self) -> ScaleFactors {
        self.scale
    }

    fn orientation(&self) -> Orientation {
        Orientation::Landscape
    }

    fn session(&self) -> &DeviceSession {
        &self.session
    }
}
