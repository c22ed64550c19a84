//! Raw per-identity adb operations over a restarted bridge server

use super::runner::{CommandOutput, CommandRunner, SystemRunner};
use crate::config::DeviceOptions;
use crate::error::{BridgeError, Result};
use crate::locator::{locate, platform_executable};
use crate::scale::{Orientation, Resolution, ScaleFactors};
use image::DynamicImage;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remote capture location, overwritten by every screenshot
pub const REMOTE_SCREENSHOT_PATH: &str = "/data/local/tmp/image.png";

/// One line of `adb devices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEntry {
    pub identity: String,
    pub state: String,
}

/// Diagnostic snapshot of a device target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identity: String,
    pub serial: Option<String>,
    pub resolution: Resolution,
    pub orientation: Orientation,
    pub scale: ScaleFactors,
}

impl DeviceInfo {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Connection to the adb bridge tool
#[derive(Debug, Clone)]
pub struct DeviceSession {
    adb: PathBuf,
    runner: Arc<dyn CommandRunner>,
    screenshot_dir: PathBuf,
}

impl DeviceSession {
    /// Locate adb per `options` and open a session with real processes
    pub async fn start(options: &DeviceOptions) -> Result<Self> {
        let adb = match &options.adb_path {
            Some(path) => path.clone(),
            None => locate(&platform_executable("adb"), &options.search_root)?,
        };
        Self::open(adb, Arc::new(SystemRunner), options).await
    }

    /// Kill any running adb server, start a fresh one and verify it came up
    pub async fn open(
        adb: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
        options: &DeviceOptions,
    ) -> Result<Self> {
        let session = Self {
            adb: adb.into(),
            runner,
            screenshot_dir: options.screenshot_dir.clone(),
        };
        session.restart_server(options.restart_delay).await?;
        Ok(session)
    }

    async fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        debug!("adb {}", args.join(" "));
        self.runner.output(&self.adb, &args).await
    }

    fn run_detached(&self, args: Vec<String>) {
        debug!("adb {} (detached)", args.join(" "));
        if let Err(e) = self.runner.spawn_detached(&self.adb, &args) {
            warn!("Failed to dispatch adb {}: {}", args.join(" "), e);
        }
    }

    async fn restart_server(&self, delay: std::time::Duration) -> Result<()> {
        // No server may be running yet, so the kill status is irrelevant
        match self.run(args(&["kill-server"])).await {
            Ok(output) if !output.success => debug!("kill-server: {}", output.combined()),
            Ok(_) => {}
            Err(e) => debug!("kill-server failed: {}", e),
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let output = self
            .run(args(&["start-server"]))
            .await
            .map_err(|e| BridgeError::Connectivity(format!("cannot start adb server: {}", e)))?;
        if !output.success {
            return Err(BridgeError::Connectivity(format!(
                "adb start-server failed: {}",
                output.combined()
            )));
        }

        info!("adb server restarted");
        Ok(())
    }

    /// Raw stdout of `adb devices`
    pub async fn device_listing(&self) -> Result<String> {
        let output = self.run(args(&["devices"])).await?;
        if !output.success {
            return Err(BridgeError::Connectivity(format!(
                "adb devices failed: {}",
                output.combined()
            )));
        }
        Ok(output.stdout)
    }

    /// Entries listed by `adb devices`
    pub async fn devices(&self) -> Result<Vec<DeviceEntry>> {
        Ok(parse_device_listing(&self.device_listing().await?))
    }

    /// Attach to a device over TCP, e.g. `127.0.0.1:5554`
    pub async fn connect(&self, address: &str) -> Result<()> {
        let output = self.run(args(&["connect", address])).await?;
        let lower = output.combined().to_lowercase();

        if !output.success || lower.contains("cannot") || lower.contains("failed") {
            return Err(BridgeError::Connectivity(format!(
                "adb connect {} failed: {}",
                address,
                output.combined()
            )));
        }

        info!("Connected to {}", address);
        Ok(())
    }

    /// Local file a screenshot of `id` is pulled to
    pub fn screenshot_path(&self, id: &str) -> PathBuf {
        let safe: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.screenshot_dir.join(format!("{}.png", safe))
    }

    /// Capture the screen of `id`, pull it next to the working files and decode it
    pub async fn screenshot(&self, id: &str) -> Result<DynamicImage> {
        let capture = self
            .run(device_args(id, &["shell", "screencap", "-p", REMOTE_SCREENSHOT_PATH]))
            .await?;
        if !capture.success {
            return Err(BridgeError::Transfer(format!(
                "screencap on {} failed: {}",
                id,
                capture.combined()
            )));
        }

        let local = self.screenshot_path(id);
        let local_arg = local.to_string_lossy().into_owned();
        let pull = self
            .run(device_args(id, &["pull", REMOTE_SCREENSHOT_PATH, &local_arg]))
            .await?;
        if !pull.success {
            return Err(BridgeError::Transfer(format!(
                "pull from {} failed: {}",
                id,
                pull.combined()
            )));
        }

        debug!("Screenshot of {} saved to {}", id, local.display());
        Ok(image::open(&local)?)
    }

    /// Touch event at native pixels; returns without waiting for adb
    pub fn tap(&self, id: &str, x: i32, y: i32) {
        info!("Input {} at: {}, {}", id, x, y);
        self.run_detached(device_args(
            id,
            &["shell", "input", "tap", &x.to_string(), &y.to_string()],
        ));
    }

    /// Drag gesture at native pixels; returns without waiting for adb
    pub fn swipe(&self, id: &str, x1: i32, y1: i32, x2: i32, y2: i32) {
        info!("Swiping {} from: {}, {} -> {}, {}", id, x1, y1, x2, y2);
        self.run_detached(device_args(
            id,
            &[
                "shell",
                "input",
                "touchscreen",
                "swipe",
                &x1.to_string(),
                &y1.to_string(),
                &x2.to_string(),
                &y2.to_string(),
            ],
        ));
    }

    /// Size as reported by `wm size`, axes untouched
    pub async fn raw_size(&self, id: &str) -> Result<Resolution> {
        let output = self.run(device_args(id, &["shell", "wm", "size"])).await?;
        if !output.success {
            return Err(BridgeError::Connectivity(format!(
                "wm size on {} failed: {}",
                id,
                output.combined()
            )));
        }
        parse_wm_size(&output.stdout)
    }

    /// Native size with the largest axis first
    pub async fn resolution(&self, id: &str) -> Result<Resolution> {
        Ok(self.raw_size(id).await?.sorted_desc())
    }

    pub async fn serial_no(&self, id: &str) -> Result<String> {
        let output = self.run(device_args(id, &["get-serialno"])).await?;
        if !output.success {
            return Err(BridgeError::Connectivity(format!(
                "get-serialno on {} failed: {}",
                id,
                output.combined()
            )));
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Log and return size, orientation and scale factors for `id`
    pub async fn info(
        &self,
        id: &str,
        scale: ScaleFactors,
        orientation: Orientation,
    ) -> Result<DeviceInfo> {
        let resolution = self.resolution(id).await?;
        let serial = match self.serial_no(id).await {
            Ok(serial) if !serial.is_empty() => Some(serial),
            Ok(_) => None,
            Err(e) => {
                debug!("No serial for {}: {}", id, e);
                None
            }
        };

        info!("Device: {}", id);
        info!("Size: {}", resolution);
        info!("Landscape: {}", orientation.is_landscape());
        info!("Scale: sx={}, sy={}", scale.sx, scale.sy);

        Ok(DeviceInfo {
            identity: id.to_string(),
            serial,
            resolution,
            orientation,
            scale,
        })
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// `-s <id>` followed by `rest`
fn device_args(id: &str, rest: &[&str]) -> Vec<String> {
    let mut full = vec!["-s".to_string(), id.to_string()];
    full.extend(rest.iter().map(|s| s.to_string()));
    full
}

/// Parse `adb devices` output, skipping the header line
pub fn parse_device_listing(listing: &str) -> Vec<DeviceEntry> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let identity = parts.next()?;
            let state = parts.next()?;
            Some(DeviceEntry {
                identity: identity.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// Parse the last `WxH` token of `wm size` output
pub fn parse_wm_size(output: &str) -> Result<Resolution> {
    let token = output
        .split_whitespace()
        .last()
        .ok_or_else(|| BridgeError::Parse("empty wm size output".to_string()))?;
    Resolution::parse(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{png_bytes, FakeRunner};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn options(dir: &Path) -> DeviceOptions {
        DeviceOptions::default()
            .with_screenshot_dir(dir)
            .with_restart_delay(Duration::ZERO)
    }

    #[test]
    fn test_parse_device_listing() {
        let listing = "List of devices attached\nemulator-5554\tdevice\nR58M123ABC\tdevice\n192.168.1.5:5555\toffline\n\n";
        let entries = parse_device_listing(listing);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].identity, "emulator-5554");
        assert_eq!(entries[1].identity, "R58M123ABC");
        assert_eq!(entries[2].state, "offline");
    }

    #[test]
    fn test_parse_device_listing_skips_daemon_banner() {
        let listing = "* daemon not running; starting now at tcp:5037\n* daemon started successfully\nList of devices attached\nR58M123ABC\tdevice\n";
        let entries = parse_device_listing(listing);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identity, "R58M123ABC");
    }

    #[test]
    fn test_parse_wm_size() {
        assert_eq!(
            parse_wm_size("Physical size: 1080x2400\n").unwrap(),
            Resolution::new(1080, 2400)
        );
        assert_eq!(
            parse_wm_size("Physical size: 1080x2400\nOverride size: 720x1600\n").unwrap(),
            Resolution::new(720, 1600)
        );
        assert!(parse_wm_size("").is_err());
    }

    #[tokio::test]
    async fn test_open_restarts_server() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();
        assert_eq!(runner.calls(), vec!["kill-server", "start-server"]);
    }

    #[tokio::test]
    async fn test_open_fails_when_server_cannot_start() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.respond("start-server", CommandOutput::failed("could not bind"));
        let result = DeviceSession::open("adb", runner.clone(), &options(dir.path())).await;
        assert!(matches!(result, Err(BridgeError::Connectivity(_))));
    }

    #[tokio::test]
    async fn test_resolution_sorted_descending() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.respond(
            "-s R58M123ABC shell wm size",
            CommandOutput::ok("Physical size: 1080x2400\n"),
        );
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();

        assert_eq!(
            session.raw_size("R58M123ABC").await.unwrap(),
            Resolution::new(1080, 2400)
        );
        assert_eq!(
            session.resolution("R58M123ABC").await.unwrap(),
            Resolution::new(2400, 1080)
        );
    }

    #[tokio::test]
    async fn test_resolution_failure_is_connectivity_error() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.respond(
            "-s emulator-5554 shell wm size",
            CommandOutput::failed("error: device 'emulator-5554' not found"),
        );
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();
        let result = session.resolution("emulator-5554").await;
        assert!(matches!(result, Err(BridgeError::Connectivity(_))));
    }

    #[tokio::test]
    async fn test_screenshot_pulls_and_decodes() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.pull_writes(png_bytes(8, 4));
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();

        let img = session.screenshot("emulator-5554").await.unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));

        let local = dir.path().join("emulator-5554.png");
        assert!(local.exists());
        let calls = runner.calls();
        assert_eq!(
            calls[2],
            "-s emulator-5554 shell screencap -p /data/local/tmp/image.png"
        );
        assert_eq!(
            calls[3],
            format!(
                "-s emulator-5554 pull /data/local/tmp/image.png {}",
                local.display()
            )
        );
    }

    #[tokio::test]
    async fn test_screenshot_capture_failure_is_transfer_error() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.respond(
            "-s emulator-5554 shell screencap",
            CommandOutput::failed("Status: -1"),
        );
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();
        let result = session.screenshot("emulator-5554").await;
        assert!(matches!(result, Err(BridgeError::Transfer(_))));
    }

    #[tokio::test]
    async fn test_screenshot_pull_failure_is_transfer_error() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.respond(
            "-s emulator-5554 pull",
            CommandOutput::failed("remote object does not exist"),
        );
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();
        let result = session.screenshot("emulator-5554").await;
        assert!(matches!(result, Err(BridgeError::Transfer(_))));
    }

    #[tokio::test]
    async fn test_tap_and_swipe_are_detached() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();

        session.tap("R58M123ABC", 10, 20);
        session.swipe("R58M123ABC", 1, 2, 3, 4);

        assert_eq!(
            runner.detached(),
            vec![
                "-s R58M123ABC shell input tap 10 20",
                "-s R58M123ABC shell input touchscreen swipe 1 2 3 4",
            ]
        );
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_connect_reports_refusal() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner.respond(
            "connect 127.0.0.1:5556",
            CommandOutput::ok("cannot connect to 127.0.0.1:5556: Connection refused"),
        );
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();

        assert!(session.connect("127.0.0.1:5554").await.is_ok());
        assert!(matches!(
            session.connect("127.0.0.1:5556").await,
            Err(BridgeError::Connectivity(_))
        ));
    }

    #[test]
    fn test_screenshot_path_sanitizes_identity() {
        let session = DeviceSession {
            adb: PathBuf::from("adb"),
            runner: FakeRunner::new(),
            screenshot_dir: PathBuf::from("/tmp/shots"),
        };
        assert_eq!(
            session.screenshot_path("192.168.1.5:5555"),
            PathBuf::from("/tmp/shots/192.168.1.5_5555.png")
        );
    }

    #[tokio::test]
    async fn test_info_serializes() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::new();
        runner
            .respond(
                "-s emulator-5554 shell wm size",
                CommandOutput::ok("Physical size: 3840x2160\n"),
            )
            .respond("-s emulator-5554 get-serialno", CommandOutput::ok("emulator-5554\n"));
        let session = DeviceSession::open("adb", runner.clone(), &options(dir.path()))
            .await
            .unwrap();

        let info = session
            .info("emulator-5554", ScaleFactors::new(2.0, 2.0).unwrap(), Orientation::Landscape)
            .await
            .unwrap();
        assert_eq!(info.resolution, Resolution::new(3840, 2160));
        assert_eq!(info.serial.as_deref(), Some("emulator-5554"));

        let json = info.to_json().unwrap();
        assert!(json.contains("\"sx\": 2.0"));
        assert!(json.contains("\"Landscape\""));
    }
}
