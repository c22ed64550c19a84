//! adbvision CLI - drive Android phones and emulators in reference coordinates
//!
//! Usage:
//!     adbvision [OPTIONS]
//!
//! Environment Variables:
//!     ADB_VISION_ADB: Path to the adb executable
//!     ADB_VISION_TESSERACT: Path to the tesseract executable
//!     ADB_VISION_DEVICE_ID: Phone serial for multi-device setups
//!     ADB_VISION_EMULATOR_REFERENCE / ADB_VISION_PHONE_REFERENCE: Reference resolutions (WxH)
//!     RUST_LOG: Log filter (default: info)

use adb_vision::{
    open_device, platform_executable, Device, DeviceOptions, DeviceSession, OcrEngine, OcrImage,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// adbvision - resolution-independent Android automation
#[derive(Parser, Debug)]
#[command(name = "adbvision")]
#[command(about = "Resolution-independent Android phone and emulator automation")]
#[command(after_help = r#"Examples:
    # Show connected devices
    adbvision --list-devices

    # Tap the centre of a 1920x1080 reference screen on the first emulator
    adbvision --emulator --tap 960 540

    # Attach to three emulators and print info for emulator-5556
    adbvision --emulator --devices 3 --port 5556 --info

    # Swipe on a specific phone
    adbvision --name R58M123ABC --swipe 1200 900 1200 200

    # Read the text in the top banner of the screen
    adbvision --emulator --ocr --crop 0 0 1920 120
"#)]
struct Cli {
    // Target options
    /// Target emulator instances instead of a physical phone
    #[arg(short = 'e', long)]
    emulator: bool,

    /// Emulators to attach: 0 discovers, -1 uses --port only, n takes n canonical ports
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    devices: i32,

    /// Emulator console port driven by this session
    #[arg(short = 'p', long, default_value = "5554")]
    port: u16,

    /// Phone serial (discovered when omitted)
    #[arg(short = 'n', long, env = "ADB_VISION_DEVICE_ID")]
    name: Option<String>,

    /// Interpret phone coordinates landscape-first
    #[arg(long)]
    landscape: bool,

    // Tool options
    /// Path to adb (otherwise PATH, then the search root)
    #[arg(long, env = "ADB_VISION_ADB")]
    adb: Option<PathBuf>,

    /// Path to tesseract (otherwise PATH, then the search root)
    #[arg(long, env = "ADB_VISION_TESSERACT")]
    tesseract: Option<PathBuf>,

    /// Directory searched for adb and tesseract (default: current directory)
    #[arg(long)]
    search_root: Option<PathBuf>,

    /// Directory screenshots are pulled to (default: current directory)
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    // Actions
    /// List devices known to adb and exit
    #[arg(long)]
    list_devices: bool,

    /// Print resolution, orientation and scale factors
    #[arg(long)]
    info: bool,

    /// Print --info as JSON
    #[arg(long, requires = "info")]
    json: bool,

    /// Capture a screenshot
    #[arg(long)]
    screenshot: bool,

    /// Tap at reference coordinates
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    tap: Option<Vec<f64>>,

    /// Swipe between reference coordinates
    #[arg(long, num_args = 4, value_names = ["X1", "Y1", "X2", "Y2"], allow_negative_numbers = true)]
    swipe: Option<Vec<f64>>,

    /// Read screen text with tesseract
    #[arg(long)]
    ocr: bool,

    /// Restrict --ocr to a region in reference coordinates
    #[arg(long, num_args = 4, value_names = ["X1", "Y1", "X2", "Y2"], requires = "ocr")]
    crop: Option<Vec<f64>>,

    /// Tesseract language (e.g. eng)
    #[arg(long, requires = "ocr")]
    ocr_lang: Option<String>,

    // Other options
    /// Only log warnings and errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every bridge command
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn init_logging(args: &Cli) {
    let default_level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Explicit path, then PATH, then leave it to the tree search
fn resolve_tool(explicit: Option<&PathBuf>, stem: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.clone());
    }
    match which::which(platform_executable(stem)) {
        Ok(path) => {
            debug!("Using {} from PATH: {}", stem, path.display());
            Some(path)
        }
        Err(_) => None,
    }
}

fn build_options(args: &Cli) -> DeviceOptions {
    let mut options = DeviceOptions::new()
        .with_emulator(args.emulator)
        .with_device_count(args.devices)
        .with_port(args.port)
        .with_landscape(args.landscape);

    if let Some(name) = &args.name {
        options = options.with_name(name);
    }
    if let Some(root) = &args.search_root {
        options = options.with_search_root(root);
    }
    if let Some(dir) = &args.screenshot_dir {
        options = options.with_screenshot_dir(dir);
    }
    if let Some(adb) = resolve_tool(args.adb.as_ref(), "adb") {
        options = options.with_adb_path(adb);
    }
    options
}

fn build_ocr_engine(args: &Cli, search_root: &Path) -> Result<OcrEngine> {
    let engine = match resolve_tool(args.tesseract.as_ref(), "tesseract") {
        Some(path) => OcrEngine::with_path(path),
        None => OcrEngine::locate(search_root)?,
    };
    Ok(match &args.ocr_lang {
        Some(lang) => engine.with_language(lang),
        None => engine,
    })
}

/// Handle --list-devices
async fn list_devices(options: &DeviceOptions) -> Result<()> {
    let session = DeviceSession::start(options).await?;
    let devices = session.devices().await?;

    if devices.is_empty() {
        println!("No devices connected.");
        return Ok(());
    }

    println!("Connected devices:");
    println!("{}", "-".repeat(60));
    for device in devices {
        let status_icon = if device.state == "device" {
            "\u{2713}"
        } else {
            "\u{2717}"
        };
        println!("  {} {:<30} [{}]", status_icon, device.identity, device.state);
    }
    Ok(())
}

/// Run the requested actions in order against one device
async fn run_actions(args: &Cli, device: &dyn Device, options: &DeviceOptions) -> Result<()> {
    if args.info {
        let info = device.info().await?;
        if args.json {
            println!("{}", info.to_json()?);
        } else {
            println!("Device: {}", info.identity);
            if let Some(serial) = &info.serial {
                println!("Serial: {}", serial);
            }
            println!("Size: {}", info.resolution);
            println!("Orientation: {:?}", info.orientation);
            println!("Scale: sx={}, sy={}", info.scale.sx, info.scale.sy);
        }
    }

    if args.screenshot {
        let image = device.screenshot().await?;
        let path = device.session().screenshot_path(device.identity());
        println!(
            "Screenshot {}x{} saved to {}",
            image.width(),
            image.height(),
            path.display()
        );
    }

    if let Some(point) = &args.tap {
        device.tap(point[0], point[1]);
    }

    if let Some(points) = &args.swipe {
        device.swipe(points[0], points[1], points[2], points[3]);
    }

    if args.ocr {
        let engine = build_ocr_engine(args, &options.search_root)?;
        let mut screen = OcrImage::from_device(device, engine).await?;
        if let Some(region) = &args.crop {
            screen = screen.crop(region[0], region[1], region[2], region[3]);
        }
        let words: Vec<String> = screen.extract_text().await?.collect();
        println!("{}", words.join(" "));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args);

    let options = build_options(&args);

    if args.list_devices {
        return list_devices(&options).await;
    }

    let device = open_device(&options).await.with_context(|| {
        if options.emulator {
            "failed to attach to emulators".to_string()
        } else {
            "failed to attach to phone".to_string()
        }
    })?;
    info!("Attached to {}", device.identity());

    run_actions(&args, device.as_ref(), &options).await
}
