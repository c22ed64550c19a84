//! Emulator port allocation
//!
//! The emulator takes two sequential ports per instance (console and adb),
//! so instance consoles sit on even ports counting up from 5554.

use crate::adb::DeviceSession;
use crate::config::DEFAULT_EMULATOR_PORT;
use crate::error::{BridgeError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

lazy_static! {
    static ref EMULATOR_PORT_RE: Regex = Regex::new(r"emulator-(\d+)").unwrap();
}

/// Which emulator ports to attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRequest {
    /// Read the live `adb devices` listing
    Discover,
    /// A single known port
    Manual(u16),
    /// The canonical ports for this many instances
    Count(u32),
}

impl PortRequest {
    /// Map the numeric device count convention onto a request:
    /// 0 discovers, -1 uses `manual_port`, n > 0 takes n canonical ports.
    pub fn from_count(count: i32, manual_port: u16) -> Result<Self> {
        match count {
            0 => Ok(Self::Discover),
            -1 => Ok(Self::Manual(manual_port)),
            n if n > 0 && n as u32 <= MAX_EMULATOR_COUNT => Ok(Self::Count(n as u32)),
            n => Err(BridgeError::InvalidPortRequest(n)),
        }
    }
}

/// Most instances whose console ports still fit below `u16::MAX`
pub const MAX_EMULATOR_COUNT: u32 = (u16::MAX as u32 - DEFAULT_EMULATOR_PORT as u32) / 2 + 1;

/// Canonical console ports for `count` emulator instances
pub fn canonical_ports(count: u32) -> Result<Vec<u16>> {
    match count {
        0 => Ok(Vec::new()),
        1 => Ok(vec![DEFAULT_EMULATOR_PORT]),
        // Not the 2-step progression; kept as observed with paired instances
        2 => Ok(vec![DEFAULT_EMULATOR_PORT, DEFAULT_EMULATOR_PORT + 4]),
        n => (0..n)
            .map(|i| {
                u32::from(DEFAULT_EMULATOR_PORT)
                    .checked_add(i.saturating_mul(2))
                    .and_then(|port| u16::try_from(port).ok())
                    .ok_or_else(|| {
                        BridgeError::InvalidPortRequest(i32::try_from(n).unwrap_or(i32::MAX))
                    })
            })
            .collect(),
    }
}

/// Every `emulator-<port>` identifier in a device listing, in listing order
pub fn parse_emulator_ports(listing: &str) -> Vec<u16> {
    EMULATOR_PORT_RE
        .captures_iter(listing)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// Resolve a request against an already captured device listing.
///
/// Discovery only decides how many instances are running; the ports returned
/// are the canonical ones for that count.
pub fn allocate(request: PortRequest, listing: Option<&str>) -> Result<Vec<u16>> {
    let count = match request {
        PortRequest::Manual(port) => return Ok(vec![port]),
        PortRequest::Count(n) => n,
        PortRequest::Discover => {
            info!("Finding devices..");
            let found = parse_emulator_ports(listing.unwrap_or_default());
            if found.is_empty() {
                return Err(BridgeError::NoDevice(
                    "no emulator listed by adb devices".to_string(),
                ));
            }
            info!("Found {} devices", found.len());
            info!("Ports: {:?}", found);
            found.len() as u32
        }
    };
    canonical_ports(count)
}

/// Compute the emulator ports to attach to, querying adb when discovering
pub async fn generate_ports(request: PortRequest, session: &DeviceSession) -> Result<Vec<u16>> {
    let listing = match request {
        PortRequest::Discover => Some(session.device_listing().await?),
        _ => None,
    };
    allocate(request, listing.as_deref())
}
