//! Timing configuration for bridge server handling

use lazy_static::lazy_static;
use std::env;
use std::time::Duration;

/// Delays applied around bridge server restarts
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Seconds to wait between killing and starting the server
    pub server_restart_delay: f64,
}

impl TimingConfig {
    pub fn server_restart_delay(&self) -> Duration {
        Duration::from_secs_f64(self.server_restart_delay.max(0.0))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            server_restart_delay: env::var("ADB_VISION_SERVER_RESTART_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
        }
    }
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}
