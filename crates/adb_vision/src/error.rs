//! Error types for bridge, device and OCR operations

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Executable {name} not found under {}", root.display())]
    MissingExecutable { name: String, root: PathBuf },

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("No device found: {0}")]
    NoDevice(String),

    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid device count {0}: expected -1, 0 or a count whose ports fit below 65536")]
    InvalidPortRequest(i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_and_messages() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(BridgeError::from(io), BridgeError::Io(_)));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(BridgeError::from(json), BridgeError::Json(_)));

        let err = BridgeError::MissingExecutable {
            name: "adb".to_string(),
            root: PathBuf::from("/opt/sdk"),
        };
        assert_eq!(err.to_string(), "Executable adb not found under /opt/sdk");
        assert!(BridgeError::InvalidPortRequest(-2).to_string().contains("-2"));
    }
}
