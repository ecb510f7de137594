//! Error types and handling.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::frame::hex_list;

/// Decode failures.
///
/// These are never raised out of [`crate::parse`]; they travel inside the
/// returned `ParseResult` so a caller can render them next to the fields that
/// were still extracted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FrameError {
    /// Malformed hex text or a frame too short for its family
    #[error("Invalid format: {reason}")]
    InvalidFormat { reason: String },

    /// Leading bytes match neither the door nor the weight family
    #[error("Unknown frame type, leading bytes {}", hex_list(.bytes))]
    UnknownFrameType { bytes: Vec<u8> },

    /// LRC mismatch on a whole frame or on a single weight chunk
    #[error("LRC check failed: computed 0x{computed:02x}, received 0x{received:02x}")]
    ChecksumFailure { computed: u8, received: u8 },

    /// Some chunks of a multi-sensor weight response failed their LRC
    #[error("LRC check failed for sensor(s) {}", hex_list(.addresses))]
    PartialChecksumFailure { addresses: Vec<u8> },
}

impl FrameError {
    /// Create an invalid format error with reason
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat { reason: reason.into() }
    }
}

/// Error type for the command-line and configuration layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or saved
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// File or stream I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Result serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input that is not a frame (e.g. a checksum body given to the CLI)
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
