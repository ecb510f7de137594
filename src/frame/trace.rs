//! Optional diagnostics for the decode pipeline.
//!
//! The decoders never log on their own. A caller that wants to follow a frame
//! through classification and checksum validation passes a [`FrameTrace`] to
//! [`super::parse_with`]; [`NoTrace`] is what [`super::parse`] uses.

use tracing::debug;

use super::checksum::LrcCheck;
use super::hex_list;

/// Observer for decode steps. Every hook defaults to doing nothing.
pub trait FrameTrace {
    /// Bytes seen at a named stage (`"input"`, `"chunk"`).
    fn bytes(&self, _stage: &str, _bytes: &[u8]) {}

    /// Checksum comparison for a frame or chunk.
    fn checksum(&self, _scope: &str, _check: LrcCheck) {}

    /// Free-form remark (dropped bytes, length mismatch, unknown codes).
    fn note(&self, _message: &str) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl FrameTrace for NoTrace {}

/// Forwards decode steps to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTrace;

impl FrameTrace for TracingTrace {
    fn bytes(&self, stage: &str, bytes: &[u8]) {
        debug!(stage, len = bytes.len(), "bytes: {}", hex_list(bytes));
    }

    fn checksum(&self, scope: &str, check: LrcCheck) {
        debug!(
            scope,
            valid = check.is_valid(),
            "LRC computed 0x{:02x}, received 0x{:02x}",
            check.computed,
            check.received
        );
    }

    fn note(&self, message: &str) {
        debug!("{message}");
    }
}
