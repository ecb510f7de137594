//! Uniform result envelope returned by the parser.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::door::DoorFrame;
use super::weight::WeightFrame;
use super::hex_byte;
use crate::error::FrameError;

/// Decoded fields keyed by name.
pub type Details = serde_json::Map<String, Value>;

/// Frame family as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameType {
    Door,
    Weight,
    Unknown,
}

/// Command code and display name. The name is empty for codes this decoder
/// does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
}

impl CommandInfo {
    pub fn new(code: impl Into<String>, name: &str) -> Self {
        Self {
            code: Some(code.into()),
            name: name.to_string(),
        }
    }
}

/// Typed view of a decoded frame, for Rust callers.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    Door(DoorFrame),
    Weight(WeightFrame),
}

/// Outcome of one `parse` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub success: bool,
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    pub is_response: bool,
    pub command: CommandInfo,
    pub details: Details,
    pub raw_bytes: Vec<String>,
    /// Set on failure and on partial multi-chunk failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FrameError>,
    #[serde(skip)]
    pub frame: Option<DecodedFrame>,
}

impl ParseResult {
    pub(crate) fn new(frame_type: FrameType, bytes: &[u8]) -> Self {
        Self {
            success: true,
            frame_type,
            is_response: false,
            command: CommandInfo::default(),
            details: Details::new(),
            raw_bytes: bytes.iter().map(|&b| hex_byte(b)).collect(),
            message: None,
            error: None,
            frame: None,
        }
    }

    /// Mark the result failed.
    pub(crate) fn fail(mut self, error: FrameError) -> Self {
        self.success = false;
        self.message = Some(error.to_string());
        self.error = Some(error);
        self
    }

    /// Mark the result failed, naming what was still identified.
    pub(crate) fn fail_with(self, error: FrameError, context: &str) -> Self {
        let message = format!("{error} ({context})");
        let mut result = self.fail(error);
        result.message = Some(message);
        result
    }

    /// Attach a diagnostic without failing the result.
    pub(crate) fn warn(mut self, error: FrameError) -> Self {
        self.message = Some(error.to_string());
        self.error = Some(error);
        self
    }

    /// Attach a diagnostic without failing the result, naming what it concerns.
    pub(crate) fn warn_with(self, error: FrameError, context: &str) -> Self {
        let message = format!("{error} ({context})");
        let mut result = self.warn(error);
        result.message = Some(message);
        result
    }

    pub(crate) fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.details.insert(key.to_string(), value.into());
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    pub fn door(&self) -> Option<&DoorFrame> {
        match &self.frame {
            Some(DecodedFrame::Door(frame)) => Some(frame),
            _ => None,
        }
    }

    pub fn weight(&self) -> Option<&WeightFrame> {
        match &self.frame {
            Some(DecodedFrame::Weight(frame)) => Some(frame),
            _ => None,
        }
    }
}
