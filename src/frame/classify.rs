//! Hex text tokenizing and frame family classification.

use super::types::{
    CHUNK_LEN, CMD_TARE_ZERO_CALIBRATION, DOOR_HEADER, FrameKind, FunctionCode, MIN_FRAME_LEN, REG_DISCRIMINATION_RATE,
    REG_WEIGHT, WeightOp,
};
use crate::error::FrameError;

/// Decode hex text into bytes. Whitespace anywhere is ignored, case is not significant.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, FrameError> {
    let digits = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(c))
        .collect::<Result<Vec<u8>, char>>()
        .map_err(|c| FrameError::invalid_format(format!("'{c}' is not a hex digit")))?;

    if digits.len() % 2 != 0 {
        return Err(FrameError::invalid_format(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }

    Ok(digits.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

/// Bytes of one frame, at least [`MIN_FRAME_LEN`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    pub fn from_hex(text: &str) -> Result<Self, FrameError> {
        Self::try_from(decode_hex(text)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<Vec<u8>> for RawFrame {
    type Error = FrameError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < MIN_FRAME_LEN {
            return Err(FrameError::invalid_format(format!(
                "frame needs at least {MIN_FRAME_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }
}

/// Decide the frame family and, for weight frames, the sub-operation.
pub fn classify(frame: &RawFrame) -> Result<FrameKind, FrameError> {
    let bytes = frame.as_bytes();

    if bytes[0] == DOOR_HEADER {
        return Ok(FrameKind::Door);
    }

    let function = FunctionCode::from_byte(bytes[1]).ok_or_else(|| FrameError::UnknownFrameType {
        bytes: bytes[..2].to_vec(),
    })?;
    let selector = bytes[2];

    let op = match function {
        // Index 2 is a reserved byte inside a weight chunk, so a read response
        // holding at least one chunk is a weight read whatever it contains.
        FunctionCode::ReadResponse if bytes.len() >= CHUNK_LEN => WeightOp::ReadWeight,
        FunctionCode::ReadRequest | FunctionCode::ReadResponse => match selector {
            REG_WEIGHT => WeightOp::ReadWeight,
            REG_DISCRIMINATION_RATE => WeightOp::DiscriminationRate,
            other => WeightOp::Unrecognized(other),
        },
        FunctionCode::WriteRequest | FunctionCode::WriteResponse => match selector {
            CMD_TARE_ZERO_CALIBRATION => WeightOp::TareZeroCalibration,
            REG_DISCRIMINATION_RATE => WeightOp::DiscriminationRate,
            other => WeightOp::Unrecognized(other),
        },
    };

    Ok(FrameKind::Weight { function, op })
}
