//! Door-lock controller frames.
//!
//! Layout (big-endian multi-byte fields):
//! - 0: header `0xF3`
//! - 1..3: length (8 = request, 9 = response)
//! - 3..5: command code
//! - 5: cabinet address
//! - 6..8: return code
//! - 8: sequence number
//! - 9: lock number
//! - 10: lock status (responses only, 1 = open)
//! - last: XOR LRC

use super::checksum::{LrcCheck, door_lrc, seal};
use super::classify::RawFrame;
use super::result::{CommandInfo, DecodedFrame, FrameType, ParseResult};
use super::trace::FrameTrace;
use super::types::{
    DOOR_HEADER, DOOR_LENGTH_OVERHEAD, DOOR_LENGTH_REQUEST, DOOR_LENGTH_RESPONSE, DOOR_REQUEST_LEN, DOOR_RESPONSE_LEN,
    DoorCommand,
};
use super::{hex_byte, hex_word};
use crate::error::FrameError;

/// Status byte value reported for an open lock.
pub const LOCK_OPEN: u8 = 0x01;

/// Decoded door-lock frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorFrame {
    pub length: u16,
    pub command: DoorCommand,
    pub address: u8,
    pub return_code: u16,
    pub sequence: u8,
    pub lock_number: u8,
    /// Raw status byte, present on responses only.
    pub status: Option<u8>,
}

impl DoorFrame {
    /// Request addressed to one lock of one cabinet.
    pub fn request(command: DoorCommand, address: u8, lock_number: u8) -> Self {
        Self {
            length: DOOR_LENGTH_REQUEST,
            command,
            address,
            return_code: 0,
            sequence: 0,
            lock_number,
            status: None,
        }
    }

    /// Response carrying a lock status byte.
    pub fn response(command: DoorCommand, address: u8, lock_number: u8, status: u8) -> Self {
        Self {
            length: DOOR_LENGTH_RESPONSE,
            status: Some(status),
            ..Self::request(command, address, lock_number)
        }
    }

    pub fn with_sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_return_code(mut self, return_code: u16) -> Self {
        self.return_code = return_code;
        self
    }

    pub fn is_response(&self) -> bool {
        self.length == DOOR_LENGTH_RESPONSE
    }

    /// `Some(true)` when a response reports the lock open.
    pub fn is_open(&self) -> Option<bool> {
        self.status.map(|s| s == LOCK_OPEN)
    }

    /// Serialize with a freshly computed LRC.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(DOOR_RESPONSE_LEN);
        body.push(DOOR_HEADER);
        body.extend_from_slice(&self.length.to_be_bytes());
        body.extend_from_slice(&self.command.code().to_be_bytes());
        body.push(self.address);
        body.extend_from_slice(&self.return_code.to_be_bytes());
        body.push(self.sequence);
        body.push(self.lock_number);
        if let Some(status) = self.status {
            body.push(status);
        }
        seal(body, door_lrc)
    }

    /// Read the fixed-offset fields. `bytes` must hold at least a request frame.
    fn read_fields(bytes: &[u8]) -> Self {
        let length = u16::from_be_bytes([bytes[1], bytes[2]]);
        let status = if length == DOOR_LENGTH_RESPONSE { bytes.get(10).copied() } else { None };

        Self {
            length,
            command: DoorCommand::from_code(u16::from_be_bytes([bytes[3], bytes[4]])),
            address: bytes[5],
            return_code: u16::from_be_bytes([bytes[6], bytes[7]]),
            sequence: bytes[8],
            lock_number: bytes[9],
            status,
        }
    }

    fn describe(&self) -> String {
        let command = match self.command.name() {
            "" => hex_word(self.command.code()),
            name => name.to_string(),
        };
        format!("{command}, cabinet {}, lock {}", self.address, self.lock_number)
    }
}

/// Decode a frame already classified as a door frame.
pub(crate) fn decode(frame: &RawFrame, trace: &dyn FrameTrace) -> ParseResult {
    let bytes = frame.as_bytes();
    let mut result = ParseResult::new(FrameType::Door, bytes);

    if bytes.len() < DOOR_REQUEST_LEN {
        return result.fail(FrameError::invalid_format(format!(
            "door frame needs at least {DOOR_REQUEST_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let door = DoorFrame::read_fields(bytes);
    result.is_response = door.is_response();
    result.command = CommandInfo::new(hex_word(door.command.code()), door.command.name());

    if door.is_response() && bytes.len() < DOOR_RESPONSE_LEN {
        return result.fail(FrameError::invalid_format(format!(
            "door response needs {DOOR_RESPONSE_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    if usize::from(door.length) + DOOR_LENGTH_OVERHEAD != bytes.len() {
        trace.note(&format!(
            "door length field {} does not match {} received bytes",
            door.length,
            bytes.len()
        ));
    }
    if door.command.name().is_empty() {
        trace.note(&format!("unrecognized door command {}", hex_word(door.command.code())));
    }

    let check = LrcCheck::of(bytes, door_lrc);
    trace.checksum("door", check);

    result.insert("header", hex_byte(bytes[0]));
    result.insert("length", door.length);
    result.insert("commandCode", hex_word(door.command.code()));
    result.insert("address", door.address);
    result.insert("lockNumber", door.lock_number);

    if let Err(error) = check.verify() {
        result.insert("calculated", hex_byte(check.computed));
        result.insert("received", hex_byte(check.received));
        let context = door.describe();
        result.frame = Some(DecodedFrame::Door(door));
        return result.fail_with(error, &context);
    }

    result.insert("returnCode", hex_word(door.return_code));
    result.insert("sequence", door.sequence);
    result.insert("lrc", hex_byte(check.received));
    if let (Some(status), Some(open)) = (door.status, door.is_open()) {
        result.insert("status", hex_byte(status));
        result.insert("doorOpen", open);
    }

    result.frame = Some(DecodedFrame::Door(door));
    result
}
