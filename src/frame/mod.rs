//! Medical-supplies cabinet frame decoding.
//!
//! Two device families share the serial bus:
//! - door-lock controllers, frames led by `0xF3` with an XOR LRC
//! - gravity (weight) sensors, frames led by a sensor address with an additive LRC
//!
//! Decoding is a pure function of the input text. Nothing is sent, cached or retried.
//!
//! # Example
//!
//! ```
//! use cabinet_frames::frame::{FrameType, parse};
//!
//! let result = parse("F3 00 08 11 11 01 00 00 00 01 08");
//! assert!(result.success);
//! assert_eq!(result.frame_type, FrameType::Door);
//! assert_eq!(result.command.name, "Open");
//! ```

pub mod checksum;
pub mod classify;
pub mod division;
pub mod door;
pub mod result;
pub mod trace;
pub mod types;
pub mod weight;


pub use classify::{RawFrame, classify, decode_hex};
pub use door::DoorFrame;
pub use result::{CommandInfo, DecodedFrame, Details, FrameType, ParseResult};
pub use trace::{FrameTrace, NoTrace, TracingTrace};
pub use types::{DoorCommand, FrameKind, FunctionCode, WeightOp};
pub use weight::{SensorStatus, WeightFrame, WeightPayload, WeightReading};

/// Decode one frame from hex text.
pub fn parse(text: &str) -> ParseResult {
    parse_with(text, &NoTrace)
}

/// Decode one frame from hex text, reporting each step to `trace`.
pub fn parse_with(text: &str, trace: &dyn FrameTrace) -> ParseResult {
    let frame = match RawFrame::from_hex(text) {
        Ok(frame) => frame,
        Err(error) => {
            trace.note(&format!("rejected input: {error}"));
            return ParseResult::new(FrameType::Unknown, &[]).fail(error);
        }
    };
    trace.bytes("input", frame.as_bytes());

    match classify(&frame) {
        Ok(FrameKind::Door) => door::decode(&frame, trace),
        Ok(FrameKind::Weight { function, op }) => weight::decode(&frame, function, op, trace),
        Err(error) => {
            trace.note(&format!("unclassified frame: {error}"));
            ParseResult::new(FrameType::Unknown, frame.as_bytes()).fail(error)
        }
    }
}

/// `0x1f`
pub fn hex_byte(byte: u8) -> String {
    format!("0x{byte:02x}")
}

/// `0x1f2e`
pub fn hex_word(word: u16) -> String {
    format!("0x{word:04x}")
}

/// `0x01 0x02 0x03`
pub fn hex_list(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| hex_byte(b)).collect::<Vec<_>>().join(" ")
}
