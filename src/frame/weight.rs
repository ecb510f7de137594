//! Gravity sensor frames.
//!
//! Every frame starts with the sensor address (0 = broadcast), a function code and
//! a register/command byte, and ends with an additive LRC. Weight-read responses
//! are different: they concatenate one 9-byte chunk per sensor, each with its own
//! LRC:
//!
//! | offset | field |
//! |---|---|
//! | 0 | sensor address |
//! | 1..3 | reserved |
//! | 3 | status flags |
//! | 4 | bit 7 sign (1 = negative), bits 0-3 division code |
//! | 5..8 | division count, 24-bit big-endian |
//! | 8 | LRC |

use serde::Serialize;
use serde_json::Value;

use super::checksum::{LrcCheck, seal, weight_lrc};
use super::classify::RawFrame;
use super::division::{DEFAULT_DIVISION_VALUE, division_value, is_mapped};
use super::hex_byte;
use super::result::{CommandInfo, DecodedFrame, FrameType, ParseResult};
use super::trace::FrameTrace;
use super::types::{
    BROADCAST_ADDRESS, CHUNK_LEN, FN_READ_RESPONSE, FunctionCode, WEIGHT_MIN_LEN, WEIGHT_PAYLOAD_LEN, WRITE_ACK_OK,
    WeightOp,
};
use crate::error::FrameError;

const SIGN_BIT: u8 = 0x80;
const DIVISION_CODE_MASK: u8 = 0x0F;
const COUNT_MASK: u32 = 0x00FF_FFFF;

/// Status flags of one sensor, bit 7 to bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatus {
    pub raw: u8,
    pub calibration_allowed: bool,
    pub fixed_one: bool,
    pub fixed_zero: bool,
    pub fault: bool,
    pub range_overflow: bool,
    pub zero_abnormal_at_power_up: bool,
    pub stable: bool,
    pub zero_position: bool,
}

impl SensorStatus {
    pub fn from_byte(raw: u8) -> Self {
        let bit = |n: u8| raw & (1 << n) != 0;
        Self {
            raw,
            calibration_allowed: bit(7),
            fixed_one: bit(6),
            fixed_zero: bit(5),
            fault: bit(4),
            range_overflow: bit(3),
            zero_abnormal_at_power_up: bit(2),
            stable: bit(1),
            zero_position: bit(0),
        }
    }
}

/// One sensor's record from a weight-read response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightReading {
    pub address: u8,
    pub status: SensorStatus,
    pub negative: bool,
    pub division_code: u8,
    /// Grams per division.
    pub division_value: f64,
    pub division_count: u32,
    /// Signed weight in grams.
    pub weight: f64,
    pub lrc: LrcCheck,
}

impl WeightReading {
    /// Decode one chunk. `chunk` must be [`CHUNK_LEN`] bytes.
    pub fn from_chunk(chunk: &[u8]) -> Self {
        let sign_division = chunk[4];
        let negative = sign_division & SIGN_BIT != 0;
        let division_code = sign_division & DIVISION_CODE_MASK;
        let division_value = division_value(division_code);
        let division_count = u32::from_be_bytes([0, chunk[5], chunk[6], chunk[7]]);
        let magnitude = f64::from(division_count) * division_value;

        Self {
            address: chunk[0],
            status: SensorStatus::from_byte(chunk[3]),
            negative,
            division_code,
            division_value,
            division_count,
            weight: if negative { -magnitude } else { magnitude },
            lrc: LrcCheck::of(chunk, weight_lrc),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Type-specific content of a weight frame.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightPayload {
    /// Requests without payload and unrecognized operations.
    Empty,
    Readings(Vec<WeightReading>),
    /// Current rate (read response) or requested rate (write request).
    Rate(u8),
    /// Write response sentinel.
    WriteAck { succeeded: bool, code: u8 },
}

/// Decoded gravity sensor frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightFrame {
    /// Address of the frame, or of the first chunk of a weight-read response.
    pub address: u8,
    pub function: FunctionCode,
    pub op: WeightOp,
    pub payload: WeightPayload,
}

impl WeightFrame {
    pub fn readings(&self) -> &[WeightReading] {
        match &self.payload {
            WeightPayload::Readings(readings) => readings,
            _ => &[],
        }
    }
}

/// Build a command or short response: address, function, register/command,
/// optional payload byte, LRC.
pub fn encode_command(address: u8, function: FunctionCode, op: WeightOp, payload: Option<u8>) -> Vec<u8> {
    let mut body = vec![address, function.code(), op.code()];
    body.extend(payload);
    seal(body, weight_lrc)
}

/// Build one weight-read response chunk. `count` is truncated to 24 bits.
pub fn encode_chunk(address: u8, status: u8, negative: bool, division_code: u8, count: u32) -> Vec<u8> {
    let sign = if negative { SIGN_BIT } else { 0 };
    let count = (count & COUNT_MASK).to_be_bytes();
    let body = vec![
        address,
        FN_READ_RESPONSE,
        0x00,
        status,
        sign | (division_code & DIVISION_CODE_MASK),
        count[1],
        count[2],
        count[3],
    ];
    seal(body, weight_lrc)
}

fn address_label(address: u8) -> String {
    if address == BROADCAST_ADDRESS {
        "broadcast".to_string()
    } else {
        format!("sensor {address}")
    }
}

fn rate_description(rate: u8) -> String {
    if rate == 0 {
        "compensation tracking disabled".to_string()
    } else {
        format!("{rate}x division value")
    }
}

/// Decode a frame already classified as a weight frame.
pub(crate) fn decode(frame: &RawFrame, function: FunctionCode, op: WeightOp, trace: &dyn FrameTrace) -> ParseResult {
    let bytes = frame.as_bytes();
    let mut result = ParseResult::new(FrameType::Weight, bytes);
    result.is_response = function.is_response();
    result.command = CommandInfo::new(hex_byte(op.code()), op.command_name(function));

    if let WeightOp::Unrecognized(code) = op {
        trace.note(&format!("unrecognized weight register/command {}", hex_byte(code)));
    }

    match (function, op) {
        (FunctionCode::ReadResponse, WeightOp::ReadWeight) => decode_readings(result, bytes, function, trace),
        _ => decode_command(result, bytes, function, op, trace),
    }
}

/// Weight-read response: one or more chunks, checked one by one.
///
/// A chunk that fails its LRC never fails the frame: any subset of failing chunks,
/// the whole response included, keeps `success` and is reported in `message`.
/// A lone chunk reports `ChecksumFailure`, several report `PartialChecksumFailure`.
fn decode_readings(mut result: ParseResult, bytes: &[u8], function: FunctionCode, trace: &dyn FrameTrace) -> ParseResult {
    let count = bytes.len() / CHUNK_LEN;
    if count == 0 {
        return result.fail(FrameError::invalid_format(format!(
            "weight response needs at least one {CHUNK_LEN}-byte chunk, got {} bytes",
            bytes.len()
        )));
    }

    let dropped = bytes.len() % CHUNK_LEN;
    if dropped > 0 {
        trace.note(&format!("dropping {dropped} trailing bytes after {count} chunks"));
        result.insert("droppedBytes", dropped);
    }

    let readings: Vec<WeightReading> = bytes
        .chunks_exact(CHUNK_LEN)
        .map(|chunk| {
            trace.bytes("chunk", chunk);
            let reading = WeightReading::from_chunk(chunk);
            trace.checksum(&address_label(reading.address), reading.lrc);
            if !is_mapped(reading.division_code) {
                trace.note(&format!(
                    "{} reports unmapped division code {}, using {DEFAULT_DIVISION_VALUE} g",
                    address_label(reading.address),
                    reading.division_code
                ));
            }
            reading
        })
        .collect();

    let failed: Vec<&WeightReading> = readings.iter().filter(|r| !r.lrc.is_valid()).collect();
    let single_failure = match failed.as_slice() {
        [only] if count == 1 => Some((only.lrc, only.address)),
        _ => None,
    };
    let failed_addresses: Vec<u8> = failed.iter().map(|r| r.address).collect();

    result.insert("chunkCount", count);
    result.insert("readings", readings.iter().map(WeightReading::to_value).collect::<Vec<_>>());
    if let [reading] = readings.as_slice() {
        result.insert("address", reading.address);
        result.insert("weight", reading.weight);
    }

    result.frame = Some(DecodedFrame::Weight(WeightFrame {
        address: bytes[0],
        function,
        op: WeightOp::ReadWeight,
        payload: WeightPayload::Readings(readings),
    }));

    if let Some((check, address)) = single_failure {
        return result.warn_with(check.error(), &address_label(address));
    }
    if !failed_addresses.is_empty() {
        return result.warn(FrameError::PartialChecksumFailure {
            addresses: failed_addresses,
        });
    }
    result
}

/// Everything except weight-read responses: one frame, one LRC.
fn decode_command(
    mut result: ParseResult,
    bytes: &[u8],
    function: FunctionCode,
    op: WeightOp,
    trace: &dyn FrameTrace,
) -> ParseResult {
    if bytes.len() < WEIGHT_MIN_LEN {
        return result.fail(FrameError::invalid_format(format!(
            "weight frame needs at least {WEIGHT_MIN_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let address = bytes[0];
    let label = address_label(address);
    result.insert("address", address);
    result.insert("addressLabel", label.clone());
    result.insert("functionCode", hex_byte(function.code()));

    let check = LrcCheck::of(bytes, weight_lrc);
    trace.checksum("weight", check);
    if let Err(error) = check.verify() {
        result.insert("calculated", hex_byte(check.computed));
        result.insert("received", hex_byte(check.received));
        let context = match op.command_name(function) {
            "" => label,
            name => format!("{name}, {label}"),
        };
        return result.fail_with(error, &context);
    }
    result.insert("lrc", hex_byte(check.received));

    let payload = match (op, function) {
        (WeightOp::DiscriminationRate, FunctionCode::ReadResponse | FunctionCode::WriteRequest) => {
            match payload_byte(bytes, op) {
                Ok(rate) => WeightPayload::Rate(rate),
                Err(error) => return result.fail(error),
            }
        }
        (WeightOp::DiscriminationRate | WeightOp::TareZeroCalibration, FunctionCode::WriteResponse) => {
            match payload_byte(bytes, op) {
                Ok(code) => WeightPayload::WriteAck {
                    succeeded: code == WRITE_ACK_OK,
                    code,
                },
                Err(error) => return result.fail(error),
            }
        }
        _ => WeightPayload::Empty,
    };

    match (&payload, function) {
        (WeightPayload::Rate(rate), FunctionCode::ReadResponse) => {
            result.insert("discriminationRate", *rate);
            result.insert("statusDesc", format!("{label} current discrimination rate: {rate}"));
        }
        (WeightPayload::Rate(rate), _) => {
            result.insert("rate", *rate);
            result.insert("rateDesc", rate_description(*rate));
            result.insert(
                "statusDesc",
                format!("{label} set discrimination rate: {}", rate_description(*rate)),
            );
        }
        (WeightPayload::WriteAck { succeeded, code }, _) => {
            result.insert("operationSucceeded", *succeeded);
            result.insert("resultCode", hex_byte(*code));
            let outcome = if *succeeded { "succeeded" } else { "failed" };
            result.insert("statusDesc", format!("{label} write {outcome}"));
        }
        _ => {}
    }

    result.frame = Some(DecodedFrame::Weight(WeightFrame {
        address,
        function,
        op,
        payload,
    }));
    result
}

fn payload_byte(bytes: &[u8], op: WeightOp) -> Result<u8, FrameError> {
    if bytes.len() < WEIGHT_PAYLOAD_LEN {
        return Err(FrameError::invalid_format(format!(
            "{} frame needs a payload byte ({WEIGHT_PAYLOAD_LEN} bytes), got {}",
            hex_byte(op.code()),
            bytes.len()
        )));
    }
    Ok(bytes[3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::trace::NoTrace;

    fn decode_bytes(bytes: Vec<u8>, function: FunctionCode, op: WeightOp) -> ParseResult {
        decode(&RawFrame::try_from(bytes).unwrap(), function, op, &NoTrace)
    }

    #[test]
    fn test_status_bits() {
        let status = SensorStatus::from_byte(0b1001_0011);
        assert!(status.calibration_allowed);
        assert!(!status.fixed_one);
        assert!(!status.fixed_zero);
        assert!(status.fault);
        assert!(!status.range_overflow);
        assert!(!status.zero_abnormal_at_power_up);
        assert!(status.stable);
        assert!(status.zero_position);
    }

    #[test]
    fn test_single_chunk_reading() {
        let chunk = [0x01, 0x06, 0x00, 0x02, 0x43, 0x00, 0x00, 0x0A, 0x56];
        let reading = WeightReading::from_chunk(&chunk);
        assert_eq!(reading.address, 1);
        assert_eq!(reading.division_code, 3);
        assert_eq!(reading.division_value, 1.0);
        assert_eq!(reading.division_count, 10);
        assert!(!reading.negative);
        assert_eq!(reading.weight, 10.0);
        assert!(reading.status.stable);
        assert!(reading.lrc.is_valid());
    }

    #[test]
    fn test_negative_reading() {
        let chunk = encode_chunk(4, 0x42, true, 4, 300);
        let reading = WeightReading::from_chunk(&chunk);
        assert!(reading.negative);
        assert_eq!(reading.division_value, 2.0);
        assert_eq!(reading.weight, -600.0);
    }

    #[test]
    fn test_unmapped_division_code_uses_default() {
        let chunk = encode_chunk(1, 0x42, false, 11, 7);
        let reading = WeightReading::from_chunk(&chunk);
        assert_eq!(reading.division_code, 11);
        assert_eq!(reading.weight, 7.0);
    }

    #[test]
    fn test_count_is_24_bit() {
        let chunk = encode_chunk(1, 0x42, false, 3, 0x0112_3456);
        assert_eq!(WeightReading::from_chunk(&chunk).division_count, 0x12_3456);
    }

    #[test]
    fn test_single_chunk_bad_lrc_is_reported() {
        let mut chunk = encode_chunk(3, 0x42, false, 3, 10);
        chunk[8] ^= 0xFF;
        let result = decode_bytes(chunk, FunctionCode::ReadResponse, WeightOp::ReadWeight);
        assert!(result.success);
        assert!(matches!(result.error, Some(FrameError::ChecksumFailure { .. })));
        assert!(result.message.as_deref().unwrap().contains("sensor 3"));
        // reading is still reported for the operator
        assert_eq!(result.weight().unwrap().readings().len(), 1);
    }

    #[test]
    fn test_remainder_bytes_dropped() {
        let mut bytes = encode_chunk(1, 0x42, false, 3, 10);
        bytes.extend(encode_chunk(2, 0x42, false, 3, 20));
        bytes.extend([0xAA, 0xBB]);
        let result = decode_bytes(bytes, FunctionCode::ReadResponse, WeightOp::ReadWeight);
        assert!(result.success);
        assert_eq!(result.details["droppedBytes"], 2);
        assert_eq!(result.details["chunkCount"], 2);
        assert_eq!(result.weight().unwrap().readings().len(), 2);
    }

    #[test]
    fn test_short_read_response_is_invalid() {
        let bytes = encode_command(1, FunctionCode::ReadResponse, WeightOp::ReadWeight, Some(0x10));
        let result = decode_bytes(bytes, FunctionCode::ReadResponse, WeightOp::ReadWeight);
        assert!(!result.success);
        assert!(matches!(result.error, Some(FrameError::InvalidFormat { .. })));
    }

    #[test]
    fn test_read_weight_request() {
        let bytes = encode_command(1, FunctionCode::ReadRequest, WeightOp::ReadWeight, None);
        assert_eq!(bytes, vec![0x01, 0x05, 0x02, 0x08]);
        let result = decode_bytes(bytes, FunctionCode::ReadRequest, WeightOp::ReadWeight);
        assert!(result.success);
        assert!(!result.is_response);
        assert_eq!(result.command.name, "ReadWeight");
        assert_eq!(result.weight().unwrap().payload, WeightPayload::Empty);
    }

    #[test]
    fn test_discrimination_rate_read_response() {
        let bytes = encode_command(2, FunctionCode::ReadResponse, WeightOp::DiscriminationRate, Some(3));
        let result = decode_bytes(bytes, FunctionCode::ReadResponse, WeightOp::DiscriminationRate);
        assert!(result.success);
        assert!(result.is_response);
        assert_eq!(result.command.name, "ReadDiscriminationRate");
        assert_eq!(result.details["discriminationRate"], 3);
        assert_eq!(result.weight().unwrap().payload, WeightPayload::Rate(3));
    }

    #[test]
    fn test_discrimination_rate_write_request() {
        let bytes = encode_command(0, FunctionCode::WriteRequest, WeightOp::DiscriminationRate, Some(0));
        let result = decode_bytes(bytes, FunctionCode::WriteRequest, WeightOp::DiscriminationRate);
        assert!(result.success);
        assert_eq!(result.command.name, "SetDiscriminationRate");
        assert_eq!(result.details["rateDesc"], "compensation tracking disabled");
        assert_eq!(result.details["addressLabel"], "broadcast");

        let bytes = encode_command(1, FunctionCode::WriteRequest, WeightOp::DiscriminationRate, Some(4));
        let result = decode_bytes(bytes, FunctionCode::WriteRequest, WeightOp::DiscriminationRate);
        assert_eq!(result.details["rateDesc"], "4x division value");
    }

    #[test]
    fn test_write_response_sentinel() {
        let ok = encode_command(1, FunctionCode::WriteResponse, WeightOp::DiscriminationRate, Some(WRITE_ACK_OK));
        let result = decode_bytes(ok, FunctionCode::WriteResponse, WeightOp::DiscriminationRate);
        assert!(result.success);
        assert_eq!(result.details["operationSucceeded"], true);

        let rejected = encode_command(1, FunctionCode::WriteResponse, WeightOp::TareZeroCalibration, Some(0x04));
        let result = decode_bytes(rejected, FunctionCode::WriteResponse, WeightOp::TareZeroCalibration);
        // the frame is valid even though the sensor refused the write
        assert!(result.success);
        assert_eq!(result.command.name, "TareZeroCalibration");
        assert_eq!(
            result.weight().unwrap().payload,
            WeightPayload::WriteAck { succeeded: false, code: 0x04 }
        );
    }

    #[test]
    fn test_tare_request_has_no_payload() {
        let bytes = encode_command(0, FunctionCode::WriteRequest, WeightOp::TareZeroCalibration, None);
        let result = decode_bytes(bytes, FunctionCode::WriteRequest, WeightOp::TareZeroCalibration);
        assert!(result.success);
        assert!(!result.is_response);
        assert_eq!(result.weight().unwrap().payload, WeightPayload::Empty);
    }

    #[test]
    fn test_missing_payload_byte() {
        let bytes = encode_command(1, FunctionCode::WriteResponse, WeightOp::TareZeroCalibration, None);
        let result = decode_bytes(bytes, FunctionCode::WriteResponse, WeightOp::TareZeroCalibration);
        assert!(!result.success);
        assert!(matches!(result.error, Some(FrameError::InvalidFormat { .. })));
    }

    #[test]
    fn test_unrecognized_register_decodes_header() {
        let bytes = encode_command(5, FunctionCode::ReadRequest, WeightOp::Unrecognized(0x7A), None);
        let result = decode_bytes(bytes, FunctionCode::ReadRequest, WeightOp::Unrecognized(0x7A));
        assert!(result.success);
        assert_eq!(result.command.name, "");
        assert_eq!(result.command.code.as_deref(), Some("0x7a"));
        assert_eq!(result.details["address"], 5);
        assert!(result.detail("statusDesc").is_none());
    }

    #[test]
    fn test_command_checksum_failure() {
        let mut bytes = encode_command(1, FunctionCode::WriteRequest, WeightOp::DiscriminationRate, Some(2));
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_add(1);
        let result = decode_bytes(bytes, FunctionCode::WriteRequest, WeightOp::DiscriminationRate);
        assert!(!result.success);
        assert!(matches!(result.error, Some(FrameError::ChecksumFailure { .. })));
        assert_eq!(
            result.message.as_deref().unwrap(),
            "LRC check failed: computed 0x94, received 0x95 (SetDiscriminationRate, sensor 1)"
        );
    }
}
