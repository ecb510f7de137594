//! Cabinet protocol constants and classification types.

use serde::Serialize;

/// Shortest byte sequence the classifier accepts.
pub const MIN_FRAME_LEN: usize = 3;

// Door-lock controller
pub const DOOR_HEADER: u8 = 0xF3;
pub const DOOR_LENGTH_REQUEST: u16 = 8;
pub const DOOR_LENGTH_RESPONSE: u16 = 9;
pub const DOOR_REQUEST_LEN: usize = 11;
pub const DOOR_RESPONSE_LEN: usize = 12;
/// Bytes before the length field's coverage: header(1) + length(2)
pub const DOOR_LENGTH_OVERHEAD: usize = 3;

// Door command codes
pub const CMD_OPEN: u16 = 0x1111;
pub const CMD_QUERY_STATUS: u16 = 0x1110;

// Gravity sensor function codes
pub const FN_READ_REQUEST: u8 = 0x05;
pub const FN_READ_RESPONSE: u8 = 0x06;
pub const FN_WRITE_REQUEST: u8 = 0x63;
pub const FN_WRITE_RESPONSE: u8 = 0x64;

// Gravity sensor registers / write commands
pub const REG_WEIGHT: u8 = 0x02;
pub const REG_DISCRIMINATION_RATE: u8 = 0x2E;
pub const CMD_TARE_ZERO_CALIBRATION: u8 = 0x06;

/// Payload byte a write response carries when the sensor accepted the write.
pub const WRITE_ACK_OK: u8 = 0x05;

/// Address byte that targets every sensor on the bus.
pub const BROADCAST_ADDRESS: u8 = 0x00;

/// address + function + register + checksum
pub const WEIGHT_MIN_LEN: usize = 4;
/// address + function + register + payload + checksum
pub const WEIGHT_PAYLOAD_LEN: usize = 5;
/// One sensor record inside a weight-read response.
pub const CHUNK_LEN: usize = 9;

/// Gravity sensor function code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FunctionCode {
    ReadRequest,
    ReadResponse,
    WriteRequest,
    WriteResponse,
}

impl FunctionCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            FN_READ_REQUEST => Some(Self::ReadRequest),
            FN_READ_RESPONSE => Some(Self::ReadResponse),
            FN_WRITE_REQUEST => Some(Self::WriteRequest),
            FN_WRITE_RESPONSE => Some(Self::WriteResponse),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::ReadRequest => FN_READ_REQUEST,
            Self::ReadResponse => FN_READ_RESPONSE,
            Self::WriteRequest => FN_WRITE_REQUEST,
            Self::WriteResponse => FN_WRITE_RESPONSE,
        }
    }

    pub fn is_response(self) -> bool {
        matches!(self, Self::ReadResponse | Self::WriteResponse)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Self::WriteRequest | Self::WriteResponse)
    }
}

/// Sub-operation of a gravity sensor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeightOp {
    ReadWeight,
    DiscriminationRate,
    TareZeroCalibration,
    /// Register/command byte this decoder does not know; header-only decode.
    Unrecognized(u8),
}

impl WeightOp {
    /// Register or command byte that selects this operation.
    pub fn code(self) -> u8 {
        match self {
            Self::ReadWeight => REG_WEIGHT,
            Self::DiscriminationRate => REG_DISCRIMINATION_RATE,
            Self::TareZeroCalibration => CMD_TARE_ZERO_CALIBRATION,
            Self::Unrecognized(code) => code,
        }
    }

    /// Display name; empty for unrecognized codes.
    pub fn command_name(self, function: FunctionCode) -> &'static str {
        match self {
            Self::ReadWeight => "ReadWeight",
            Self::DiscriminationRate if function.is_write() => "SetDiscriminationRate",
            Self::DiscriminationRate => "ReadDiscriminationRate",
            Self::TareZeroCalibration => "TareZeroCalibration",
            Self::Unrecognized(_) => "",
        }
    }
}

/// Frame family, decided once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Door,
    Weight { function: FunctionCode, op: WeightOp },
}

/// Door-lock controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoorCommand {
    Open,
    QueryStatus,
    /// Code kept verbatim for firmware revisions with newer commands.
    Other(u16),
}

impl DoorCommand {
    pub fn from_code(code: u16) -> Self {
        match code {
            CMD_OPEN => Self::Open,
            CMD_QUERY_STATUS => Self::QueryStatus,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::Open => CMD_OPEN,
            Self::QueryStatus => CMD_QUERY_STATUS,
            Self::Other(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::QueryStatus => "QueryStatus",
            Self::Other(_) => "",
        }
    }
}
