pub mod config;
pub mod error;
pub mod frame;
pub mod report;

pub use error::{AppError, FrameError, Result};
pub use frame::{FrameTrace, FrameType, ParseResult, parse, parse_with};
