//! Rendering parse results for the command line.

use serde_json::Value;

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::frame::{FrameType, ParseResult};

/// Render a batch of results in the configured format.
pub fn render(results: &[ParseResult], output: &OutputConfig) -> Result<String> {
    match output.format {
        OutputFormat::Json => match results {
            [single] => Ok(serde_json::to_string_pretty(single)?),
            _ => Ok(serde_json::to_string_pretty(results)?),
        },
        OutputFormat::Pretty => Ok(results
            .iter()
            .map(|result| render_text(result, output.show_raw_bytes))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Human-readable block for one result.
pub fn render_text(result: &ParseResult, show_raw_bytes: bool) -> String {
    let status = if result.success { "OK" } else { "FAIL" };
    let family = match result.frame_type {
        FrameType::Door => "door",
        FrameType::Weight => "weight",
        FrameType::Unknown => "unknown",
    };
    let mut out = format!("[{status}] {family}");
    if result.frame_type != FrameType::Unknown {
        out.push_str(if result.is_response { " response" } else { " request" });
    }
    match (&result.command.code, result.command.name.as_str()) {
        (Some(code), "") => out.push_str(&format!(" {code}")),
        (Some(code), name) => out.push_str(&format!(" {name} ({code})")),
        (None, _) => {}
    }
    out.push('\n');

    let mut lines: Vec<String> = result
        .details
        .iter()
        .map(|(key, value)| format!("  {key}: {}", display_value(value)))
        .collect();
    if let Some(message) = &result.message {
        lines.push(format!("  message: {message}"));
    }
    if show_raw_bytes && !result.raw_bytes.is_empty() {
        lines.push(format!("  raw: {}", result.raw_bytes.join(" ")));
    }
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{key}={}", display_value(value)))
                .collect();
            format!("{{{}}}", inner.join(" "))
        }
        other => other.to_string(),
    }
}
