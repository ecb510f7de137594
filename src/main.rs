//! Cabinet Frames - decode door-lock and gravity sensor frames from hex text.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cabinet_frames as app;

use app::config::{AppConfig, ConfigLoadResult, LoggingConfig, OutputFormat};
use app::frame::checksum::{LrcFn, door_lrc, seal, weight_lrc};
use app::frame::{TracingTrace, decode_hex, hex_byte, hex_list};
use app::{AppError, ParseResult};

/// Decode medical-supplies cabinet frames.
#[derive(Parser)]
#[command(name = "cabinet-frames", version)]
struct Cli {
    /// Config file path (overrides --dev)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    dev: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log every decode step at debug level
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one frame per argument, or one per stdin line when none are given
    Parse { frames: Vec<String> },
    /// Compute the LRC for a frame body (everything before the checksum byte)
    Lrc {
        #[arg(long, value_enum)]
        family: Family,
        body: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Door,
    Weight,
}

impl Family {
    fn lrc(self) -> LrcFn {
        match self {
            Self::Door => door_lrc,
            Self::Weight => weight_lrc,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let (mut config, load_note) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, "Config loaded successfully"),
        ConfigLoadResult::Missing => (AppConfig::default(), "Config missing, using defaults"),
        ConfigLoadResult::Invalid(e) => {
            return Err(AppError::from(e)).with_context(|| format!("Config path: {}", config_path.display()));
        }
    };
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
    if cli.trace {
        config.logging.trace_frames = true;
    }

    let _guard = init_logging(&config.logging)?;
    tracing::debug!("Config path: {:?}", config_path);
    tracing::debug!("{load_note}");

    match cli.command {
        Command::Parse { frames } => run_parse(frames, &config),
        Command::Lrc { family, body } => run_lrc(family, &body.join(" ")),
    }
}

/// Initialize logging. The returned guard must live until exit when logging to a file.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let level: tracing::Level = logging.level.parse()?;
    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    if logging.trace_frames {
        filter = filter.add_directive("cabinet_frames=debug".parse()?);
    }

    match &logging.file {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let name = path.file_name().context("Log file path has no file name")?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn run_parse(frames: Vec<String>, config: &AppConfig) -> anyhow::Result<ExitCode> {
    let frames = if frames.is_empty() {
        read_stdin_frames().context("Failed to read frames from stdin")?
    } else {
        frames
    };

    let results: Vec<ParseResult> = frames
        .iter()
        .map(|text| {
            if config.logging.trace_frames {
                app::parse_with(text, &TracingTrace)
            } else {
                app::parse(text)
            }
        })
        .collect();

    let failed = results.iter().filter(|r| !r.success).count();
    tracing::info!("Parsed {} frame(s), {} failed", results.len(), failed);

    println!("{}", app::report::render(&results, &config.output)?);

    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn read_stdin_frames() -> app::Result<Vec<String>> {
    let mut frames = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            frames.push(line);
        }
    }
    Ok(frames)
}

fn run_lrc(family: Family, body: &str) -> anyhow::Result<ExitCode> {
    let bytes = decode_hex(body).map_err(|e| AppError::parse(e.to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::parse("Frame body is empty").into());
    }

    let frame = seal(bytes, family.lrc());
    let checksum = frame.last().copied().unwrap_or_default();
    println!("lrc: {}", hex_byte(checksum));
    println!("frame: {}", hex_list(&frame));
    Ok(ExitCode::SUCCESS)
}
