//! # ORB Diagnostic CLI
//!
//! Inspect the topics compiled into this build and decode raw messages.
//!
//! # Usage
//!
//! ```bash
//! # All topics
//! orb_diagnostic list
//!
//! # Field layout of one topic
//! orb_diagnostic show adc_report
//!
//! # Decode a captured message
//! orb_diagnostic decode mavlink_log --file capture.bin
//! orb_diagnostic decode 1 --hex "40420f00..." --now 3500000
//!
//! # Unpack a device id
//! orb_diagnostic device-id 0x00214411
//! ```

#![deny(warnings)]

use clap::{Parser, Subcommand};
use orb::clock::SystemMonotonic;
use orb::registry::install_global;
use orb::config::LogLevel;
use orb_diagnostic::commands;
use orb_diagnostic::config::{DEFAULT_LOG_LEVEL, DiagnosticConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;

/// ORB Diagnostic - topic introspection and message decoding
#[derive(Parser, Debug)]
#[command(name = "orb_diagnostic")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Topic introspection and message decoding for the ORB data bus")]
#[command(long_about = None)]
struct Args {
    /// Path to configuration file (orb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered topics
    List,

    /// Show one topic's metadata and field layout
    Show {
        /// Topic name or numeric id
        topic: String,
    },

    /// Decode one raw message
    Decode {
        /// Topic name or numeric id
        topic: String,

        /// Message bytes as hex
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        hex: Option<String>,

        /// File holding the raw message bytes
        #[arg(long)]
        file: Option<PathBuf>,

        /// Monotonic time in microseconds to age the timestamp against
        #[arg(long, value_name = "USEC")]
        now: Option<u64>,
    },

    /// Unpack a 32-bit device id (decimal or 0x hex)
    DeviceId {
        value: String,
    },
}

fn main() {
    if let Err(e) = run() {
        error!("orb_diagnostic failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = DiagnosticConfig::load_or_default(args.config.as_deref());
    let log_level = config
        .as_ref()
        .map_or(DEFAULT_LOG_LEVEL, |c| c.shared.log_level);
    setup_tracing(&args, log_level);

    let config = config?;
    debug!(service = %config.shared.service_name, "configuration loaded");

    let registry = install_global(orb_topics::build_registry(
        config.registry.descriptor_policy,
    )?)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::List => commands::list(registry, &mut out)?,
        Command::Show { topic } => commands::show(registry, &topic, &mut out)?,
        Command::Decode {
            topic,
            hex,
            file,
            now,
        } => {
            let payload = match (hex, file) {
                (Some(text), _) => commands::parse_hex_payload(&text)?,
                (None, Some(path)) => std::fs::read(path)?,
                (None, None) => return Err("either --hex or --file is required".into()),
            };
            let now = commands::sample_time(now, &SystemMonotonic)?;
            commands::decode(
                registry,
                &topic,
                &payload,
                now,
                config.output.format_options(),
                &mut out,
            )?;
        }
        Command::DeviceId { value } => commands::device_id(&value, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
///
/// Logs go to stderr; stdout carries only command output.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from(log_level)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
