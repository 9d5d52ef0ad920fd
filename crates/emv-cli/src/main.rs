use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use emv_card::ReaderSelection;
use tracing_subscriber::EnvFilter;

mod commands;
mod formatters;
use formatters::FormatMode;

#[derive(Parser)]
#[command(name = "emv-pan")]
#[command(about = "EMV PAN Reader - Read the card number and expiry from EMV chip cards")]
#[command(version)]
struct Args {
    /// Output format mode
    #[arg(short, long, value_enum, default_value_t = FormatMode::Plain, global = true)]
    format: FormatMode,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List connected card readers
    Readers,
    /// Read the card currently in the reader
    Read {
        /// Reader name (default: first reader found)
        #[arg(short, long, env = "EMV_READER")]
        reader: Option<String>,
    },
    /// Read every card as it is inserted
    Watch {
        /// Reader name (default: all readers)
        #[arg(short, long, env = "EMV_READER")]
        reader: Option<String>,
        /// Status poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
}

fn main() -> ExitCode {
    // Set RUST_LOG=debug to log every APDU exchange, RUST_LOG=trace for raw bytes
    // Default: info level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let format_mode = args.format;

    let ok = match args.command.unwrap_or_else(|| Command::Read {
        reader: std::env::var("EMV_READER").ok(),
    }) {
        Command::Readers => commands::readers::cmd_readers(),
        Command::Read { reader } => {
            commands::read::cmd_read(&ReaderSelection::from_name(reader), format_mode)
        }
        Command::Watch { reader, poll_ms } => commands::watch::cmd_watch(
            &ReaderSelection::from_name(reader),
            format_mode,
            Duration::from_millis(poll_ms),
        ),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
