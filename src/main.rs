//! botdeck - operator console for a messaging-bot pairing session
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::Parser;

use botdeck::console::ConsoleEvent;
use botdeck::{run_console, ConsoleOptions, OutputMode};
use botdeck_core::prelude::*;

/// botdeck - supervise a messaging-bot pairing session from the terminal
#[derive(Parser, Debug)]
#[command(name = "botdeck")]
#[command(about = "Operator console for a messaging-bot pairing session", long_about = None)]
struct Args {
    /// Directory holding .botdeck/config.toml (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Start a session for this phone number right away (e.g. 628xxx, no +)
    #[arg(long, value_name = "NUMBER")]
    phone: Option<String>,

    /// Write NDJSON events instead of plain activity lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let output = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Plain
    };

    if let Err(e) = run(args, output).await {
        error!("Application error: {:?}", e);
        ConsoleEvent::error(e.to_string(), e.is_fatal()).emit(output);
        std::process::exit(1);
    }
}

async fn run(args: Args, output: OutputMode) -> Result<()> {
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;
    botdeck_core::logging::init()?;

    let config_dir = args
        .config_dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    run_console(ConsoleOptions {
        config_dir,
        phone_number: args.phone,
        output,
    })
    .await
}
