//! Console runner - main event loop
//!
//! Reads operator commands from stdin, feeds the engine, and renders engine
//! events to stdout. All session state lives in the engine.

use std::path::PathBuf;

use tokio::sync::{broadcast, mpsc};

use botdeck_app::{Engine, EngineEvent, Message};
use botdeck_core::prelude::*;

use super::command::{ConsoleCommand, UnknownCommand};
use super::{ConsoleEvent, OutputMode};

/// stdin lines buffered ahead of the loop
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Console runner options (from the CLI)
#[derive(Debug, Clone, Default)]
pub struct ConsoleOptions {
    /// Directory holding `.botdeck/config.toml`
    pub config_dir: PathBuf,
    /// Start a session immediately for this number
    pub phone_number: Option<String>,
    pub output: OutputMode,
}

/// What the stdin reader hands to the loop
#[derive(Debug)]
enum Input {
    Command(ConsoleCommand),
    Unknown(UnknownCommand),
}

/// Run the operator console until `quit`, stdin EOF, or a signal
pub async fn run_console(options: ConsoleOptions) -> Result<()> {
    info!("Config dir: {}", options.config_dir.display());

    let mut engine = Engine::new(options.config_dir.clone());
    let mut events = engine.subscribe();

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Input>(COMMAND_CHANNEL_CAPACITY);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(cmd_tx);
    });

    engine.notify_plugins_start();

    if options.output == OutputMode::Plain {
        println!("botdeck ready. Type 'help' for commands.");
    }

    if let Some(phone_number) = options.phone_number.as_deref() {
        info!("Auto-starting session");
        if let Err(e) = engine.start(phone_number) {
            debug!("Auto-start rejected: {}", e);
        }
        render_pending(&mut events, options.output);
    }

    let result = console_event_loop(&mut engine, &mut events, &mut cmd_rx, options.output).await;

    engine.shutdown().await;
    render_pending(&mut events, options.output);

    info!("botdeck console exiting");
    result
}

/// Main console event loop
async fn console_event_loop(
    engine: &mut Engine,
    events: &mut broadcast::Receiver<EngineEvent>,
    cmd_rx: &mut mpsc::Receiver<Input>,
    output: OutputMode,
) -> Result<()> {
    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        tokio::select! {
            msg = engine.msg_rx.recv() => match msg {
                Some(msg) => engine.process_message(msg),
                None => {
                    error!("Message channel closed");
                    return Err(Error::ChannelClosed);
                }
            },
            input = cmd_rx.recv() => match input {
                Some(Input::Command(command)) => handle_command(engine, command, output),
                Some(Input::Unknown(unknown)) => {
                    ConsoleEvent::error(unknown.to_string(), false).emit(output);
                }
                None => {
                    // Reader thread gone; treat like quit
                    engine.process_message(Message::Quit);
                }
            },
        }

        render_pending(events, output);
    }

    Ok(())
}

/// Apply one operator command to the engine
fn handle_command(engine: &mut Engine, command: ConsoleCommand, output: OutputMode) {
    match command {
        ConsoleCommand::Start { phone_number } => {
            // The outcome is already in the activity log
            if let Err(e) = engine.start(&phone_number) {
                debug!("Start rejected: {}", e);
            }
        }
        ConsoleCommand::Stop => engine.stop(),
        ConsoleCommand::Reset => engine.reset_stats(),
        ConsoleCommand::Status => ConsoleEvent::status(engine.snapshot()).emit(output),
        ConsoleCommand::Help => ConsoleEvent::help().emit(output),
        ConsoleCommand::Quit => engine.process_message(Message::Quit),
    }
}

/// Render every engine event received since the last call
fn render_pending(events: &mut broadcast::Receiver<EngineEvent>, output: OutputMode) {
    loop {
        match events.try_recv() {
            Ok(event) => ConsoleEvent::from_engine(&event).emit(output),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Console fell behind engine events");
            }
            Err(broadcast::error::TryRecvError::Empty)
            | Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }
}

/// Read stdin lines on a dedicated thread and forward parsed commands
fn spawn_stdin_reader_blocking(cmd_tx: mpsc::Sender<Input>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        let input = match ConsoleCommand::parse(&line) {
            None => continue,
            Some(Ok(command)) => Input::Command(command),
            Some(Err(unknown)) => {
                warn!("Unknown stdin command: {}", unknown.0);
                Input::Unknown(unknown)
            }
        };

        let quitting = matches!(input, Input::Command(ConsoleCommand::Quit));
        if cmd_tx.blocking_send(input).is_err() || quitting {
            break;
        }
    }

    info!("Stdin reader exiting");
}
