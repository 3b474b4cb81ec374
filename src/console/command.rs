//! Operator commands read from stdin

use std::fmt;

/// One parsed stdin line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `start <number>`; the number may be blank, validation happens in the engine
    Start { phone_number: String },
    Stop,
    Status,
    Reset,
    Help,
    Quit,
}

/// A line that is not a known command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown command: {} (type 'help')", self.0)
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  start <number>   Start the bot for a phone number (e.g. 628xxx, no +)
  stop             Stop the bot
  status           Show session status
  reset            Reset the message counter
  help             Show this help
  quit, q          Exit";

impl ConsoleCommand {
    /// Parse a stdin line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Result<Self, UnknownCommand>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => ConsoleCommand::Start {
                phone_number: rest.to_string(),
            },
            "stop" => ConsoleCommand::Stop,
            "status" => ConsoleCommand::Status,
            "reset" => ConsoleCommand::Reset,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "q" | "exit" => ConsoleCommand::Quit,
            _ => return Some(Err(UnknownCommand(line.to_string()))),
        };
        Some(Ok(command))
    }
}
