//! botdeck - operator console for a messaging-bot pairing session
//!
//! The session state machine lives in `botdeck-app`; this crate is the
//! stdin/stdout front end.

pub mod console;

pub use console::{run_console, ConsoleOptions, OutputMode};
