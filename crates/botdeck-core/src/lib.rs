//! # botdeck-core - Core Domain Types
//!
//! Foundation crate for botdeck. Provides domain types, the bounded activity
//! log, pairing code generation, error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, rand, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`SessionStatus`] - Session lifecycle state (Idle, Starting, PairingIssued, Connected)
//! - [`LogEntry`] - A single timestamped activity record
//! - [`Severity`] - Activity severity (Info, Success, Warning, Error)
//!
//! ### Activity Log (`activity_log`)
//! - [`ActivityLog`] - Bounded FIFO of [`LogEntry`] values, capacity [`ACTIVITY_LOG_CAPACITY`]
//!
//! ### Pairing (`pairing`)
//! - [`PairingCode`] - Validated 8-character `[A-Z0-9]` code
//! - [`PairingCodeGenerator`] - Code source trait, with [`RandomPairingCodes`] as default
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! ```rust
//! use botdeck_core::prelude::*;
//! ```

pub mod activity_log;
pub mod error;
pub mod logging;
pub mod pairing;
pub mod types;

/// Prelude for common imports used throughout all botdeck crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use activity_log::{ActivityLog, ACTIVITY_LOG_CAPACITY};
pub use error::{Error, Result, ResultExt};
pub use pairing::{
    FixedPairingCode, PairingCode, PairingCodeGenerator, RandomPairingCodes,
    PAIRING_CODE_ALPHABET, PAIRING_CODE_LEN,
};
pub use types::{LogEntry, SessionStatus, Severity};
