//! Pairing code generation
//!
//! A pairing code is a display artifact the operator types into the
//! messaging app to link a device. It is not a credential: collisions
//! between calls are acceptable and no state is kept.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};

/// Number of characters in a pairing code
pub const PAIRING_CODE_LEN: usize = 8;

/// Characters a pairing code is drawn from
pub const PAIRING_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// An 8-character `[A-Z0-9]` pairing code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PairingCode(String);

impl PairingCode {
    /// Validate and wrap a code
    pub fn parse(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let valid = code.len() == PAIRING_CODE_LEN
            && code.bytes().all(|b| PAIRING_CODE_ALPHABET.contains(&b));
        if valid {
            Ok(Self(code))
        } else {
            Err(Error::invalid_pairing_code(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PairingCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of pairing codes.
///
/// The default implementation draws random codes. A real linking protocol
/// (or a test) plugs in here without touching the session state machine.
pub trait PairingCodeGenerator: Send + Sync + fmt::Debug {
    fn generate(&self) -> PairingCode;
}

/// Uniformly random codes from [`PAIRING_CODE_ALPHABET`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPairingCodes;

impl PairingCodeGenerator for RandomPairingCodes {
    fn generate(&self) -> PairingCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..PAIRING_CODE_LEN)
            .map(|_| PAIRING_CODE_ALPHABET[rng.gen_range(0..PAIRING_CODE_ALPHABET.len())] as char)
            .collect();
        PairingCode(code)
    }
}

/// Always returns the same code
#[derive(Debug, Clone)]
pub struct FixedPairingCode(PairingCode);

impl FixedPairingCode {
    pub fn new(code: PairingCode) -> Self {
        Self(code)
    }
}

impl PairingCodeGenerator for FixedPairingCode {
    fn generate(&self) -> PairingCode {
        self.0.clone()
    }
}
