//! Session-scoped memo of confirmed commands.
//!
//! Only confirmations are stored. A denied command leaves no trace, so the
//! operator is asked again next time. Nothing here is ever written to disk.

use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

pub const DEFAULT_FINGERPRINT_LEN: usize = 16;

/// Short hex prefix of the SHA-256 digest of a command string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(command: &str, len: usize) -> Self {
        let digest = hex::encode(Sha256::digest(command.as_bytes()));
        let len = len.min(digest.len());
        Self(digest[..len].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
pub struct ConfirmationCache {
    confirmed: Mutex<HashSet<Fingerprint>>,
}

impl ConfirmationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(true)` for a confirmed fingerprint, `None` otherwise.
    /// A poisoned lock reads as a miss.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<bool> {
        match self.confirmed.lock() {
            Ok(set) => set.contains(fingerprint).then_some(true),
            Err(_) => {
                tracing::warn!(%fingerprint, "Confirmation cache lock poisoned, treating as miss");
                None
            }
        }
    }

    pub fn record(&self, fingerprint: Fingerprint) {
        match self.confirmed.lock() {
            Ok(mut set) => {
                set.insert(fingerprint);
            }
            Err(_) => {
                tracing::warn!(%fingerprint, "Confirmation cache lock poisoned, not recording");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.confirmed.lock().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
