//! Replay guard for the optional single-use redemption policy.

use crate::error::{GatepassError, Result};
use std::collections::HashSet;
use std::sync::Mutex;

/// Records redeemed ticket fingerprints.
///
/// The ticket protocol itself is stateless; when
/// [`crate::TicketConfig::single_use`] is enabled, the redeemer runs
/// each ticket's SHA-256 fingerprint through this guard and rejects
/// already-seen tickets. Sync and dyn-safe so it can be shared as a
/// trait object.
pub trait ReplayGuard: Send + Sync {
    /// Atomically mark the fingerprint as redeemed.
    ///
    /// Returns `true` exactly once per fingerprint (first caller wins).
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::Storage` if the backing store fails.
    fn consume(&self, fingerprint: &str) -> Result<bool>;
}

/// In-memory replay guard.
///
/// Suitable for a single-process deployment; a multi-node deployment
/// wants a shared store behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryReplayGuard {
    seen: Mutex<HashSet<String>>,
}

impl InMemoryReplayGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayGuard for InMemoryReplayGuard {
    fn consume(&self, fingerprint: &str) -> Result<bool> {
        let mut seen = self
            .seen
            .lock()
            .map_err(|_| GatepassError::Internal("replay guard poisoned".to_string()))?;
        Ok(seen.insert(fingerprint.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn first_consume_wins() {
        let guard = InMemoryReplayGuard::new();
        assert!(guard.consume("abc").unwrap());
        assert!(!guard.consume("abc").unwrap());
        assert!(guard.consume("def").unwrap());
    }
}
