//! Cooperative abort flag
//!
//! A transfer-abort report sets the flag from the BLE callback path; the
//! engine polls it during long-running commands and the executor clears it
//! after every command returns. Best effort only: there is no ordering
//! contract beyond "eventually observed" and no acknowledgment to the host.

use core::sync::atomic::{AtomicBool, Ordering};

/// Owner side of the abort flag
pub struct AbortSignal {
    flag: AtomicBool,
}

impl AbortSignal {
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Request abort of whatever command is currently executing.
    /// Idempotent: setting an already-set flag has no further effect.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Clear the flag. Called by the executor after each engine call so an
    /// abort applies to at most one in-flight command.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    /// Read-only token handed to the engine for polling
    pub fn token(&self) -> AbortToken<'_> {
        AbortToken { flag: &self.flag }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the abort flag, polled by the engine
#[derive(Clone, Copy)]
pub struct AbortToken<'a> {
    flag: &'a AtomicBool,
}

impl AbortToken<'_> {
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
