//! Shared security primitives for contract entry points
//!
//! Provides the scoped reentrancy guard and the pause gate used by the
//! trade engine.

use std::cell::Cell;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// [`ReentrancyGuard::enter`] hands out a [`ReentrancyLock`]; the guard stays
/// locked until that lock is dropped, so every exit path (including `?`
/// early returns) releases it.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard. Returns `None` if already held (reentrancy attempt).
    pub fn enter(&self) -> Option<ReentrancyLock<'_>> {
        if self.locked.replace(true) {
            return None;
        }
        Some(ReentrancyLock { guard: self })
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }
}

/// Held for the duration of a protected call; releases the guard on drop.
#[must_use = "the guard is released as soon as the lock is dropped"]
#[derive(Debug)]
pub struct ReentrancyLock<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.guard.locked.set(false);
    }
}

/// Global on/off gate.
///
/// When paused, every mutating entry point except unpause is rejected.
#[derive(Debug, Clone, Default)]
pub struct PauseGuard {
    paused: bool,
}

impl PauseGuard {
    /// Create a new unpaused guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause operations.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unpause operations.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Check if currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
