//! Bounded-staleness reads of state owned by another entity.
//!
//! A crystal shakes while its claimant is actively mining it. Asking the
//! claimant every frame is wasteful, so crystals keep a [`PolledFlag`] and
//! re-read the claimant's public `is_actively_mining` accessor at most once
//! per staleness window. A reader may therefore see a value up to one window
//! old.

use serde::{Deserialize, Serialize};

/// How stale a crystal's "being mined" flag may get, in seconds.
pub const MINING_STATUS_STALENESS_SECS: f32 = 0.25;

/// A cached boolean refreshed at most once per `window` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolledFlag {
    value: bool,
    age: f32,
    window: f32,
}

impl PolledFlag {
    /// A flag that refreshes on its first read.
    pub fn new(window: f32) -> Self {
        Self {
            value: false,
            age: f32::INFINITY,
            window,
        }
    }

    pub fn mining_status() -> Self {
        Self::new(MINING_STATUS_STALENESS_SECS)
    }

    /// Age the cached value by `elapsed` and return it, calling `refresh`
    /// first if the value is older than the window.
    pub fn read(&mut self, elapsed: f32, refresh: impl FnOnce() -> bool) -> bool {
        self.age += elapsed.max(0.0);
        if self.age >= self.window {
            self.value = refresh();
            self.age = 0.0;
        }
        self.value
    }

    /// The cached value without aging or refreshing it.
    pub fn peek(&self) -> bool {
        self.value
    }

    /// Force a refresh on the next read.
    pub fn invalidate(&mut self) {
        self.age = f32::INFINITY;
    }

    pub fn window(&self) -> f32 {
        self.window
    }
}

impl Default for PolledFlag {
    fn default() -> Self {
        Self::mining_status()
    }
}
