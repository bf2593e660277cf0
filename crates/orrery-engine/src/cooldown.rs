//! Rate limiting for repeatable actions such as firing.

use serde::{Deserialize, Serialize};

/// Honors an action at most once per `interval_ms`.
///
/// A request at `now` is honored when no action has been honored yet, or when
/// at least `interval_ms` has passed since the last honored one. Dropped
/// requests do not move the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    interval_ms: u64,
    last_honored: Option<u64>,
}

impl Cooldown {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_honored: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns `true` and starts a new window if the action is allowed.
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_honored {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return false;
            }
        }
        self.last_honored = Some(now_ms);
        true
    }

    /// Forget the last honored action.
    pub fn reset(&mut self) {
        self.last_honored = None;
    }
}
