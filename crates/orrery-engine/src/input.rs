//! Player input, sampled once per frame.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// The state of the controls for one frame.
///
/// `left`, `right` and `fire` are held states. `any_key`, `pause_toggled` and
/// `quit` are edges: they were pressed since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub any_key: bool,
    pub pause_toggled: bool,
    pub quit: bool,
}

impl InputSnapshot {
    pub const IDLE: InputSnapshot = InputSnapshot {
        left: false,
        right: false,
        fire: false,
        any_key: false,
        pause_toggled: false,
        quit: false,
    };

    pub fn any_key() -> Self {
        Self {
            any_key: true,
            ..Self::IDLE
        }
    }

    pub fn quit() -> Self {
        Self {
            quit: true,
            ..Self::IDLE
        }
    }

    pub fn pause() -> Self {
        Self {
            pause_toggled: true,
            ..Self::IDLE
        }
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::IDLE
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::IDLE
        }
    }

    pub fn fire() -> Self {
        Self {
            fire: true,
            ..Self::IDLE
        }
    }

    /// Horizontal steering: -1, 0 or +1. Both directions held cancel out.
    pub fn steer(&self) -> i8 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Produces one [`InputSnapshot`] per frame.
pub trait InputSource {
    fn poll(&mut self) -> InputSnapshot;
}

/// Replays a fixed list of snapshots, then a fallback forever.
///
/// The fallback defaults to [`InputSnapshot::quit`], so a scripted run always
/// ends once the script is exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    frames: VecDeque<InputSnapshot>,
    exhausted: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            exhausted: InputSnapshot::quit(),
        }
    }

    /// Snapshot to return once the script runs out.
    pub fn then(mut self, exhausted: InputSnapshot) -> Self {
        self.exhausted = exhausted;
        self
    }

    /// Append `count` copies of `snapshot`.
    pub fn push(&mut self, snapshot: InputSnapshot, count: usize) {
        self.frames.extend(std::iter::repeat(snapshot).take(count));
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        self.frames.pop_front().unwrap_or(self.exhausted)
    }
}
