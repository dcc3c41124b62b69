//! Frame-counted lockout for discrete gesture triggers.
//!
//! A held gesture is seen on every frame it is held.  After a trigger fires
//! the debouncer stays locked until its counter passes the delay, so one
//! physical gesture produces one action.

/// Two-state debouncer: Idle or Locked.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    locked: bool,
    /// Frames ticked since arming; in `[0, delay]` between ticks.
    counter: u32,
    delay: u32,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a discrete trigger may fire this frame.
    pub fn should_fire(&self) -> bool {
        !self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Lock for the next `delay_frames` frames after the current one.
    pub fn arm(&mut self, delay_frames: u32) {
        self.locked = true;
        self.counter = 0;
        self.delay = delay_frames;
    }

    /// Advance one frame.  Unlocks once the counter exceeds the delay.
    pub fn tick(&mut self) {
        if !self.locked {
            return;
        }
        self.counter = self.counter.saturating_add(1);
        if self.counter > self.delay {
            self.counter = 0;
            self.locked = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:locked {} :counter {} :delay {})",
            if self.locked { "t" } else { "nil" },
            self.counter,
            self.delay,
        )
    }
}
