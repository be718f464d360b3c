use tui_blockfall_core::types::ConfigError;

/// Single repeating gravity schedule driven by elapsed milliseconds.
///
/// `start` always replaces the current schedule with a fresh one, so a
/// restart or resume never leaves a second schedule behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GravityTimer {
    interval_ms: u32,
    elapsed_ms: u64,
    active: bool,
}

impl GravityTimer {
    pub fn new(interval_ms: u32) -> Result<Self, ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroGravityInterval);
        }
        Ok(Self {
            interval_ms,
            elapsed_ms: 0,
            active: false,
        })
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Cancel any existing schedule and begin a new one from zero.
    pub fn start(&mut self) {
        self.active = true;
        self.elapsed_ms = 0;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.elapsed_ms = 0;
    }

    /// Let `ms` milliseconds pass and return how many ticks fell due.
    pub fn advance(&mut self, ms: u32) -> u32 {
        if !self.active {
            return 0;
        }
        self.elapsed_ms += u64::from(ms);
        let interval = u64::from(self.interval_ms);
        let due = self.elapsed_ms / interval;
        self.elapsed_ms %= interval;
        due.min(u64::from(u32::MAX)) as u32
    }

    /// Milliseconds until the next tick, if running.
    pub fn remaining_ms(&self) -> Option<u32> {
        self.active
            .then(|| (u64::from(self.interval_ms) - self.elapsed_ms) as u32)
    }
}
