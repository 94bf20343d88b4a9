//! Water tracking
//!
//! Glasses consumed against a daily target. The count is clamped to
//! [0, target]: the increment path can never push past the target, and
//! repeated increments at the ceiling change nothing.

use chrono::NaiveDate;
use vida_fitpro_shared::models::WaterIntake;

/// Today's water consumption state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterTracker {
    consumed: u32,
    target: u32,
}

impl WaterTracker {
    pub fn new(target: u32) -> Self {
        Self {
            consumed: 0,
            target,
        }
    }

    /// Rebuild from a loaded record.
    pub fn from_intake(intake: &WaterIntake) -> Self {
        Self {
            consumed: intake.glasses.min(intake.target),
            target: intake.target,
        }
    }

    /// Add one glass, clamped to the target. Returns whether the count
    /// changed.
    pub fn add_glass(&mut self) -> bool {
        let next = (self.consumed + 1).min(self.target);
        let changed = next != self.consumed;
        self.consumed = next;
        changed
    }

    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn is_full(&self) -> bool {
        self.consumed >= self.target
    }

    /// Fraction of the target consumed, for progress display.
    pub fn fraction(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        f64::from(self.consumed) / f64::from(self.target)
    }

    /// Snapshot as the record shape persisted to the store.
    pub fn as_intake(&self, date: NaiveDate) -> WaterIntake {
        WaterIntake {
            glasses: self.consumed,
            target: self.target,
            date,
        }
    }
}
