//! Water reminder schedule
//!
//! A fixed list of daily slots is checked once per minute against the
//! wall clock. A slot fires at most once per matching minute: the last
//! fired (hour, minute) key is remembered and compared before firing
//! again. Disabling stops future firings without clearing that key.

use crate::notify::Notification;

/// One reminder slot in the daily schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSlot {
    pub hour: u32,
    pub minute: u32,
    pub label: &'static str,
}

/// Default schedule: eight slots spanning 08:00-22:00.
pub const DEFAULT_SLOTS: [ReminderSlot; 8] = [
    ReminderSlot { hour: 8, minute: 0, label: "Morning" },
    ReminderSlot { hour: 10, minute: 0, label: "Mid-morning" },
    ReminderSlot { hour: 12, minute: 0, label: "Lunch" },
    ReminderSlot { hour: 14, minute: 0, label: "Afternoon" },
    ReminderSlot { hour: 16, minute: 0, label: "Snack" },
    ReminderSlot { hour: 18, minute: 0, label: "Late afternoon" },
    ReminderSlot { hour: 20, minute: 0, label: "Evening" },
    ReminderSlot { hour: 22, minute: 0, label: "Before bed" },
];

/// Reminder schedule state.
#[derive(Debug, Clone)]
pub struct WaterReminders {
    slots: Vec<ReminderSlot>,
    enabled: bool,
    last_fired: Option<(u32, u32)>,
    banner_visible: bool,
}

impl WaterReminders {
    pub fn new(enabled: bool) -> Self {
        Self {
            slots: DEFAULT_SLOTS.to_vec(),
            enabled,
            last_fired: None,
            banner_visible: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable future firings. The last-fired key is kept
    /// either way, so re-enabling within the same minute cannot
    /// double-fire a slot.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn slots(&self) -> &[ReminderSlot] {
        &self.slots
    }

    pub fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    /// Hide the in-app banner without touching the schedule.
    pub fn dismiss_banner(&mut self) {
        self.banner_visible = false;
    }

    /// Run one scheduled check against the current wall-clock minute.
    ///
    /// Returns the matched slot when it fires; firing shows the in-app
    /// banner and records the (hour, minute) key so a second check in
    /// the same minute is a no-op.
    pub fn check(&mut self, hour: u32, minute: u32) -> Option<ReminderSlot> {
        if !self.enabled {
            return None;
        }
        let slot = self
            .slots
            .iter()
            .copied()
            .find(|slot| slot.hour == hour && slot.minute == minute)?;
        if self.last_fired == Some((hour, minute)) {
            return None;
        }
        self.last_fired = Some((hour, minute));
        self.banner_visible = true;
        Some(slot)
    }

    /// The system notification payload for a firing, carrying current
    /// water progress.
    pub fn notification(consumed: u32, target: u32) -> Notification {
        Notification::new(
            "Time to drink water",
            format!("You've had {consumed} of {target} glasses today. Stay hydrated!"),
        )
    }
}

impl Default for WaterReminders {
    fn default() -> Self {
        Self::new(false)
    }
}
