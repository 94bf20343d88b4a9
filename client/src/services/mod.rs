//! Client-side services
//!
//! Derived state and screen-local mechanics: nutrition aggregation,
//! water tracking, the reminder schedule, and the workout session with
//! its rest timer. Everything here is synchronous and owns no I/O; the
//! application layer wires services to the gateway.

pub mod hydration;
pub mod nutrition;
pub mod reminders;
pub mod workout;

pub use hydration::WaterTracker;
pub use nutrition::NutritionService;
pub use reminders::{ReminderSlot, WaterReminders};
pub use workout::{ExerciseUpdate, RestTimer, WorkoutSession};
