//! Workout session and rest timer
//!
//! The session holds the in-memory exercise list for the active
//! workout. Edits are optimistic: the list changes immediately and the
//! caller decides whether a remote write follows (only for exercises
//! that already have a remote identifier).

use crate::error::{AppError, AppResult};
use serde_json::json;
use uuid::Uuid;
use vida_fitpro_shared::models::Exercise;
use vida_fitpro_shared::validation::{validate_exercise_weight, validate_rpe};

/// A single-field edit to one exercise.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseUpdate {
    Weight(f64),
    Rpe(u8),
    Completed(bool),
    Sets(u32),
    Reps(String),
    RestSeconds(u32),
}

impl ExerciseUpdate {
    /// Remote column the edit maps onto.
    pub fn column(&self) -> &'static str {
        match self {
            ExerciseUpdate::Weight(_) => "weight",
            ExerciseUpdate::Rpe(_) => "rpe",
            ExerciseUpdate::Completed(_) => "completed",
            ExerciseUpdate::Sets(_) => "sets",
            ExerciseUpdate::Reps(_) => "reps",
            ExerciseUpdate::RestSeconds(_) => "rest",
        }
    }

    /// Remote value for the edit.
    pub fn value(&self) -> serde_json::Value {
        match self {
            ExerciseUpdate::Weight(v) => json!(v),
            ExerciseUpdate::Rpe(v) => json!(v),
            ExerciseUpdate::Completed(v) => json!(v),
            ExerciseUpdate::Sets(v) => json!(v),
            ExerciseUpdate::Reps(v) => json!(v),
            ExerciseUpdate::RestSeconds(v) => json!(v),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ExerciseUpdate::Weight(v) => validate_exercise_weight(*v),
            ExerciseUpdate::Rpe(v) => validate_rpe(*v),
            _ => Ok(()),
        }
    }

    fn apply_to(&self, exercise: &mut Exercise) {
        match self {
            ExerciseUpdate::Weight(v) => exercise.weight_kg = *v,
            ExerciseUpdate::Rpe(v) => exercise.rpe = Some(*v),
            ExerciseUpdate::Completed(v) => exercise.completed = *v,
            ExerciseUpdate::Sets(v) => exercise.sets = *v,
            ExerciseUpdate::Reps(v) => exercise.reps = v.clone(),
            ExerciseUpdate::RestSeconds(v) => exercise.rest_seconds = *v,
        }
    }
}

/// In-memory state of the active workout.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl WorkoutSession {
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            name: name.into(),
            exercises,
        }
    }

    /// Apply one edit to one exercise in memory.
    ///
    /// Returns the exercise's remote identifier when the edit should
    /// also be written back; `None` for exercises not yet persisted.
    pub fn apply(&mut self, index: usize, update: &ExerciseUpdate) -> AppResult<Option<Uuid>> {
        update
            .validate()
            .map_err(AppError::Validation)?;
        let exercise = self
            .exercises
            .get_mut(index)
            .ok_or_else(|| AppError::Validation(format!("no exercise at index {index}")))?;
        update.apply_to(exercise);
        Ok(exercise.id)
    }
}

/// Rest countdown used between sets.
///
/// One instance exists at a time; starting replaces any countdown in
/// progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestTimer {
    remaining_seconds: u32,
    resting: bool,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a countdown of `seconds`, replacing any in progress.
    pub fn start(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
        self.resting = seconds > 0;
    }

    /// One second elapsed. At zero the resting flag drops.
    pub fn tick(&mut self) {
        if !self.resting {
            return;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.resting = false;
        }
    }

    /// Stop early without waiting for the countdown.
    pub fn cancel(&mut self) {
        self.resting = false;
    }

    pub fn is_resting(&self) -> bool {
        self.resting
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// `m:ss` rendering of the remaining countdown.
    pub fn format(&self) -> String {
        let mins = self.remaining_seconds / 60;
        let secs = self.remaining_seconds % 60;
        format!("{mins}:{secs:02}")
    }
}
