//! Workout repository
//!
//! At most one incomplete workout is loaded per user: the most recently
//! created one. Its exercises are ordered by the explicit order field,
//! not by creation time.

use crate::gateway::{Filter, Gateway, OrderBy};
use crate::repositories::{decode, load_failed};
use serde::Deserialize;
use uuid::Uuid;
use vida_fitpro_shared::errors::{LoadError, WriteError};
use vida_fitpro_shared::models::{Exercise, Workout};

const WORKOUTS_TABLE: &str = "workouts";
const EXERCISES_TABLE: &str = "exercises";

#[derive(Debug, Deserialize)]
struct WorkoutRow {
    id: Uuid,
    name: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct ExerciseRow {
    id: Uuid,
    name: String,
    sets: u32,
    reps: String,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    rest: Option<u32>,
    completed: bool,
    #[serde(default)]
    rpe: Option<u8>,
    order_index: i32,
}

/// Today's workout with its exercises, ready for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct TodayWorkout {
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
}

/// Workout repository
pub struct WorkoutRepository;

impl WorkoutRepository {
    /// The user's most recent incomplete workout, if any.
    pub async fn fetch_today(
        gateway: &dyn Gateway,
        user_id: Uuid,
    ) -> Result<Option<TodayWorkout>, LoadError> {
        let rows = gateway
            .read_many(
                WORKOUTS_TABLE,
                &[
                    Filter::eq("user_id", user_id.to_string()),
                    Filter::eq("completed", false),
                ],
                Some(OrderBy::desc("created_at")),
            )
            .await
            .map_err(load_failed("workout"))?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let workout_row: WorkoutRow = decode("workout", row)?;

        let exercise_rows = gateway
            .read_many(
                EXERCISES_TABLE,
                &[Filter::eq("workout_id", workout_row.id.to_string())],
                Some(OrderBy::asc("order_index")),
            )
            .await
            .map_err(load_failed("exercises"))?;

        let mut exercises = exercise_rows
            .into_iter()
            .map(|row| {
                let row: ExerciseRow = decode("exercise", row)?;
                Ok(Exercise {
                    id: Some(row.id),
                    name: row.name,
                    sets: row.sets,
                    reps: row.reps,
                    weight_kg: row.weight.unwrap_or(0.0),
                    rest_seconds: row.rest.unwrap_or(0),
                    completed: row.completed,
                    rpe: row.rpe,
                    order_index: row.order_index,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        // Ordering is part of the contract; don't rely on the store
        // honoring the query clause.
        exercises.sort_by_key(|e| e.order_index);

        Ok(Some(TodayWorkout {
            workout: Workout {
                id: workout_row.id,
                name: workout_row.name,
                completed: workout_row.completed,
            },
            exercises,
        }))
    }

    /// Write a single edited field of one exercise back to the store.
    pub async fn update_exercise_field(
        gateway: &dyn Gateway,
        exercise_id: Uuid,
        column: &'static str,
        value: serde_json::Value,
    ) -> Result<(), WriteError> {
        let mut partial = serde_json::Map::new();
        partial.insert(column.to_string(), value);
        gateway
            .update(
                EXERCISES_TABLE,
                &[Filter::eq("id", exercise_id.to_string())],
                serde_json::Value::Object(partial),
            )
            .await
            .map_err(|source| WriteError {
                what: "exercise field",
                source,
            })?;
        Ok(())
    }
}
