//! Data models for the Vida FitPro client
//!
//! These are the client-side views of the records held by the remote
//! backend. Every struct here is produced by an explicit mapping step at
//! the gateway boundary; loosely-typed rows never cross into the
//! application layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated session, as reported by the identity service.
///
/// The client holds a read-only copy; the gateway owns the lifecycle
/// (created on sign-in/sign-up, destroyed on sign-out or expiry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// User profile as seen by the client.
///
/// Merged from two remote records: the `profiles` row (display name) and
/// the `users` row (training preferences and body stats). Onboarding is
/// considered complete once both `goal` and `level` are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub goal: Option<String>,
    pub level: Option<String>,
    pub days_per_week: Option<u8>,
    pub session_time_minutes: Option<u16>,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    #[serde(default)]
    pub streak: u32,
}

impl Profile {
    /// Whether the onboarding questionnaire has been answered.
    ///
    /// Goal and level are the gating fields; the remaining answers are
    /// optional refinements.
    pub fn onboarding_complete(&self) -> bool {
        let filled = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        filled(&self.goal) && filled(&self.level)
    }
}

/// Subscription status values recognized by the client.
pub const SUBSCRIPTION_STATUS_ACTIVE: &str = "active";

/// Subscription record.
///
/// Only rows with status [`SUBSCRIPTION_STATUS_ACTIVE`] grant dashboard
/// access; every other status is treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub payment_method: Option<String>,
    pub amount: f64,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SUBSCRIPTION_STATUS_ACTIVE
    }
}

/// Workout record (without its exercises).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
}

/// Exercise within a workout.
///
/// `id` is `None` for exercises added locally and not yet persisted;
/// field edits are only written back for rows that have a remote
/// identifier. `reps` is free-form ("8-12", "until failure").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Option<Uuid>,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub weight_kg: f64,
    pub rest_seconds: u32,
    pub completed: bool,
    pub rpe: Option<u8>,
    pub order_index: i32,
}

/// Meal record scoped to a single date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub completed: bool,
}

/// Water intake for one user on one date.
///
/// The remote store keeps one row per (user, date), maintained by upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntake {
    pub glasses: u32,
    pub target: u32,
    pub date: NaiveDate,
}
