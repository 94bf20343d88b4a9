//! Typed record access over the gateway
//!
//! Repositories translate between the gateway's loosely-typed rows and
//! the shared models. Each read performs an explicit mapping step;
//! malformed rows are rejected as load failures instead of leaking
//! half-populated values into the application.

pub mod hydration;
pub mod nutrition;
pub mod profile;
pub mod subscription;
pub mod workout;

pub use hydration::HydrationRepository;
pub use nutrition::NutritionRepository;
pub use profile::{OnboardingAnswers, ProfileRepository};
pub use subscription::{SubscriptionRepository, SUBSCRIPTION_PRICE};
pub use workout::{TodayWorkout, WorkoutRepository};

use chrono::{NaiveDate, Utc};
use vida_fitpro_shared::errors::{GatewayError, LoadError};

/// The date used to scope daily records (meals, water, workouts).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Map a raw row into a typed value, rejecting malformed responses.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    what: &'static str,
    row: serde_json::Value,
) -> Result<T, LoadError> {
    serde_json::from_value(row).map_err(|e| LoadError::Failed {
        what,
        source: GatewayError::Malformed(e.to_string()),
    })
}

/// Shorthand for tagging a gateway failure with the record being read.
pub(crate) fn load_failed(what: &'static str) -> impl FnOnce(GatewayError) -> LoadError {
    move |source| LoadError::Failed { what, source }
}
