//! Vida FitPro Shared Library
//!
//! This crate contains the data models, error taxonomy, and validation
//! helpers shared between the client library and its tests.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;

pub use models::{
    Exercise, Meal, Profile, Session, Subscription, WaterIntake, Workout,
};
