//! Profile repository
//!
//! The client's profile view merges two remote records: the `profiles`
//! row created at sign-up (display name) and the `users` row carrying
//! training preferences and body stats. A missing or unreadable account
//! row degrades to empty optional fields; a missing profile row is a
//! hard signal that routes to onboarding.

use crate::gateway::{Filter, Gateway};
use crate::repositories::{decode, load_failed};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;
use vida_fitpro_shared::errors::{LoadError, WriteError};
use vida_fitpro_shared::models::{Profile, Session};

const PROFILES_TABLE: &str = "profiles";
const ACCOUNTS_TABLE: &str = "users";

/// `profiles` row shape.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    name: Option<String>,
}

/// `users` row shape. Every field beyond the id may be absent until
/// onboarding completes.
#[derive(Debug, Default, Deserialize)]
struct AccountRow {
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    days_per_week: Option<u8>,
    #[serde(default)]
    session_time: Option<u16>,
    #[serde(default)]
    equipment: Option<Vec<String>>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    target_weight: Option<f64>,
    #[serde(default)]
    streak: Option<u32>,
}

/// Completed onboarding questionnaire, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingAnswers {
    pub goal: String,
    pub level: String,
    pub days_per_week: u8,
    pub session_time_minutes: u16,
    pub equipment: Vec<String>,
}

/// Profile repository
pub struct ProfileRepository;

impl ProfileRepository {
    /// Load and merge the profile and account rows for a session.
    ///
    /// Returns `ProfileMissing` when the profile row does not exist.
    /// An unreadable account row is logged and treated as empty; the
    /// incomplete-profile routing rule then takes over.
    pub async fn fetch(gateway: &dyn Gateway, session: &Session) -> Result<Profile, LoadError> {
        let user_filter = [Filter::eq("id", session.user_id.to_string())];

        let profile_row = gateway
            .read_one(PROFILES_TABLE, &user_filter)
            .await
            .map_err(load_failed("profile"))?
            .ok_or(LoadError::ProfileMissing)?;
        let profile: ProfileRow = decode("profile", profile_row)?;

        let account: AccountRow = match gateway.read_one(ACCOUNTS_TABLE, &user_filter).await {
            Ok(Some(row)) => decode("account", row).unwrap_or_else(|err| {
                warn!(error = %err, "account row malformed, continuing without it");
                AccountRow::default()
            }),
            Ok(None) => AccountRow::default(),
            Err(err) => {
                warn!(error = %err, "failed to load account details, continuing without them");
                AccountRow::default()
            }
        };

        Ok(Profile {
            id: session.user_id,
            name: profile.name.unwrap_or_default(),
            email: session.email.clone(),
            goal: account.goal,
            level: account.level,
            days_per_week: account.days_per_week,
            session_time_minutes: account.session_time,
            equipment: account.equipment.unwrap_or_default(),
            weight_kg: account.weight,
            target_weight_kg: account.target_weight,
            streak: account.streak.unwrap_or(0),
        })
    }

    /// Create the profile and account rows for a fresh sign-up.
    pub async fn provision(
        gateway: &dyn Gateway,
        session: &Session,
        name: &str,
    ) -> Result<(), WriteError> {
        gateway
            .insert(
                PROFILES_TABLE,
                json!({
                    "id": session.user_id.to_string(),
                    "name": name,
                }),
            )
            .await
            .map_err(|source| WriteError {
                what: "profile row",
                source,
            })?;

        gateway
            .insert(
                ACCOUNTS_TABLE,
                json!({
                    "id": session.user_id.to_string(),
                    "email": session.email,
                    "name": name,
                    "streak": 0,
                }),
            )
            .await
            .map_err(|source| WriteError {
                what: "account row",
                source,
            })?;

        Ok(())
    }

    /// Persist the onboarding answers onto the account row.
    pub async fn save_onboarding(
        gateway: &dyn Gateway,
        user_id: Uuid,
        answers: &OnboardingAnswers,
    ) -> Result<(), WriteError> {
        gateway
            .update(
                ACCOUNTS_TABLE,
                &[Filter::eq("id", user_id.to_string())],
                json!({
                    "goal": answers.goal,
                    "level": answers.level,
                    "days_per_week": answers.days_per_week,
                    "session_time": answers.session_time_minutes,
                    "equipment": answers.equipment,
                }),
            )
            .await
            .map_err(|source| WriteError {
                what: "onboarding answers",
                source,
            })?;
        Ok(())
    }
}
