//! Water intake repository
//!
//! One row per (user, date), maintained by upsert. The increment path
//! is write-behind: local state moves first and a failed upsert is the
//! caller's to log, never to roll back.

use crate::gateway::{Filter, Gateway};
use crate::repositories::{decode, load_failed};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use vida_fitpro_shared::errors::{LoadError, WriteError};
use vida_fitpro_shared::models::WaterIntake;

const TABLE: &str = "water_intake";

/// Conflict keys for the daily upsert.
const CONFLICT_KEYS: &[&str] = &["user_id", "date"];

#[derive(Debug, Deserialize)]
struct WaterRow {
    glasses: u32,
    target: u32,
    date: NaiveDate,
}

/// Water intake repository
pub struct HydrationRepository;

impl HydrationRepository {
    /// The user's water record for a date, if one exists.
    pub async fn fetch_for_date(
        gateway: &dyn Gateway,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<WaterIntake>, LoadError> {
        let row = gateway
            .read_one(
                TABLE,
                &[
                    Filter::eq("user_id", user_id.to_string()),
                    Filter::eq("date", date.to_string()),
                ],
            )
            .await
            .map_err(load_failed("water intake"))?;

        match row {
            Some(row) => {
                let row: WaterRow = decode("water intake", row)?;
                Ok(Some(WaterIntake {
                    glasses: row.glasses,
                    target: row.target,
                    date: row.date,
                }))
            }
            None => Ok(None),
        }
    }

    /// Insert-or-update the day's record, keyed by (user, date).
    pub async fn upsert(
        gateway: &dyn Gateway,
        user_id: Uuid,
        intake: &WaterIntake,
    ) -> Result<(), WriteError> {
        gateway
            .upsert(
                TABLE,
                json!({
                    "user_id": user_id.to_string(),
                    "glasses": intake.glasses,
                    "target": intake.target,
                    "date": intake.date.to_string(),
                }),
                CONFLICT_KEYS,
            )
            .await
            .map_err(|source| WriteError {
                what: "water intake",
                source,
            })?;
        Ok(())
    }
}
