//! Meal repository

use crate::gateway::{Filter, Gateway, OrderBy};
use crate::repositories::{decode, load_failed};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use vida_fitpro_shared::errors::LoadError;
use vida_fitpro_shared::models::Meal;

const TABLE: &str = "meals";

#[derive(Debug, Deserialize)]
struct MealRow {
    id: Uuid,
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    completed: bool,
}

/// Meal repository
pub struct NutritionRepository;

impl NutritionRepository {
    /// All meals for one user on one date, in creation order.
    pub async fn fetch_for_date(
        gateway: &dyn Gateway,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Meal>, LoadError> {
        let rows = gateway
            .read_many(
                TABLE,
                &[
                    Filter::eq("user_id", user_id.to_string()),
                    Filter::eq("date", date.to_string()),
                ],
                Some(OrderBy::asc("created_at")),
            )
            .await
            .map_err(load_failed("meals"))?;

        rows.into_iter()
            .map(|row| {
                let row: MealRow = decode("meal", row)?;
                Ok(Meal {
                    id: row.id,
                    name: row.name,
                    calories: row.calories,
                    protein_g: row.protein,
                    carbs_g: row.carbs,
                    fat_g: row.fat,
                    completed: row.completed,
                })
            })
            .collect()
    }
}
