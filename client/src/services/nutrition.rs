//! Nutrition aggregation
//!
//! Today's totals are always a full recompute over the meal list; the
//! consumed values are never stored independently, so a reload can
//! never disagree with the list it came from.

use crate::config::NutritionConfig;
use vida_fitpro_shared::models::Meal;
use vida_fitpro_shared::types::{MacroProgress, NutritionProgress, NutritionTotals};

/// Nutrition aggregation service
pub struct NutritionService;

impl NutritionService {
    /// Sum calories and macros over a meal list.
    ///
    /// Order-independent; an empty list yields all zeros.
    pub fn aggregate(meals: &[Meal]) -> NutritionTotals {
        meals.iter().fold(NutritionTotals::default(), |acc, meal| {
            NutritionTotals {
                calories: acc.calories + meal.calories,
                protein_g: acc.protein_g + meal.protein_g,
                carbs_g: acc.carbs_g + meal.carbs_g,
                fat_g: acc.fat_g + meal.fat_g,
            }
        })
    }

    /// Totals paired with the configured daily targets.
    pub fn progress(meals: &[Meal], targets: &NutritionConfig) -> NutritionProgress {
        let totals = Self::aggregate(meals);
        NutritionProgress {
            calories: MacroProgress {
                consumed: totals.calories,
                target: targets.calorie_target,
            },
            protein: MacroProgress {
                consumed: totals.protein_g,
                target: targets.protein_target_g,
            },
            carbs: MacroProgress {
                consumed: totals.carbs_g,
                target: targets.carbs_target_g,
            },
            fat: MacroProgress {
                consumed: totals.fat_g,
                target: targets.fat_target_g,
            },
        }
    }
}
