//! Cross-layer value types

use serde::{Deserialize, Serialize};

/// Payment paths offered on the subscription gate.
///
/// Payment itself is out of scope: the pix path shows a static code and
/// activation is confirmed by the user, not by a payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Card => "card",
        }
    }
}

/// Sign-in credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
///
/// `password_confirmation` is checked client-side before any network
/// call; the gateway only ever sees the password itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpDetails {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Totals summed over one day's meal list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Consumed-versus-target pair for a single tracked quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroProgress {
    pub consumed: f64,
    pub target: f64,
}

impl MacroProgress {
    /// Fraction of the target consumed, capped at 1.0 for display.
    pub fn fraction(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.consumed / self.target).min(1.0)
    }
}

/// Full macro breakdown shown on the dashboard and diet screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionProgress {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fat: MacroProgress,
}
