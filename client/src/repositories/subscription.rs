//! Subscription repository
//!
//! A single active row per user gates dashboard access. Activation is
//! self-reported: the client inserts the row after the user confirms
//! payment; no payment processor is involved.

use crate::gateway::{Filter, Gateway};
use crate::repositories::{decode, load_failed};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use vida_fitpro_shared::errors::{LoadError, WriteError};
use vida_fitpro_shared::models::{Subscription, SUBSCRIPTION_STATUS_ACTIVE};
use vida_fitpro_shared::types::PaymentMethod;

const TABLE: &str = "subscriptions";

/// Monthly subscription price.
pub const SUBSCRIPTION_PRICE: f64 = 25.99;

#[derive(Debug, Deserialize)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    #[serde(default)]
    payment_method: Option<String>,
    amount: f64,
}

/// Subscription repository
pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// The user's active subscription, if one exists.
    pub async fn fetch_active(
        gateway: &dyn Gateway,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, LoadError> {
        let row = gateway
            .read_one(
                TABLE,
                &[
                    Filter::eq("user_id", user_id.to_string()),
                    Filter::eq("status", SUBSCRIPTION_STATUS_ACTIVE),
                ],
            )
            .await
            .map_err(load_failed("subscription"))?;

        match row {
            Some(row) => {
                let row: SubscriptionRow = decode("subscription", row)?;
                Ok(Some(Subscription {
                    id: row.id,
                    user_id: row.user_id,
                    status: row.status,
                    payment_method: row.payment_method,
                    amount: row.amount,
                }))
            }
            None => Ok(None),
        }
    }

    /// Insert an active subscription after user-confirmed payment.
    pub async fn activate(
        gateway: &dyn Gateway,
        user_id: Uuid,
        method: PaymentMethod,
    ) -> Result<(), WriteError> {
        gateway
            .insert(
                TABLE,
                json!({
                    "user_id": user_id.to_string(),
                    "status": SUBSCRIPTION_STATUS_ACTIVE,
                    "payment_method": method.as_str(),
                    "amount": SUBSCRIPTION_PRICE,
                }),
            )
            .await
            .map_err(|source| WriteError {
                what: "subscription activation",
                source,
            })?;
        Ok(())
    }
}
