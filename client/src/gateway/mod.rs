//! Remote backend gateway
//!
//! The gateway is the client's only external dependency: a managed
//! service providing identity (sign-up/sign-in/sign-out, session change
//! notifications) and record storage with query/insert/update/upsert
//! primitives. The client consumes this contract and never implements
//! any of it.
//!
//! [`Gateway`] is the seam: the application and repositories depend on
//! the trait, [`RestGateway`] speaks the service's HTTP dialect, and the
//! tests substitute an in-memory fake.

pub mod rest;

pub use rest::RestGateway;

use async_trait::async_trait;
use tokio::sync::broadcast;
use vida_fitpro_shared::errors::GatewayError;
use vida_fitpro_shared::models::Session;

/// A loosely-typed record as returned by the store.
///
/// Rows leave the gateway as JSON objects; the repositories map them
/// into typed models before anything else sees them.
pub type Record = serde_json::Value;

/// Session lifecycle notifications delivered asynchronously by the
/// identity service.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Result ordering for multi-row reads.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// The remote backend contract consumed by the client.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The session currently held by the gateway, if any.
    async fn current_session(&self) -> Result<Option<Session>, GatewayError>;

    /// Subscribe to session-change notifications.
    ///
    /// Dropping the receiver unsubscribes; owners must do so on
    /// teardown so events never fire against stale state.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, GatewayError>;

    /// Tear down the session. The local session copy is always cleared,
    /// even when the remote call fails.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Read a single record; `Ok(None)` when no row matches.
    async fn read_one(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<Record>, GatewayError>;

    /// Read all matching records, optionally ordered.
    async fn read_many(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Record>, GatewayError>;

    /// Insert a record, returning the stored row.
    async fn insert(&self, table: &str, record: Record) -> Result<Record, GatewayError>;

    /// Apply a partial update to the matching rows, returning the first
    /// updated row.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        partial: Record,
    ) -> Result<Record, GatewayError>;

    /// Insert-or-update keyed by `conflict_keys`, returning the stored
    /// row.
    async fn upsert(
        &self,
        table: &str,
        record: Record,
        conflict_keys: &[&str],
    ) -> Result<Record, GatewayError>;
}
