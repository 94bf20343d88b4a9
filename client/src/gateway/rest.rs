//! HTTP implementation of the gateway contract
//!
//! Speaks the managed backend's REST dialect: `/auth/v1/*` for
//! identity, `/rest/v1/{table}` for records. Every request carries the
//! public API key; record requests additionally carry the session's
//! bearer token once signed in.

use crate::config::GatewayConfig;
use crate::gateway::{Filter, Gateway, OrderBy, Record, SessionEvent};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;
use uuid::Uuid;
use vida_fitpro_shared::errors::GatewayError;
use vida_fitpro_shared::models::Session;

/// Capacity of the session-event channel. Events are tiny and the only
/// subscriber drains them promptly; lagging just drops the oldest.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Access token plus the session view it authenticates.
#[derive(Debug, Clone)]
struct AuthState {
    access_token: String,
    session: Session,
}

/// Gateway implementation over HTTP.
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    auth: RwLock<Option<AuthState>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Identity service response for sign-in and sign-up.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
    email: String,
}

/// Error body shape returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error_description", alias = "msg")]
    message: Option<String>,
}

impl RestGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            auth: RwLock::new(None),
            events,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        let token = {
            let auth = self.auth.read().await;
            auth.as_ref()
                .map(|a| a.access_token.clone())
                .unwrap_or_else(|| self.anon_key.clone())
        };
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let apikey = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        headers.insert("apikey", apikey);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Turn a non-success response into a `GatewayError`.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body),
            Err(_) => String::new(),
        };
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthenticated);
        }
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode_rows(response: reqwest::Response) -> Result<Vec<Record>, GatewayError> {
        response
            .json::<Vec<Record>>()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    async fn store_session(&self, token: TokenResponse) -> Session {
        let session = Session {
            user_id: token.user.id,
            email: token.user.email,
        };
        {
            let mut auth = self.auth.write().await;
            *auth = Some(AuthState {
                access_token: token.access_token,
                session: session.clone(),
            });
        }
        // No subscribers is fine; the send result only reports that.
        let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
        session
    }
}

/// Render filters as query pairs in the service's `column=eq.value`
/// notation.
fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| {
            let rendered = match &f.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (f.column.clone(), format!("eq.{rendered}"))
        })
        .collect()
}

/// Render an ordering clause as a query pair.
fn order_pair(order: &OrderBy) -> (String, String) {
    let direction = if order.ascending { "asc" } else { "desc" };
    ("order".to_string(), format!("{}.{direction}", order.column))
}

#[async_trait]
impl Gateway for RestGateway {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        let auth = self.auth.read().await;
        Ok(auth.as_ref().map(|a| a.session.clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .headers(self.headers().await?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let token: TokenResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(self.store_session(token).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, GatewayError> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .headers(self.headers().await?)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let token: TokenResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(self.store_session(token).await)
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let headers = self.headers().await?;
        {
            let mut auth = self.auth.write().await;
            *auth = None;
        }
        let _ = self.events.send(SessionEvent::SignedOut);

        // The local session is already gone; a failed remote revocation
        // only shortens the token's useful life, so log and move on.
        let result = self
            .http
            .post(self.auth_url("logout"))
            .headers(headers)
            .send()
            .await;
        match result {
            Ok(response) => {
                if let Err(err) = Self::check(response).await {
                    warn!(error = %err, "remote sign-out failed");
                }
            }
            Err(err) => warn!(error = %err, "remote sign-out failed"),
        }
        Ok(())
    }

    async fn read_one(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<Record>, GatewayError> {
        let rows = self.read_many(table, filters, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn read_many(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Record>, GatewayError> {
        let mut query = filter_pairs(filters);
        query.push(("select".to_string(), "*".to_string()));
        if let Some(order) = &order {
            query.push(order_pair(order));
        }

        let response = self
            .http
            .get(self.table_url(table))
            .headers(self.headers().await?)
            .query(&query)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode_rows(Self::check(response).await?).await
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, GatewayError> {
        let mut headers = self.headers().await?;
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let response = self
            .http
            .post(self.table_url(table))
            .headers(headers)
            .json(&record)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode_rows(Self::check(response).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Malformed("insert returned no rows".to_string()))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        partial: Record,
    ) -> Result<Record, GatewayError> {
        let mut headers = self.headers().await?;
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let response = self
            .http
            .patch(self.table_url(table))
            .headers(headers)
            .query(&filter_pairs(filters))
            .json(&partial)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode_rows(Self::check(response).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Malformed("update matched no rows".to_string()))
    }

    async fn upsert(
        &self,
        table: &str,
        record: Record,
        conflict_keys: &[&str],
    ) -> Result<Record, GatewayError> {
        let mut headers = self.headers().await?;
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let response = self
            .http
            .post(self.table_url(table))
            .headers(headers)
            .query(&[("on_conflict", conflict_keys.join(","))])
            .json(&record)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode_rows(Self::check(response).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Malformed("upsert returned no rows".to_string()))
    }
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
