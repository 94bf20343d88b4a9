//! Common test utilities for integration tests
//!
//! Provides an in-memory gateway fake and an app wrapper. The fake
//! implements the full gateway contract over seeded tables, records
//! every write, and can inject read or write failures per table.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;
use vida_fitpro_client::app::{App, AppEvent};
use vida_fitpro_client::config::AppConfig;
use vida_fitpro_client::gateway::{Filter, Gateway, OrderBy, Record, SessionEvent};
use vida_fitpro_client::notify::{Notification, Notifier, PermissionState};
use vida_fitpro_client::prefs::PrefsStore;
use vida_fitpro_shared::errors::GatewayError;
use vida_fitpro_shared::models::Session;

/// A recorded write against the fake store.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert {
        table: String,
        record: Value,
    },
    Update {
        table: String,
        filters: Vec<(String, Value)>,
        partial: Value,
    },
    Upsert {
        table: String,
        record: Value,
        conflict_keys: Vec<String>,
    },
}

#[derive(Default)]
struct FakeStore {
    tables: HashMap<String, Vec<Value>>,
    writes: Vec<WriteOp>,
    failing_reads: HashSet<String>,
    failing_writes: bool,
}

/// In-memory gateway double.
pub struct FakeGateway {
    session: Mutex<Option<Session>>,
    credentials: Mutex<Option<(String, String, Session)>>,
    store: Mutex<FakeStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            session: Mutex::new(None),
            credentials: Mutex::new(None),
            store: Mutex::new(FakeStore::default()),
            events,
        }
    }

    /// Start out already signed in.
    pub fn with_session(self, session: Session) -> Self {
        *self.session.lock().unwrap() = Some(session);
        self
    }

    /// Accept exactly these credentials on sign-in.
    pub fn with_credentials(self, email: &str, password: &str, session: Session) -> Self {
        *self.credentials.lock().unwrap() =
            Some((email.to_string(), password.to_string(), session));
        self
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.store
            .lock()
            .unwrap()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Every read of `table` fails with a server error.
    pub fn fail_reads_on(&self, table: &str) {
        self.store
            .lock()
            .unwrap()
            .failing_reads
            .insert(table.to_string());
    }

    /// Every write fails with a server error.
    pub fn fail_writes(&self) {
        self.store.lock().unwrap().failing_writes = true;
    }

    pub fn writes(&self) -> Vec<WriteOp> {
        self.store.lock().unwrap().writes.clone()
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.store
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn server_error() -> GatewayError {
        GatewayError::Status {
            status: 500,
            message: "injected failure".to_string(),
        }
    }

    fn matches(row: &Value, filters: &[Filter]) -> bool {
        filters
            .iter()
            .all(|f| row.get(&f.column) == Some(&f.value))
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let accepted = self.credentials.lock().unwrap().clone();
        match accepted {
            Some((e, p, session)) if e == email && p == password => {
                *self.session.lock().unwrap() = Some(session.clone());
                let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
                Ok(session)
            }
            _ => Err(GatewayError::Status {
                status: 400,
                message: "invalid login credentials".to_string(),
            }),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _name: &str,
    ) -> Result<Session, GatewayError> {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
        };
        *self.session.lock().unwrap() = Some(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        *self.session.lock().unwrap() = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    async fn read_one(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<Record>, GatewayError> {
        Ok(self.read_many(table, filters, None).await?.into_iter().next())
    }

    async fn read_many(
        &self,
        table: &str,
        filters: &[Filter],
        _order: Option<OrderBy>,
    ) -> Result<Vec<Record>, GatewayError> {
        let store = self.store.lock().unwrap();
        if store.failing_reads.contains(table) {
            return Err(Self::server_error());
        }
        Ok(store
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches(row, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, GatewayError> {
        let mut store = self.store.lock().unwrap();
        if store.failing_writes {
            return Err(Self::server_error());
        }
        store.writes.push(WriteOp::Insert {
            table: table.to_string(),
            record: record.clone(),
        });
        let mut stored = record.clone();
        if stored.get("id").is_none() {
            stored["id"] = json!(Uuid::new_v4().to_string());
        }
        store
            .tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        partial: Record,
    ) -> Result<Record, GatewayError> {
        let mut store = self.store.lock().unwrap();
        if store.failing_writes {
            return Err(Self::server_error());
        }
        store.writes.push(WriteOp::Update {
            table: table.to_string(),
            filters: filters
                .iter()
                .map(|f| (f.column.clone(), f.value.clone()))
                .collect(),
            partial: partial.clone(),
        });

        let mut updated = None;
        if let Some(rows) = store.tables.get_mut(table) {
            for row in rows.iter_mut() {
                if Self::matches(row, filters) {
                    if let (Some(row_obj), Some(partial_obj)) =
                        (row.as_object_mut(), partial.as_object())
                    {
                        for (key, value) in partial_obj {
                            row_obj.insert(key.clone(), value.clone());
                        }
                    }
                    updated.get_or_insert_with(|| row.clone());
                }
            }
        }
        updated.ok_or_else(|| GatewayError::Malformed("update matched no rows".to_string()))
    }

    async fn upsert(
        &self,
        table: &str,
        record: Record,
        conflict_keys: &[&str],
    ) -> Result<Record, GatewayError> {
        let mut store = self.store.lock().unwrap();
        if store.failing_writes {
            return Err(Self::server_error());
        }
        store.writes.push(WriteOp::Upsert {
            table: table.to_string(),
            record: record.clone(),
            conflict_keys: conflict_keys.iter().map(|k| k.to_string()).collect(),
        });

        let rows = store.tables.entry(table.to_string()).or_default();
        let conflicting = rows.iter_mut().find(|row| {
            conflict_keys
                .iter()
                .all(|key| row.get(*key) == record.get(*key))
        });
        match conflicting {
            Some(row) => {
                *row = record.clone();
                Ok(record)
            }
            None => {
                rows.push(record.clone());
                Ok(record)
            }
        }
    }
}

/// Notifier double that counts delivered notifications.
#[derive(Default)]
pub struct CountingNotifier {
    delivered: AtomicUsize,
    requests: AtomicUsize,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn permission_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn request_permission(&self) -> PermissionState {
        self.requests.fetch_add(1, Ordering::SeqCst);
        PermissionState::Granted
    }

    fn permission(&self) -> PermissionState {
        if self.requests.load(Ordering::SeqCst) > 0 {
            PermissionState::Granted
        } else {
            PermissionState::NotDetermined
        }
    }

    fn notify(&self, _notification: &Notification) {
        self.delivered.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: App,
    pub events: mpsc::Receiver<AppEvent>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<CountingNotifier>,
    _prefs_dir: TempDir,
}

impl TestApp {
    /// Build an app over a fake gateway with default config and a
    /// throwaway preferences file.
    pub async fn new(gateway: FakeGateway) -> Self {
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(CountingNotifier::new());
        let prefs_dir = TempDir::new().expect("temp dir");
        let prefs_store = PrefsStore::at(prefs_dir.path().join("preferences.json"));

        let (app, events) = App::new(
            Arc::clone(&gateway) as Arc<dyn Gateway>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            prefs_store,
            AppConfig::default(),
        )
        .await;

        Self {
            app,
            events,
            gateway,
            notifier,
            _prefs_dir: prefs_dir,
        }
    }
}

/// A session for one fixed test user.
pub fn session() -> Session {
    Session {
        user_id: Uuid::parse_str("6f2b9f3e-8f5a-4d8b-9c3e-111111111111").unwrap(),
        email: "ana@example.com".to_string(),
    }
}

/// Seed the profile row created at sign-up.
pub fn seed_profile(gateway: &FakeGateway, session: &Session, name: &str) {
    gateway.seed(
        "profiles",
        vec![json!({ "id": session.user_id.to_string(), "name": name })],
    );
}

/// Seed a fully onboarded account row.
pub fn seed_onboarded_account(gateway: &FakeGateway, session: &Session) {
    gateway.seed(
        "users",
        vec![json!({
            "id": session.user_id.to_string(),
            "email": session.email,
            "name": "Ana",
            "goal": "hypertrophy",
            "level": "intermediate",
            "days_per_week": 4,
            "session_time": 60,
            "equipment": ["Full gym"],
            "weight": 72.5,
            "target_weight": 68.0,
            "streak": 5,
        })],
    );
}

/// Seed an account row with onboarding not yet answered.
pub fn seed_blank_account(gateway: &FakeGateway, session: &Session) {
    gateway.seed(
        "users",
        vec![json!({
            "id": session.user_id.to_string(),
            "email": session.email,
            "name": "Ana",
            "streak": 0,
        })],
    );
}

/// Seed an active subscription row.
pub fn seed_active_subscription(gateway: &FakeGateway, session: &Session) {
    gateway.seed(
        "subscriptions",
        vec![json!({
            "id": Uuid::new_v4().to_string(),
            "user_id": session.user_id.to_string(),
            "status": "active",
            "payment_method": "pix",
            "amount": 25.99,
        })],
    );
}

/// Seed a user ready for the dashboard: profile, onboarded account,
/// active subscription.
pub fn seed_subscribed_user(gateway: &FakeGateway, session: &Session) {
    seed_profile(gateway, session, "Ana");
    seed_onboarded_account(gateway, session);
    seed_active_subscription(gateway, session);
}
