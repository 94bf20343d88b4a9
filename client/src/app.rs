//! Screen-state machine
//!
//! The top-level orchestrator. [`App`] owns the whole client state and
//! serializes every mutation through one event loop, so network
//! responses arriving out of order never race a local read-modify-write.
//! Screens read the [`AppState`] slice they render; writes go through
//! `App` methods.
//!
//! Startup walks the gateway: session → profile/account → subscription,
//! and lands on the auth screen, onboarding, the payment gate, or the
//! dashboard. Session-change notifications and manual sign-in converge
//! on the same idempotent load routine.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::gateway::{Gateway, SessionEvent};
use crate::notify::{Notifier, PermissionState};
use crate::prefs::{Preferences, PrefsStore};
use crate::repositories::{
    self, HydrationRepository, NutritionRepository, OnboardingAnswers, ProfileRepository,
    SubscriptionRepository, WorkoutRepository,
};
use crate::services::{
    ExerciseUpdate, NutritionService, RestTimer, WaterReminders, WaterTracker, WorkoutSession,
};
use crate::tasks::ScheduledTask;
use chrono::{Local, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vida_fitpro_shared::errors::{AuthError, GatewayError, LoadError};
use vida_fitpro_shared::models::{Meal, Profile, Session};
use vida_fitpro_shared::types::{NutritionProgress, PaymentMethod, SignUpDetails};
use vida_fitpro_shared::validation::validate_signup;

/// Copy-paste payment code shown on the pix path of the gate.
pub const PIX_PAYMENT_CODE: &str = "00020126580014br.gov.bcb.pix0136a1b2c3d4-e5f6-7890-abcd-ef1234567890520400005303986540525.995802BR5925VIDA FITPRO LTDA6009SAO PAULO62070503***63041D3A";

/// Number of onboarding steps.
pub const ONBOARDING_STEP_COUNT: usize = 5;

/// Capacity of the app event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Which form the auth screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// The screens of the client. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Onboarding,
    SubscriptionGate,
    Dashboard,
    Workout,
    Diet,
    Progress,
    Profile,
}

/// Screens reachable by lateral navigation once subscribed.
const TAB_SCREENS: [Screen; 5] = [
    Screen::Dashboard,
    Screen::Workout,
    Screen::Diet,
    Screen::Progress,
    Screen::Profile,
];

impl Screen {
    /// Where a failed startup load routes. Everything fails closed to
    /// the payment gate except a missing or incomplete profile, which
    /// goes back to onboarding.
    pub fn for_load_error(err: &LoadError) -> Self {
        match err {
            LoadError::NoSession => Screen::Auth,
            LoadError::ProfileMissing | LoadError::ProfileIncomplete => Screen::Onboarding,
            LoadError::SubscriptionInactive | LoadError::Failed { .. } => Screen::SubscriptionGate,
        }
    }
}

/// Routing as a pure function of what the startup load found.
pub fn route_for(
    session_present: bool,
    goal: Option<&str>,
    level: Option<&str>,
    has_active_subscription: bool,
) -> Screen {
    if !session_present {
        return Screen::Auth;
    }
    let answered = |value: Option<&str>| value.is_some_and(|v| !v.is_empty());
    if !answered(goal) || !answered(level) {
        return Screen::Onboarding;
    }
    if !has_active_subscription {
        return Screen::SubscriptionGate;
    }
    Screen::Dashboard
}

/// Events delivered to the app's single-threaded loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Session lifecycle notification from the gateway.
    Session(SessionEvent),
    /// Once-per-minute reminder check.
    ReminderTick,
    /// Once-per-second rest-timer tick.
    RestTick,
}

/// Onboarding questionnaire progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingState {
    pub step: usize,
    pub goal: Option<String>,
    pub level: Option<String>,
    pub days_per_week: Option<u8>,
    pub session_time_minutes: Option<u16>,
    pub equipment: Vec<String>,
}

impl OnboardingState {
    /// Whether a given step has an answer.
    pub fn step_answered(&self, step: usize) -> bool {
        match step {
            0 => self.goal.as_deref().is_some_and(|v| !v.is_empty()),
            1 => self.level.as_deref().is_some_and(|v| !v.is_empty()),
            2 => self.days_per_week.is_some(),
            3 => self.session_time_minutes.is_some(),
            4 => !self.equipment.is_empty(),
            _ => false,
        }
    }

    /// Whether the current step allows moving forward.
    pub fn can_advance(&self) -> bool {
        self.step_answered(self.step)
    }

    /// Move to the next step if the current one is answered. Returns
    /// false on the last step; completion is a separate action.
    pub fn next(&mut self) -> bool {
        if !self.can_advance() || self.step + 1 >= ONBOARDING_STEP_COUNT {
            return false;
        }
        self.step += 1;
        true
    }

    /// Move back one step.
    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    /// Toggle an equipment option (the one multi-select step).
    pub fn toggle_equipment(&mut self, item: &str) {
        if let Some(pos) = self.equipment.iter().position(|e| e == item) {
            self.equipment.remove(pos);
        } else {
            self.equipment.push(item.to_string());
        }
    }

    /// The completed questionnaire, if every step is answered.
    pub fn answers(&self) -> Option<OnboardingAnswers> {
        if !(0..ONBOARDING_STEP_COUNT).all(|step| self.step_answered(step)) {
            return None;
        }
        Some(OnboardingAnswers {
            goal: self.goal.clone()?,
            level: self.level.clone()?,
            days_per_week: self.days_per_week?,
            session_time_minutes: self.session_time_minutes?,
            equipment: self.equipment.clone(),
        })
    }
}

/// Dashboard-derived state, reloaded as a whole.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub workout: Option<WorkoutSession>,
    pub meals: Vec<Meal>,
    pub nutrition: NutritionProgress,
    pub water: WaterTracker,
}

impl DashboardData {
    fn new(config: &AppConfig) -> Self {
        Self {
            workout: None,
            meals: Vec::new(),
            nutrition: NutritionService::progress(&[], &config.nutrition),
            water: WaterTracker::new(config.water.target_glasses),
        }
    }
}

/// The whole client state. Each screen renders its slice.
#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub auth_mode: AuthMode,
    /// Inline error on the auth form, the only user-facing failure.
    pub auth_error: Option<AuthError>,
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    pub has_subscription: bool,
    pub onboarding: OnboardingState,
    pub payment_method: Option<PaymentMethod>,
    pub dashboard: DashboardData,
    pub rest_timer: RestTimer,
    pub reminders: WaterReminders,
}

/// The screen-state orchestrator.
pub struct App {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notifier>,
    prefs_store: PrefsStore,
    config: AppConfig,
    state: AppState,
    events_tx: mpsc::Sender<AppEvent>,
    reminder_task: Option<ScheduledTask>,
    rest_task: Option<ScheduledTask>,
    _session_listener: ScheduledTask,
}

impl App {
    /// Build the app and its event channel. Loads persisted
    /// preferences and starts listening for session changes.
    pub async fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
        prefs_store: PrefsStore,
        config: AppConfig,
    ) -> (Self, mpsc::Receiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let prefs = prefs_store.load().await;

        let session_listener = {
            let mut events = gateway.subscribe();
            let tx = events_tx.clone();
            ScheduledTask::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            if tx.send(AppEvent::Session(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session events lagged");
                        }
                    }
                }
            })
        };

        let state = AppState {
            screen: Screen::Auth,
            auth_mode: AuthMode::default(),
            auth_error: None,
            session: None,
            profile: None,
            has_subscription: false,
            onboarding: OnboardingState::default(),
            payment_method: None,
            dashboard: DashboardData::new(&config),
            rest_timer: RestTimer::new(),
            reminders: WaterReminders::new(prefs.water_reminders_enabled),
        };

        let app = Self {
            gateway,
            notifier,
            prefs_store,
            config,
            state,
            events_tx,
            reminder_task: None,
            rest_task: None,
            _session_listener: session_listener,
        };
        (app, events_rx)
    }

    /// Read-only view of the client state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Mutable access to the onboarding slice (the onboarding screen's
    /// writable state).
    pub fn onboarding_mut(&mut self) -> &mut OnboardingState {
        &mut self.state.onboarding
    }

    /// Drive the event loop until the channel closes.
    pub async fn run(&mut self, mut events: mpsc::Receiver<AppEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
    }

    /// Apply one event. Everything that mutates state funnels through
    /// here or through a direct user action method.
    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Session(SessionEvent::SignedIn(session)) => {
                self.load_for_session(session).await;
            }
            AppEvent::Session(SessionEvent::SignedOut) => self.clear_session_state(),
            AppEvent::ReminderTick => {
                let now = Local::now();
                self.check_reminders(now.hour(), now.minute());
            }
            AppEvent::RestTick => self.apply_rest_tick(),
        }
    }

    // ------------------------------------------------------------------
    // Startup and routing
    // ------------------------------------------------------------------

    /// Startup: ask the gateway for an existing session and route.
    pub async fn initialize(&mut self) {
        match self.gateway.current_session().await {
            Ok(Some(session)) => self.load_for_session(session).await,
            Ok(None) => {
                info!("no session, routing to auth");
                self.state.screen = Screen::Auth;
            }
            Err(err) => {
                warn!(error = %err, "session check failed, routing to auth");
                self.state.screen = Screen::Auth;
            }
        }
    }

    /// The load routine both startup and session-change notifications
    /// converge on. Idempotent: running it twice for the same session
    /// lands in the same state.
    async fn load_for_session(&mut self, session: Session) {
        self.state.auth_error = None;
        self.state.session = Some(session.clone());

        let screen = match self.load_user_state(&session).await {
            Ok(()) => {
                let profile = self.state.profile.as_ref();
                route_for(
                    true,
                    profile.and_then(|p| p.goal.as_deref()),
                    profile.and_then(|p| p.level.as_deref()),
                    self.state.has_subscription,
                )
            }
            Err(err) => {
                info!(reason = %err, "startup load stopped short of the dashboard");
                Screen::for_load_error(&err)
            }
        };

        self.transition(screen);
        if screen == Screen::Dashboard {
            self.load_dashboard_data().await;
            self.ensure_reminder_task();
        }
    }

    /// Load profile and subscription, recording them in state.
    ///
    /// Errors say where the walk stopped; the caller maps them to a
    /// screen. Profile read failures count as a missing profile; a
    /// subscription check failure fails closed to the gate.
    async fn load_user_state(&mut self, session: &Session) -> Result<(), LoadError> {
        self.state.has_subscription = false;
        let gateway = Arc::clone(&self.gateway);

        let profile = match ProfileRepository::fetch(gateway.as_ref(), session).await {
            Ok(profile) => profile,
            Err(LoadError::Failed { what, source }) => {
                warn!(what, error = %source, "profile load failed, treating as missing");
                return Err(LoadError::ProfileMissing);
            }
            Err(err) => return Err(err),
        };
        let complete = profile.onboarding_complete();
        self.state.profile = Some(profile);
        if !complete {
            return Err(LoadError::ProfileIncomplete);
        }

        match SubscriptionRepository::fetch_active(gateway.as_ref(), session.user_id).await {
            Ok(Some(_)) => {
                self.state.has_subscription = true;
                Ok(())
            }
            Ok(None) => Err(LoadError::SubscriptionInactive),
            Err(err) => {
                warn!(error = %err, "subscription check failed, failing closed to the gate");
                Err(LoadError::SubscriptionInactive)
            }
        }
    }

    /// Reload everything the dashboard derives from today's records.
    /// Each piece loads independently; failures are logged and the
    /// previous value stands until the next reload.
    pub async fn load_dashboard_data(&mut self) {
        let Some(session) = self.state.session.clone() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let user_id = session.user_id;
        let date = repositories::today();

        match HydrationRepository::fetch_for_date(gateway.as_ref(), user_id, date).await {
            Ok(Some(intake)) => self.state.dashboard.water = WaterTracker::from_intake(&intake),
            Ok(None) => {
                self.state.dashboard.water = WaterTracker::new(self.config.water.target_glasses);
            }
            Err(err) => warn!(error = %err, "failed to load water intake"),
        }

        match NutritionRepository::fetch_for_date(gateway.as_ref(), user_id, date).await {
            Ok(meals) => {
                self.state.dashboard.nutrition =
                    NutritionService::progress(&meals, &self.config.nutrition);
                self.state.dashboard.meals = meals;
            }
            Err(err) => warn!(error = %err, "failed to load meals"),
        }

        match WorkoutRepository::fetch_today(gateway.as_ref(), user_id).await {
            Ok(Some(today)) => {
                self.state.dashboard.workout =
                    Some(WorkoutSession::new(today.workout.name, today.exercises));
            }
            Ok(None) => self.state.dashboard.workout = None,
            Err(err) => warn!(error = %err, "failed to load workout"),
        }
    }

    /// Lateral navigation between the tab screens. Ignored until an
    /// active subscription makes them reachable.
    pub fn navigate(&mut self, screen: Screen) {
        if !self.state.has_subscription || !TAB_SCREENS.contains(&screen) {
            debug!(?screen, "navigation ignored");
            return;
        }
        self.transition(screen);
    }

    fn transition(&mut self, screen: Screen) {
        if self.state.screen == Screen::Workout && screen != Screen::Workout {
            // Leaving the workout screen stops its timer.
            self.cancel_rest_timer();
        }
        self.state.screen = screen;
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub fn switch_auth_mode(&mut self, mode: AuthMode) {
        self.state.auth_mode = mode;
        self.state.auth_error = None;
    }

    /// Sign in and re-run the startup load. Failures surface inline on
    /// the form.
    pub async fn sign_in(&mut self, email: &str, password: &str) {
        self.state.auth_error = None;
        match self.gateway.sign_in(email, password).await {
            Ok(session) => self.load_for_session(session).await,
            Err(err) => self.state.auth_error = Some(auth_error_from(err)),
        }
    }

    /// Validate the form, create the account, provision its rows, and
    /// re-run the startup load (which routes to onboarding).
    pub async fn sign_up(&mut self, details: SignUpDetails) {
        self.state.auth_error = None;
        if let Err(err) = validate_signup(
            &details.email,
            &details.password,
            &details.password_confirmation,
        ) {
            self.state.auth_error = Some(err);
            return;
        }

        match self
            .gateway
            .sign_up(&details.email, &details.password, &details.name)
            .await
        {
            Ok(session) => {
                let gateway = Arc::clone(&self.gateway);
                if let Err(err) =
                    ProfileRepository::provision(gateway.as_ref(), &session, &details.name).await
                {
                    // The load sequence routes to onboarding either way.
                    warn!(error = %err, "sign-up provisioning incomplete");
                }
                self.load_for_session(session).await;
            }
            Err(err) => self.state.auth_error = Some(auth_error_from(err)),
        }
    }

    /// Tear the session down and return to auth, regardless of what
    /// was in flight.
    pub async fn sign_out(&mut self) {
        if let Err(err) = self.gateway.sign_out().await {
            warn!(error = %err, "sign-out failed");
        }
        self.clear_session_state();
    }

    fn clear_session_state(&mut self) {
        self.state.session = None;
        self.state.profile = None;
        self.state.has_subscription = false;
        self.state.payment_method = None;
        self.state.onboarding = OnboardingState::default();
        self.state.dashboard = DashboardData::new(&self.config);
        self.state.rest_timer = RestTimer::new();
        self.state.reminders.dismiss_banner();
        self.rest_task = None;
        self.reminder_task = None;
        self.state.auth_mode = AuthMode::Login;
        self.state.auth_error = None;
        self.state.screen = Screen::Auth;
    }

    // ------------------------------------------------------------------
    // Onboarding
    // ------------------------------------------------------------------

    /// Persist the finished questionnaire and re-run the startup load,
    /// which routes to the gate or the dashboard.
    pub async fn complete_onboarding(&mut self) -> AppResult<()> {
        let Some(session) = self.state.session.clone() else {
            return Err(AppError::Validation("not signed in".to_string()));
        };
        let Some(answers) = self.state.onboarding.answers() else {
            return Err(AppError::Validation(
                "onboarding has unanswered steps".to_string(),
            ));
        };

        let gateway = Arc::clone(&self.gateway);
        if let Err(err) =
            ProfileRepository::save_onboarding(gateway.as_ref(), session.user_id, &answers).await
        {
            // Stay on onboarding; the user can retry.
            warn!(error = %err, "onboarding answers not persisted");
            return Ok(());
        }
        self.load_for_session(session).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Subscription gate
    // ------------------------------------------------------------------

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.state.payment_method = Some(method);
    }

    pub fn clear_payment_method(&mut self) {
        self.state.payment_method = None;
    }

    /// User confirmed payment: record the active subscription and move
    /// to the dashboard.
    pub async fn activate_subscription(&mut self) -> AppResult<()> {
        let Some(session) = self.state.session.clone() else {
            return Err(AppError::Validation("not signed in".to_string()));
        };
        let Some(method) = self.state.payment_method else {
            return Err(AppError::Validation("no payment method selected".to_string()));
        };

        let gateway = Arc::clone(&self.gateway);
        match SubscriptionRepository::activate(gateway.as_ref(), session.user_id, method).await {
            Ok(()) => {
                self.state.has_subscription = true;
                self.transition(Screen::Dashboard);
                self.load_dashboard_data().await;
                self.ensure_reminder_task();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "subscription activation not persisted");
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Water
    // ------------------------------------------------------------------

    /// One more glass, clamped to the target. Local state moves first;
    /// the upsert is best-effort and never rolled back.
    pub async fn add_water_glass(&mut self) {
        let Some(session) = self.state.session.clone() else {
            return;
        };
        self.state.dashboard.water.add_glass();
        let intake = self.state.dashboard.water.as_intake(repositories::today());

        let gateway = Arc::clone(&self.gateway);
        if let Err(err) =
            HydrationRepository::upsert(gateway.as_ref(), session.user_id, &intake).await
        {
            warn!(error = %err, "water intake not persisted");
        }
    }

    /// "I drank water" on the reminder banner: count the glass and
    /// dismiss.
    pub async fn accept_water_reminder(&mut self) {
        self.add_water_glass().await;
        self.state.reminders.dismiss_banner();
    }

    /// Hide the banner without counting anything.
    pub fn dismiss_water_reminder(&mut self) {
        self.state.reminders.dismiss_banner();
    }

    /// Flip the reminders preference, persist it, and (when enabling)
    /// request notification permission best-effort.
    pub async fn toggle_water_reminders(&mut self) {
        let enabled = !self.state.reminders.enabled();
        self.state.reminders.set_enabled(enabled);

        let prefs = Preferences {
            water_reminders_enabled: enabled,
        };
        if let Err(err) = self.prefs_store.save(&prefs).await {
            warn!(error = %err, "failed to persist reminder preference");
        }

        if enabled {
            // Permission gates only the system notification; the
            // in-app banner fires regardless.
            self.notifier.request_permission().await;
            self.ensure_reminder_task();
        } else {
            self.reminder_task = None;
        }
    }

    /// Run one reminder check against a wall-clock minute.
    pub fn check_reminders(&mut self, hour: u32, minute: u32) {
        let Some(slot) = self.state.reminders.check(hour, minute) else {
            return;
        };
        info!(label = slot.label, hour, minute, "water reminder fired");
        if self.notifier.permission() == PermissionState::Granted {
            let water = &self.state.dashboard.water;
            let notification = WaterReminders::notification(water.consumed(), water.target());
            self.notifier.notify(&notification);
        }
    }

    fn ensure_reminder_task(&mut self) {
        if !self.state.reminders.enabled()
            || !self.state.has_subscription
            || self.reminder_task.is_some()
        {
            return;
        }
        let tx = self.events_tx.clone();
        self.reminder_task = Some(ScheduledTask::every(Duration::from_secs(60), move || {
            let tx = tx.clone();
            async move {
                let _ = tx.send(AppEvent::ReminderTick).await;
            }
        }));
    }

    // ------------------------------------------------------------------
    // Workout
    // ------------------------------------------------------------------

    /// Apply one field edit to one exercise, optimistically, and write
    /// it back if the exercise already exists remotely.
    pub async fn update_exercise(&mut self, index: usize, update: ExerciseUpdate) -> AppResult<()> {
        let Some(workout) = self.state.dashboard.workout.as_mut() else {
            return Err(AppError::Validation("no active workout".to_string()));
        };
        let remote_id = workout.apply(index, &update)?;

        if let Some(id) = remote_id {
            let gateway = Arc::clone(&self.gateway);
            if let Err(err) = WorkoutRepository::update_exercise_field(
                gateway.as_ref(),
                id,
                update.column(),
                update.value(),
            )
            .await
            {
                warn!(error = %err, "exercise edit not persisted");
            }
        }
        Ok(())
    }

    /// Start (or replace) the rest countdown and its ticking task.
    pub fn start_rest_timer(&mut self, seconds: u32) {
        self.state.rest_timer.start(seconds);
        if !self.state.rest_timer.is_resting() {
            self.rest_task = None;
            return;
        }
        let tx = self.events_tx.clone();
        self.rest_task = Some(ScheduledTask::every(Duration::from_secs(1), move || {
            let tx = tx.clone();
            async move {
                let _ = tx.send(AppEvent::RestTick).await;
            }
        }));
    }

    /// Skip the rest early.
    pub fn cancel_rest_timer(&mut self) {
        self.state.rest_timer.cancel();
        self.rest_task = None;
    }

    fn apply_rest_tick(&mut self) {
        self.state.rest_timer.tick();
        if !self.state.rest_timer.is_resting() {
            self.rest_task = None;
        }
    }
}

fn auth_error_from(err: GatewayError) -> AuthError {
    match err {
        GatewayError::Unauthenticated => AuthError::InvalidCredentials,
        GatewayError::Status { status, .. } if (400..=403).contains(&status) => {
            AuthError::InvalidCredentials
        }
        other => AuthError::Gateway(other),
    }
}
