//! Error types for the Vida FitPro client
//!
//! Three families mirror the three ways the client can fail: talking to
//! the gateway at all (`GatewayError`), authenticating (`AuthError`,
//! surfaced inline on the auth form), and loading or writing records
//! (`LoadError` / `WriteError`, logged and routed but never shown as an
//! error screen).

use thiserror::Error;

/// Low-level gateway failures, independent of what was being asked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("not authenticated")]
    Unauthenticated,

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Authentication failures, surfaced inline on the auth form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Why the startup load sequence stopped short of the dashboard.
///
/// These are routing signals as much as errors: each variant maps to a
/// screen (auth, onboarding, or the payment gate) rather than to an
/// error surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no active session")]
    NoSession,

    #[error("profile record missing")]
    ProfileMissing,

    #[error("profile incomplete: onboarding not finished")]
    ProfileIncomplete,

    #[error("no active subscription")]
    SubscriptionInactive,

    #[error("failed to load {what}: {source}")]
    Failed {
        what: &'static str,
        #[source]
        source: GatewayError,
    },
}

/// A best-effort write that did not reach the remote store.
///
/// Local state is never rolled back on this error; callers log it and
/// move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to persist {what}: {source}")]
pub struct WriteError {
    pub what: &'static str,
    #[source]
    pub source: GatewayError,
}
