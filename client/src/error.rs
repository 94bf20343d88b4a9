//! Application error handling
//!
//! All backend errors are caught at the call site; nothing propagates
//! to a global handler. The only user-visible failures are inline
//! validation and auth messages; everything else is logged and the
//! screen routing absorbs it.

use thiserror::Error;
use vida_fitpro_shared::errors::{AuthError, GatewayError, LoadError, WriteError};

/// Top-level client error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
