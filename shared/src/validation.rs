//! Input validation functions
//!
//! Validation that runs before anything touches the network: auth form
//! fields and the user-editable workout numbers.

use crate::errors::AuthError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() || email.len() > 255 {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if !email_regex.is_match(email) {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Validate a sign-up form: email shape, password length, confirmation.
pub fn validate_signup(
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> Result<(), AuthError> {
    validate_email(email)?;
    if password != password_confirmation {
        return Err(AuthError::PasswordMismatch);
    }
    validate_password(password)?;
    Ok(())
}

/// Validate a rate-of-perceived-exertion value (1-10 scale).
pub fn validate_rpe(rpe: u8) -> Result<(), String> {
    if (1..=10).contains(&rpe) {
        Ok(())
    } else {
        Err(format!("RPE must be between 1 and 10, got {rpe}"))
    }
}

/// Validate an exercise weight in kg.
pub fn validate_exercise_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 0.0 {
        return Err("Weight cannot be negative".to_string());
    }
    if weight_kg > 1000.0 {
        return Err("Weight unreasonably high".to_string());
    }
    Ok(())
}
