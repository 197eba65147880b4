//! Request DTOs with validation.

use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use quill_auth::NewAccount;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "confirmation_matches"))]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 5, max = 20, message = "Username must be 5 to 20 characters"))]
    pub username: String,
    /// Display name.
    #[validate(length(min = 1, max = 30, message = "Name is required and at most 30 characters"))]
    pub name: String,
    /// Email.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    /// Password.
    #[validate(custom(function = "password_policy"))]
    pub password: String,
    /// Optional repeat of the password; must match when sent.
    #[serde(default, rename = "confirmpassword", alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 5, max = 20, message = "Username must be 5 to 20 characters"))]
    pub username: String,
    /// Password.
    #[validate(custom(function = "password_policy"))]
    pub password: String,
}

/// 8 to 25 ASCII letters and digits, with at least one lowercase letter,
/// one uppercase letter, and one digit.
fn password_policy(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    let well_formed = (8..=25).contains(&len)
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit());

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("password_policy").with_message(Cow::Borrowed(
            "Password must be 8 to 25 letters and digits with an uppercase letter, a lowercase letter, and a digit",
        )))
    }
}

fn confirmation_matches(req: &RegisterRequest) -> Result<(), ValidationError> {
    match &req.confirm_password {
        Some(confirm) if confirm != &req.password => Err(ValidationError::new(
            "password_mismatch",
        )
        .with_message(Cow::Borrowed("Password confirmation does not match"))),
        _ => Ok(()),
    }
}
