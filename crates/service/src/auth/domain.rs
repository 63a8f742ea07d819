use models::user::Subscription;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Signup body. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /users/verify`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResendVerificationInput {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `PATCH /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionInput {
    pub subscription: String,
}

/// Domain user (business view of the stored account)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub subscription: Subscription,
    pub token: Option<String>,
    pub verify: bool,
    pub verification_token: String,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser { email: self.email.clone(), subscription: self.subscription }
    }
}

/// Values needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub verification_token: String,
}

/// What clients see of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub email: String,
    pub subscription: Subscription,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicUser,
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::Validation("\"email\" is required".into()));
    }
    let invalid = || AuthError::Validation("\"email\" must be a valid email".into());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if !well_formed {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("\"password\" is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "\"password\" length must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    validate_email(email)?;
    validate_password(password)
}
