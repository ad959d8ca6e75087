use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        repo::InsertUserError,
        repo_types::{NewUser, User},
    },
    error::{ApiError, INVALID_PAYLOAD},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 7;
pub const INCORRECT_CREDENTIALS: &str = "Incorrect email address or password";
pub const EMAIL_EXISTS: &str = "Email already exists";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

impl From<InsertUserError> for ApiError {
    fn from(err: InsertUserError) -> Self {
        match err {
            // lost a race with a concurrent registration for the same email
            InsertUserError::EmailTaken => ApiError::Conflict(EMAIL_EXISTS.into()),
            InsertUserError::Other(e) => ApiError::Internal(e.context("insert user")),
        }
    }
}

fn required(field: Option<String>) -> Result<String, ApiError> {
    field.ok_or_else(|| ApiError::validation(INVALID_PAYLOAD))
}

/// Validates the payload, rejects taken emails and stores the new account.
pub async fn register_user(state: &AppState, payload: RegisterRequest) -> Result<User, ApiError> {
    let password = payload
        .password
        .filter(|p| p.chars().count() >= MIN_PASSWORD_LEN)
        .ok_or_else(|| ApiError::validation("Password must be greater than 6 characters"))?;

    let email = payload
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| ApiError::validation("Invalid email address"))?;

    let first_name = required(payload.first_name)?;
    let last_name = required(payload.last_name)?;
    let phone = required(payload.phone)?;

    if state
        .users
        .find_by_email(&email)
        .await
        .context("look up email")?
        .is_some()
    {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict(EMAIL_EXISTS.into()));
    }

    let password_hash = state
        .hasher
        .hash_blocking(password)
        .await
        .context("hash password")?;

    let user = state
        .users
        .insert(NewUser {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            phone,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks credentials and mints a token for the account. Unknown email and wrong
/// password produce the same error.
pub async fn authenticate(
    state: &AppState,
    payload: LoginRequest,
) -> Result<(User, String), ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::validation("Email and password are required"));
    };
    let email = email.trim();

    let Some(user) = state
        .users
        .find_by_email(email)
        .await
        .context("look up user")?
    else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::unauthorized(INCORRECT_CREDENTIALS));
    };

    let ok = state
        .hasher
        .verify_blocking(password, user.password_hash.clone())
        .await
        .context("verify password")?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized(INCORRECT_CREDENTIALS));
    }

    let token = state
        .jwt
        .issue(&user.id.to_string())
        .context("sign session token")?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((user, token))
}
