use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        extractors::SESSION_COOKIE,
        repo_types::User,
        services::{authenticate, register_user},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let Json(payload) = payload?;
    let user = register_user(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(user).with_message("Account created successfully")),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<User>>), ApiError> {
    let Json(payload) = payload?;
    let (user, token) = authenticate(&state, payload).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .expires(state.jwt.expires_at(OffsetDateTime::now_utc()))
        .build();

    Ok((
        jar.add(cookie),
        Json(ApiResponse::data(user).with_message("Logged in successfully")),
    ))
}

/// Overwrites the session cookie with an already expired empty value. The token
/// itself stays valid until it expires.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .expires(OffsetDateTime::now_utc() - TimeDuration::hours(1))
        .build();
    info!("session cookie cleared");
    (
        jar.add(cookie),
        Json(ApiResponse::message("Logged out successfully")),
    )
}
