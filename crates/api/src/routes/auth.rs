//! Authentication routes: register, login, refresh, logout.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::AppState;
use prestar_core::auth::{hash_password, verify_password};
use prestar_db::repositories::user::{CreateUserInput, UserError, UserRepository};
use prestar_db::repositories::session::SessionRepository;
use prestar_shared::auth::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, UserInfo};
use prestar_shared::TokenPair;

/// Registration request payload.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Password (at least 8 characters).
    #[validate(length(min = 8))]
    pub password: String,
    /// Full name.
    #[validate(length(min = 1))]
    pub full_name: String,
}

/// Creates the auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// POST `/auth/register` - Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo
        .create_user(CreateUserInput {
            email: payload.email,
            password_hash,
            full_name: payload.full_name,
        })
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "User registered");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": user.id,
                    "email": user.email,
                    "full_name": user.full_name,
                    "created_at": user.created_at
                })),
            )
                .into_response()
        }
        Err(UserError::EmailTaken) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "email_taken",
                "message": "Email already registered"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create user");
            internal_error()
        }
    }
}

/// POST `/auth/login` - Exchange credentials for a token pair.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            error!(error = %e, "Failed to look up user");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            error!(error = %e, "Password verification failed");
            return internal_error();
        }
    }

    let (access_token, refresh_token) = match (
        state.jwt_service.generate_access_token(user.id),
        state.jwt_service.generate_refresh_token(user.id),
    ) {
        (Ok(a), Ok(r)) => (a, r),
        _ => {
            error!("Failed to generate tokens");
            return internal_error();
        }
    };

    let session_repo = SessionRepository::new((*state.db).clone());
    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create_session(user.id, &refresh_token, None, expires_at)
        .await
    {
        error!(error = %e, "Failed to create session");
        return internal_error();
    }

    info!(user_id = %user.id, "User logged in");
    (
        StatusCode::OK,
        Json(LoginResponse {
            user: UserInfo {
                id: user.id,
                email: user.email,
                full_name: user.full_name,
            },
            access_token,
            refresh_token,
            expires_in: state.jwt_service.access_token_expires_in(),
        }),
    )
        .into_response()
}

/// POST `/auth/refresh` - Rotate a refresh token into a new pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    // The token must be a valid JWT and have an active session.
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(claims) => claims,
        Err(_) => return invalid_refresh(),
    };

    let session_repo = SessionRepository::new((*state.db).clone());
    if session_repo.find_active(&payload.refresh_token).await.is_err() {
        return invalid_refresh();
    }

    // Rotation: revoke the old session before issuing a new pair.
    if let Err(e) = session_repo.revoke(&payload.refresh_token).await {
        error!(error = %e, "Failed to revoke session");
        return internal_error();
    }

    let user_id = claims.user_id();
    let (access_token, refresh_token) = match (
        state.jwt_service.generate_access_token(user_id),
        state.jwt_service.generate_refresh_token(user_id),
    ) {
        (Ok(a), Ok(r)) => (a, r),
        _ => {
            error!("Failed to generate tokens");
            return internal_error();
        }
    };

    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create_session(user_id, &refresh_token, None, expires_at)
        .await
    {
        error!(error = %e, "Failed to create session");
        return internal_error();
    }

    (
        StatusCode::OK,
        Json(TokenPair::new(
            access_token,
            refresh_token,
            state.jwt_service.access_token_expires_in(),
        )),
    )
        .into_response()
}

/// POST `/auth/logout` - Revoke a refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());
    // Revoking an unknown token is a no-op for the caller.
    let _ = session_repo.revoke(&payload.refresh_token).await;
    (StatusCode::NO_CONTENT, ()).into_response()
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn invalid_refresh() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_refresh_token",
            "message": "Refresh token is invalid, expired, or revoked"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
