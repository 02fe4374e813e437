use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::AppState,
    auth::{generate_access_token, hash_password, validate_password_strength, verify_password},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserProfile},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.email, &state.jwt)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(AuthResponse {
        access_token,
        user: UserProfile::from(user),
    })
}

/// Lowercased and trimmed so lookups are case-insensitive
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;

    let email = normalize_email(&request.email);
    if !looks_like_email(&email) {
        return Err(AppError::InvalidInput("A valid email is required".to_string()));
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }
    validate_password_strength(&request.password).map_err(AppError::InvalidInput)?;

    let password_hash = hash_password(&request.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?;

    let user = state
        .users
        .create_user(NewUser {
            email,
            password_hash,
            name: name.to_string(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_token(&state, &user)?)))
}

/// Unknown email and wrong password are indistinguishable to the caller
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(request) = payload?;

    let user = state
        .users
        .find_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let verified = verify_password(&request.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {e}")))?;
    if !verified {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    Ok(Json(issue_token(&state, &user)?))
}

pub async fn profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserProfile>> {
    let account = state
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&account)))
}
