//! Account handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use hogwarts_types::user::{LoginRequest, LoginResponse, RegisterRequest, UserProfile};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let user = state.user_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user.id }))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.user_service.login(body).await?))
}

/// GET /api/auth/user
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = state.user_service.get_user(&auth.user_id).await?;
    Ok(Json(UserProfile::from(&user)))
}
