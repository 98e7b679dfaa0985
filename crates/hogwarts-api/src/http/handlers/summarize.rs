//! Story summary endpoint.

use axum::extract::State;
use axum::Json;
use tokio_util::sync::CancellationToken;

use hogwarts_types::chat::{SummarizeRequest, SummarizeResponse};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// POST /api/ai/summarize - condense the conversation into a summary fragment.
///
/// If the client disconnects, axum drops this future and the pending
/// upstream request with it.
pub async fn summarize(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(request): ApiJson<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError> {
    tracing::debug!(user_id = %auth.user_id, "summarize requested");
    let summary = state
        .relay_service
        .summarize(&request, &CancellationToken::new())
        .await?;
    Ok(Json(SummarizeResponse { summary }))
}
