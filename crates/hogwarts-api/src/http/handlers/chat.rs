//! Streaming chat endpoint.
//!
//! POST /api/chat
//!
//! Validation, prompt assembly and dispatch happen before the response
//! starts, so their failures still map to an HTTP status. Once the upstream
//! answered, its body is relayed byte for byte as `text/event-stream`.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use hogwarts_core::relay::ChannelSink;
use hogwarts_types::chat::ChatRequest;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// POST /api/chat - relay one narrator turn.
pub async fn stream_chat(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Response, AppError> {
    let request_id = uuid::Uuid::now_v7();
    let span = tracing::info_span!(
        "chat",
        %request_id,
        user_id = %auth.user_id,
        multi_agent = request.multi_agent,
    );

    let cancel = CancellationToken::new();
    let source = state
        .relay_service
        .open_chat(&request, &cancel)
        .instrument(span.clone())
        .await?;

    let (tx, mut rx) = mpsc::channel::<Bytes>(state.relay_config.channel_capacity.max(1));
    let service = state.relay_service.clone();
    let relay_cancel = cancel.clone();
    tokio::spawn(
        async move {
            let mut sink = ChannelSink::new(tx);
            service.relay(source, &mut sink, &relay_cancel).await;
        }
        .instrument(span),
    );

    // Dropping the body (client gone) fires the token and stops the relay.
    let guard = cancel.drop_guard();
    let body = async_stream::stream! {
        let _guard = guard;
        while let Some(chunk) = rx.recv().await {
            yield Ok::<_, Infallible>(chunk);
        }
    };

    Ok((
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Body::from_stream(body),
    )
        .into_response())
}
