//! HttpUpstreamDispatcher: concrete [`UpstreamDispatcher`] over reqwest.
//!
//! One shared `reqwest::Client` per process; its connection pool is reused
//! across requests. The credential inside the envelope is only exposed when
//! the body is serialized and is never logged.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use hogwarts_core::relay::{ByteStream, UpstreamDispatcher, UpstreamEnvelope};
use hogwarts_types::config::UpstreamConfig;
use hogwarts_types::error::RelayError;
use hogwarts_types::relay::UpstreamTarget;

/// Longest error body kept from a failed upstream response.
const MAX_ERROR_BODY: usize = 2048;

pub struct HttpUpstreamDispatcher {
    client: reqwest::Client,
    base_url: String,
    chat_path: String,
    multi_agent_path: String,
}

impl HttpUpstreamDispatcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_path: config.chat_path.clone(),
            multi_agent_path: config.multi_agent_path.clone(),
        })
    }

    fn url(&self, target: UpstreamTarget) -> String {
        let path = match target {
            UpstreamTarget::Chat => &self.chat_path,
            UpstreamTarget::MultiAgentChat => &self.multi_agent_path,
        };
        format!("{}{}", self.base_url, path)
    }
}

impl UpstreamDispatcher for HttpUpstreamDispatcher {
    async fn dispatch(
        &self,
        target: UpstreamTarget,
        envelope: &UpstreamEnvelope,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, RelayError> {
        let body = envelope
            .to_json()
            .map_err(|e| RelayError::Serialization(format!("envelope: {e}")))?;
        let url = self.url(target);
        tracing::debug!(%target, %url, body_bytes = body.len(), "dispatching to inference service");

        let send = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(body)
            .send();

        // Dropping the pending `send` future aborts the request.
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RelayError::ClientDisconnected),
            response = send => response.map_err(|e| {
                tracing::warn!(%target, error = %e, "inference service unreachable");
                RelayError::UpstreamConnect(e.without_url().to_string())
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            tracing::warn!(%target, status = status.as_u16(), "inference service returned an error");
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| RelayError::UpstreamRead(e.to_string())));
        Ok(Box::pin(stream))
    }
}
