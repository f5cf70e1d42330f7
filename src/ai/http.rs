use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{MoveProvider, MoveRequest, MoveResponse};
use crate::error::AiError;

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP client for the remote move-selection service.
#[derive(Debug, Clone)]
pub struct HttpMoveProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMoveProvider {
    /// Create a client for the service at `base_url`. Requests time out
    /// after `timeout`; expiry surfaces as [`AiError::Unavailable`].
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AiError::Unavailable {
                reason: err.to_string(),
            })?;
        Ok(HttpMoveProvider { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MoveProvider for HttpMoveProvider {
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, AiError> {
        let url = format!("{}/api/move", self.base_url);
        debug!(url = %url, mark = request.mark, depth = request.depth, "requesting remote move");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, url = %url, "move request failed");
                AiError::Unavailable {
                    reason: err.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // The service reports failures as {"status": "error", "error": ...}
            let message = response
                .json::<MoveResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "no error detail".to_string());
            warn!(status = status.as_u16(), message = %message, "move service returned an error");
            return Err(AiError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<MoveResponse>()
            .await
            .map_err(|err| AiError::Protocol {
                reason: err.to_string(),
            })
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response
                .json::<HealthResponse>()
                .await
                .map(|body| body.status == "ok")
                .unwrap_or(false),
            Ok(response) => {
                debug!(status = response.status().as_u16(), "health check failed");
                false
            }
            Err(err) => {
                debug!(error = %err, "health check unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let provider =
            HttpMoveProvider::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:5000");
    }
}
