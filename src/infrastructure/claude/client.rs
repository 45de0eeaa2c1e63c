use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::errors::ClaudeApiError;
use super::types::{MessageRequest, MessageResponse};
use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::models::AnalysisConfig;
use crate::domain::ports::CompletionClient;
use crate::infrastructure::logging::SecretScrubber;

/// HTTP client for the Claude Messages API.
///
/// One POST per call, no retries; the credential is passed per request so a
/// single client serves whatever key is currently stored.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    max_tokens: u32,
    anthropic_version: String,
    timeout_secs: u64,
}

impl ClaudeClient {
    pub fn new(config: &AnalysisConfig) -> EcoResult<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| EcoError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            anthropic_version: config.anthropic_version.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    async fn send_request(
        &self,
        credential: &str,
        request: &MessageRequest,
    ) -> Result<MessageResponse, ClaudeApiError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-api-key", credential)
            .header("anthropic-version", &self.anthropic_version)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let scrubbed = SecretScrubber::scrub(&body);
            warn!(status = status.as_u16(), body = %scrubbed, "Messages API returned an error");
            return Err(ClaudeApiError::from_status(status, &scrubbed));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(e))?;
        serde_json::from_str(&body).map_err(|e| ClaudeApiError::Envelope(e.to_string()))
    }

    fn classify_send_error(&self, err: reqwest::Error) -> ClaudeApiError {
        if err.is_timeout() {
            ClaudeApiError::Timeout(self.timeout_secs)
        } else {
            ClaudeApiError::Network(err)
        }
    }
}

#[async_trait]
impl CompletionClient for ClaudeClient {
    #[instrument(skip(self, credential, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, credential: &str, prompt: &str) -> EcoResult<String> {
        let request = MessageRequest::user_prompt(&self.model, self.max_tokens, prompt);
        let response = self.send_request(credential, &request).await?;

        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
                "completion received"
            );
        }

        response.first_text().map(str::to_string).ok_or_else(|| {
            EcoError::MalformedResponse("response contained no text content".to_string())
        })
    }
}
