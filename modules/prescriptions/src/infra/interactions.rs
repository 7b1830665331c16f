//! HTTP client for the external drug-interaction service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::InteractionsConfig;
use crate::domain::error::InteractionError;
use crate::domain::repo::InteractionClient;

pub struct HttpInteractionClient {
    http: reqwest::Client,
    url: String,
}

impl HttpInteractionClient {
    /// # Errors
    /// Returns [`InteractionError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(cfg: &InteractionsConfig) -> Result<Self, InteractionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| InteractionError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: cfg.url.clone(),
        })
    }
}

fn classify(err: &reqwest::Error) -> InteractionError {
    if let Some(status) = err.status() {
        InteractionError::Status(status.as_u16())
    } else if err.is_decode() {
        InteractionError::Decode(err.to_string())
    } else {
        InteractionError::Transport(err.to_string())
    }
}

#[async_trait]
impl InteractionClient for HttpInteractionClient {
    async fn fetch(&self) -> Result<Value, InteractionError> {
        tracing::debug!(url = %self.url, "querying drug interaction service");
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| classify(&e))?;

        response.json::<Value>().await.map_err(|e| classify(&e))
    }
}
