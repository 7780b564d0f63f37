//! Remote embed-template API client
//!
//! Bearer-token JSON API treated as an opaque remote store. Failures never
//! cross the caller boundary as errors: every public method logs and
//! returns `None` or `false` after the retry budget is spent.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::application::errors::ApiError;
use crate::domain::entities::EmbedTemplate;
use crate::infrastructure::config::ApiConfig;

/// Standard response envelope for all endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

pub struct EmbedApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    max_attempts: u32,
    backoff: Duration,
}

impl EmbedApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client, using default settings: {}", e);
            Client::default()
        });
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout,
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    fn embeds_url(&self, guild_id: &str, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{}/guilds/{}/embeds/{}", self.base_url, guild_id, name),
            None => format!("{}/guilds/{}/embeds", self.base_url, guild_id),
        }
    }

    /// Send a request, retrying network/timeout/non-2xx failures with
    /// linear backoff. A 2xx response with `success: false` is a final
    /// rejection and is not retried.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Option<T>, ApiError> {
        let mut last_err = ApiError::Network("no attempts made".to_string());

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.backoff * (attempt - 1)).await;
            }

            // Request-level timeout holds even when the builder above fell
            // back to a default client.
            let mut req = self.client.request(method.clone(), url).timeout(self.timeout);
            if let Some(token) = &self.token {
                req = req.header("Authorization", format!("Bearer {}", token));
            }
            if let Some(body) = &body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) if response.status().is_success() => {
                    let envelope: Envelope<T> = response
                        .json()
                        .await
                        .map_err(|e| ApiError::Parse(e.to_string()))?;
                    if envelope.success {
                        return Ok(envelope.data);
                    }
                    return Err(ApiError::Rejected(
                        envelope.error.unwrap_or_else(|| "unknown".to_string()),
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    last_err = ApiError::Status(status.as_u16(), text);
                }
                Err(e) if e.is_timeout() => {
                    last_err = ApiError::Timeout;
                }
                Err(e) => {
                    last_err = ApiError::Network(e.to_string());
                }
            }

            tracing::warn!(
                attempt,
                max = self.max_attempts,
                url,
                "Embed API request failed: {}",
                last_err
            );
        }

        Err(last_err)
    }

    pub async fn fetch_templates(&self, guild_id: &str) -> Option<Vec<EmbedTemplate>> {
        let url = self.embeds_url(guild_id, None);
        match self.request(Method::GET, &url, None).await {
            Ok(templates) => templates,
            Err(e) => {
                tracing::error!(guild = guild_id, "Failed to fetch templates: {}", e);
                None
            }
        }
    }

    pub async fn fetch_template(&self, guild_id: &str, name: &str) -> Option<EmbedTemplate> {
        let url = self.embeds_url(guild_id, Some(name));
        match self.request(Method::GET, &url, None).await {
            Ok(template) => template,
            Err(e) => {
                tracing::error!(guild = guild_id, name, "Failed to fetch template: {}", e);
                None
            }
        }
    }

    pub async fn save_template(&self, guild_id: &str, template: &EmbedTemplate) -> bool {
        let url = self.embeds_url(guild_id, None);
        let body = match serde_json::to_value(template) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to serialize template: {}", e);
                return false;
            }
        };
        match self
            .request::<serde_json::Value>(Method::POST, &url, Some(body))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(guild = guild_id, "Failed to save template: {}", e);
                false
            }
        }
    }

    pub async fn delete_template(&self, guild_id: &str, name: &str) -> bool {
        let url = self.embeds_url(guild_id, Some(name));
        match self
            .request::<serde_json::Value>(Method::DELETE, &url, None)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(guild = guild_id, name, "Failed to delete template: {}", e);
                false
            }
        }
    }
}
