use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::embedding::{ensure_finite, EmbeddingError, EmbeddingProvider};
use crate::services::cache::{CacheKey, EmbeddingCache};

/// Bounded exponential backoff for embedding calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-indexed), doubling each time
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
///
/// Retries transport errors, throttling and 5xx responses. Successful
/// vectors are kept in an optional in-memory cache.
pub struct EmbeddingClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
    retry: RetryPolicy,
    cache: Option<EmbeddingCache>,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(endpoint: String, api_key: String, model: String) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            client,
            retry: RetryPolicy::default(),
            cache: None,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.endpoint.trim_end_matches('/'))
    }

    /// One POST to the provider, no retries
    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EmbeddingError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Failed to parse embedding: {}", e)))?;

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("Missing data array".into()))?;

        if vector.is_empty() {
            return Err(EmbeddingError::InvalidResponse("Empty embedding".into()));
        }
        ensure_finite(&vector)?;

        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = CacheKey::embedding(&self.model, text);
        if let Some(cache) = &self.cache {
            if let Some(vector) = cache.get(&key).await {
                return Ok(vector.as_ref().clone());
            }
        }

        let mut attempt = 0;
        let vector = loop {
            match self.request_embedding(text).await {
                Ok(vector) => break vector,
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Embedding request failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(key, vector.clone()).await;
        }

        Ok(vector)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
