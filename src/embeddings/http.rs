//! Shared HTTP plumbing for embedding providers.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::RetryPolicy;
use crate::error::{Error, Result};

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Timeout, retry and batching settings shared by all HTTP providers.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingsConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Backoff for transient failures
    pub retry: RetryPolicy,
    /// Maximum texts per request (providers may cap this further)
    pub batch_size: usize,
}

impl Default for HttpEmbeddingsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpEmbeddingsConfig {
    /// 30s timeout, default retry policy, 256 texts per request.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            batch_size: 256,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the maximum number of texts per request (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub(crate) fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))
    }

    /// Split `texts` into batches of at most `limit`, embedding each with retries.
    ///
    /// The result is all-or-nothing: the first batch that fails for good
    /// fails the whole call.
    pub(crate) fn batched<F>(
        &self,
        provider: &'static str,
        texts: &[&str],
        limit: usize,
        mut embed_batch: F,
    ) -> Result<Vec<Vec<f32>>>
    where
        F: FnMut(&[&str]) -> Result<Vec<Vec<f32>>>,
    {
        let size = self.batch_size.min(limit).max(1);
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(size) {
            let batch = self.retry.run(provider, || embed_batch(chunk))?;
            if batch.len() != chunk.len() {
                return Err(Error::MalformedEmbeddingResponse(format!(
                    "{} returned {} vectors for {} texts",
                    provider,
                    batch.len(),
                    chunk.len()
                )));
            }
            vectors.extend(batch);
        }
        log::debug!("{}: embedded {} texts", provider, texts.len());
        Ok(vectors)
    }
}

/// Map a transport error; timeouts and connection failures are transient.
pub(crate) fn request_error(provider: &'static str, err: reqwest::Error) -> Error {
    Error::EmbeddingRequest {
        provider,
        transient: err.is_timeout() || err.is_connect(),
        message: err.to_string(),
    }
}

/// Send a request and decode its JSON body.
///
/// Non-success statuses become [`Error::EmbeddingStatus`]; a body that does
/// not decode into `R` is a malformed response.
pub(crate) fn send_json<R>(provider: &'static str, request: RequestBuilder) -> Result<R>
where
    R: DeserializeOwned,
{
    let response = request.send().map_err(|e| request_error(provider, e))?;
    let status = response.status();
    let body = response.text().map_err(|e| request_error(provider, e))?;
    if !status.is_success() {
        return Err(Error::EmbeddingStatus {
            provider,
            status: status.as_u16(),
            body: truncate(&body),
        });
    }
    decode(provider, &body)
}

pub(crate) fn decode<R>(provider: &'static str, body: &str) -> Result<R>
where
    R: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        Error::MalformedEmbeddingResponse(format!("{} response did not decode: {}", provider, e))
    })
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
