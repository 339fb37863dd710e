//! Cloudflare Workers AI embeddings client.

use std::fmt;
use std::str::FromStr;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use super::http::{send_json, HttpEmbeddingsConfig};
use super::{embed_non_empty, EmbeddingsClient};
use crate::error::{Error, Result};

const PROVIDER: &str = "cloudflare";

/// Workers AI accepts at most this many texts per call.
const MAX_BATCH: usize = 100;

/// BGE embedding models hosted on Workers AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloudflareModel {
    /// `@cf/baai/bge-small-en-v1.5`
    BgeSmall,
    /// `@cf/baai/bge-base-en-v1.5`
    #[default]
    BgeBase,
    /// `@cf/baai/bge-large-en-v1.5`
    BgeLarge,
}

impl CloudflareModel {
    /// Model path used in the run URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudflareModel::BgeSmall => "@cf/baai/bge-small-en-v1.5",
            CloudflareModel::BgeBase => "@cf/baai/bge-base-en-v1.5",
            CloudflareModel::BgeLarge => "@cf/baai/bge-large-en-v1.5",
        }
    }

    /// Vector dimensionality.
    pub fn dimensions(&self) -> usize {
        match self {
            CloudflareModel::BgeSmall => 384,
            CloudflareModel::BgeBase => 768,
            CloudflareModel::BgeLarge => 1024,
        }
    }
}

impl FromStr for CloudflareModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "@cf/baai/bge-small-en-v1.5" => Ok(CloudflareModel::BgeSmall),
            "@cf/baai/bge-base-en-v1.5" => Ok(CloudflareModel::BgeBase),
            "@cf/baai/bge-large-en-v1.5" => Ok(CloudflareModel::BgeLarge),
            other => Err(Error::InvalidConfig(format!("unknown Cloudflare model '{}'", other))),
        }
    }
}

impl fmt::Display for CloudflareModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct RunRequest<'a> {
    text: &'a [&'a str],
}

#[derive(Deserialize)]
struct RunResponse {
    result: RunResult,
}

#[derive(Deserialize)]
struct RunResult {
    data: Vec<Vec<f32>>,
}

/// Client for `POST {base_url}/accounts/{account_id}/ai/run/{model}`.
#[derive(Debug, Clone)]
pub struct CloudflareEmbeddings {
    http: Client,
    config: HttpEmbeddingsConfig,
    auth: HeaderValue,
    account_id: String,
    base_url: String,
    model: CloudflareModel,
}

impl CloudflareEmbeddings {
    /// Public API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.cloudflare.com/client/v4";

    /// Create a client. No request is made.
    ///
    /// # Errors
    ///
    /// An empty token or account id.
    pub fn new(
        api_token: &str,
        account_id: &str,
        model: CloudflareModel,
        config: HttpEmbeddingsConfig,
    ) -> Result<Self> {
        if api_token.trim().is_empty() || account_id.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "Cloudflare embeddings require an API token and an account id".to_string(),
            ));
        }
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_token.trim())).map_err(|_| {
            Error::InvalidConfig("Cloudflare API token is not a valid header".to_string())
        })?;
        auth.set_sensitive(true);
        Ok(Self {
            http: config.build_client()?,
            config,
            auth,
            account_id: account_id.trim().to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Configured model.
    pub fn model(&self) -> CloudflareModel {
        self.model
    }

    fn run_url(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url,
            self.account_id,
            self.model.as_str()
        )
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = self
            .http
            .post(self.run_url())
            .header(AUTHORIZATION, self.auth.clone())
            .json(&RunRequest { text: texts });
        let response: RunResponse = send_json(PROVIDER, request)?;
        Ok(response.result.data)
    }
}

impl EmbeddingsClient for CloudflareEmbeddings {
    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        embed_non_empty(texts, self.model.dimensions(), |non_empty| {
            self.config
                .batched(PROVIDER, non_empty, MAX_BATCH, |batch| self.embed_batch(batch))
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
