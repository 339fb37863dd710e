//! OpenAI embeddings API client.

use std::fmt;
use std::str::FromStr;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use super::http::{send_json, HttpEmbeddingsConfig};
use super::{embed_non_empty, EmbeddingsClient};
use crate::error::{Error, Result};

const PROVIDER: &str = "openai";

/// Embedding models served by OpenAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenAiModel {
    /// `text-embedding-3-small`
    TextEmbedding3Small,
    /// `text-embedding-3-large`
    #[default]
    TextEmbedding3Large,
    /// `text-embedding-ada-002`
    Ada002,
}

impl OpenAiModel {
    /// Model id sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenAiModel::TextEmbedding3Small => "text-embedding-3-small",
            OpenAiModel::TextEmbedding3Large => "text-embedding-3-large",
            OpenAiModel::Ada002 => "text-embedding-ada-002",
        }
    }

    /// Vector dimensionality.
    pub fn dimensions(&self) -> usize {
        match self {
            OpenAiModel::TextEmbedding3Small | OpenAiModel::Ada002 => 1536,
            OpenAiModel::TextEmbedding3Large => 3072,
        }
    }
}

impl FromStr for OpenAiModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "text-embedding-3-small" => Ok(OpenAiModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(OpenAiModel::TextEmbedding3Large),
            "text-embedding-ada-002" => Ok(OpenAiModel::Ada002),
            other => Err(Error::InvalidConfig(format!("unknown OpenAI model '{}'", other))),
        }
    }
}

impl fmt::Display for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in request order; the API does not promise ordered `data`.
    fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>> {
        self.data.sort_by_key(|d| d.index);
        let in_sequence = self.data.iter().enumerate().all(|(i, d)| d.index == i);
        if self.data.len() != expected || !in_sequence {
            return Err(Error::MalformedEmbeddingResponse(format!(
                "openai returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        Ok(self.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Client for `POST {base_url}/embeddings`.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    http: Client,
    config: HttpEmbeddingsConfig,
    auth: HeaderValue,
    base_url: String,
    model: OpenAiModel,
}

impl OpenAiEmbeddings {
    /// Public API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a client. No request is made.
    ///
    /// # Errors
    ///
    /// An empty API key or one that is not a valid header value.
    pub fn new(api_key: &str, model: OpenAiModel, config: HttpEmbeddingsConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("OpenAI API key is empty".to_string()));
        }
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| Error::InvalidConfig("OpenAI API key is not a valid header".to_string()))?;
        auth.set_sensitive(true);
        Ok(Self {
            http: config.build_client()?,
            config,
            auth,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Point the client at a compatible endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Configured model.
    pub fn model(&self) -> OpenAiModel {
        self.model
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .header(AUTHORIZATION, self.auth.clone())
            .json(&EmbeddingRequest {
                model: self.model.as_str(),
                input: texts,
            });
        send_json::<EmbeddingResponse>(PROVIDER, request)?.into_vectors(texts.len())
    }
}

impl EmbeddingsClient for OpenAiEmbeddings {
    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        embed_non_empty(texts, self.model.dimensions(), |non_empty| {
            self.config
                .batched(PROVIDER, non_empty, usize::MAX, |batch| self.embed_batch(batch))
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
