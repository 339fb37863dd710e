//! Ollama local embeddings client.

use std::fmt;
use std::str::FromStr;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::http::{request_error, send_json, HttpEmbeddingsConfig};
use super::{embed_non_empty, EmbeddingsClient};
use crate::error::{Error, Result};

const PROVIDER: &str = "ollama";

/// Embedding models commonly pulled into Ollama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OllamaModel {
    /// `bge-large`
    #[default]
    BgeLarge,
    /// `nomic-embed-text`
    NomicEmbedText,
}

impl OllamaModel {
    /// Model name sent to the server.
    pub fn as_str(&self) -> &'static str {
        match self {
            OllamaModel::BgeLarge => "bge-large",
            OllamaModel::NomicEmbedText => "nomic-embed-text",
        }
    }

    /// Vector dimensionality.
    pub fn dimensions(&self) -> usize {
        match self {
            OllamaModel::BgeLarge => 1024,
            OllamaModel::NomicEmbedText => 768,
        }
    }
}

impl FromStr for OllamaModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "bge-large" => Ok(OllamaModel::BgeLarge),
            "nomic-embed-text" => Ok(OllamaModel::NomicEmbedText),
            other => Err(Error::InvalidConfig(format!("unknown Ollama model '{}'", other))),
        }
    }
}

impl fmt::Display for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Client for `POST {base_url}/api/embeddings`, one text per request.
#[derive(Debug, Clone)]
pub struct OllamaEmbeddings {
    http: Client,
    config: HttpEmbeddingsConfig,
    base_url: String,
    model: OllamaModel,
}

impl OllamaEmbeddings {
    /// Default local server.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    /// Create a client. No request is made; see [`check_connection`](Self::check_connection).
    pub fn new(base_url: &str, model: OllamaModel, config: HttpEmbeddingsConfig) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("Ollama base URL is empty".to_string()));
        }
        Ok(Self {
            http: config.build_client()?,
            config,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Configured model.
    pub fn model(&self) -> OllamaModel {
        self.model
    }

    /// Verify that the server answers on `GET /api/tags`.
    pub fn check_connection(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .map_err(|e| request_error(PROVIDER, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::EmbeddingStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                body: format!("server at {} is not ready", self.base_url),
            });
        }
        log::info!("Connected to Ollama at {}", self.base_url);
        Ok(())
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let request = self
            .http
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbeddingRequest {
                model: self.model.as_str(),
                prompt: text,
            });
        let response: EmbeddingResponse = send_json(PROVIDER, request)?;
        if response.embedding.is_empty() {
            return Err(Error::MalformedEmbeddingResponse(
                "ollama returned an empty embedding".to_string(),
            ));
        }
        Ok(response.embedding)
    }
}

impl EmbeddingsClient for OllamaEmbeddings {
    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        embed_non_empty(texts, self.model.dimensions(), |non_empty| {
            self.config.batched(PROVIDER, non_empty, 1, |batch| {
                batch.iter().map(|text| self.embed_one(text)).collect()
            })
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::super::http::decode;
    use super::*;

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(EmbeddingRequest {
            model: "bge-large",
            prompt: "hello",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"model": "bge-large", "prompt": "hello"}));
    }

    #[test]
    fn test_response_decoding() {
        let response: EmbeddingResponse = decode(PROVIDER, r#"{"embedding": [0.5, -0.5]}"#).unwrap();
        assert_eq!(response.embedding, vec![0.5, -0.5]);
        assert!(decode::<EmbeddingResponse>(PROVIDER, r#"{"error": "model not found"}"#).is_err());
    }

    #[test]
    fn test_models() {
        assert_eq!(OllamaModel::default().dimensions(), 1024);
        assert_eq!(
            "nomic-embed-text".parse::<OllamaModel>().unwrap().dimensions(),
            768
        );
        assert!("llama3".parse::<OllamaModel>().is_err());
    }

    #[test]
    fn test_base_url_normalized() {
        let client = OllamaEmbeddings::new(
            "http://gpu-box:11434/",
            OllamaModel::default(),
            HttpEmbeddingsConfig::new(),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://gpu-box:11434");
        assert!(OllamaEmbeddings::new("", OllamaModel::default(), HttpEmbeddingsConfig::new()).is_err());
    }
}
