//! Embedding capability and HTTP provider clients.
//!
//! The semantic merge step only depends on the [`EmbeddingsClient`] trait.
//! Concrete clients for hosted and local providers live in submodules and
//! are selected at runtime through [`EmbeddingsConfig`].
//!
//! # Example
//!
//! ```no_run
//! use doc_consolidate::embeddings::{create_embeddings_client, EmbeddingsConfig, EmbeddingsProvider};
//!
//! let config = EmbeddingsConfig::new(EmbeddingsProvider::Ollama)
//!     .with_base_url("http://localhost:11434");
//! let client = create_embeddings_client(&config)?;
//! let vectors = client.embed_many(&["rent is due monthly", ""])?;
//! assert_eq!(vectors.len(), 2);
//! # Ok::<(), doc_consolidate::Error>(())
//! ```

mod cloudflare;
mod http;
mod ollama;
mod openai;
mod retry;

pub use cloudflare::{CloudflareEmbeddings, CloudflareModel};
pub use http::HttpEmbeddingsConfig;
pub use ollama::{OllamaEmbeddings, OllamaModel};
pub use openai::{OpenAiEmbeddings, OpenAiModel};
pub use retry::RetryPolicy;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Capability that turns texts into vectors.
///
/// Implementations must return exactly one vector per input text, in input
/// order, all of one dimensionality. Empty or whitespace-only texts get an
/// all-zero placeholder vector instead of an error. A failed call fails as a
/// whole; partial batches are never returned.
pub trait EmbeddingsClient: Send + Sync {
    /// Embed a batch of texts.
    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Return the provider name for logging.
    fn name(&self) -> &'static str;
}

/// Cosine similarity of two vectors.
///
/// Returns `0` when either vector has zero norm or the lengths differ.
/// Accumulates in `f64` and clamps to `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use doc_consolidate::embeddings::cosine_similarity;
///
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]), 1.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}

/// Check a returned batch against the capability contract.
///
/// # Errors
///
/// [`Error::MalformedEmbeddingResponse`] when the count differs from
/// `expected`, dimensionalities are mixed, or a value is not finite.
pub fn validate_embeddings(expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
    if vectors.len() != expected {
        return Err(Error::MalformedEmbeddingResponse(format!(
            "expected {} vectors, got {}",
            expected,
            vectors.len()
        )));
    }
    if let Some(first) = vectors.first() {
        let dim = first.len();
        if let Some(pos) = vectors.iter().position(|v| v.len() != dim) {
            return Err(Error::MalformedEmbeddingResponse(format!(
                "vector {} has dimension {}, expected {}",
                pos,
                vectors[pos].len(),
                dim
            )));
        }
        if vectors.iter().flatten().any(|x| !x.is_finite()) {
            return Err(Error::MalformedEmbeddingResponse(
                "vector contains a non-finite value".to_string(),
            ));
        }
    }
    Ok(())
}

/// Embed only the non-blank texts and pad the rest with zero vectors in place.
///
/// The zero vector takes the dimension of the returned vectors, falling back
/// to `default_dim` when every text was blank.
pub(crate) fn embed_non_empty<F>(texts: &[&str], default_dim: usize, embed: F) -> Result<Vec<Vec<f32>>>
where
    F: FnOnce(&[&str]) -> Result<Vec<Vec<f32>>>,
{
    let non_empty: Vec<&str> = texts.iter().copied().filter(|t| !t.trim().is_empty()).collect();
    if non_empty.is_empty() {
        return Ok(vec![vec![0.0; default_dim]; texts.len()]);
    }

    let embedded = embed(&non_empty)?;
    validate_embeddings(non_empty.len(), &embedded)?;
    if embedded.len() == texts.len() {
        return Ok(embedded);
    }

    let dim = embedded.first().map_or(default_dim, Vec::len);
    let mut embedded = embedded.into_iter();
    let result = texts
        .iter()
        .map(|text| {
            if text.trim().is_empty() {
                vec![0.0; dim]
            } else {
                embedded.next().unwrap_or_else(|| vec![0.0; dim])
            }
        })
        .collect();
    Ok(result)
}

/// Supported embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingsProvider {
    /// OpenAI embeddings API
    OpenAi,
    /// Local Ollama server
    Ollama,
    /// Cloudflare Workers AI
    Cloudflare,
}

impl EmbeddingsProvider {
    /// Name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingsProvider::OpenAi => "openai",
            EmbeddingsProvider::Ollama => "ollama",
            EmbeddingsProvider::Cloudflare => "cloudflare",
        }
    }
}

impl FromStr for EmbeddingsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(EmbeddingsProvider::OpenAi),
            "ollama" => Ok(EmbeddingsProvider::Ollama),
            "cloudflare" => Ok(EmbeddingsProvider::Cloudflare),
            _ => Err(Error::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for EmbeddingsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to build an embedding client.
#[derive(Debug, Clone)]
pub struct EmbeddingsConfig {
    /// Which provider to call
    pub provider: EmbeddingsProvider,
    /// Model name; the provider default when `None`
    pub model: Option<String>,
    /// API key or token (OpenAI, Cloudflare)
    pub api_key: Option<String>,
    /// Cloudflare account id
    pub account_id: Option<String>,
    /// Override for the provider's base URL
    pub base_url: Option<String>,
    /// Timeout, retry and batching settings
    pub http: HttpEmbeddingsConfig,
}

impl EmbeddingsConfig {
    /// Create a config for a provider with default settings.
    pub fn new(provider: EmbeddingsProvider) -> Self {
        Self {
            provider,
            model: None,
            api_key: None,
            account_id: None,
            base_url: None,
            http: HttpEmbeddingsConfig::default(),
        }
    }

    /// Create a config with credentials taken from the environment.
    ///
    /// Reads `OPENAI_API_KEY`, `OLLAMA_API_URL`, `CLOUDFLARE_API_TOKEN` and
    /// `CLOUDFLARE_ACCOUNT_ID` as relevant to the provider.
    pub fn from_env(provider: EmbeddingsProvider) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut config = Self::new(provider);
        match provider {
            EmbeddingsProvider::OpenAi => config.api_key = var("OPENAI_API_KEY"),
            EmbeddingsProvider::Ollama => config.base_url = var("OLLAMA_API_URL"),
            EmbeddingsProvider::Cloudflare => {
                config.api_key = var("CLOUDFLARE_API_TOKEN");
                config.account_id = var("CLOUDFLARE_ACCOUNT_ID");
            },
        }
        config
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API key or token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the Cloudflare account id.
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set timeout, retry and batching settings.
    pub fn with_http(mut self, http: HttpEmbeddingsConfig) -> Self {
        self.http = http;
        self
    }

    fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::InvalidConfig(format!("{} embeddings require an API key", self.provider))
        })
    }
}

/// Build a shareable client for the configured provider.
///
/// No network request is made here.
///
/// # Errors
///
/// Missing credentials, an unknown model name or an HTTP client that cannot
/// be built are configuration errors.
pub fn create_embeddings_client(config: &EmbeddingsConfig) -> Result<Arc<dyn EmbeddingsClient>> {
    let model = config.model.as_deref();
    let client: Arc<dyn EmbeddingsClient> = match config.provider {
        EmbeddingsProvider::OpenAi => {
            let model = model.map(str::parse::<OpenAiModel>).transpose()?.unwrap_or_default();
            let mut client = OpenAiEmbeddings::new(config.require_api_key()?, model, config.http.clone())?;
            if let Some(url) = &config.base_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        },
        EmbeddingsProvider::Ollama => {
            let model = model.map(str::parse::<OllamaModel>).transpose()?.unwrap_or_default();
            let url = config.base_url.as_deref().unwrap_or(OllamaEmbeddings::DEFAULT_BASE_URL);
            Arc::new(OllamaEmbeddings::new(url, model, config.http.clone())?)
        },
        EmbeddingsProvider::Cloudflare => {
            let model = model.map(str::parse::<CloudflareModel>).transpose()?.unwrap_or_default();
            let account_id = config.account_id.as_deref().ok_or_else(|| {
                Error::InvalidConfig("cloudflare embeddings require an account id".to_string())
            })?;
            let mut client = CloudflareEmbeddings::new(
                config.require_api_key()?,
                account_id,
                model,
                config.http.clone(),
            )?;
            if let Some(url) = &config.base_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        },
    };
    log::info!("Using {} embeddings", client.name());
    Ok(client)
}
