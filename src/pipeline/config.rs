//! Configuration for the ingestion pipeline.
//!
//! Everything here is a plain value supplied by the caller. Nothing is read
//! from the environment or from global state; thresholds are validated when
//! the steps that consume them are constructed.

use std::fmt;
use std::str::FromStr;

use crate::elements::Element;
use crate::error::{Error, Result};
use crate::node::NodeThresholds;

/// Named pipeline presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePreset {
    /// No steps: every element becomes its own node
    NoOp,
    /// Deterministic geometric consolidation, no external calls
    #[default]
    Basic,
    /// Geometric clean-up followed by embedding-similarity merging
    Semantic,
}

impl PipelinePreset {
    /// Name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            PipelinePreset::NoOp => "none",
            PipelinePreset::Basic => "basic",
            PipelinePreset::Semantic => "semantic",
        }
    }
}

impl FromStr for PipelinePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "noop" => Ok(PipelinePreset::NoOp),
            "basic" => Ok(PipelinePreset::Basic),
            "semantic" => Ok(PipelinePreset::Semantic),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for PipelinePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the semantic preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticConfig {
    /// Final floor: nodes with fewer tokens are dropped after merging
    pub min_tokens: usize,
    /// Token budget; the semantic merge uses half of it as its ceiling
    pub max_tokens: usize,
    /// Cosine similarity threshold in `[-1, 1]`
    pub min_similarity: f32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticConfig {
    /// 256 / 1024 tokens, similarity 0.6.
    pub fn new() -> Self {
        Self {
            min_tokens: 256,
            max_tokens: 1024,
            min_similarity: 0.6,
        }
    }

    /// Set the final token floor.
    pub fn with_min_tokens(mut self, min_tokens: usize) -> Self {
        self.min_tokens = min_tokens;
        self
    }

    /// Set the token budget.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the similarity threshold.
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Ceiling for a single semantic merge.
    pub fn merge_ceiling(&self) -> usize {
        self.max_tokens / 2
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.min_tokens > self.max_tokens {
            return Err(Error::InvalidConfig(format!(
                "min_tokens ({}) exceeds max_tokens ({})",
                self.min_tokens, self.max_tokens
            )));
        }
        Ok(())
    }
}

/// Which element variants enter the pipeline.
///
/// Text always does; tables and images can be skipped when the caller has no
/// use for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSelection {
    /// Keep table elements
    pub tables: bool,
    /// Keep image elements
    pub images: bool,
}

impl Default for ElementSelection {
    fn default() -> Self {
        Self {
            tables: true,
            images: true,
        }
    }
}

impl ElementSelection {
    /// Keep or skip tables.
    pub fn with_tables(mut self, tables: bool) -> Self {
        self.tables = tables;
        self
    }

    /// Keep or skip images.
    pub fn with_images(mut self, images: bool) -> Self {
        self.images = images;
        self
    }

    /// Whether the element passes the selection.
    pub fn accepts(&self, element: &Element) -> bool {
        match element {
            Element::Text(_) => true,
            Element::Table(_) => self.tables,
            Element::Image(_) => self.images,
        }
    }
}

/// Configuration shared by the presets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineConfig {
    /// Stub and small token thresholds
    pub thresholds: NodeThresholds,
    /// Semantic preset parameters
    pub semantic: SemanticConfig,
    /// Element variants admitted at ingestion
    pub selection: ElementSelection,
}

impl PipelineConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set node thresholds.
    pub fn with_thresholds(mut self, thresholds: NodeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set semantic parameters.
    pub fn with_semantic(mut self, semantic: SemanticConfig) -> Self {
        self.semantic = semantic;
        self
    }

    /// Set the element selection.
    pub fn with_selection(mut self, selection: ElementSelection) -> Self {
        self.selection = selection;
        self
    }
}
