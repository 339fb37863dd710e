//! Ingestion pipeline: ordered processing steps over sorted nodes.
//!
//! ```text
//! Element[]
//!     ↓
//! [ElementSelection] (optionally skip tables / images)
//!     ↓
//! Node[] (one singleton node per element)
//!     ↓
//! sort → [ProcessingStep] → sort → [ProcessingStep] → ...
//!     ↓
//! Node[] (consolidated)
//! ```
//!
//! # Key Design Principles
//!
//! 1. **Owned sequences**: every step takes the node vector by value and
//!    returns a new one; nothing is aliased between steps.
//!
//! 2. **Deterministic order**: nodes are re-sorted by `(page, y0, x0)` before
//!    every step with a stable sort.
//!
//! 3. **Pluggable steps**: presets are plain step lists; callers can append
//!    their own [`ProcessingStep`] implementations.

pub mod config;
pub mod transforms;

pub use config::{ElementSelection, PipelineConfig, PipelinePreset, SemanticConfig};
pub use transforms::{
    CombineBullets, CombineHeadingsWithClosestText, CombineNodesSemantically,
    CombineNodesSpatially, CombineSlicedImages, ProcessingStep, RemoveFullPageStubs,
    RemoveMetadataElements, RemoveNodesBelowNTokens, RemoveRepeatedElements,
    RemoveTextInsideTables, SpatialCriteria,
};

use std::fmt;
use std::sync::Arc;

use crate::elements::Element;
use crate::embeddings::EmbeddingsClient;
use crate::error::{Error, Result};
use crate::node::{nodes_from_elements, sort_nodes, Node};

/// An ordered list of processing steps.
///
/// The pipeline holds no document state; the same instance can run any
/// number of documents in sequence.
///
/// # Examples
///
/// ```
/// use doc_consolidate::elements::TextElement;
/// use doc_consolidate::geometry::BoundingBox;
/// use doc_consolidate::pipeline::{IngestionPipeline, PipelineConfig};
///
/// let bbox = BoundingBox::new(1, 612.0, 792.0, 72.0, 300.0, 540.0, 320.0)?;
/// let pipeline = IngestionPipeline::basic(&PipelineConfig::default())?;
/// let nodes = pipeline.run_elements(vec![TextElement::new("Hello", bbox).into()])?;
/// assert!(nodes.len() <= 1);
/// # Ok::<(), doc_consolidate::Error>(())
/// ```
#[derive(Default)]
pub struct IngestionPipeline {
    steps: Vec<Box<dyn ProcessingStep>>,
    selection: ElementSelection,
}

impl fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("steps", &self.step_names())
            .field("selection", &self.selection)
            .finish()
    }
}

impl IngestionPipeline {
    /// Create a pipeline without steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity pipeline.
    pub fn noop() -> Self {
        Self::new()
    }

    /// Set which element variants [`run_elements`](Self::run_elements) admits.
    pub fn with_selection(mut self, selection: ElementSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Append a step. Ordering is the caller's responsibility.
    pub fn append_transform(&mut self, step: Box<dyn ProcessingStep>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Box<dyn ProcessingStep>] {
        &self.steps
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Deterministic geometric consolidation.
    pub fn basic(config: &PipelineConfig) -> Result<Self> {
        let t = config.thresholds;
        let steps: Vec<Box<dyn ProcessingStep>> = vec![
            Box::new(RemoveTextInsideTables::new()),
            Box::new(CombineSlicedImages::new()),
            Box::new(RemoveFullPageStubs::new(0.35)?.with_thresholds(t)),
            Box::new(CombineNodesSpatially::new(10.0, 4.0, SpatialCriteria::BothSmall)?.with_thresholds(t)),
            Box::new(CombineHeadingsWithClosestText::new()),
            Box::new(CombineBullets::new()),
            Box::new(CombineNodesSpatially::new(0.0, 10.0, SpatialCriteria::BothSmall)?.with_thresholds(t)),
            Box::new(RemoveMetadataElements::new().with_thresholds(t)),
            Box::new(CombineNodesSpatially::touching(SpatialCriteria::EitherStub).with_thresholds(t)),
            Box::new(RemoveRepeatedElements::new(2)?),
            Box::new(RemoveNodesBelowNTokens::new(t.stub_tokens)),
            Box::new(CombineBullets::new()),
        ];
        Ok(Self {
            steps,
            selection: config.selection,
        })
    }

    /// Geometric clean-up followed by embedding-similarity merging.
    ///
    /// # Errors
    ///
    /// Invalid semantic parameters are rejected here, before any document
    /// is processed.
    pub fn semantic(config: &PipelineConfig, client: Arc<dyn EmbeddingsClient>) -> Result<Self> {
        let t = config.thresholds;
        let semantic = config.semantic;
        semantic.validate()?;
        let steps: Vec<Box<dyn ProcessingStep>> = vec![
            Box::new(RemoveTextInsideTables::new()),
            Box::new(CombineSlicedImages::new()),
            Box::new(RemoveFullPageStubs::new(0.35)?.with_thresholds(t)),
            Box::new(CombineNodesSpatially::new(10.0, 2.0, SpatialCriteria::BothSmall)?.with_thresholds(t)),
            Box::new(CombineHeadingsWithClosestText::new()),
            Box::new(CombineBullets::new()),
            Box::new(RemoveMetadataElements::new().with_thresholds(t)),
            Box::new(RemoveRepeatedElements::new(2)?),
            Box::new(RemoveNodesBelowNTokens::new(10)),
            Box::new(CombineBullets::new()),
            Box::new(CombineNodesSemantically::new(
                client,
                semantic.min_similarity,
                semantic.merge_ceiling(),
            )?),
            Box::new(RemoveNodesBelowNTokens::new(semantic.min_tokens)),
        ];
        Ok(Self {
            steps,
            selection: config.selection,
        })
    }

    /// Build a named preset.
    ///
    /// # Errors
    ///
    /// The semantic preset needs an embedding client.
    pub fn from_preset(
        preset: PipelinePreset,
        config: &PipelineConfig,
        client: Option<Arc<dyn EmbeddingsClient>>,
    ) -> Result<Self> {
        match preset {
            PipelinePreset::NoOp => Ok(Self::noop().with_selection(config.selection)),
            PipelinePreset::Basic => Self::basic(config),
            PipelinePreset::Semantic => {
                let client = client.ok_or_else(|| {
                    Error::InvalidConfig("the semantic preset requires an embeddings client".to_string())
                })?;
                Self::semantic(config, client)
            },
        }
    }

    /// Run nodes through every step.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the run; no partial output is returned.
    pub fn run(&self, mut nodes: Vec<Node>) -> Result<Vec<Node>> {
        sort_nodes(&mut nodes);
        for step in &self.steps {
            let before = nodes.len();
            sort_nodes(&mut nodes);
            nodes = step.process(nodes)?;
            log::debug!("{}: {} -> {} nodes", step.name(), before, nodes.len());
        }
        log::info!("Pipeline produced {} nodes", nodes.len());
        Ok(nodes)
    }

    /// Wrap admitted elements into nodes and run them.
    ///
    /// # Errors
    ///
    /// Invalid bounding boxes fail here, before any step runs.
    pub fn run_elements(&self, elements: Vec<Element>) -> Result<Vec<Node>> {
        let total = elements.len();
        let nodes = nodes_from_elements(
            elements
                .into_iter()
                .filter(|e| self.selection.accepts(e)),
        )?;
        if nodes.len() < total {
            log::debug!("Skipped {} elements by selection", total - nodes.len());
        }
        self.run(nodes)
    }
}
