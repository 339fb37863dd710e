// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::should_implement_trait)]

//! # Doc Consolidate
//!
//! Consolidates over-segmented document elements into coherent nodes.
//!
//! Extraction engines emit text runs, tables and images as many small,
//! positioned fragments. This crate wraps each fragment into a [`Node`] and
//! runs the nodes through an ordered pipeline of merge and filter steps until
//! they form retrieval-sized chunks.
//!
//! ## Core Features
//!
//! - **Geometric consolidation**: table-text deduplication, sliced-image
//!   stitching, fixed-point proximity merging, heading attachment and
//!   cross-page bullet reassembly
//! - **Clean-up filters**: full-page stubs, page numbers, running headers and
//!   footers, text repeated across pages
//! - **Semantic merging**: adjacent nodes with similar embeddings merge under
//!   a token budget
//! - **Embedding providers**: OpenAI, Ollama and Cloudflare Workers AI over
//!   blocking HTTP with bounded exponential backoff
//!
//! ## Architecture
//!
//! - **Closed element model**: [`Element`] is a tagged enum over text, table
//!   and image payloads
//! - **Pluggable steps**: every transform implements
//!   [`ProcessingStep`](pipeline::ProcessingStep); presets are step lists
//! - **Capability injection**: the semantic step only sees the
//!   [`EmbeddingsClient`](embeddings::EmbeddingsClient) trait
//!
//! ## Quick Start
//!
//! ```
//! use doc_consolidate::elements::TextElement;
//! use doc_consolidate::geometry::BoundingBox;
//! use doc_consolidate::pipeline::{IngestionPipeline, PipelineConfig, PipelinePreset};
//!
//! # fn main() -> doc_consolidate::Result<()> {
//! let page = |y0: f32| BoundingBox::new(1, 612.0, 792.0, 72.0, y0, 540.0, y0 + 12.0);
//! let elements = vec![
//!     TextElement::heading("1. Term", page(100.0)?).into(),
//!     TextElement::new("The lease runs for twelve months.", page(116.0)?).into(),
//! ];
//!
//! let pipeline = IngestionPipeline::from_preset(PipelinePreset::NoOp, &PipelineConfig::default(), None)?;
//! let nodes = pipeline.run_elements(elements)?;
//! assert_eq!(nodes.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Data model
pub mod elements;
pub mod geometry;
pub mod node;
pub mod text;

// Consolidation pipeline
pub mod pipeline;

// Embedding capability and providers
pub mod embeddings;

// Re-exports
pub use elements::{Element, ElementVariant};
pub use error::{Error, Result};
pub use geometry::BoundingBox;
pub use node::{Node, NodeThresholds};
pub use pipeline::{IngestionPipeline, PipelineConfig, PipelinePreset};
