//! Processing steps for the ingestion pipeline.
//!
//! Every step consumes a sorted node sequence and returns a new one. Steps
//! carry configuration fixed at construction and no document state.
//!
//! # Available Steps
//!
//! - [`RemoveTextInsideTables`]: drops text double-counted by table extraction
//! - [`CombineSlicedImages`]: stitches image bands back together
//! - [`RemoveFullPageStubs`]: drops page-sized boxes with almost no text
//! - [`CombineNodesSpatially`]: fixed-point proximity merge
//! - [`CombineHeadingsWithClosestText`]: attaches headings to their body text
//! - [`CombineBullets`]: reassembles list items, including across pages
//! - [`RemoveMetadataElements`]: drops page numbers and running headers
//! - [`RemoveRepeatedElements`]: drops text repeated across pages
//! - [`RemoveNodesBelowNTokens`]: final stub cleanup
//! - [`CombineNodesSemantically`]: embedding-similarity merge under a token budget

mod bullets;
mod filters;
mod headings;
mod images;
mod metadata;
mod semantic;
mod spatial;
mod tables;

pub use bullets::CombineBullets;
pub use filters::{RemoveFullPageStubs, RemoveNodesBelowNTokens};
pub use headings::CombineHeadingsWithClosestText;
pub use images::CombineSlicedImages;
pub use metadata::{RemoveMetadataElements, RemoveRepeatedElements};
pub use semantic::CombineNodesSemantically;
pub use spatial::{CombineNodesSpatially, SpatialCriteria};
pub use tables::RemoveTextInsideTables;

use crate::error::Result;
use crate::node::Node;

/// Trait for a single `nodes -> nodes` transformation.
///
/// Implementations receive nodes already sorted by position and must not
/// keep state between calls. Deterministic geometric steps never fail on
/// valid nodes; the `Result` exists for steps that call external services.
pub trait ProcessingStep: Send + Sync {
    /// Transform a sorted node sequence.
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>>;

    /// Return the name of this step for logging.
    fn name(&self) -> &'static str;
}

/// One left-to-right pass merging adjacent pairs that satisfy `should_merge`.
///
/// A merged node stays at its index and is re-tested against its new right
/// neighbour, so chains collapse within a single pass. Returns the number of
/// merges performed.
pub(crate) fn merge_adjacent<F>(nodes: &mut Vec<Node>, mut should_merge: F) -> usize
where
    F: FnMut(&Node, &Node) -> bool,
{
    let mut merges = 0;
    let mut i = 0;
    while i + 1 < nodes.len() {
        if should_merge(&nodes[i], &nodes[i + 1]) {
            let next = nodes.remove(i + 1);
            nodes[i].absorb(next);
            merges += 1;
            continue;
        }
        i += 1;
    }
    merges
}
