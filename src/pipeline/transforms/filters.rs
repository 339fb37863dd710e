//! Size-based node filters.

use crate::error::{Error, Result};
use crate::node::{Node, NodeThresholds};

use super::ProcessingStep;

/// Drops page-sized nodes that carry almost no text.
///
/// Watermarks, scanned backgrounds and decorative frames often arrive as a
/// box covering most of the page with a handful of tokens. Nodes spanning
/// more than one page are always kept.
#[derive(Debug, Clone, Copy)]
pub struct RemoveFullPageStubs {
    max_area_pct: f32,
    thresholds: NodeThresholds,
}

impl RemoveFullPageStubs {
    /// Create the step.
    ///
    /// # Arguments
    ///
    /// * `max_area_pct` - Page coverage in `(0, 1]` above which a stub is dropped
    pub fn new(max_area_pct: f32) -> Result<Self> {
        if !(max_area_pct > 0.0 && max_area_pct <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max_area_pct must be in (0, 1], got {}",
                max_area_pct
            )));
        }
        Ok(Self {
            max_area_pct,
            thresholds: NodeThresholds::default(),
        })
    }

    /// Use custom stub thresholds.
    pub fn with_thresholds(mut self, thresholds: NodeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn keep(&self, node: &Node) -> bool {
        node.num_pages() > 1
            || node.bbox().page_coverage() <= self.max_area_pct
            || !node.is_stub(&self.thresholds)
    }
}

impl ProcessingStep for RemoveFullPageStubs {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        Ok(nodes.into_iter().filter(|n| self.keep(n)).collect())
    }

    fn name(&self) -> &'static str {
        "RemoveFullPageStubs"
    }
}

/// Drops nodes with fewer than `min_tokens` tokens.
#[derive(Debug, Clone, Copy)]
pub struct RemoveNodesBelowNTokens {
    min_tokens: usize,
}

impl RemoveNodesBelowNTokens {
    /// Create the step.
    pub fn new(min_tokens: usize) -> Self {
        Self { min_tokens }
    }
}

impl ProcessingStep for RemoveNodesBelowNTokens {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let before = nodes.len();
        let result: Vec<Node> = nodes
            .into_iter()
            .filter(|n| n.tokens() >= self.min_tokens)
            .collect();
        log::debug!(
            "RemoveNodesBelowNTokens({}): dropped {} nodes",
            self.min_tokens,
            before - result.len()
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "RemoveNodesBelowNTokens"
    }
}
