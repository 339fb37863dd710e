//! Reassembly of images that extraction engines slice into bands.

use std::collections::HashMap;

use crate::elements::ElementVariant;
use crate::error::{Error, Result};
use crate::node::{sort_nodes, Node};

use super::ProcessingStep;

/// Merges image-only nodes on the same page whose boxes touch.
///
/// Two boxes touch when they are stacked vertically with overlapping
/// x-ranges and a vertical gap of at most `epsilon`, or placed side by side
/// with overlapping y-ranges and a horizontal gap of at most `epsilon`.
/// Applied until no further pair merges.
#[derive(Debug, Clone, Copy)]
pub struct CombineSlicedImages {
    epsilon: f32,
}

impl Default for CombineSlicedImages {
    fn default() -> Self {
        Self::new()
    }
}

impl CombineSlicedImages {
    /// Create the step with a 1pt contact tolerance.
    pub fn new() -> Self {
        Self { epsilon: 1.0 }
    }

    /// Create the step with a custom contact tolerance.
    pub fn with_epsilon(epsilon: f32) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "image contact tolerance must be a non-negative number, got {}",
                epsilon
            )));
        }
        Ok(Self { epsilon })
    }

    fn is_slice(node: &Node) -> bool {
        node.is_only(ElementVariant::Image) && node.num_pages() == 1
    }

    fn touching(&self, a: &Node, b: &Node) -> bool {
        let (a, b) = (a.bbox(), b.bbox());
        if a.page != b.page {
            return false;
        }
        let h_gap = a.horizontal_gap(b);
        let v_gap = a.vertical_gap(b);
        (v_gap <= self.epsilon && h_gap <= 0.0) || (h_gap <= self.epsilon && v_gap <= 0.0)
    }

    /// One pass: each image slice is compared with the last image kept on its page.
    fn pass(&self, nodes: Vec<Node>) -> (Vec<Node>, usize) {
        let mut result: Vec<Node> = Vec::with_capacity(nodes.len());
        let mut last_image: HashMap<u32, usize> = HashMap::new();
        let mut merges = 0;

        for node in nodes {
            if !Self::is_slice(&node) {
                result.push(node);
                continue;
            }
            let page = node.page();
            if let Some(&idx) = last_image.get(&page) {
                if self.touching(&result[idx], &node) {
                    result[idx].absorb(node);
                    merges += 1;
                    continue;
                }
            }
            last_image.insert(page, result.len());
            result.push(node);
        }
        (result, merges)
    }
}

impl ProcessingStep for CombineSlicedImages {
    fn process(&self, mut nodes: Vec<Node>) -> Result<Vec<Node>> {
        let mut total = 0;
        loop {
            sort_nodes(&mut nodes);
            let (next, merges) = self.pass(nodes);
            nodes = next;
            total += merges;
            if merges == 0 {
                break;
            }
        }
        if total > 0 {
            log::debug!("CombineSlicedImages: stitched {} image slices", total);
        }
        Ok(nodes)
    }

    fn name(&self) -> &'static str {
        "CombineSlicedImages"
    }
}
