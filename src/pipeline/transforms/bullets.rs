//! Reassembly of bulleted lists split into fragments.

use crate::elements::{Element, ElementVariant};
use crate::error::Result;
use crate::node::Node;
use crate::text::is_terminated;

use super::ProcessingStep;

/// Merges bullet items with their continuations and sibling items.
///
/// Once a node ends in a bullet item it keeps absorbing the following text
/// nodes while the next one opens a new bullet or the current tail has not
/// finished its sentence. Tables, images and headings end the list. Page
/// boundaries do not: a list item broken by a page break is joined back,
/// and the merged node stays anchored on the first page.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineBullets;

impl CombineBullets {
    /// Create the step.
    pub fn new() -> Self {
        Self
    }

    fn tail_unterminated(node: &Node) -> bool {
        node.elements()
            .last()
            .and_then(Element::as_text)
            .is_some_and(|t| !is_terminated(&t.text))
    }

    fn continues(current: &Node, in_list: bool, next: &Node) -> bool {
        if !(in_list || current.ends_with_bullet()) {
            return false;
        }
        if !next.is_only(ElementVariant::Text) || next.is_heading() {
            return false;
        }
        next.starts_with_bullet() || Self::tail_unterminated(current)
    }
}

impl ProcessingStep for CombineBullets {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let mut result: Vec<Node> = Vec::with_capacity(nodes.len());
        let mut in_list = false;
        let mut merged = 0;

        for node in nodes {
            if let Some(current) = result.last_mut() {
                if Self::continues(current, in_list, &node) {
                    current.absorb(node);
                    in_list = true;
                    merged += 1;
                    continue;
                }
            }
            in_list = false;
            result.push(node);
        }

        if merged > 0 {
            log::debug!("CombineBullets: merged {} list fragments", merged);
        }
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "CombineBullets"
    }
}
