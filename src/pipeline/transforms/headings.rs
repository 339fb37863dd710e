//! Attaching headings to the text they introduce.

use crate::error::Result;
use crate::node::Node;

use super::ProcessingStep;

/// Merges each heading-only node with the closest following body text.
///
/// Candidates are the not-yet-consumed nodes after the heading on the same
/// page that contain body text; the one with the smallest vertical gap wins,
/// the earliest on ties. The search stops at the next heading, so a heading
/// never reaches past a sibling section. Single pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineHeadingsWithClosestText;

impl CombineHeadingsWithClosestText {
    /// Create the step.
    pub fn new() -> Self {
        Self
    }

    fn closest_body(slots: &[Option<Node>], i: usize, heading: &Node) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (j, slot) in slots.iter().enumerate().skip(i + 1) {
            let Some(candidate) = slot else { continue };
            if candidate.page() != heading.page() || candidate.is_heading() {
                break;
            }
            if !candidate.has_body_text() {
                continue;
            }
            let gap = heading.bbox().vertical_gap(candidate.bbox());
            if best.map_or(true, |(_, g)| gap < g) {
                best = Some((j, gap));
            }
        }
        best.map(|(j, _)| j)
    }
}

impl ProcessingStep for CombineHeadingsWithClosestText {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
        let mut merged = 0;

        for i in 0..slots.len() {
            let target = match &slots[i] {
                Some(node) if node.is_heading() => Self::closest_body(&slots, i, node),
                _ => None,
            };
            if let Some(j) = target {
                if let (Some(body), Some(heading)) = (slots[j].take(), slots[i].as_mut()) {
                    heading.absorb(body);
                    merged += 1;
                }
            }
        }

        if merged > 0 {
            log::debug!("CombineHeadingsWithClosestText: attached {} headings", merged);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    fn name(&self) -> &'static str {
        "CombineHeadingsWithClosestText"
    }
}
