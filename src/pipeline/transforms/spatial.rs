//! Fixed-point proximity merging.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::node::{sort_nodes, Node, NodeThresholds};

use super::{merge_adjacent, ProcessingStep};

/// Which nodes qualify for a proximity merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialCriteria {
    /// Both nodes are below the "small" token threshold
    #[default]
    BothSmall,
    /// At least one node is below the "stub" token threshold
    EitherStub,
}

impl SpatialCriteria {
    /// Name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            SpatialCriteria::BothSmall => "both_small",
            SpatialCriteria::EitherStub => "either_stub",
        }
    }

    fn accepts(&self, a: &Node, b: &Node, thresholds: &NodeThresholds) -> bool {
        match self {
            SpatialCriteria::BothSmall => a.is_small(thresholds) && b.is_small(thresholds),
            SpatialCriteria::EitherStub => a.is_stub(thresholds) || b.is_stub(thresholds),
        }
    }
}

impl FromStr for SpatialCriteria {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both_small" => Ok(SpatialCriteria::BothSmall),
            "either_stub" => Ok(SpatialCriteria::EitherStub),
            other => Err(Error::InvalidConfig(format!(
                "unknown spatial criteria '{}' (expected both_small or either_stub)",
                other
            ))),
        }
    }
}

impl fmt::Display for SpatialCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Merges adjacent nodes that sit close together on the same page.
///
/// For each adjacent pair in sort order the horizontal and vertical gaps
/// between their same-page boxes are measured; the pair merges when both
/// gaps fall within the error margins and the [`SpatialCriteria`] hold.
/// Merging can create new qualifying adjacencies, so passes repeat (with a
/// re-sort in between) until one performs no merge. Running the step again
/// on its own output is therefore a no-op.
#[derive(Debug, Clone, Copy)]
pub struct CombineNodesSpatially {
    x_error_margin: f32,
    y_error_margin: f32,
    criteria: SpatialCriteria,
    thresholds: NodeThresholds,
}

impl CombineNodesSpatially {
    /// Create the step.
    ///
    /// # Errors
    ///
    /// Margins must be finite and non-negative.
    pub fn new(x_error_margin: f32, y_error_margin: f32, criteria: SpatialCriteria) -> Result<Self> {
        for (axis, margin) in [("x", x_error_margin), ("y", y_error_margin)] {
            if !margin.is_finite() || margin < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{}_error_margin must be a non-negative number, got {}",
                    axis, margin
                )));
            }
        }
        Ok(Self {
            x_error_margin,
            y_error_margin,
            criteria,
            thresholds: NodeThresholds::default(),
        })
    }

    /// Create the step with zero margins: only touching or overlapping boxes merge.
    pub fn touching(criteria: SpatialCriteria) -> Self {
        Self {
            x_error_margin: 0.0,
            y_error_margin: 0.0,
            criteria,
            thresholds: NodeThresholds::default(),
        }
    }

    /// Use custom small/stub thresholds.
    pub fn with_thresholds(mut self, thresholds: NodeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Whether any same-page pair of boxes lies within the margins.
    fn close_enough(&self, a: &Node, b: &Node) -> bool {
        let b_boxes = b.page_boxes();
        a.page_boxes().iter().any(|a_box| {
            b_boxes.iter().any(|b_box| {
                a_box.page == b_box.page
                    && a_box.horizontal_gap(b_box) <= self.x_error_margin
                    && a_box.vertical_gap(b_box) <= self.y_error_margin
            })
        })
    }

    fn should_merge(&self, a: &Node, b: &Node) -> bool {
        self.criteria.accepts(a, b, &self.thresholds) && self.close_enough(a, b)
    }
}

impl ProcessingStep for CombineNodesSpatially {
    fn process(&self, mut nodes: Vec<Node>) -> Result<Vec<Node>> {
        let before = nodes.len();
        let mut passes = 0;
        loop {
            passes += 1;
            sort_nodes(&mut nodes);
            let merges = merge_adjacent(&mut nodes, |a, b| self.should_merge(a, b));
            if merges == 0 {
                break;
            }
        }
        log::debug!(
            "CombineNodesSpatially(x={}, y={}, {}): {} -> {} nodes in {} passes",
            self.x_error_margin,
            self.y_error_margin,
            self.criteria,
            before,
            nodes.len(),
            passes
        );
        Ok(nodes)
    }

    fn name(&self) -> &'static str {
        "CombineNodesSpatially"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_horizontal_gap_within_margin_merges() {
        let nodes = vec![
            text("Lease", bbox(1, 10.0, 100.0, 60.0, 112.0)),
            text("Agreement", bbox(1, 65.0, 100.0, 150.0, 112.0)),
        ];
        let step = CombineNodesSpatially::new(10.0, 0.0, SpatialCriteria::BothSmall).unwrap();
        let result = step.process(nodes).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text(), "Lease\nAgreement");
        let b = result[0].bbox();
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (10.0, 100.0, 150.0, 112.0));
    }

    #[test]
    fn test_gap_beyond_margin_kept() {
        let nodes = vec![
            text("left", bbox(1, 10.0, 100.0, 60.0, 112.0)),
            text("right", bbox(1, 80.0, 100.0, 150.0, 112.0)),
        ];
        let step = CombineNodesSpatially::new(10.0, 0.0, SpatialCriteria::BothSmall).unwrap();
        assert_eq!(step.process(nodes).unwrap().len(), 2);
    }

    #[test]
    fn test_criteria_blocks_large_nodes() {
        let long_text = vec!["word"; 300].join(" ");
        let nodes = vec![
            text(&long_text, bbox(1, 10.0, 100.0, 300.0, 300.0)),
            text("tail", bbox(1, 10.0, 302.0, 300.0, 312.0)),
        ];
        let both_small = CombineNodesSpatially::new(0.0, 5.0, SpatialCriteria::BothSmall).unwrap();
        assert_eq!(both_small.process(nodes.clone()).unwrap().len(), 2);

        let either_stub = CombineNodesSpatially::new(0.0, 5.0, SpatialCriteria::EitherStub).unwrap();
        assert_eq!(either_stub.process(nodes).unwrap().len(), 1);
    }

    #[test]
    fn test_different_pages_never_merge() {
        let nodes = vec![
            text("a", bbox(1, 10.0, 780.0, 60.0, 790.0)),
            text("b", bbox(2, 10.0, 780.0, 60.0, 790.0)),
        ];
        let step = CombineNodesSpatially::new(100.0, 100.0, SpatialCriteria::EitherStub).unwrap();
        assert_eq!(step.process(nodes).unwrap().len(), 2);
    }

    #[test]
    fn test_chain_collapses_and_second_run_is_noop() {
        let nodes: Vec<Node> = (0..6)
            .map(|i| {
                let y = 100.0 + i as f32 * 14.0;
                text(&format!("line {}", i), bbox(1, 10.0, y, 200.0, y + 12.0))
            })
            .collect();
        let step = CombineNodesSpatially::new(0.0, 4.0, SpatialCriteria::BothSmall).unwrap();
        let once = step.process(nodes).unwrap();
        assert_eq!(once.len(), 1);
        let twice = step.process(once.clone()).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_criteria_parsing() {
        assert_eq!("both_small".parse::<SpatialCriteria>().unwrap(), SpatialCriteria::BothSmall);
        assert_eq!(" EITHER_STUB ".parse::<SpatialCriteria>().unwrap(), SpatialCriteria::EitherStub);
        assert!("neither".parse::<SpatialCriteria>().is_err());
    }

    #[test]
    fn test_negative_margin_rejected() {
        assert!(CombineNodesSpatially::new(-1.0, 0.0, SpatialCriteria::BothSmall).is_err());
        assert!(CombineNodesSpatially::new(0.0, f32::INFINITY, SpatialCriteria::BothSmall).is_err());
    }
}
