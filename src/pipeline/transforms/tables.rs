//! Removal of text that table extraction already covers.

use std::collections::BTreeMap;

use crate::elements::Element;
use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::node::Node;

use super::ProcessingStep;

/// Drops text elements lying fully inside a table region on the same page.
///
/// Text and table extraction run independently, so the words of a table show
/// up twice: once as raw text runs and once in the table's markup. Nodes that
/// lose every element are dropped; nodes that lose some are rebuilt from the
/// rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveTextInsideTables;

impl RemoveTextInsideTables {
    /// Create the step.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingStep for RemoveTextInsideTables {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let mut tables: BTreeMap<u32, Vec<BoundingBox>> = BTreeMap::new();
        for element in nodes.iter().flat_map(Node::elements) {
            if let Element::Table(table) = element {
                tables.entry(table.bbox.page).or_default().push(table.bbox);
            }
        }
        if tables.is_empty() {
            return Ok(nodes);
        }

        let inside_table = |element: &Element| {
            element.is_text()
                && tables
                    .get(&element.page())
                    .is_some_and(|boxes| boxes.iter().any(|t| t.contains(element.bbox())))
        };

        let before = nodes.len();
        let mut result = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !node.elements().iter().any(|e| inside_table(e)) {
                result.push(node);
                continue;
            }
            let kept: Vec<Element> = node
                .into_elements()
                .into_iter()
                .filter(|e| !inside_table(e))
                .collect();
            if let Some(rebuilt) = Node::from_valid_elements(kept) {
                result.push(rebuilt);
            }
        }

        log::debug!(
            "RemoveTextInsideTables: {} -> {} nodes",
            before,
            result.len()
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "RemoveTextInsideTables"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::elements::TextElement;

    #[test]
    fn test_text_inside_table_removed() {
        let nodes = vec![
            table("| a | b |", bbox(1, 0.0, 0.0, 100.0, 100.0)),
            text("a b", bbox(1, 10.0, 10.0, 90.0, 20.0)),
        ];
        let result = RemoveTextInsideTables.process(nodes).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text(), "| a | b |");
    }

    #[test]
    fn test_text_on_other_page_or_overlapping_kept() {
        let nodes = vec![
            table("| a |", bbox(1, 0.0, 0.0, 100.0, 100.0)),
            text("other page", bbox(2, 10.0, 10.0, 90.0, 20.0)),
            text("straddles", bbox(1, 50.0, 90.0, 150.0, 110.0)),
        ];
        let result = RemoveTextInsideTables.process(nodes).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_partial_node_rebuilt() {
        let mixed = Node::new(vec![
            TextElement::new("inside", bbox(1, 10.0, 10.0, 50.0, 20.0)).into(),
            TextElement::new("outside", bbox(1, 10.0, 120.0, 50.0, 130.0)).into(),
        ])
        .unwrap();
        let nodes = vec![table("| t |", bbox(1, 0.0, 0.0, 100.0, 100.0)), mixed];
        let result = RemoveTextInsideTables.process(nodes).unwrap();
        assert_eq!(texts(&result), vec!["| t |", "outside"]);
        assert_eq!(result[1].bbox().y0, 120.0);
        assert_eq!(result[1].tokens(), 1);
    }

    #[test]
    fn test_no_tables_is_identity() {
        let nodes = vec![text("alpha", bbox(1, 0.0, 0.0, 10.0, 10.0))];
        let result = RemoveTextInsideTables.process(nodes.clone()).unwrap();
        assert_eq!(result, nodes);
    }
}
