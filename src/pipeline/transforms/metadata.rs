//! Removal of page furniture: page numbers, running headers and footers.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::elements::ElementVariant;
use crate::error::{Error, Result};
use crate::node::{Node, NodeThresholds};
use crate::text::{is_page_label, is_page_number, normalize};

use super::ProcessingStep;

/// Drops text nodes that are page numbers or stubs sitting in the page margins.
///
/// A node is in the header band when its box ends within the top
/// `margin_pct` of the page height, and in the footer band when it starts
/// within the bottom `margin_pct`. Decorated labels ("Page 3", "3 of 10")
/// go wherever they are; a bare "12" or "iv" only goes from the bands.
#[derive(Debug, Clone, Copy)]
pub struct RemoveMetadataElements {
    margin_pct: f32,
    thresholds: NodeThresholds,
}

impl Default for RemoveMetadataElements {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoveMetadataElements {
    /// Create the step with 12% header and footer bands.
    pub fn new() -> Self {
        Self {
            margin_pct: 0.12,
            thresholds: NodeThresholds::default(),
        }
    }

    /// Use a custom band height as a fraction of the page height in `[0, 0.5)`.
    pub fn with_margin(mut self, margin_pct: f32) -> Result<Self> {
        if !(0.0..0.5).contains(&margin_pct) {
            return Err(Error::InvalidConfig(format!(
                "margin_pct must be in [0, 0.5), got {}",
                margin_pct
            )));
        }
        self.margin_pct = margin_pct;
        Ok(self)
    }

    /// Use custom stub thresholds.
    pub fn with_thresholds(mut self, thresholds: NodeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn in_margin_band(&self, node: &Node) -> bool {
        if node.num_pages() != 1 {
            return false;
        }
        let bbox = node.bbox();
        let band = self.margin_pct * bbox.page_height;
        bbox.y1 <= band || bbox.y0 >= bbox.page_height - band
    }

    fn is_metadata(&self, node: &Node) -> bool {
        if !node.is_only(ElementVariant::Text) {
            return false;
        }
        let text = node.text();
        if self.in_margin_band(node) {
            is_page_number(text) || node.is_stub(&self.thresholds)
        } else {
            is_page_label(text)
        }
    }
}

impl ProcessingStep for RemoveMetadataElements {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let before = nodes.len();
        let result: Vec<Node> = nodes.into_iter().filter(|n| !self.is_metadata(n)).collect();
        log::debug!(
            "RemoveMetadataElements: dropped {} nodes",
            before - result.len()
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "RemoveMetadataElements"
    }
}

/// Drops nodes whose text repeats on at least `threshold` distinct pages.
///
/// Letterheads, confidentiality notices and running footers that survive
/// the margin filter show up verbatim on many pages. Text is compared after
/// normalization; nodes without text are never removed.
#[derive(Debug, Clone, Copy)]
pub struct RemoveRepeatedElements {
    threshold: usize,
}

impl RemoveRepeatedElements {
    /// Create the step.
    ///
    /// # Errors
    ///
    /// `threshold` must be at least 2: a single occurrence is never a repeat.
    pub fn new(threshold: usize) -> Result<Self> {
        if threshold < 2 {
            return Err(Error::InvalidConfig(format!(
                "repetition threshold must be at least 2, got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }
}

impl ProcessingStep for RemoveRepeatedElements {
    fn process(&self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        let keys: Vec<String> = nodes.iter().map(|n| normalize(n.text())).collect();

        let mut pages_by_text: IndexMap<&str, BTreeSet<u32>> = IndexMap::new();
        for (key, node) in keys.iter().zip(&nodes) {
            if key.is_empty() {
                continue;
            }
            pages_by_text
                .entry(key.as_str())
                .or_default()
                .insert(node.page());
        }

        let repeated: BTreeSet<&str> = pages_by_text
            .iter()
            .filter(|(_, pages)| pages.len() >= self.threshold)
            .map(|(text, _)| *text)
            .collect();
        if repeated.is_empty() {
            return Ok(nodes);
        }
        for text in &repeated {
            log::debug!("RemoveRepeatedElements: dropping repeated text {:?}", text);
        }

        let result = nodes
            .into_iter()
            .zip(&keys)
            .filter(|(_, key)| !repeated.contains(key.as_str()))
            .map(|(node, _)| node)
            .collect();
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "RemoveRepeatedElements"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_page_numbers_removed() {
        let nodes = vec![
            text("Body paragraph with content.", bbox(1, 50.0, 300.0, 500.0, 320.0)),
            text("Page 3 of 10", bbox(1, 250.0, 400.0, 350.0, 410.0)),
            text("- 4 -", bbox(1, 290.0, 420.0, 310.0, 430.0)),
            text("iv", bbox(1, 290.0, 770.0, 310.0, 780.0)),
        ];
        let result = RemoveMetadataElements::new().process(nodes).unwrap();
        assert_eq!(texts(&result), vec!["Body paragraph with content."]);
    }

    #[test]
    fn test_bare_numbers_in_body_kept() {
        let nodes = vec![
            text("I", bbox(1, 50.0, 300.0, 60.0, 310.0)),
            text("2024", bbox(1, 50.0, 320.0, 90.0, 330.0)),
            text("vi", bbox(1, 50.0, 340.0, 60.0, 350.0)),
            text("12", bbox(1, 290.0, 770.0, 310.0, 780.0)),
        ];
        let result = RemoveMetadataElements::new().process(nodes).unwrap();
        assert_eq!(texts(&result), vec!["I", "2024", "vi"]);
    }

    #[test]
    fn test_margin_stubs_removed() {
        let nodes = vec![
            text("ACME Corp", bbox(1, 50.0, 20.0, 200.0, 40.0)),
            text("Confidential", bbox(1, 50.0, 760.0, 200.0, 780.0)),
            text("Short line mid page", bbox(1, 50.0, 400.0, 200.0, 420.0)),
        ];
        let result = RemoveMetadataElements::new().process(nodes).unwrap();
        assert_eq!(texts(&result), vec!["Short line mid page"]);
    }

    #[test]
    fn test_margin_long_text_and_images_kept() {
        let long_text = vec!["word"; 60].join(" ");
        let nodes = vec![
            text(&long_text, bbox(1, 50.0, 10.0, 500.0, 90.0)),
            image(bbox(1, 50.0, 760.0, 200.0, 790.0)),
        ];
        let result = RemoveMetadataElements::new().process(nodes).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_invalid_margin() {
        assert!(RemoveMetadataElements::new().with_margin(0.6).is_err());
        assert!(RemoveMetadataElements::new().with_margin(-0.1).is_err());
        assert!(RemoveMetadataElements::new().with_margin(0.0).is_ok());
    }

    #[test]
    fn test_repeated_across_pages_removed() {
        let nodes = vec![
            text("ACME  Corp Lease", bbox(1, 50.0, 300.0, 200.0, 310.0)),
            text("Unique clause one.", bbox(1, 50.0, 320.0, 200.0, 330.0)),
            text("acme corp lease", bbox(2, 50.0, 300.0, 200.0, 310.0)),
            text("Unique clause two.", bbox(2, 50.0, 320.0, 200.0, 330.0)),
        ];
        let result = RemoveRepeatedElements::new(2).unwrap().process(nodes).unwrap();
        assert_eq!(texts(&result), vec!["Unique clause one.", "Unique clause two."]);
    }

    #[test]
    fn test_repeat_on_same_page_or_below_threshold_kept() {
        let nodes = vec![
            text("Signature", bbox(1, 50.0, 300.0, 200.0, 310.0)),
            text("Signature", bbox(1, 300.0, 300.0, 500.0, 310.0)),
            text("Footer", bbox(1, 50.0, 500.0, 200.0, 510.0)),
            text("Footer", bbox(2, 50.0, 500.0, 200.0, 510.0)),
            image(bbox(1, 0.0, 0.0, 10.0, 10.0)),
            image(bbox(2, 0.0, 0.0, 10.0, 10.0)),
        ];
        let result = RemoveRepeatedElements::new(3).unwrap().process(nodes).unwrap();
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn test_single_node_spanning_pages_is_not_a_repeat() {
        let spanning = text("• The tenant shall return all keys", bbox(1, 50.0, 700.0, 500.0, 720.0))
            .merge(text("on the final day of the lease.", bbox(2, 50.0, 60.0, 500.0, 80.0)));
        assert_eq!(spanning.num_pages(), 2);
        let nodes = vec![spanning, text("Unique clause two.", bbox(2, 50.0, 320.0, 200.0, 330.0))];
        let result = RemoveRepeatedElements::new(2).unwrap().process(nodes).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_threshold_must_be_at_least_two() {
        assert!(RemoveRepeatedElements::new(1).is_err());
        assert!(RemoveRepeatedElements::new(2).is_ok());
    }
}
