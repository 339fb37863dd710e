//! Nodes: the unit of consolidated content.
//!
//! A [`Node`] wraps one or more [`Element`]s in page/position order together
//! with a cached bounding box, text and token count. Nodes are created once
//! per extracted element and merged by the pipeline's transforms; they are
//! never split.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Add;

use serde::Serialize;

use crate::elements::{Element, ElementVariant};
use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use crate::text::count_tokens;

/// Token thresholds that classify nodes as stubs or small fragments.
///
/// Defaults follow the values the heuristics were tuned with: nodes below
/// 50 tokens are stubs, nodes below 256 tokens are small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeThresholds {
    /// Nodes with fewer tokens are near-empty stubs
    pub stub_tokens: usize,
    /// Nodes with fewer tokens are candidates for reassembly
    pub small_tokens: usize,
}

impl Default for NodeThresholds {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeThresholds {
    /// Create thresholds with default values.
    pub fn new() -> Self {
        Self {
            stub_tokens: 50,
            small_tokens: 256,
        }
    }

    /// Set the stub threshold.
    pub fn with_stub_tokens(mut self, tokens: usize) -> Self {
        self.stub_tokens = tokens;
        self
    }

    /// Set the small threshold.
    pub fn with_small_tokens(mut self, tokens: usize) -> Self {
        self.small_tokens = tokens;
        self
    }
}

/// An ordered, non-empty group of elements treated as one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    text: String,
    bbox: BoundingBox,
    tokens: usize,
    elements: Vec<Element>,
}

impl Node {
    /// Build a node from elements, validating every bounding box.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyNode`] for an empty element list and
    /// [`Error::InvalidBoundingBox`] when any element's box breaks the
    /// geometry invariants.
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::EmptyNode);
        }
        for element in &elements {
            element.bbox().validate()?;
        }
        Self::from_valid_elements(elements).ok_or(Error::EmptyNode)
    }

    /// Wrap a single element.
    pub fn from_element(element: Element) -> Result<Self> {
        Self::new(vec![element])
    }

    /// Build a node from elements that are already known to be valid.
    ///
    /// Returns `None` for an empty list.
    pub(crate) fn from_valid_elements(elements: Vec<Element>) -> Option<Self> {
        let mut iter = elements.iter();
        let first = iter.next()?;
        let bbox = iter.fold(*first.bbox(), |acc, e| acc.union(e.bbox()));
        let text = elements
            .iter()
            .map(Element::text)
            .collect::<Vec<_>>()
            .join("\n");
        let tokens = count_tokens(&text);
        Some(Self {
            text,
            bbox,
            tokens,
            elements,
        })
    }

    /// Merge `other` into `self`, keeping `self`'s elements first.
    ///
    /// The result's box is the page-aware union of both boxes; when the
    /// operands sit on different pages the merged node is anchored to the
    /// lower page.
    pub fn merge(mut self, other: Node) -> Node {
        self.absorb(other);
        self
    }

    /// In-place form of [`Node::merge`] used by the index-based merge loops.
    pub(crate) fn absorb(&mut self, other: Node) {
        self.bbox = self.bbox.union(&other.bbox);
        self.text.push('\n');
        self.text.push_str(&other.text);
        self.tokens += other.tokens;
        self.elements.extend(other.elements);
    }

    /// Text of all elements joined by newlines.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Union of the element boxes.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Token count of [`Node::text`].
    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Constituent elements in order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Consume the node, returning its elements.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// Page the node is anchored to (the lowest page it spans).
    pub fn page(&self) -> u32 {
        self.bbox.page
    }

    /// Set of element variants present in the node.
    pub fn variant(&self) -> BTreeSet<ElementVariant> {
        self.elements.iter().map(Element::variant).collect()
    }

    /// Whether every element has the given variant.
    pub fn is_only(&self, variant: ElementVariant) -> bool {
        self.elements.iter().all(|e| e.variant() == variant)
    }

    /// Whether any element has the given variant.
    pub fn contains_variant(&self, variant: ElementVariant) -> bool {
        self.elements.iter().any(|e| e.variant() == variant)
    }

    /// Whether the node consists solely of heading text.
    pub fn is_heading(&self) -> bool {
        self.elements.iter().all(Element::is_heading)
    }

    /// Whether the node holds at least one non-heading text element.
    pub fn has_body_text(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.is_text() && !e.is_heading())
    }

    /// Whether the first element is a bullet item.
    pub fn starts_with_bullet(&self) -> bool {
        self.elements
            .first()
            .and_then(Element::as_text)
            .is_some_and(|t| t.is_bullet())
    }

    /// Whether the last element is a bullet item.
    pub fn ends_with_bullet(&self) -> bool {
        self.elements
            .last()
            .and_then(Element::as_text)
            .is_some_and(|t| t.is_bullet())
    }

    /// Whether the last element is a bullet item that has not ended its sentence.
    pub fn ends_with_unterminated_bullet(&self) -> bool {
        self.elements
            .last()
            .and_then(Element::as_text)
            .is_some_and(|t| t.is_unterminated_bullet())
    }

    /// Pages the node's elements sit on.
    pub fn pages(&self) -> BTreeSet<u32> {
        self.elements.iter().map(Element::page).collect()
    }

    /// Number of distinct pages spanned.
    pub fn num_pages(&self) -> usize {
        self.pages().len()
    }

    /// One box per page: the union of the element boxes on that page.
    pub fn page_boxes(&self) -> Vec<BoundingBox> {
        let mut per_page: BTreeMap<u32, BoundingBox> = BTreeMap::new();
        for element in &self.elements {
            let bbox = element.bbox();
            per_page
                .entry(bbox.page)
                .and_modify(|acc| *acc = acc.union(bbox))
                .or_insert(*bbox);
        }
        per_page.into_values().collect()
    }

    /// Whether the node is a near-empty stub.
    pub fn is_stub(&self, thresholds: &NodeThresholds) -> bool {
        self.tokens < thresholds.stub_tokens
    }

    /// Whether the node is small enough to be a reassembly candidate.
    pub fn is_small(&self, thresholds: &NodeThresholds) -> bool {
        self.tokens < thresholds.small_tokens
    }

    /// Position ordering: `(page, y0, x0)` with a total float comparison.
    ///
    /// Equal positions compare `Equal`; stable sorting then keeps the
    /// original extraction order.
    pub fn cmp_position(&self, other: &Node) -> Ordering {
        self.bbox
            .page
            .cmp(&other.bbox.page)
            .then_with(|| self.bbox.y0.total_cmp(&other.bbox.y0))
            .then_with(|| self.bbox.x0.total_cmp(&other.bbox.x0))
    }
}

impl Add for Node {
    type Output = Node;

    fn add(self, rhs: Node) -> Node {
        self.merge(rhs)
    }
}

/// Sort nodes into reading position, stable on ties.
pub fn sort_nodes(nodes: &mut [Node]) {
    nodes.sort_by(Node::cmp_position);
}

/// Wrap each element into a singleton node, in input order.
///
/// # Errors
///
/// Fails fast on the first element with an invalid bounding box.
pub fn nodes_from_elements<I>(elements: I) -> Result<Vec<Node>>
where
    I: IntoIterator<Item = Element>,
{
    elements.into_iter().map(Node::from_element).collect()
}
