//! Extracted content elements.
//!
//! This module provides the closed set of element variants that extraction
//! engines hand to the consolidation pipeline.
//!
//! ## Design
//!
//! The `Element` enum represents every content type a node can hold. Elements
//! are immutable once extracted; nodes only collect and order them, and the
//! transforms pattern-match on the variant rather than inspecting types.
//!
//! ## Example
//!
//! ```
//! use doc_consolidate::elements::{Element, TextElement};
//! use doc_consolidate::geometry::BoundingBox;
//!
//! let bbox = BoundingBox::new(1, 612.0, 792.0, 72.0, 72.0, 300.0, 86.0).unwrap();
//! let element = Element::Text(TextElement::new("Hello, World!", bbox));
//!
//! assert!(element.is_text());
//! assert_eq!(element.text(), "Hello, World!");
//! ```

mod image;
mod table;
mod text;

pub use image::ImageElement;
pub use table::{TableElement, TableFormat};
pub use text::TextElement;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Discriminant of an [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementVariant {
    /// Text run (body or heading)
    Text,
    /// Table region
    Table,
    /// Image region
    Image,
}

impl ElementVariant {
    /// Variant name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ElementVariant::Text => "text",
            ElementVariant::Table => "table",
            ElementVariant::Image => "image",
        }
    }
}

/// A single extracted item anchored to a bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum Element {
    /// Text content, optionally heading-like
    Text(TextElement),
    /// Table content rendered as markdown or HTML
    Table(TableElement),
    /// Image content with optional caption
    Image(ImageElement),
}

impl Element {
    /// Get the bounding box of this element.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            Element::Text(t) => &t.bbox,
            Element::Table(t) => &t.bbox,
            Element::Image(i) => &i.bbox,
        }
    }

    /// Page the element sits on.
    pub fn page(&self) -> u32 {
        self.bbox().page
    }

    /// Get the element's text (table markup, image caption).
    pub fn text(&self) -> &str {
        match self {
            Element::Text(t) => &t.text,
            Element::Table(t) => &t.text,
            Element::Image(i) => &i.text,
        }
    }

    /// Get the variant tag.
    pub fn variant(&self) -> ElementVariant {
        match self {
            Element::Text(_) => ElementVariant::Text,
            Element::Table(_) => ElementVariant::Table,
            Element::Image(_) => ElementVariant::Image,
        }
    }

    /// Check if this is a text element.
    pub fn is_text(&self) -> bool {
        matches!(self, Element::Text(_))
    }

    /// Check if this is a table element.
    pub fn is_table(&self) -> bool {
        matches!(self, Element::Table(_))
    }

    /// Check if this is an image element.
    pub fn is_image(&self) -> bool {
        matches!(self, Element::Image(_))
    }

    /// Check if this is heading-like text.
    pub fn is_heading(&self) -> bool {
        matches!(self, Element::Text(t) if t.is_heading)
    }

    /// Get as text element if this is text.
    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get as table element if this is a table.
    pub fn as_table(&self) -> Option<&TableElement> {
        match self {
            Element::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Get as image element if this is an image.
    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            Element::Image(i) => Some(i),
            _ => None,
        }
    }
}

impl From<TextElement> for Element {
    fn from(value: TextElement) -> Self {
        Element::Text(value)
    }
}

impl From<TableElement> for Element {
    fn from(value: TableElement) -> Self {
        Element::Table(value)
    }
}

impl From<ImageElement> for Element {
    fn from(value: ImageElement) -> Self {
        Element::Image(value)
    }
}
