//! Text element types.
//!
//! Text elements are the bulk of extracted content: lines, paragraphs and
//! headings. Heading-like text is ordinary text with the heading flag set.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::text::{is_terminated, starts_with_bullet};

/// A run of extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// The text, possibly multi-line
    pub text: String,
    /// Where the text sits on the page
    pub bbox: BoundingBox,
    /// Whether the extraction engine classified this text as a heading
    #[serde(default)]
    pub is_heading: bool,
}

impl TextElement {
    /// Create a body-text element.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            is_heading: false,
        }
    }

    /// Create a heading element.
    pub fn heading(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self::new(text, bbox).with_heading(true)
    }

    /// Set the heading flag.
    pub fn with_heading(mut self, is_heading: bool) -> Self {
        self.is_heading = is_heading;
        self
    }

    /// Whether the text opens with a bullet or list marker.
    pub fn is_bullet(&self) -> bool {
        starts_with_bullet(&self.text)
    }

    /// Whether this is a bullet item whose last line lacks terminal punctuation.
    ///
    /// Such an item most likely continues in the next fragment.
    pub fn is_unterminated_bullet(&self) -> bool {
        self.is_bullet() && !is_terminated(&self.text)
    }
}
