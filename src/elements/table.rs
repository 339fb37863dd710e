//! Table element types.
//!
//! Table structure recognition happens upstream; by the time a table reaches
//! this crate it is a rendered markdown or HTML string plus its region.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Rendering of a table's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// GitHub-flavoured markdown table
    #[default]
    Markdown,
    /// HTML `<table>` markup
    Html,
}

/// A detected table region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableElement {
    /// Rendered table contents
    pub text: String,
    /// Region occupied by the table
    pub bbox: BoundingBox,
    /// How `text` is rendered
    #[serde(default)]
    pub format: TableFormat,
}

impl TableElement {
    /// Create a markdown table element.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            format: TableFormat::Markdown,
        }
    }

    /// Set the rendering format.
    pub fn with_format(mut self, format: TableFormat) -> Self {
        self.format = format;
        self
    }
}
