//! Image element types.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// An extracted image region.
///
/// Extraction engines frequently slice large figures into horizontal or
/// vertical bands; each band arrives as its own `ImageElement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    /// Alternative text or caption, empty when unknown
    #[serde(default)]
    pub text: String,
    /// Region where the image is placed
    pub bbox: BoundingBox,
    /// MIME type of `data`, e.g. `image/png`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Base64-encoded image payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ImageElement {
    /// Create an image element without payload or caption.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            text: String::new(),
            bbox,
            mime_type: None,
            data: None,
        }
    }

    /// Set alternative text.
    pub fn with_alt_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attach a base64 payload.
    pub fn with_data(mut self, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self.data = Some(data.into());
        self
    }
}
