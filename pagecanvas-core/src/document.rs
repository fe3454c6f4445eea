//! Persisted page representation: elements plus page-level settings.
//!
//! The remote store keeps a document as a JSON string in `page_data`:
//!
//! ```text
//! { "elements": [ {id, type, x, y, width, height, rotation, zIndex, locked, content, styles}, ... ],
//!   "pageSettings": {backgroundColor, backgroundImage, backgroundSize, backgroundPosition} }
//! ```

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId};
use crate::error::ContentError;
use crate::validation::{validate_secure_url, ValidationError};

/// Page background and sizing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSettings {
    /// CSS background color.
    pub background_color: String,
    /// Background image URL; empty means no image.
    pub background_image: String,
    /// CSS `background-size` mode.
    pub background_size: String,
    /// CSS `background-position`.
    pub background_position: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            background_image: String::new(),
            background_size: "cover".to_string(),
            background_position: "center".to_string(),
        }
    }
}

impl PageSettings {
    /// The background image, if one is set.
    #[must_use]
    pub fn background_image(&self) -> Option<&str> {
        Some(self.background_image.as_str()).filter(|s| !s.is_empty())
    }

    /// Check that any background image uses secure transport.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InsecureUrl`] for a non-`https://` image.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.background_image() {
            Some(url) => validate_secure_url(url),
            None => Ok(()),
        }
    }
}

/// All elements on a page plus its settings. The unit of save, load and undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Elements in insertion order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Page-level settings.
    #[serde(default)]
    pub page_settings: PageSettings,
}

impl Document {
    /// An empty page with default settings.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode a stored `page_data` string.
    ///
    /// An empty string decodes to an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::LegacyBlockFormat`] for block-list content and
    /// [`ContentError::Malformed`] for anything else that is not a document.
    pub fn from_page_data(page_data: &str) -> Result<Self, ContentError> {
        if page_data.trim().is_empty() {
            return Ok(Self::empty());
        }
        let value: serde_json::Value = serde_json::from_str(page_data)?;
        if value.get("elements").is_none() && value.get("blocks").is_some() {
            return Err(ContentError::LegacyBlockFormat);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decode stored content, substituting an empty document when it is
    /// unreadable.
    ///
    /// The error is returned alongside so the host can warn the user.
    #[must_use]
    pub fn from_page_data_or_empty(page_data: &str) -> (Self, Option<ContentError>) {
        match Self::from_page_data(page_data) {
            Ok(document) => (document, None),
            Err(e) => {
                tracing::warn!("Stored content is unreadable, starting from an empty page: {e}");
                (Self::empty(), Some(e))
            }
        }
    }

    /// Encode as a `page_data` string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_page_data(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Highest element id in the document.
    #[must_use]
    pub fn max_id(&self) -> Option<ElementId> {
        self.elements.iter().map(|e| e.id).max()
    }

    /// Elements sorted by stacking order (ties keep insertion order).
    #[must_use]
    pub fn draw_order(&self) -> Vec<&Element> {
        let mut elements: Vec<&Element> = self.elements.iter().collect();
        elements.sort_by_key(|e| e.z_index);
        elements
    }

    /// Check every user-supplied URL in the document.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.page_settings.validate()?;
        for element in &self.elements {
            if element.element_type == crate::ElementType::Image && !element.is_placeholder() {
                if let Some(ref url) = element.content {
                    validate_secure_url(url)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CreateOptions, ElementType, Point};

    fn sample() -> Document {
        let mut doc = Document::empty();
        doc.elements.push(Element::with_defaults(
            ElementId::new(3),
            ElementType::Text,
            Point::new(5.0, 5.0),
            1,
            &CreateOptions::default(),
        ));
        doc.elements.push(Element::with_defaults(
            ElementId::new(9),
            ElementType::Rectangle,
            Point::new(0.0, 0.0),
            0,
            &CreateOptions::default(),
        ));
        doc
    }

    #[test]
    fn test_page_data_roundtrip_preserves_document() {
        let doc = sample();
        let json = doc.to_page_data().expect("encode");
        assert!(json.contains("\"pageSettings\""));
        assert!(json.contains("\"backgroundColor\":\"#ffffff\""));
        let back = Document::from_page_data(&json).expect("decode");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_empty_page_data_is_empty_document() {
        assert_eq!(Document::from_page_data("").expect("empty"), Document::empty());
        assert_eq!(Document::from_page_data("{}").expect("{}"), Document::empty());
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = Document::from_page_data("not json").unwrap_err();
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[test]
    fn test_block_format_is_legacy() {
        let err = Document::from_page_data(r#"{"blocks":[{"type":"heading","text":"Hi"}]}"#)
            .unwrap_err();
        assert!(matches!(err, ContentError::LegacyBlockFormat));
    }

    #[test]
    fn test_unreadable_content_recovers_to_empty_page() {
        let (doc, err) = Document::from_page_data_or_empty("not json");
        assert_eq!(doc, Document::empty());
        assert!(matches!(err, Some(ContentError::Malformed(_))));

        let (doc, err) = Document::from_page_data_or_empty(r#"{"blocks":[]}"#);
        assert_eq!(doc, Document::empty());
        assert!(matches!(err, Some(ContentError::LegacyBlockFormat)));

        let stored = sample().to_page_data().expect("encode");
        let (doc, err) = Document::from_page_data_or_empty(&stored);
        assert_eq!(doc, sample());
        assert!(err.is_none());
    }

    #[test]
    fn test_partial_page_settings_use_defaults() {
        let doc = Document::from_page_data(
            r##"{"elements":[],"pageSettings":{"backgroundColor":"#000000"}}"##,
        )
        .expect("decode");
        assert_eq!(doc.page_settings.background_color, "#000000");
        assert_eq!(doc.page_settings.background_size, "cover");
        assert!(doc.page_settings.background_image().is_none());
    }

    #[test]
    fn test_max_id_and_draw_order() {
        let doc = sample();
        assert_eq!(doc.max_id(), Some(ElementId::new(9)));
        let order: Vec<u64> = doc.draw_order().iter().map(|e| e.id.get()).collect();
        assert_eq!(order, vec![9, 3]);
    }

    #[test]
    fn test_validate_rejects_insecure_background() {
        let mut doc = Document::empty();
        doc.page_settings.background_image = "http://example.com/bg.png".into();
        assert!(doc.validate().is_err());
        doc.page_settings.background_image = "https://example.com/bg.png".into();
        assert!(doc.validate().is_ok());
    }
}
