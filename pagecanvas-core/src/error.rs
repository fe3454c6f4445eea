//! Error types for editor operations.

use thiserror::Error;

use crate::element::ElementId;
use crate::validation::ValidationError;

/// Result type for editor operations.
pub type EditResult<T> = Result<T, EditError>;

/// Errors that can occur when mutating the live document.
#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    /// No element with this id exists in the document.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// The element is locked against the requested change.
    #[error("Element {0} is locked")]
    Locked(ElementId),

    /// The operation needs a selected element and none is selected.
    #[error("No element selected")]
    NoSelection,

    /// Paste was requested before anything was copied.
    #[error("Clipboard is empty")]
    EmptyClipboard,

    /// Input was rejected at the point of entry.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Navigation was attempted while the document has unsaved changes.
    #[error("You have unsaved changes")]
    UnsavedChanges,
}

/// Errors raised while decoding persisted page content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The stored `page_data` is not a valid document.
    #[error("Malformed page content: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The stored content uses the block-list layout, which this editor does not read.
    #[error("Page content uses the legacy block format")]
    LegacyBlockFormat,
}
