//! Render target — the document that owns the mount element.
//!
//! The session never inspects markup. It hands every render payload to a
//! [`Document`], which replaces the entire inner content of the element with
//! the configured id. Payloads come from a trusted renderer and are applied
//! verbatim, with no sanitization or diffing.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

/// Errors reported by a [`Document`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("could not find mount element '#{0}'")]
    NotFound(String),
}

/// A document with addressable elements whose content can be replaced.
pub trait Document: Send + Sync + 'static {
    /// Replaces the full inner content of the element `element_id` with `markup`.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::NotFound`] when no element has that id; the
    /// document must be left untouched in that case.
    fn replace_content(&self, element_id: &str, markup: &str) -> Result<(), MountError>;
}

/// A thread-safe in-memory document.
///
/// Useful for headless hosts that forward markup elsewhere, and for tests.
///
/// # Examples
///
/// ```
/// use paro::document::{Document, MemoryDocument};
///
/// let doc = MemoryDocument::with_element("app");
/// doc.replace_content("app", "<b>hi</b>").unwrap();
/// assert_eq!(doc.content("app").as_deref(), Some("<b>hi</b>"));
/// assert!(doc.replace_content("missing", "x").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RwLock<HashMap<String, String>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document holding a single empty element.
    pub fn with_element(id: impl Into<String>) -> Self {
        let doc = Self::new();
        doc.insert_element(id, "");
        doc
    }

    /// Adds (or resets) an element with the given initial content.
    pub fn insert_element(&self, id: impl Into<String>, content: impl Into<String>) {
        self.elements.write().insert(id.into(), content.into());
    }

    /// Removes an element, returning its last content.
    pub fn remove_element(&self, id: &str) -> Option<String> {
        self.elements.write().remove(id)
    }

    /// Current content of an element, if it exists.
    pub fn content(&self, id: &str) -> Option<String> {
        self.elements.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.read().contains_key(id)
    }
}

impl Document for MemoryDocument {
    fn replace_content(&self, element_id: &str, markup: &str) -> Result<(), MountError> {
        let mut elements = self.elements.write();
        let slot = elements
            .get_mut(element_id)
            .ok_or_else(|| MountError::NotFound(element_id.to_owned()))?;
        markup.clone_into(slot);
        Ok(())
    }
}
