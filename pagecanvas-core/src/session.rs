//! Editor session: the live document, its history, selection and save state.
//!
//! Every public mutation on [`EditorSession`] either commits exactly one
//! history snapshot and bumps the revision, or changes nothing.

use crate::document::{Document, PageSettings};
use crate::element::{CreateOptions, Element, ElementId, ElementPatch, ElementType};
use crate::error::{EditError, EditResult};
use crate::geometry::{CanvasSize, Point};
use crate::history::{History, Snapshot};
use crate::store::{ElementStore, HitTarget, ZDirection};

/// Document payload captured for a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Serialized document for the `page_data` field.
    pub page_data: String,
    /// Revision the payload was taken from.
    pub revision: u64,
}

/// State owned by one editing session of one page.
#[derive(Debug, Clone)]
pub struct EditorSession {
    store: ElementStore,
    history: History,
    selection: Option<ElementId>,
    clipboard: Option<Element>,
    canvas: CanvasSize,
    revision: u64,
    saved_revision: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl EditorSession {
    /// Start a session on an empty page.
    #[must_use]
    pub fn new(canvas: CanvasSize) -> Self {
        let store = ElementStore::new();
        let mut history = History::new();
        history.push(Snapshot::capture(store.document()));
        Self {
            store,
            history,
            selection: None,
            clipboard: None,
            canvas,
            revision: 0,
            saved_revision: 0,
        }
    }

    /// Start a session on a loaded document.
    #[must_use]
    pub fn with_document(canvas: CanvasSize, document: Document) -> Self {
        let mut session = Self::new(canvas);
        session.load_document(document);
        session
    }

    /// Replace the live document with a freshly loaded one.
    ///
    /// History restarts from this document and the session is clean.
    pub fn load_document(&mut self, document: Document) {
        self.store.replace(document);
        self.history.clear();
        self.history.push(Snapshot::capture(self.store.document()));
        self.selection = None;
        self.saved_revision = self.revision;
        tracing::debug!("Loaded document with {} elements", self.store.len());
    }

    // --- Queries ---

    /// The element store.
    #[must_use]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// The live document.
    #[must_use]
    pub fn document(&self) -> &Document {
        self.store.document()
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Look up an element.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    /// The selected element id.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    /// The selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selection.and_then(|id| self.store.get(id))
    }

    /// Canvas dimensions used for snapping and centering.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Change the canvas dimensions.
    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    /// Monotonic counter bumped by every commit.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether there are changes not yet confirmed persisted.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// What lies under `p`, checking the selected element's handles first.
    #[must_use]
    pub fn hit_test(&self, p: Point) -> HitTarget {
        self.store.hit_test(p, self.selection)
    }

    // --- Selection ---

    /// Select an element. Unknown ids leave the selection unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] for an unknown id.
    pub fn select(&mut self, id: ElementId) -> EditResult<()> {
        if self.store.get(id).is_none() {
            return Err(EditError::ElementNotFound(id));
        }
        self.selection = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selection = None;
    }

    fn selected_id(&self) -> EditResult<ElementId> {
        self.selection
            .filter(|id| self.store.get(*id).is_some())
            .ok_or(EditError::NoSelection)
    }

    // --- Commit plumbing ---

    /// Record the live document as a new history entry and mark it dirty.
    pub(crate) fn commit(&mut self) {
        self.history.push(Snapshot::capture(self.store.document()));
        self.revision += 1;
    }

    fn commit_if<T>(&mut self, result: EditResult<T>) -> EditResult<T> {
        match result {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("Edit rejected: {e}");
                Err(e)
            }
        }
    }

    pub(crate) fn store_mut(&mut self) -> &mut ElementStore {
        &mut self.store
    }

    // --- Element operations ---

    /// Add a new element.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] for bad options.
    pub fn create_element(
        &mut self,
        element_type: ElementType,
        position: Point,
        options: &CreateOptions,
    ) -> EditResult<ElementId> {
        let result = self.store.create(element_type, position, options);
        self.commit_if(result)
    }

    /// Apply a partial change to an element.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`], [`EditError::Locked`] or
    /// [`EditError::Validation`]; nothing is committed in that case.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> EditResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let result = self.store.update(id, patch);
        self.commit_if(result)
    }

    /// Delete an element, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn remove_element(&mut self, id: ElementId) -> EditResult<Element> {
        let result = self.store.remove(id);
        if result.is_ok() && self.selection == Some(id) {
            self.selection = None;
        }
        self.commit_if(result)
    }

    /// Delete the selected element.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoSelection`] or the errors of [`Self::remove_element`].
    pub fn remove_selected(&mut self) -> EditResult<Element> {
        let id = self.selected_id()?;
        self.remove_element(id)
    }

    /// Move an element one z step. Returns `false` (no commit) at the extreme.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`].
    pub fn reorder(&mut self, id: ElementId, direction: ZDirection) -> EditResult<bool> {
        let moved = self.store.reorder(id, direction)?;
        if moved {
            self.commit();
        }
        Ok(moved)
    }

    /// Flip the lock flag. Allowed on locked elements.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`].
    pub fn toggle_lock(&mut self, id: ElementId) -> EditResult<bool> {
        let locked = !self
            .store
            .get(id)
            .ok_or(EditError::ElementNotFound(id))?
            .locked;
        let patch = ElementPatch {
            locked: Some(locked),
            ..ElementPatch::default()
        };
        self.update_element(id, &patch)?;
        Ok(locked)
    }

    /// Copy the selected element to the session clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoSelection`].
    pub fn copy_selected(&mut self) -> EditResult<()> {
        let element = self.selected_element().cloned().ok_or(EditError::NoSelection)?;
        self.clipboard = Some(element);
        Ok(())
    }

    /// Paste the clipboard as a new element on top and select it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::EmptyClipboard`].
    pub fn paste(&mut self) -> EditResult<ElementId> {
        let source = self.clipboard.clone().ok_or(EditError::EmptyClipboard)?;
        let id = self.store.insert_copy(&source);
        self.selection = Some(id);
        self.commit();
        Ok(id)
    }

    /// Duplicate an element: deep copy, new id, offset, on top, selected.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`].
    pub fn duplicate(&mut self, id: ElementId) -> EditResult<ElementId> {
        let result = self.store.duplicate(id);
        if let Ok(copy) = &result {
            self.selection = Some(*copy);
        }
        self.commit_if(result)
    }

    /// Replace a text element's content.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn set_text(&mut self, id: ElementId, text: &str) -> EditResult<()> {
        self.update_element(id, &ElementPatch::content(text))
    }

    /// Set the text alignment of a text element. Other types are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`].
    pub fn set_text_align(&mut self, id: ElementId, align: &str) -> EditResult<()> {
        let element = self.store.get(id).ok_or(EditError::ElementNotFound(id))?;
        if element.element_type != ElementType::Text {
            return Ok(());
        }
        self.update_element(id, &ElementPatch::style("textAlign", align))
    }

    /// Center an element horizontally on the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn center_horizontally(&mut self, id: ElementId) -> EditResult<()> {
        let element = self.store.get(id).ok_or(EditError::ElementNotFound(id))?;
        let patch = ElementPatch {
            x: Some((self.canvas.width - element.width) / 2.0),
            ..ElementPatch::default()
        };
        self.update_element(id, &patch)
    }

    /// Center an element vertically on the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn center_vertically(&mut self, id: ElementId) -> EditResult<()> {
        let element = self.store.get(id).ok_or(EditError::ElementNotFound(id))?;
        let patch = ElementPatch {
            y: Some((self.canvas.height - element.height) / 2.0),
            ..ElementPatch::default()
        };
        self.update_element(id, &patch)
    }

    /// Replace the page settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] for an insecure background image.
    pub fn set_page_settings(&mut self, settings: PageSettings) -> EditResult<()> {
        let result = self.store.set_page_settings(settings);
        self.commit_if(result)
    }

    /// Set the background color and image; an empty image clears it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] for an insecure background image.
    pub fn set_background(&mut self, color: &str, image: &str) -> EditResult<()> {
        let settings = PageSettings {
            background_color: color.to_string(),
            background_image: image.trim().to_string(),
            ..self.store.page_settings().clone()
        };
        self.set_page_settings(settings)
    }

    // --- History ---

    fn apply_snapshot(&mut self, document: Document) {
        self.store.replace(document);
        self.selection = None;
        self.revision += 1;
    }

    /// Step back one snapshot. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(document) = self.history.undo().map(|s| s.document().clone()) else {
            return false;
        };
        self.apply_snapshot(document);
        true
    }

    /// Step forward one snapshot. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(document) = self.history.redo().map(|s| s.document().clone()) else {
            return false;
        };
        self.apply_snapshot(document);
        true
    }

    // --- Persistence hooks ---

    /// Serialize the live document for saving.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn prepare_save(&self) -> Result<SaveRequest, serde_json::Error> {
        Ok(SaveRequest {
            page_data: self.store.document().to_page_data()?,
            revision: self.revision,
        })
    }

    /// Record that the document at `revision` was persisted.
    ///
    /// The session stays dirty if it was edited after that revision.
    pub fn complete_save(&mut self, revision: u64) {
        if revision > self.saved_revision && revision <= self.revision {
            self.saved_revision = revision;
        }
    }

    /// Unsaved-changes guard for navigation away from the editor.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnsavedChanges`] when dirty and `force` is false.
    pub fn guard_navigation(&self, force: bool) -> EditResult<()> {
        if self.is_dirty() && !force {
            return Err(EditError::UnsavedChanges);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditorSession {
        EditorSession::new(CanvasSize::new(1000.0, 800.0))
    }

    fn text_at(s: &mut EditorSession, x: f64, y: f64) -> ElementId {
        s.create_element(ElementType::Text, Point::new(x, y), &CreateOptions::default())
            .expect("create")
    }

    #[test]
    fn test_new_session_is_clean_with_one_snapshot() {
        let s = session();
        assert!(!s.is_dirty());
        assert_eq!(s.history().len(), 1);
        assert!(s.document().elements.is_empty());
    }

    #[test]
    fn test_create_commits_and_dirties() {
        let mut s = session();
        text_at(&mut s, 10.0, 10.0);
        assert!(s.is_dirty());
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.revision(), 1);
    }

    #[test]
    fn test_rejected_edit_commits_nothing() {
        let mut s = session();
        let id = text_at(&mut s, 10.0, 10.0);
        s.toggle_lock(id).expect("lock");
        let before = s.history().len();
        assert_eq!(s.update_element(id, &ElementPatch::position(1.0, 1.0)), Err(EditError::Locked(id)));
        assert!(s.remove_element(id).is_err());
        assert_eq!(s.history().len(), before);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut s = session();
        let id = text_at(&mut s, 10.0, 10.0);
        s.select(id).expect("select");
        s.remove_element(id).expect("remove");
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn test_undo_redo_restore_documents_and_clear_selection() {
        let mut s = session();
        let id = text_at(&mut s, 10.0, 10.0);
        let after_create = s.document().clone();
        s.update_element(id, &ElementPatch::position(50.0, 60.0)).expect("move");
        let after_move = s.document().clone();
        s.select(id).expect("select");

        assert!(s.undo());
        assert_eq!(s.document(), &after_create);
        assert_eq!(s.selection(), None);
        assert!(s.redo());
        assert_eq!(s.document(), &after_move);
        assert!(!s.redo());
    }

    #[test]
    fn test_undo_then_edit_drops_redo() {
        let mut s = session();
        text_at(&mut s, 10.0, 10.0);
        text_at(&mut s, 20.0, 20.0);
        assert!(s.undo());
        text_at(&mut s, 30.0, 30.0);
        assert!(!s.history().can_redo());
        assert!(!s.redo());
    }

    #[test]
    fn test_copy_paste_selects_offset_copy() {
        let mut s = session();
        let id = text_at(&mut s, 10.0, 10.0);
        assert_eq!(s.paste(), Err(EditError::EmptyClipboard));
        s.select(id).expect("select");
        s.copy_selected().expect("copy");
        let pasted = s.paste().expect("paste");
        assert_eq!(s.selection(), Some(pasted));
        let el = s.element(pasted).expect("pasted");
        assert_eq!((el.x, el.y), (30.0, 30.0));
    }

    #[test]
    fn test_reorder_at_extreme_does_not_commit() {
        let mut s = session();
        let id = text_at(&mut s, 10.0, 10.0);
        let rev = s.revision();
        assert!(!s.reorder(id, ZDirection::Forward).expect("reorder"));
        assert_eq!(s.revision(), rev);
    }

    #[test]
    fn test_save_cycle_respects_later_edits() {
        let mut s = session();
        text_at(&mut s, 10.0, 10.0);
        let request = s.prepare_save().expect("prepare");
        text_at(&mut s, 20.0, 20.0);
        s.complete_save(request.revision);
        assert!(s.is_dirty());

        let request = s.prepare_save().expect("prepare");
        s.complete_save(request.revision);
        assert!(!s.is_dirty());
        assert!(s.guard_navigation(false).is_ok());
    }

    #[test]
    fn test_guard_navigation_blocks_when_dirty() {
        let mut s = session();
        text_at(&mut s, 10.0, 10.0);
        assert_eq!(s.guard_navigation(false), Err(EditError::UnsavedChanges));
        assert!(s.guard_navigation(true).is_ok());
    }

    #[test]
    fn test_center_and_align() {
        let mut s = session();
        let id = text_at(&mut s, 10.0, 10.0);
        s.center_horizontally(id).expect("center h");
        s.center_vertically(id).expect("center v");
        let el = s.element(id).expect("el");
        assert_eq!((el.x, el.y), (400.0, 380.0));

        s.set_text_align(id, "center").expect("align");
        let align = s.element(id).and_then(|e| e.styles.get("textAlign").cloned());
        assert_eq!(align.as_deref(), Some("center"));
    }

    #[test]
    fn test_set_background_validates() {
        let mut s = session();
        assert!(s.set_background("#000000", "http://insecure/bg.png").is_err());
        assert!(!s.is_dirty());
        s.set_background("#000000", "https://cdn.example.com/bg.png").expect("bg");
        assert_eq!(
            s.document().page_settings.background_image(),
            Some("https://cdn.example.com/bg.png")
        );
    }

    #[test]
    fn test_load_document_resets_history_and_counter() {
        let mut s = session();
        text_at(&mut s, 10.0, 10.0);
        let mut doc = Document::empty();
        doc.elements.push(Element::with_defaults(
            ElementId::new(41),
            ElementType::Circle,
            Point::default(),
            0,
            &CreateOptions::default(),
        ));
        s.load_document(doc);
        assert!(!s.is_dirty());
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.store().next_id(), ElementId::new(42));
    }
}
