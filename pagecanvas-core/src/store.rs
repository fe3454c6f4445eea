//! The element store: sole owner of the live document.
//!
//! Every read the view layer needs (draw order, hit testing) goes through
//! [`ElementStore`]; nothing is read back out of rendered output. The store
//! does not know about history or dirty tracking - [`crate::EditorSession`]
//! wraps it and records a snapshot after each successful mutation.

use serde::{Deserialize, Serialize};

use crate::document::{Document, PageSettings};
use crate::element::{CreateOptions, Element, ElementId, ElementPatch, ElementType};
use crate::error::{EditError, EditResult};
use crate::geometry::{Point, ResizeHandle, PASTE_OFFSET};
use crate::validation::{
    validate_finite, validate_icon_name, validate_min_size, validate_secure_url,
};

/// Direction for a one-step z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZDirection {
    /// Toward the viewer.
    Forward,
    /// Away from the viewer.
    Backward,
}

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas.
    Canvas,
    /// The body of an element.
    Body(ElementId),
    /// A resize handle of an element.
    Handle(ElementId, ResizeHandle),
}

/// Ordered collection of elements plus page settings.
#[derive(Debug, Clone)]
pub struct ElementStore {
    document: Document,
    next_id: u64,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    /// Create an empty store. The first id handed out is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: Document::empty(),
            next_id: 1,
        }
    }

    /// Create a store hydrated from a persisted document.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        let mut store = Self::new();
        store.replace(document);
        store
    }

    /// Replace the whole document. The id counter never moves backwards.
    pub fn replace(&mut self, document: Document) {
        let floor = document.max_id().map_or(1, |id| id.get() + 1);
        self.next_id = self.next_id.max(floor);
        self.document = document;
    }

    /// The live document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Page settings of the live document.
    #[must_use]
    pub fn page_settings(&self) -> &PageSettings {
        &self.document.page_settings
    }

    /// The id the next created element will receive.
    #[must_use]
    pub fn next_id(&self) -> ElementId {
        ElementId::new(self.next_id)
    }

    /// Look up an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.document.elements.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ElementId) -> EditResult<&mut Element> {
        self.document
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EditError::ElementNotFound(id))
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.document.elements.iter()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.document.elements.len()
    }

    /// Whether the page has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.elements.is_empty()
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        id
    }

    #[allow(clippy::cast_possible_wrap)] // element counts never approach i64::MAX
    fn count_z(&self) -> i64 {
        self.document.elements.len() as i64
    }

    fn top_z(&self) -> i64 {
        let above_max = self
            .document
            .elements
            .iter()
            .map(|e| e.z_index + 1)
            .max()
            .unwrap_or(0);
        above_max.max(self.count_z())
    }

    /// Add a new element with the defaults for its type, drawn on top.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] if an image URL is not `https://`,
    /// an icon name is blank, or the position is not finite.
    pub fn create(
        &mut self,
        element_type: ElementType,
        position: Point,
        options: &CreateOptions,
    ) -> EditResult<ElementId> {
        validate_finite("x", position.x)?;
        validate_finite("y", position.y)?;
        if let Some(ref url) = options.url {
            validate_secure_url(url)?;
        }
        if let Some(ref name) = options.icon_name {
            validate_icon_name(name)?;
        }

        let id = self.allocate_id();
        let z_index = self.count_z();
        let element = Element::with_defaults(id, element_type, position, z_index, options);
        tracing::debug!("Created {:?} element {id} at z={z_index}", element_type);
        self.document.elements.push(element);
        Ok(id)
    }

    /// Apply a partial change to an element.
    ///
    /// Lock toggling is always allowed; position, size and content changes
    /// are rejected while the element is locked.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`], [`EditError::Locked`], or
    /// [`EditError::Validation`] for bad geometry or an insecure image URL.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> EditResult<()> {
        for (field, value) in [
            ("x", patch.x),
            ("y", patch.y),
            ("width", patch.width),
            ("height", patch.height),
            ("rotation", patch.rotation),
        ] {
            if let Some(v) = value {
                validate_finite(field, v)?;
            }
        }

        let element = self.get_mut(id)?;
        if element.locked && patch.touches_locked_fields() {
            return Err(EditError::Locked(id));
        }
        if let Some(width) = patch.width {
            validate_min_size("width", width)?;
        }
        if let Some(height) = patch.height {
            validate_min_size("height", height)?;
        }
        if element.element_type == ElementType::Image {
            if let Some(ref url) = patch.content {
                validate_secure_url(url)?;
            }
        }
        patch.apply_to(element);
        Ok(())
    }

    /// Move an element without validation or lock checks.
    ///
    /// Used for the intermediate frames of a gesture that already passed the
    /// lock check when it started.
    pub(crate) fn set_bounds_unchecked(&mut self, id: ElementId, rect: crate::Rect) {
        if let Ok(element) = self.get_mut(id) {
            element.x = rect.x;
            element.y = rect.y;
            element.width = rect.width;
            element.height = rect.height;
        }
    }

    /// Delete an element.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn remove(&mut self, id: ElementId) -> EditResult<Element> {
        let index = self
            .document
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(EditError::ElementNotFound(id))?;
        if self.document.elements[index].locked {
            return Err(EditError::Locked(id));
        }
        Ok(self.document.elements.remove(index))
    }

    /// Move an element one z step. Returns `false` if it is already at the
    /// extreme in that direction.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`].
    pub fn reorder(&mut self, id: ElementId, direction: ZDirection) -> EditResult<bool> {
        let zs = self.document.elements.iter().map(|e| e.z_index);
        let (min_z, max_z) = zs.fold((i64::MAX, i64::MIN), |(lo, hi), z| (lo.min(z), hi.max(z)));
        let element = self.get_mut(id)?;
        match direction {
            ZDirection::Forward if element.z_index < max_z => element.z_index += 1,
            ZDirection::Backward if element.z_index > min_z => element.z_index -= 1,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Insert a deep copy of `source` with a fresh id, offset by
    /// [`PASTE_OFFSET`] and placed on top.
    pub fn insert_copy(&mut self, source: &Element) -> ElementId {
        let mut copy = source.clone();
        copy.id = self.allocate_id();
        copy.x += PASTE_OFFSET;
        copy.y += PASTE_OFFSET;
        copy.z_index = self.top_z();
        let id = copy.id;
        self.document.elements.push(copy);
        id
    }

    /// Duplicate an element in place.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`].
    pub fn duplicate(&mut self, id: ElementId) -> EditResult<ElementId> {
        let source = self.get(id).cloned().ok_or(EditError::ElementNotFound(id))?;
        Ok(self.insert_copy(&source))
    }

    /// Replace the page settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] for an insecure background image.
    pub fn set_page_settings(&mut self, settings: PageSettings) -> EditResult<()> {
        settings.validate()?;
        self.document.page_settings = settings;
        Ok(())
    }

    /// Find what lies under `p`.
    ///
    /// Handles of the selected element win over bodies; among bodies the
    /// highest z-index wins. Rotation is ignored.
    #[must_use]
    pub fn hit_test(&self, p: Point, selected: Option<ElementId>) -> HitTarget {
        if let Some(element) = selected.and_then(|id| self.get(id)) {
            if let Some(handle) = element.bounds().handle_at(p) {
                return HitTarget::Handle(element.id, handle);
            }
        }
        self.document
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.bounds().contains(p))
            .max_by_key(|(index, e)| (e.z_index, *index))
            .map_or(HitTarget::Canvas, |(_, e)| HitTarget::Body(e.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MIN_ELEMENT_SIZE;
    use crate::ValidationError;

    fn store_with(types: &[ElementType]) -> (ElementStore, Vec<ElementId>) {
        let mut store = ElementStore::new();
        let ids = types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                #[allow(clippy::cast_precision_loss)]
                let offset = i as f64 * 10.0;
                store
                    .create(*t, Point::new(offset, offset), &CreateOptions::default())
                    .expect("create")
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn test_create_assigns_sequential_ids_and_z() {
        let (store, ids) = store_with(&[ElementType::Text, ElementType::Circle]);
        assert_eq!(ids, vec![ElementId::new(1), ElementId::new(2)]);
        assert_eq!(store.get(ids[1]).map(|e| e.z_index), Some(1));
        assert_eq!(store.next_id(), ElementId::new(3));
    }

    #[test]
    fn test_create_rejects_insecure_image_url() {
        let mut store = ElementStore::new();
        let err = store
            .create(
                ElementType::Image,
                Point::new(0.0, 0.0),
                &CreateOptions {
                    url: Some("http://example.com/cat.png".into()),
                    ..CreateOptions::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, EditError::Validation(ValidationError::InsecureUrl(_))));
        assert!(store.is_empty());
        assert_eq!(store.next_id(), ElementId::new(1));
    }

    #[test]
    fn test_ids_never_reused_after_remove() {
        let (mut store, ids) = store_with(&[ElementType::Text, ElementType::Line]);
        store.remove(ids[1]).expect("remove");
        let id = store
            .create(ElementType::Icon, Point::default(), &CreateOptions::default())
            .expect("create");
        assert_eq!(id, ElementId::new(3));
    }

    #[test]
    fn test_from_document_restores_counter() {
        let (store, _) = store_with(&[ElementType::Text, ElementType::Text, ElementType::Text]);
        let restored = ElementStore::from_document(store.document().clone());
        assert_eq!(restored.next_id(), ElementId::new(4));
    }

    #[test]
    fn test_replace_never_lowers_counter() {
        let (mut store, _) = store_with(&[ElementType::Text, ElementType::Text]);
        store.replace(Document::empty());
        assert_eq!(store.next_id(), ElementId::new(3));
    }

    #[test]
    fn test_locked_rejects_geometry_and_content() {
        let (mut store, ids) = store_with(&[ElementType::Text]);
        let id = ids[0];
        store
            .update(id, &ElementPatch { locked: Some(true), ..ElementPatch::default() })
            .expect("lock");

        assert_eq!(store.update(id, &ElementPatch::position(5.0, 5.0)), Err(EditError::Locked(id)));
        assert_eq!(store.update(id, &ElementPatch::content("new")), Err(EditError::Locked(id)));
        assert_eq!(store.remove(id).map(|e| e.id), Err(EditError::Locked(id)));
        assert!(store.update(id, &ElementPatch::style("color", "#111111")).is_ok());

        store
            .update(id, &ElementPatch { locked: Some(false), ..ElementPatch::default() })
            .expect("unlock");
        assert!(store.update(id, &ElementPatch::position(5.0, 5.0)).is_ok());
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = ElementStore::new();
        let missing = ElementId::new(42);
        assert_eq!(
            store.update(missing, &ElementPatch::position(1.0, 1.0)),
            Err(EditError::ElementNotFound(missing))
        );
    }

    #[test]
    fn test_update_rejects_nan() {
        let (mut store, ids) = store_with(&[ElementType::Rectangle]);
        let err = store.update(ids[0], &ElementPatch::position(f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, EditError::Validation(_)));
    }

    #[test]
    fn test_update_rejects_size_below_minimum() {
        let (mut store, ids) = store_with(&[ElementType::Rectangle]);
        let before = store.get(ids[0]).cloned();
        let patch = ElementPatch {
            width: Some(-50.0),
            height: Some(3.0),
            ..ElementPatch::default()
        };
        assert_eq!(
            store.update(ids[0], &patch),
            Err(EditError::Validation(ValidationError::BelowMinimumSize("width")))
        );
        assert_eq!(store.get(ids[0]).cloned(), before);

        let patch = ElementPatch {
            width: Some(MIN_ELEMENT_SIZE),
            height: Some(MIN_ELEMENT_SIZE),
            ..ElementPatch::default()
        };
        store.update(ids[0], &patch).expect("minimum size");
        assert_eq!(store.get(ids[0]).map(|e| e.width), Some(MIN_ELEMENT_SIZE));
    }

    #[test]
    fn test_reorder_stops_at_extremes() {
        let (mut store, ids) = store_with(&[ElementType::Text, ElementType::Text]);
        assert!(!store.reorder(ids[1], ZDirection::Forward).expect("reorder"));
        assert!(!store.reorder(ids[0], ZDirection::Backward).expect("reorder"));
        assert!(store.reorder(ids[0], ZDirection::Forward).expect("reorder"));
        assert_eq!(store.get(ids[0]).map(|e| e.z_index), Some(1));
    }

    #[test]
    fn test_duplicate_offsets_and_goes_on_top() {
        let (mut store, ids) = store_with(&[ElementType::Rectangle, ElementType::Circle]);
        let copy = store.duplicate(ids[0]).expect("duplicate");
        let original = store.get(ids[0]).cloned().expect("original");
        let dup = store.get(copy).cloned().expect("copy");
        assert_ne!(dup.id, original.id);
        assert_eq!((dup.x, dup.y), (original.x + 20.0, original.y + 20.0));
        assert_eq!(dup.z_index, 2);
        assert_eq!(dup.styles, original.styles);
    }

    #[test]
    fn test_hit_test_prefers_top_and_handles() {
        let mut store = ElementStore::new();
        let below = store
            .create(ElementType::Rectangle, Point::new(0.0, 0.0), &CreateOptions::default())
            .expect("create");
        let above = store
            .create(ElementType::Rectangle, Point::new(50.0, 50.0), &CreateOptions::default())
            .expect("create");

        assert_eq!(store.hit_test(Point::new(60.0, 60.0), None), HitTarget::Body(above));
        assert_eq!(store.hit_test(Point::new(10.0, 10.0), None), HitTarget::Body(below));
        assert_eq!(store.hit_test(Point::new(900.0, 900.0), None), HitTarget::Canvas);
        assert_eq!(
            store.hit_test(Point::new(200.0, 100.0), Some(below)),
            HitTarget::Handle(below, ResizeHandle::Se)
        );
    }

    #[test]
    fn test_set_page_settings_validates() {
        let mut store = ElementStore::new();
        let settings = PageSettings {
            background_image: "ftp://example.com/a.png".into(),
            ..PageSettings::default()
        };
        assert!(store.set_page_settings(settings).is_err());
        assert_eq!(store.page_settings(), &PageSettings::default());
    }
}
