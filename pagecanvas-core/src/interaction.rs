//! Interaction controller: turns pointer and keyboard input into committed edits.
//!
//! ```text
//!            pointer-down (body)          pointer-up
//!   Idle ─────────────────────────▶ Dragging ─────────▶ Idle  (one commit)
//!     │      pointer-down (handle)          pointer-up
//!     ├───────────────────────────▶ Resizing ─────────▶ Idle  (one commit)
//!     │      double-click (text)         blur / Enter
//!     └───────────────────────────▶ EditingText ──────▶ Idle  (one commit)
//! ```
//!
//! Intermediate pointer moves update the live document directly and never
//! touch history; the snapshot is taken when the gesture ends.

use serde::Serialize;

use crate::element::{ElementId, ElementType};
use crate::error::{EditError, EditResult};
use crate::event::{InputEvent, KeyInput, Shortcut};
use crate::geometry::{clamp_to_page, resize, snap_to_guides, Point, Rect, ResizeHandle, SNAP_THRESHOLD};
use crate::session::EditorSession;
use crate::store::HitTarget;

/// What the view layer should do after an input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Nothing changed.
    None,
    /// Transient state changed (selection, gesture frame); re-render.
    Render,
    /// The document changed and a history entry was recorded.
    Committed,
    /// Show an in-place text editor for this element.
    #[serde(rename_all = "camelCase")]
    BeginTextEdit {
        /// Element being edited.
        id: ElementId,
        /// Text to seed the editor with.
        text: String,
    },
}

/// The gesture in progress. Never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Waiting for input.
    #[default]
    Idle,
    /// Moving an element.
    Dragging {
        /// Element being moved.
        id: ElementId,
        /// Pointer position at pointer-down.
        origin: Point,
        /// Element bounds at pointer-down.
        start: Rect,
    },
    /// Resizing an element from one of its handles.
    Resizing {
        /// Element being resized.
        id: ElementId,
        /// Handle being dragged.
        handle: ResizeHandle,
        /// Pointer position at pointer-down.
        origin: Point,
        /// Element bounds at pointer-down.
        start: Rect,
    },
    /// Editing a text element in place.
    EditingText {
        /// Element being edited.
        id: ElementId,
        /// Current editor contents.
        buffer: String,
    },
}

/// Drives an [`EditorSession`] from raw input.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    session: EditorSession,
    gesture: Gesture,
    snap_enabled: bool,
}

impl InteractionController {
    /// Take ownership of a session.
    #[must_use]
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            gesture: Gesture::Idle,
            snap_enabled: false,
        }
    }

    /// The controlled session.
    #[must_use]
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Mutable access for toolbar-style operations that bypass pointer input.
    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    /// Give the session back.
    #[must_use]
    pub fn into_session(self) -> EditorSession {
        self.session
    }

    /// The gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether an in-place text edit is open.
    #[must_use]
    pub fn is_editing_text(&self) -> bool {
        matches!(self.gesture, Gesture::EditingText { .. })
    }

    /// Turn snap-to-guides on or off for drags.
    pub fn set_snap(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    /// Whether drags snap to guides.
    #[must_use]
    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    /// Dispatch a host event.
    pub fn handle_event(&mut self, event: &InputEvent) -> Action {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::PointerCancel => self.pointer_cancel(),
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y)),
            InputEvent::Key(key) => self.key_down(key),
            InputEvent::TextInput { text } => self.text_input(text),
            InputEvent::Blur => self.blur(),
        }
    }

    // --- Pointer ---

    /// Primary button pressed at `p`.
    pub fn pointer_down(&mut self, p: Point) -> Action {
        if self.is_editing_text() {
            self.commit_text_edit();
        }
        match self.session.hit_test(p) {
            HitTarget::Canvas => {
                self.session.deselect();
                Action::Render
            }
            HitTarget::Handle(id, handle) => match self.begin_resize(id, handle, p) {
                Ok(()) => Action::Render,
                Err(_) => Action::None,
            },
            HitTarget::Body(id) => {
                if self.begin_drag(id, p).is_err() {
                    // locked elements stay selectable so they can be unlocked
                    let _ = self.session.select(id);
                }
                Action::Render
            }
        }
    }

    /// Start moving `id` with the pointer at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn begin_drag(&mut self, id: ElementId, origin: Point) -> EditResult<()> {
        let start = self.unlocked_bounds(id)?;
        self.session.select(id)?;
        self.gesture = Gesture::Dragging { id, origin, start };
        Ok(())
    }

    /// Start resizing `id` from `handle` with the pointer at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn begin_resize(
        &mut self,
        id: ElementId,
        handle: ResizeHandle,
        origin: Point,
    ) -> EditResult<()> {
        let start = self.unlocked_bounds(id)?;
        self.session.select(id)?;
        self.gesture = Gesture::Resizing {
            id,
            handle,
            origin,
            start,
        };
        Ok(())
    }

    fn unlocked_bounds(&self, id: ElementId) -> EditResult<Rect> {
        let element = self.session.element(id).ok_or(EditError::ElementNotFound(id))?;
        if element.locked {
            return Err(EditError::Locked(id));
        }
        Ok(element.bounds())
    }

    /// Pointer moved to `p`.
    pub fn pointer_move(&mut self, p: Point) -> Action {
        match self.gesture {
            Gesture::Dragging { id, origin, start } => {
                let (dx, dy) = p.delta_from(origin);
                let mut candidate = Point::new(start.x + dx, start.y + dy);
                if self.snap_enabled {
                    candidate = snap_to_guides(
                        candidate,
                        start.width,
                        start.height,
                        self.session.canvas(),
                        SNAP_THRESHOLD,
                    );
                }
                let pos = clamp_to_page(candidate);
                let rect = Rect::new(pos.x, pos.y, start.width, start.height);
                self.session.store_mut().set_bounds_unchecked(id, rect);
                Action::Render
            }
            Gesture::Resizing {
                id,
                handle,
                origin,
                start,
            } => {
                let (dx, dy) = p.delta_from(origin);
                self.session
                    .store_mut()
                    .set_bounds_unchecked(id, resize(start, handle, dx, dy));
                Action::Render
            }
            Gesture::Idle | Gesture::EditingText { .. } => Action::None,
        }
    }

    /// Primary button released: commits a drag or resize.
    pub fn pointer_up(&mut self) -> Action {
        let id = match self.gesture {
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => id,
            Gesture::Idle | Gesture::EditingText { .. } => return Action::None,
        };
        self.gesture = Gesture::Idle;
        if self.session.element(id).is_none() {
            return Action::Render;
        }
        self.session.commit();
        tracing::debug!("Committed gesture on element {id}");
        Action::Committed
    }

    /// Gesture interrupted: restore the starting geometry without committing.
    pub fn pointer_cancel(&mut self) -> Action {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { id, start, .. } | Gesture::Resizing { id, start, .. } => {
                self.session.store_mut().set_bounds_unchecked(id, start);
                Action::Render
            }
            other => {
                self.gesture = other;
                Action::None
            }
        }
    }

    // --- Text editing ---

    /// Double click at `p`: opens the text editor on an unlocked text element.
    pub fn double_click(&mut self, p: Point) -> Action {
        match self.session.hit_test(p) {
            HitTarget::Body(id) => self.begin_text_edit(id).unwrap_or(Action::None),
            HitTarget::Canvas | HitTarget::Handle(..) => Action::None,
        }
    }

    /// Open the in-place editor on a text element.
    ///
    /// Non-text elements are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ElementNotFound`] or [`EditError::Locked`].
    pub fn begin_text_edit(&mut self, id: ElementId) -> EditResult<Action> {
        let element = self.session.element(id).ok_or(EditError::ElementNotFound(id))?;
        if element.element_type != ElementType::Text {
            return Ok(Action::None);
        }
        if element.locked {
            return Err(EditError::Locked(id));
        }
        let text = element.content.clone().unwrap_or_default();
        self.session.select(id)?;
        self.gesture = Gesture::EditingText {
            id,
            buffer: text.clone(),
        };
        Ok(Action::BeginTextEdit { id, text })
    }

    /// The editor's text changed.
    pub fn text_input(&mut self, text: &str) -> Action {
        if let Gesture::EditingText { buffer, .. } = &mut self.gesture {
            text.clone_into(buffer);
        }
        Action::None
    }

    /// The editor lost focus: commit its text.
    pub fn blur(&mut self) -> Action {
        self.commit_text_edit()
    }

    /// Close the text editor and commit its buffer as one history entry.
    pub fn commit_text_edit(&mut self) -> Action {
        let Gesture::EditingText { id, buffer } = std::mem::take(&mut self.gesture) else {
            return Action::None;
        };
        match self.session.set_text(id, &buffer) {
            Ok(()) => Action::Committed,
            Err(e) => {
                tracing::debug!("Text edit on {id} dropped: {e}");
                Action::Render
            }
        }
    }

    // --- Keyboard ---

    /// Key pressed.
    ///
    /// While a text edit is open only Enter (without Shift) is handled; it
    /// commits the edit. Shortcuts are ignored during a drag or resize.
    pub fn key_down(&mut self, key: &KeyInput) -> Action {
        match self.gesture {
            Gesture::EditingText { .. } => {
                if key.is_commit_enter() {
                    return self.commit_text_edit();
                }
                return Action::None;
            }
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => return Action::None,
            Gesture::Idle => {}
        }
        match key.shortcut() {
            Some(shortcut) => self.run_shortcut(shortcut),
            None => Action::None,
        }
    }

    fn run_shortcut(&mut self, shortcut: Shortcut) -> Action {
        let committed = |ok: bool| if ok { Action::Committed } else { Action::None };
        match shortcut {
            Shortcut::Delete => committed(self.session.remove_selected().is_ok()),
            Shortcut::Deselect => {
                self.session.deselect();
                Action::Render
            }
            Shortcut::Copy => {
                let _ = self.session.copy_selected();
                Action::None
            }
            Shortcut::Paste => committed(self.session.paste().is_ok()),
            Shortcut::Duplicate => match self.session.selection() {
                Some(id) => committed(self.session.duplicate(id).is_ok()),
                None => Action::None,
            },
            Shortcut::Undo => committed(self.session.undo()),
            Shortcut::Redo => committed(self.session.redo()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::CreateOptions;
    use crate::geometry::{CanvasSize, MIN_ELEMENT_SIZE};

    fn controller() -> InteractionController {
        InteractionController::new(EditorSession::new(CanvasSize::new(1000.0, 800.0)))
    }

    fn add(c: &mut InteractionController, t: ElementType, x: f64, y: f64) -> ElementId {
        c.session_mut()
            .create_element(t, Point::new(x, y), &CreateOptions::default())
            .expect("create")
    }

    fn bounds(c: &InteractionController, id: ElementId) -> Rect {
        c.session().element(id).map(crate::Element::bounds).expect("element")
    }

    #[test]
    fn test_drag_commits_once() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Text, 50.0, 50.0);
        let before = c.session().history().len();

        assert_eq!(c.pointer_down(Point::new(60.0, 60.0)), Action::Render);
        c.pointer_move(Point::new(70.0, 55.0));
        c.pointer_move(Point::new(90.0, 50.0));
        assert_eq!(c.session().history().len(), before);
        assert_eq!(c.pointer_up(), Action::Committed);

        let b = bounds(&c, id);
        assert_eq!((b.x, b.y), (80.0, 40.0));
        assert_eq!(c.session().history().len(), before + 1);
        assert_eq!(c.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_drag_clamps_to_zero() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Rectangle, 10.0, 10.0);
        c.pointer_down(Point::new(20.0, 20.0));
        c.pointer_move(Point::new(-100.0, -100.0));
        c.pointer_up();
        let b = bounds(&c, id);
        assert_eq!((b.x, b.y), (0.0, 0.0));
    }

    #[test]
    fn test_snap_applies_only_when_enabled() {
        let mut c = controller();
        // 150x150 circle; center lands at (503, 300) after the move
        let id = add(&mut c, ElementType::Circle, 100.0, 100.0);
        c.pointer_down(Point::new(110.0, 110.0));
        c.pointer_move(Point::new(438.0, 235.0));
        assert_eq!(bounds(&c, id).x, 428.0);
        c.pointer_cancel();

        c.set_snap(true);
        c.pointer_down(Point::new(110.0, 110.0));
        c.pointer_move(Point::new(438.0, 235.0));
        c.pointer_up();
        assert_eq!(bounds(&c, id).x, 425.0);
        assert_eq!(bounds(&c, id).y, 225.0);
    }

    #[test]
    fn test_resize_from_handle_respects_minimum() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Rectangle, 100.0, 100.0);
        c.session_mut().select(id).expect("select");
        // south-east handle of a 200x100 rectangle at (100,100)
        c.pointer_down(Point::new(300.0, 200.0));
        assert!(matches!(c.gesture(), Gesture::Resizing { handle: ResizeHandle::Se, .. }));
        c.pointer_move(Point::new(0.0, 0.0));
        assert_eq!(c.pointer_up(), Action::Committed);
        let b = bounds(&c, id);
        assert_eq!((b.width, b.height), (MIN_ELEMENT_SIZE, MIN_ELEMENT_SIZE));
    }

    #[test]
    fn test_cancel_restores_geometry_without_commit() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Rectangle, 100.0, 100.0);
        let rev = c.session().revision();
        c.pointer_down(Point::new(150.0, 150.0));
        c.pointer_move(Point::new(400.0, 400.0));
        assert_eq!(c.pointer_cancel(), Action::Render);
        assert_eq!(bounds(&c, id), Rect::new(100.0, 100.0, 200.0, 100.0));
        assert_eq!(c.session().revision(), rev);
    }

    #[test]
    fn test_locked_element_is_selected_not_dragged() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Rectangle, 100.0, 100.0);
        c.session_mut().toggle_lock(id).expect("lock");
        c.pointer_down(Point::new(150.0, 150.0));
        assert_eq!(c.session().selection(), Some(id));
        assert_eq!(c.gesture(), &Gesture::Idle);
        assert_eq!(c.pointer_up(), Action::None);
    }

    #[test]
    fn test_click_on_canvas_deselects() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Rectangle, 100.0, 100.0);
        c.session_mut().select(id).expect("select");
        c.pointer_down(Point::new(900.0, 700.0));
        assert_eq!(c.session().selection(), None);
    }

    #[test]
    fn test_text_edit_commits_on_blur() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Text, 10.0, 10.0);
        let action = c.double_click(Point::new(20.0, 20.0));
        assert!(matches!(action, Action::BeginTextEdit { id: got, .. } if got == id));
        let rev = c.session().revision();

        c.text_input("Hello");
        c.text_input("Hello world");
        assert_eq!(c.session().revision(), rev);
        assert_eq!(c.blur(), Action::Committed);
        assert_eq!(c.session().revision(), rev + 1);
        let content = c.session().element(id).and_then(|e| e.content.clone());
        assert_eq!(content.as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_enter_commits_and_shortcuts_suspended_while_editing() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Text, 10.0, 10.0);
        c.begin_text_edit(id).expect("edit");
        assert_eq!(c.key_down(&KeyInput::plain("Delete")), Action::None);
        assert!(c.session().element(id).is_some());
        c.text_input("done");
        assert_eq!(c.key_down(&KeyInput::plain("Enter")), Action::Committed);
        assert!(!c.is_editing_text());
    }

    #[test]
    fn test_double_click_ignores_shapes() {
        let mut c = controller();
        add(&mut c, ElementType::Rectangle, 10.0, 10.0);
        assert_eq!(c.double_click(Point::new(20.0, 20.0)), Action::None);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut c = controller();
        let id = add(&mut c, ElementType::Icon, 10.0, 10.0);
        c.session_mut().select(id).expect("select");

        assert_eq!(c.key_down(&KeyInput::ctrl("c")), Action::None);
        assert_eq!(c.key_down(&KeyInput::ctrl("v")), Action::Committed);
        let pasted = c.session().selection().expect("pasted selected");
        assert_ne!(pasted, id);
        assert_eq!(bounds(&c, pasted).x, 30.0);

        assert_eq!(c.key_down(&KeyInput::ctrl("d")), Action::Committed);
        assert_eq!(c.session().store().len(), 3);

        assert_eq!(c.key_down(&KeyInput::plain("Delete")), Action::Committed);
        assert_eq!(c.session().store().len(), 2);
        assert_eq!(c.key_down(&KeyInput::plain("Delete")), Action::None);

        assert_eq!(c.key_down(&KeyInput::ctrl("z")), Action::Committed);
        assert_eq!(c.session().store().len(), 3);
        assert_eq!(c.key_down(&KeyInput::ctrl("y")), Action::Committed);
        assert_eq!(c.session().store().len(), 2);

        assert_eq!(c.key_down(&KeyInput::plain("Escape")), Action::Render);
        assert_eq!(c.session().selection(), None);
    }

    #[test]
    fn test_action_serializes_for_host() {
        let json = serde_json::to_value(Action::BeginTextEdit {
            id: ElementId::new(4),
            text: "x".into(),
        })
        .expect("serialize");
        assert_eq!(json["action"], "beginTextEdit");
        assert_eq!(json["id"], 4);
        assert_eq!(serde_json::to_value(Action::Committed).expect("ser")["action"], "committed");
    }
}
