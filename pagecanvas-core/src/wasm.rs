//! WebAssembly bindings for pagecanvas-core.
//!
//! The JavaScript view forwards raw input here and re-renders from
//! [`WasmEditor::elements_json`] whenever an action asks for it.

use wasm_bindgen::prelude::*;

use crate::{
    Action, CanvasSize, CreateOptions, Document, EditorSession, ElementId, ElementType,
    InputEvent, InteractionController, KeyInput, KeyModifiers, Point,
};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn action_json(action: &Action) -> String {
    serde_json::to_string(action).unwrap_or_default()
}

/// Page editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    controller: InteractionController,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor on an empty page with the given canvas size.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            controller: InteractionController::new(EditorSession::new(CanvasSize::new(
                width, height,
            ))),
        }
    }

    /// Load a stored `page_data` string.
    ///
    /// Unreadable content loads as an empty page; the returned string is a
    /// warning to show the user, or empty.
    #[wasm_bindgen(js_name = loadPageData)]
    pub fn load_page_data(&mut self, page_data: &str) -> String {
        let (document, error) = Document::from_page_data_or_empty(page_data);
        self.controller.session_mut().load_document(document);
        error.map(|e| e.to_string()).unwrap_or_default()
    }

    /// Serialize the live document for saving.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = pageData)]
    pub fn page_data(&self) -> Result<String, String> {
        self.controller
            .session()
            .document()
            .to_page_data()
            .map_err(|e| e.to_string())
    }

    /// Elements in draw order as JSON.
    #[wasm_bindgen(js_name = elementsJson)]
    #[must_use]
    pub fn elements_json(&self) -> String {
        serde_json::to_string(&self.controller.session().document().draw_order())
            .unwrap_or_default()
    }

    /// Page settings as JSON.
    #[wasm_bindgen(js_name = pageSettingsJson)]
    #[must_use]
    pub fn page_settings_json(&self) -> String {
        serde_json::to_string(&self.controller.session().document().page_settings)
            .unwrap_or_default()
    }

    /// Selected element id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<u64> {
        self.controller.session().selection().map(ElementId::get)
    }

    /// Forward a JSON-encoded [`InputEvent`].
    ///
    /// # Errors
    ///
    /// Returns an error string if the event cannot be parsed.
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, json: &str) -> Result<String, String> {
        let event: InputEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(action_json(&self.controller.handle_event(&event)))
    }

    /// Primary button pressed.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> String {
        action_json(&self.controller.pointer_down(Point::new(x, y)))
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        action_json(&self.controller.pointer_move(Point::new(x, y)))
    }

    /// Primary button released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> String {
        action_json(&self.controller.pointer_up())
    }

    /// Gesture interrupted.
    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self) -> String {
        action_json(&self.controller.pointer_cancel())
    }

    /// Double click.
    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, x: f64, y: f64) -> String {
        action_json(&self.controller.double_click(Point::new(x, y)))
    }

    /// Key pressed, with `KeyboardEvent.key` naming.
    #[wasm_bindgen(js_name = keyDown)]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn key_down(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool) -> String {
        let input = KeyInput {
            key: key.to_string(),
            modifiers: KeyModifiers {
                shift,
                ctrl,
                alt: false,
                meta,
            },
        };
        action_json(&self.controller.key_down(&input))
    }

    /// In-place text editor content changed.
    #[wasm_bindgen(js_name = textInput)]
    pub fn text_input(&mut self, text: &str) -> String {
        action_json(&self.controller.text_input(text))
    }

    /// In-place text editor lost focus.
    pub fn blur(&mut self) -> String {
        action_json(&self.controller.blur())
    }

    /// Toggle snap-to-guides.
    #[wasm_bindgen(js_name = setSnap)]
    pub fn set_snap(&mut self, enabled: bool) {
        self.controller.set_snap(enabled);
    }

    /// Add an element from the toolbar.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown type or invalid options.
    #[wasm_bindgen(js_name = createElement)]
    pub fn create_element(
        &mut self,
        element_type: &str,
        x: f64,
        y: f64,
        url: Option<String>,
        icon_name: Option<String>,
    ) -> Result<u64, String> {
        let element_type: ElementType = element_type.parse()?;
        let options = CreateOptions { url, icon_name };
        self.controller
            .session_mut()
            .create_element(element_type, Point::new(x, y), &options)
            .map(ElementId::get)
            .map_err(|e| e.to_string())
    }

    /// Undo the last commit.
    pub fn undo(&mut self) -> bool {
        self.controller.session_mut().undo()
    }

    /// Redo the last undone commit.
    pub fn redo(&mut self) -> bool {
        self.controller.session_mut().redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.controller.session().history().can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.controller.session().history().can_redo()
    }

    /// Whether there are unsaved changes.
    #[wasm_bindgen(js_name = isDirty)]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.controller.session().is_dirty()
    }

    /// Current revision; pass it back to [`Self::complete_save`].
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.controller.session().revision()
    }

    /// Record that the document at `revision` was persisted.
    #[wasm_bindgen(js_name = completeSave)]
    pub fn complete_save(&mut self, revision: u64) {
        self.controller.session_mut().complete_save(revision);
    }
}
