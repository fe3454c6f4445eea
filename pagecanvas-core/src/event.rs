//! Input events for editor interaction.

use serde::{Deserialize, Serialize};

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    #[serde(default)]
    pub shift: bool,
    /// Control key pressed.
    #[serde(default)]
    pub ctrl: bool,
    /// Alt/Option key pressed.
    #[serde(default)]
    pub alt: bool,
    /// Meta/Command key pressed.
    #[serde(default)]
    pub meta: bool,
}

impl KeyModifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub const fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press as reported by the host (browser `KeyboardEvent.key` naming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// Key name, e.g. `"Delete"`, `"Escape"`, `"z"`.
    pub key: String,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl KeyInput {
    /// A key with no modifiers.
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers::default(),
        }
    }

    /// A key with Ctrl held.
    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers {
                ctrl: true,
                ..KeyModifiers::default()
            },
        }
    }

    /// The editor shortcut this key press maps to, if any.
    #[must_use]
    pub fn shortcut(&self) -> Option<Shortcut> {
        match self.key.as_str() {
            "Delete" => Some(Shortcut::Delete),
            "Escape" => Some(Shortcut::Deselect),
            key if self.modifiers.command() => match key.to_ascii_lowercase().as_str() {
                "c" => Some(Shortcut::Copy),
                "v" => Some(Shortcut::Paste),
                "d" => Some(Shortcut::Duplicate),
                "z" => Some(Shortcut::Undo),
                "y" => Some(Shortcut::Redo),
                _ => None,
            },
            _ => None,
        }
    }

    /// Enter without Shift: finishes an in-place text edit.
    #[must_use]
    pub fn is_commit_enter(&self) -> bool {
        self.key == "Enter" && !self.modifiers.shift
    }
}

/// Keyboard commands available while no text is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shortcut {
    /// Delete the selected element.
    Delete,
    /// Clear the selection.
    Deselect,
    /// Copy the selected element.
    Copy,
    /// Paste the copied element.
    Paste,
    /// Duplicate the selected element.
    Duplicate,
    /// Undo the last commit.
    Undo,
    /// Redo the last undone commit.
    Redo,
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown {
        /// X coordinate in page space.
        x: f64,
        /// Y coordinate in page space.
        y: f64,
    },
    /// Pointer moved.
    PointerMove {
        /// X coordinate in page space.
        x: f64,
        /// Y coordinate in page space.
        y: f64,
    },
    /// Primary button released.
    PointerUp,
    /// The gesture was interrupted (pointer left the window, capture lost).
    PointerCancel,
    /// Double click.
    DoubleClick {
        /// X coordinate in page space.
        x: f64,
        /// Y coordinate in page space.
        y: f64,
    },
    /// Key pressed.
    Key(KeyInput),
    /// The in-place text editor's content changed.
    TextInput {
        /// Full current text of the editor.
        text: String,
    },
    /// The in-place text editor lost focus.
    Blur,
}
