//! Scripted edits replayed through the interaction controller.
//!
//! Scripts are JSON arrays of commands tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "create", "type": "text", "x": 50, "y": 50},
//!   {"op": "move", "id": 1, "dx": 30, "dy": -10},
//!   {"op": "set_text", "id": 1, "text": "Welcome"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::element::{CreateOptions, ElementId, ElementPatch, ElementType};
use crate::error::{EditError, EditResult};
use crate::geometry::{Point, ResizeHandle};
use crate::interaction::InteractionController;
use crate::store::ZDirection;

/// One editor operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    /// Add an element with its type defaults.
    #[serde(rename_all = "camelCase")]
    Create {
        /// Kind of element.
        #[serde(rename = "type")]
        element_type: ElementType,
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Image URL.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// Icon name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon_name: Option<String>,
    },
    /// Drag an element by a delta.
    Move {
        /// Element to move.
        id: ElementId,
        /// Horizontal pointer travel.
        dx: f64,
        /// Vertical pointer travel.
        dy: f64,
    },
    /// Drag one of an element's resize handles by a delta.
    Resize {
        /// Element to resize.
        id: ElementId,
        /// Handle to drag.
        handle: ResizeHandle,
        /// Horizontal pointer travel.
        dx: f64,
        /// Vertical pointer travel.
        dy: f64,
    },
    /// Apply a partial change.
    Update {
        /// Element to change.
        id: ElementId,
        /// Fields to change.
        patch: ElementPatch,
    },
    /// Delete an element.
    Delete {
        /// Element to delete.
        id: ElementId,
    },
    /// Move one z step.
    Reorder {
        /// Element to move.
        id: ElementId,
        /// Direction of the step.
        direction: ZDirection,
    },
    /// Duplicate an element.
    Duplicate {
        /// Element to copy.
        id: ElementId,
    },
    /// Flip the lock flag.
    ToggleLock {
        /// Element to lock or unlock.
        id: ElementId,
    },
    /// Replace a text element's content.
    SetText {
        /// Text element.
        id: ElementId,
        /// New content.
        text: String,
    },
    /// Set text alignment.
    SetTextAlign {
        /// Text element.
        id: ElementId,
        /// `left`, `center` or `right`.
        align: String,
    },
    /// Center on the canvas horizontally.
    CenterHorizontally {
        /// Element to center.
        id: ElementId,
    },
    /// Center on the canvas vertically.
    CenterVertically {
        /// Element to center.
        id: ElementId,
    },
    /// Change the page background.
    SetBackground {
        /// CSS color.
        color: String,
        /// Image URL; empty clears it.
        #[serde(default)]
        image: String,
    },
    /// Select an element.
    Select {
        /// Element to select.
        id: ElementId,
    },
    /// Step back one snapshot.
    Undo,
    /// Step forward one snapshot.
    Redo,
}

impl InteractionController {
    /// Replay one command.
    ///
    /// Returns the id of the element created by `create` or `duplicate`.
    ///
    /// # Errors
    ///
    /// Returns the [`EditError`] of the underlying operation; nothing is
    /// committed in that case.
    pub fn apply_command(&mut self, command: &EditCommand) -> EditResult<Option<ElementId>> {
        self.commit_text_edit();
        match command {
            EditCommand::Create {
                element_type,
                x,
                y,
                url,
                icon_name,
            } => {
                let options = CreateOptions {
                    url: url.clone(),
                    icon_name: icon_name.clone(),
                };
                let id = self
                    .session_mut()
                    .create_element(*element_type, Point::new(*x, *y), &options)?;
                Ok(Some(id))
            }
            EditCommand::Move { id, dx, dy } => {
                let origin = self.element_origin(*id)?;
                self.begin_drag(*id, origin)?;
                self.pointer_move(Point::new(origin.x + dx, origin.y + dy));
                self.pointer_up();
                Ok(None)
            }
            EditCommand::Resize { id, handle, dx, dy } => {
                let bounds = self
                    .session()
                    .element(*id)
                    .ok_or(EditError::ElementNotFound(*id))?
                    .bounds();
                let origin = bounds.handle_position(*handle);
                self.begin_resize(*id, *handle, origin)?;
                self.pointer_move(Point::new(origin.x + dx, origin.y + dy));
                self.pointer_up();
                Ok(None)
            }
            EditCommand::Update { id, patch } => {
                self.session_mut().update_element(*id, patch)?;
                Ok(None)
            }
            EditCommand::Delete { id } => {
                self.session_mut().remove_element(*id)?;
                Ok(None)
            }
            EditCommand::Reorder { id, direction } => {
                self.session_mut().reorder(*id, *direction)?;
                Ok(None)
            }
            EditCommand::Duplicate { id } => Ok(Some(self.session_mut().duplicate(*id)?)),
            EditCommand::ToggleLock { id } => {
                self.session_mut().toggle_lock(*id)?;
                Ok(None)
            }
            EditCommand::SetText { id, text } => {
                self.session_mut().set_text(*id, text)?;
                Ok(None)
            }
            EditCommand::SetTextAlign { id, align } => {
                self.session_mut().set_text_align(*id, align)?;
                Ok(None)
            }
            EditCommand::CenterHorizontally { id } => {
                self.session_mut().center_horizontally(*id)?;
                Ok(None)
            }
            EditCommand::CenterVertically { id } => {
                self.session_mut().center_vertically(*id)?;
                Ok(None)
            }
            EditCommand::SetBackground { color, image } => {
                self.session_mut().set_background(color, image)?;
                Ok(None)
            }
            EditCommand::Select { id } => {
                self.session_mut().select(*id)?;
                Ok(None)
            }
            EditCommand::Undo => {
                self.session_mut().undo();
                Ok(None)
            }
            EditCommand::Redo => {
                self.session_mut().redo();
                Ok(None)
            }
        }
    }

    /// Replay a script, stopping at the first failing command.
    ///
    /// # Errors
    ///
    /// Returns the index of the failing command and its error.
    pub fn apply_script(&mut self, commands: &[EditCommand]) -> Result<(), (usize, EditError)> {
        for (index, command) in commands.iter().enumerate() {
            self.apply_command(command).map_err(|e| (index, e))?;
        }
        Ok(())
    }

    fn element_origin(&self, id: ElementId) -> EditResult<Point> {
        self.session()
            .element(id)
            .map(|e| Point::new(e.x, e.y))
            .ok_or(EditError::ElementNotFound(id))
    }
}
