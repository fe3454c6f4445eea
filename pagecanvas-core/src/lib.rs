//! # Pagecanvas Core
//!
//! Editor logic for free-form web page building: an element store, bounded
//! undo history, drag/resize/snap geometry and a pointer/keyboard
//! interaction controller. No I/O. Compiles to WASM for the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            InteractionController            │
//! │  - Pointer gestures  - Shortcuts            │
//! │  - Text editing      - Scripted commands    │
//! ├─────────────────────────────────────────────┤
//! │               EditorSession                 │
//! │  ElementStore     │  History                │
//! │  - Elements       │  - Snapshots (max 50)   │
//! │  - Page settings  │  - Undo / redo          │
//! │  - Hit testing    │  Revision / dirty flag  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod session;
pub mod store;
pub mod validation;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use command::EditCommand;
pub use document::{Document, PageSettings};
pub use element::{CreateOptions, Element, ElementId, ElementPatch, ElementType, Styles};
pub use error::{ContentError, EditError, EditResult};
pub use event::{InputEvent, KeyInput, KeyModifiers, Shortcut};
pub use geometry::{
    CanvasSize, Point, Rect, ResizeHandle, MIN_ELEMENT_SIZE, PASTE_OFFSET, SNAP_THRESHOLD,
};
pub use history::{History, Snapshot, MAX_HISTORY};
pub use interaction::{Action, Gesture, InteractionController};
pub use session::{EditorSession, SaveRequest};
pub use store::{ElementStore, HitTarget, ZDirection};
pub use validation::ValidationError;

/// Pagecanvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
