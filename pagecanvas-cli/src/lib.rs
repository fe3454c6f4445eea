//! # Pagecanvas CLI
//!
//! Command-line host for Pagecanvas pages. Talks to the remote page API,
//! decodes stored documents into editor sessions and saves them back.
//!
//! ## Usage
//!
//! ```bash
//! pagecanvas --session-cookie "PHPSESSID=..." show my-site
//! pagecanvas apply my-site edits.json --save
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - API location, session cookie and canvas size
//! - `PageApiClient` - reqwest client for the five page API endpoints
//! - `PersistenceBridge` - load/save with error mapping and notifications

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bridge;
pub mod commands;
pub mod config;

pub use api::{ApiError, LoginStatus, PageApiClient, PageRecord, PageResponse, WriteResponse};
pub use bridge::{
    BridgeError, LoadedPage, Notification, NotificationKind, PageInfo, PersistenceBridge,
    SaveOutcome,
};
pub use config::{CliArgs, Command, HostConfig};
