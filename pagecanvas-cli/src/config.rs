//! Command-line arguments and host configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pagecanvas_core::CanvasSize;

/// Default page API location.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Command-line arguments for pagecanvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "pagecanvas")]
#[command(about = "Load, edit and save Pagecanvas pages from the command line")]
#[command(version)]
pub struct CliArgs {
    /// Page API base URL
    #[arg(long, env = "PAGECANVAS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Cookie header carrying the session credentials (e.g. `PHPSESSID=...`)
    #[arg(long, env = "PAGECANVAS_SESSION_COOKIE")]
    pub session_cookie: Option<String>,

    /// Canvas width in pixels, used for snapping and centering
    #[arg(long, default_value = "1200")]
    pub canvas_width: f64,

    /// Canvas height in pixels, used for snapping and centering
    #[arg(long, default_value = "800")]
    pub canvas_height: f64,

    /// Snap scripted drags to the canvas guides
    #[arg(long)]
    pub snap: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the logged-in user
    Whoami,
    /// Print a summary of a page
    Show {
        /// Page subdomain
        page: String,
    },
    /// Write a page's document as JSON
    Export {
        /// Page subdomain
        page: String,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace a page's document with one read from a file
    Import {
        /// Page subdomain
        page: String,
        /// Document JSON file
        file: PathBuf,
    },
    /// Replay an edit script against a page
    Apply {
        /// Page subdomain
        page: String,
        /// JSON array of edit commands
        script: PathBuf,
        /// Save the result
        #[arg(long)]
        save: bool,
    },
    /// Create a new page
    Create {
        /// Page title
        #[arg(long)]
        title: String,
        /// Page subdomain
        #[arg(long)]
        subdomain: String,
        /// Initial document JSON file (empty page if omitted)
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// End the session
    Logout {
        /// Log out even if unsaved local edits exist
        #[arg(long)]
        force: bool,
    },
}

/// Host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Page API base URL.
    pub api_url: String,
    /// Session cookie header value.
    pub session_cookie: Option<String>,
    /// Canvas used for snapping and centering.
    pub canvas: CanvasSize,
    /// Snap scripted drags to guides.
    pub snap: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_cookie: None,
            canvas: CanvasSize::default(),
            snap: false,
        }
    }
}

impl From<&CliArgs> for HostConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            api_url: args.api_url.clone(),
            session_cookie: args.session_cookie.clone(),
            canvas: CanvasSize::new(args.canvas_width, args.canvas_height),
            snap: args.snap,
        }
    }
}
