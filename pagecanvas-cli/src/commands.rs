//! Subcommand implementations.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use pagecanvas_core::{Document, EditCommand, InteractionController};

use crate::api::PageApiClient;
use crate::bridge::{BridgeError, LoadedPage, PageInfo, PersistenceBridge};
use crate::config::{Command, HostConfig};

/// Run one subcommand, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns an error with the bridge's user message when a remote call
/// fails, or when a local file cannot be read, parsed or written.
pub async fn run(config: &HostConfig, command: Command, out: &mut dyn Write) -> anyhow::Result<()> {
    let api = PageApiClient::new(&config.api_url, config.session_cookie.as_deref())
        .context("Failed to create page API client")?;
    let bridge = PersistenceBridge::new(api);

    match command {
        Command::Whoami => {
            let user = bridge.whoami().await.map_err(user_error)?;
            writeln!(out, "Logged in as {user}")?;
        }
        Command::Show { page } => {
            let loaded = load(&bridge, &page).await?;
            write!(out, "{}", summarize(&loaded.title, &loaded.subdomain, &loaded.document))?;
        }
        Command::Export { page, output } => {
            let loaded = load(&bridge, &page).await?;
            match output {
                Some(path) => {
                    write_document(&path, &loaded.document)?;
                    writeln!(
                        out,
                        "Wrote {} elements to {}",
                        loaded.document.elements.len(),
                        path.display()
                    )?;
                }
                None => writeln!(out, "{}", serde_json::to_string_pretty(&loaded.document)?)?,
            }
        }
        Command::Import { page, file } => {
            let document = read_document(&file)?;
            let loaded = load(&bridge, &page).await?;
            let (info, mut session) = loaded.into_session(config.canvas);
            session.load_document(document);
            save(&bridge, &info, &mut session, out).await?;
        }
        Command::Apply { page, script, save: persist } => {
            let commands = read_script(&script)?;
            let loaded = load(&bridge, &page).await?;
            let (info, session) = loaded.into_session(config.canvas);
            let mut controller = InteractionController::new(session);
            controller.set_snap(config.snap);
            controller
                .apply_script(&commands)
                .map_err(|(index, e)| anyhow::anyhow!("Command {} failed: {e}", index + 1))?;
            let mut session = controller.into_session();
            write!(out, "{}", summarize(&info.title, &info.subdomain, session.document()))?;

            if persist {
                save(&bridge, &info, &mut session, out).await?;
            } else if let Err(e) = session.guard_navigation(false) {
                writeln!(out, "{e}: pass --save to keep them")?;
            }
        }
        Command::Create {
            title,
            subdomain,
            from,
        } => {
            let document = match from {
                Some(path) => read_document(&path)?,
                None => Document::empty(),
            };
            bridge
                .create_page(&title, &subdomain, &document)
                .await
                .map_err(user_error)?;
            writeln!(out, "Created page {subdomain}")?;
        }
        Command::Logout { force } => match bridge.logout().await {
            Ok(()) => writeln!(out, "Logged out")?,
            Err(e) if force => {
                tracing::warn!("Logout request failed, ignoring: {e}");
                writeln!(out, "Logged out locally")?;
            }
            Err(e) => return Err(user_error(e)),
        },
    }
    Ok(())
}

fn user_error(e: BridgeError) -> anyhow::Error {
    tracing::debug!("Bridge error: {e:?}");
    anyhow::anyhow!(e.user_message())
}

/// Load a page. The unreadable-content warning goes to the log on stderr so
/// stdout only ever carries the command's own output.
async fn load(bridge: &PersistenceBridge, page: &str) -> anyhow::Result<LoadedPage> {
    let loaded = bridge.load(page).await.map_err(user_error)?;
    if let Some(ref warning) = loaded.warning {
        tracing::warn!("Page {page}: stored content could not be read ({warning}); starting from an empty page");
    }
    Ok(loaded)
}

async fn save(
    bridge: &PersistenceBridge,
    page: &PageInfo,
    session: &mut pagecanvas_core::EditorSession,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let outcome = bridge
        .save_session(page, session)
        .await
        .map_err(user_error)?;
    writeln!(out, "{}", outcome.notification().message)?;
    Ok(())
}

/// Human-readable page summary: title, background and elements in draw order.
#[must_use]
pub fn summarize(title: &str, subdomain: &str, document: &Document) -> String {
    let mut s = String::new();
    let settings = &document.page_settings;
    let _ = writeln!(s, "{title} ({subdomain})");
    let _ = writeln!(
        s,
        "Background: {} {}",
        settings.background_color,
        settings.background_image().unwrap_or("(no image)")
    );
    let _ = writeln!(s, "Elements: {}", document.elements.len());
    for e in document.draw_order() {
        let _ = write!(
            s,
            "  #{} {:?} at ({}, {}) {}x{} z={}",
            e.id, e.element_type, e.x, e.y, e.width, e.height, e.z_index
        );
        if e.locked {
            s.push_str(" [locked]");
        }
        if let Some(ref content) = e.content {
            let _ = write!(s, " {content:?}");
        }
        s.push('\n');
    }
    s
}

/// Read and validate a document file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a document, or
/// contains an insecure URL.
pub fn read_document(path: &Path) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::from_page_data(&raw)
        .with_context(|| format!("{} is not a page document", path.display()))?;
    document
        .validate()
        .with_context(|| format!("{} failed validation", path.display()))?;
    Ok(document)
}

/// Write a document as pretty JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_document(path: &Path, document: &Document) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read an edit script.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_script(path: &Path) -> anyhow::Result<Vec<EditCommand>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let commands: Vec<EditCommand> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an edit script", path.display()))?;
    if commands.is_empty() {
        bail!("{} contains no commands", path.display());
    }
    Ok(commands)
}
