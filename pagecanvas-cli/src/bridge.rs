//! Persistence bridge: loads pages into editor sessions and saves them back.
//!
//! Failures never abort the editor. Each [`BridgeError`] has a
//! [`BridgeError::user_message`] for display, unreadable stored content is
//! replaced with an empty page, and a failed save leaves the session dirty
//! so the user can retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pagecanvas_core::{CanvasSize, Document, EditorSession, SaveRequest};
use serde::Serialize;
use thiserror::Error;

use crate::api::{ApiError, PageApiClient};

/// How long a success notification stays visible.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(2);

/// How long a warning or error notification stays visible.
pub const WARNING_DISPLAY: Duration = Duration::from_secs(5);

/// Errors surfaced by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No valid session.
    #[error("not logged in")]
    NotAuthenticated,
    /// The page does not exist.
    #[error("page not found")]
    NotFound,
    /// The page exists but the session user may not edit it.
    #[error("permission denied")]
    Forbidden,
    /// The server answered `success: false`.
    #[error("rejected by server: {0}")]
    Rejected(String),
    /// A save for this bridge is already running.
    #[error("a save is already in progress")]
    SaveInProgress,
    /// Transport or protocol failure.
    #[error(transparent)]
    Network(ApiError),
    /// The document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ApiError> for BridgeError {
    fn from(e: ApiError) -> Self {
        match e.status() {
            Some(401) => Self::NotAuthenticated,
            Some(403) => Self::Forbidden,
            Some(404) => Self::NotFound,
            _ => Self::Network(e),
        }
    }
}

impl BridgeError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please log in to use the page builder.".to_string(),
            Self::NotFound => "Page not found.".to_string(),
            Self::Forbidden => "You do not have permission to edit this page.".to_string(),
            Self::Rejected(message) => message.clone(),
            Self::SaveInProgress => "A save is already in progress.".to_string(),
            Self::Network(_) => "Could not reach the server. Please try again.".to_string(),
            Self::Serialization(_) => "The page could not be prepared for saving.".to_string(),
        }
    }
}

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation succeeded.
    Success,
    /// Operation succeeded with caveats.
    Warning,
    /// Operation failed.
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Style.
    pub kind: NotificationKind,
    /// Text.
    pub message: String,
    /// Display duration.
    pub duration: Duration,
}

impl From<&BridgeError> for Notification {
    fn from(e: &BridgeError) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: e.user_message(),
            duration: WARNING_DISPLAY,
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored and published.
    Published,
    /// Stored, but the server reported a problem publishing.
    SavedLocally {
        /// Server-provided warning.
        warning: String,
    },
}

impl SaveOutcome {
    /// The notification to show for this outcome.
    #[must_use]
    pub fn notification(&self) -> Notification {
        match self {
            Self::Published => Notification {
                kind: NotificationKind::Success,
                message: "Published!".to_string(),
                duration: SUCCESS_DISPLAY,
            },
            Self::SavedLocally { warning } => Notification {
                kind: NotificationKind::Warning,
                message: format!("Saved locally: {warning}"),
                duration: WARNING_DISPLAY,
            },
        }
    }
}

/// A page loaded for editing.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Page subdomain, used as its id.
    pub subdomain: String,
    /// Page title.
    pub title: String,
    /// Decoded document.
    pub document: Document,
    /// Set when stored content was unreadable and an empty page was substituted.
    pub warning: Option<String>,
}

impl LoadedPage {
    /// Start an editing session on this page.
    #[must_use]
    pub fn into_session(self, canvas: CanvasSize) -> (PageInfo, EditorSession) {
        let session = EditorSession::with_document(canvas, self.document);
        (
            PageInfo {
                subdomain: self.subdomain,
                title: self.title,
            },
            session,
        )
    }
}

/// Identity of a page being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Page subdomain, used as its id.
    pub subdomain: String,
    /// Page title.
    pub title: String,
}

/// Clears the in-flight flag when a save finishes, however it finishes.
struct SaveGuard<'a>(&'a AtomicBool);

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Moves documents between the editor and the page API.
#[derive(Debug)]
pub struct PersistenceBridge {
    api: PageApiClient,
    saving: AtomicBool,
}

impl PersistenceBridge {
    /// Wrap an API client.
    #[must_use]
    pub fn new(api: PageApiClient) -> Self {
        Self {
            api,
            saving: AtomicBool::new(false),
        }
    }

    /// The underlying client.
    #[must_use]
    pub fn api(&self) -> &PageApiClient {
        &self.api
    }

    /// Whether a save is running.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Check the session and return the user's label.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotAuthenticated`] without a valid session.
    pub async fn whoami(&self) -> Result<String, BridgeError> {
        let status = self.api.check_login().await?;
        if !status.is_authenticated() {
            return Err(BridgeError::NotAuthenticated);
        }
        Ok(status.user_label())
    }

    /// Check the session, then fetch and decode a page.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotAuthenticated`], [`BridgeError::NotFound`],
    /// [`BridgeError::Forbidden`] when the user does not own the page,
    /// [`BridgeError::Rejected`] or [`BridgeError::Network`].
    pub async fn load(&self, page: &str) -> Result<LoadedPage, BridgeError> {
        self.whoami().await?;

        let response = self.api.get_page(page).await?;
        if !response.success {
            return Err(BridgeError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Failed to load page".to_string()),
            ));
        }
        let record = response.page.ok_or(BridgeError::NotFound)?;
        if !record.is_owner {
            return Err(BridgeError::Forbidden);
        }

        let raw = record.page_data.unwrap_or_default();
        let (document, error) = Document::from_page_data_or_empty(&raw);
        let warning = error.map(|e| e.to_string());
        tracing::info!(
            "Loaded page {} with {} elements",
            record.subdomain,
            document.elements.len()
        );

        Ok(LoadedPage {
            subdomain: record.subdomain,
            title: record.title,
            document,
            warning,
        })
    }

    /// Save a prepared document.
    ///
    /// Only one save runs at a time; a second call while one is in flight is
    /// rejected, not queued. There are no retries.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::SaveInProgress`], [`BridgeError::Rejected`] for
    /// `success: false`, or the mapped transport error.
    pub async fn save(
        &self,
        page: &PageInfo,
        request: &SaveRequest,
    ) -> Result<SaveOutcome, BridgeError> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BridgeError::SaveInProgress);
        }
        let _guard = SaveGuard(&self.saving);

        let response = self
            .api
            .save_page(&page.subdomain, &request.page_data, &page.title)
            .await?;
        if !response.success {
            let message = response.message.unwrap_or_else(|| "Failed to save".to_string());
            tracing::warn!("Save of {} rejected: {message}", page.subdomain);
            return Err(BridgeError::Rejected(message));
        }

        let outcome = match response.warning {
            Some(warning) => SaveOutcome::SavedLocally { warning },
            None => SaveOutcome::Published,
        };
        tracing::info!("Saved page {} at revision {}: {outcome:?}", page.subdomain, request.revision);
        Ok(outcome)
    }

    /// Serialize, save and, on success, mark the session clean up to the
    /// saved revision.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Serialization`] or the errors of [`Self::save`];
    /// the session stays dirty.
    pub async fn save_session(
        &self,
        page: &PageInfo,
        session: &mut EditorSession,
    ) -> Result<SaveOutcome, BridgeError> {
        let request = session.prepare_save()?;
        let outcome = self.save(page, &request).await?;
        session.complete_save(request.revision);
        Ok(outcome)
    }

    /// Create a page holding `document`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Rejected`] with the server message, or the
    /// mapped transport error.
    pub async fn create_page(
        &self,
        title: &str,
        subdomain: &str,
        document: &Document,
    ) -> Result<(), BridgeError> {
        let page_data = document.to_page_data()?;
        let response = self.api.create_page(title, subdomain, &page_data).await?;
        if !response.success {
            return Err(BridgeError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Failed to create page".to_string()),
            ));
        }
        tracing::info!("Created page {subdomain}");
        Ok(())
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport error.
    pub async fn logout(&self) -> Result<(), BridgeError> {
        self.api.logout().await?;
        tracing::info!("Logged out");
        Ok(())
    }
}
