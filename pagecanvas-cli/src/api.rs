//! HTTP client for the remote page API.
//!
//! Five endpoints, all JSON, all carrying the session cookie:
//!
//! | Method | Path            | Response                                  |
//! |--------|-----------------|-------------------------------------------|
//! | GET    | `/check-login`  | `{success, logged_in, user}`              |
//! | GET    | `/page/{id}`    | `{success, page: {...}, message?}`        |
//! | PUT    | `/page/{id}`    | `{success, warning?, message?}`           |
//! | POST   | `/logout`       | ignored                                   |
//! | POST   | `/create-page`  | `{success, message?}`                     |

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors that can occur when talking to the page API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API base URL is invalid.
    #[error("invalid page API URL: {0}")]
    InvalidUrl(String),
    /// The session cookie cannot be sent as a header.
    #[error("session cookie contains characters not allowed in a header")]
    InvalidCookie,
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("page API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON parsing failed.
    #[error("failed to parse page API response: {0}")]
    Json(#[from] serde_json::Error),
    /// The server answered with a non-success status.
    #[error("page API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the status reason.
        message: String,
    },
}

impl ApiError {
    /// HTTP status of a [`ApiError::Status`] error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// `GET /check-login` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginStatus {
    /// Request succeeded.
    #[serde(default)]
    pub success: bool,
    /// A session is active.
    #[serde(default)]
    pub logged_in: bool,
    /// The logged-in user, in whatever shape the server sends.
    #[serde(default)]
    pub user: Option<Value>,
}

impl LoginStatus {
    /// Whether the session is usable.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.success && self.logged_in
    }

    /// Short name for the user: `username`, `name` or `email`, else the raw value.
    #[must_use]
    pub fn user_label(&self) -> String {
        match &self.user {
            Some(Value::String(s)) => s.clone(),
            Some(user) => ["username", "name", "email"]
                .iter()
                .find_map(|key| user.get(key).and_then(Value::as_str))
                .map_or_else(|| user.to_string(), str::to_string),
            None => "unknown".to_string(),
        }
    }
}

/// A page record.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRecord {
    /// Subdomain the page is published under.
    pub subdomain: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Serialized document; may be missing or empty for new pages.
    #[serde(default)]
    pub page_data: Option<String>,
    /// Whether the session user owns the page.
    #[serde(default)]
    pub is_owner: bool,
}

/// `GET /page/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    /// Request succeeded.
    #[serde(default)]
    pub success: bool,
    /// The page, when found.
    #[serde(default)]
    pub page: Option<PageRecord>,
    /// Error message on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// `PUT /page/{id}` and `POST /create-page` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteResponse {
    /// Request succeeded.
    #[serde(default)]
    pub success: bool,
    /// Set when the page was stored but not published.
    #[serde(default)]
    pub warning: Option<String>,
    /// Error message on failure.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct SavePageBody<'a> {
    page_data: &'a str,
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePageBody<'a> {
    title: &'a str,
    subdomain: &'a str,
    page_data: &'a str,
}

/// Client for the page API.
#[derive(Debug, Clone)]
pub struct PageApiClient {
    http: Client,
    base: Url,
}

impl PageApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://127.0.0.1:5000/api`).
    ///
    /// `session_cookie` is sent verbatim as the `Cookie` header. Cookies set
    /// by the server are kept for later requests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the URL is malformed,
    /// [`ApiError::InvalidCookie`] if the cookie is not a valid header value,
    /// and [`ApiError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url} cannot be a base URL")));
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|_| ApiError::InvalidCookie)?;
            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .user_agent(concat!("pagecanvas/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .cookie_store(true)
            // Disable proxy detection to avoid macOS system-configuration panic
            .no_proxy()
            .build()?;

        Ok(Self { http, base })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check whether the session is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn check_login(&self) -> Result<LoginStatus, ApiError> {
        let url = self.endpoint(&["check-login"])?;
        tracing::debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    /// Fetch a page by subdomain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_page(&self, page: &str) -> Result<PageResponse, ApiError> {
        let url = self.endpoint(&["page", page])?;
        tracing::debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    /// Store a page's serialized document and title.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn save_page(
        &self,
        page: &str,
        page_data: &str,
        title: &str,
    ) -> Result<WriteResponse, ApiError> {
        let url = self.endpoint(&["page", page])?;
        tracing::debug!("PUT {url} ({} bytes)", page_data.len());
        let response = self
            .http
            .put(url)
            .json(&SavePageBody { page_data, title })
            .send()
            .await?;
        decode(response).await
    }

    /// Create a new page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn create_page(
        &self,
        title: &str,
        subdomain: &str,
        page_data: &str,
    ) -> Result<WriteResponse, ApiError> {
        let url = self.endpoint(&["create-page"])?;
        tracing::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .json(&CreatePageBody {
                title,
                subdomain,
                page_data,
            })
            .send()
            .await?;
        decode(response).await
    }

    /// End the session. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers non-2xx.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["logout"])?;
        tracing::debug!("POST {url}");
        let response = self.http.post(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
