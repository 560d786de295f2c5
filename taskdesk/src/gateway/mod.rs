//! Fetch gateway abstraction for `TaskDesk`.
//!
//! Every backend call is described declaratively by a [`FetchRequest`] and
//! executed by a [`FetchGateway`]. Concrete implementations:
//! - [`http::HttpGateway`]: reqwest-backed REST client
//! - [`loopback::LoopbackGateway`]: scripted in-process gateway for testing
//!
//! The gateway also owns the notification side effect: [`toast_for`] turns a
//! completed request into the success or error [`Toast`] the UI displays.

pub mod http;
pub mod loopback;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde_json::Value;

/// Name of the header carrying the session credential.
pub const AUTHORIZATION: &str = "Authorization";

/// HTTP method of a [`FetchRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Create a resource.
    Post,
    /// Replace a resource.
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Per-request gateway behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Show a success notification when the request succeeds.
    pub show_success_toast: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            show_success_toast: true,
        }
    }
}

/// Declarative description of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Path relative to the API base URL (e.g. `/tasks/42`).
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// JSON body, if any.
    pub data: Option<Value>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Gateway behaviour flags.
    pub options: FetchOptions,
}

impl FetchRequest {
    fn new(method: Method, url: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            url: url.into(),
            method,
            data,
            headers: BTreeMap::new(),
            options: FetchOptions::default(),
        }
    }

    /// A `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url, None)
    }

    /// A `POST` request with a JSON body.
    pub fn post(url: impl Into<String>, data: Value) -> Self {
        Self::new(Method::Post, url, Some(data))
    }

    /// A `PUT` request with a JSON body.
    pub fn put(url: impl Into<String>, data: Value) -> Self {
        Self::new(Method::Put, url, Some(data))
    }

    /// Adds the `Authorization` header when a credential is present.
    #[must_use]
    pub fn with_authorization(mut self, credential: Option<&str>) -> Self {
        if let Some(credential) = credential {
            self.headers
                .insert(AUTHORIZATION.to_string(), credential.to_string());
        }
        self
    }

    /// Suppresses the success notification for this request.
    #[must_use]
    pub const fn without_success_toast(mut self) -> Self {
        self.options.show_success_toast = false;
        self
    }

    /// Returns the `Authorization` header value, if set.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).map(String::as_str)
    }
}

/// Errors surfaced by a [`FetchGateway`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("{message} ({status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status reason.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The base URL or request path could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Async gateway executing [`FetchRequest`]s.
///
/// Implementations return the decoded JSON response body. Error reporting to
/// the user happens one level up (see [`toast_for`]); callers only decide
/// what state to return to.
pub trait FetchGateway: Send + Sync {
    /// Executes `request` and returns the decoded response body.
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl std::future::Future<Output = Result<Value, GatewayError>> + Send;
}

/// Severity of a [`Toast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// The request succeeded.
    Success,
    /// The request failed.
    Error,
}

/// A transient notification shown in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Severity.
    pub kind: ToastKind,
    /// Message text.
    pub message: String,
    /// When the notification was raised.
    pub at: DateTime<Local>,
}

impl Toast {
    /// A success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
            at: Local::now(),
        }
    }

    /// An error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
            at: Local::now(),
        }
    }
}

/// Notification to raise for a completed request, if any.
///
/// Failures always produce an error toast. Successes produce a toast with the
/// body's `msg` (or `"Success"`) unless the request suppressed it.
#[must_use]
pub fn toast_for(request: &FetchRequest, result: &Result<Value, GatewayError>) -> Option<Toast> {
    match result {
        Ok(body) if request.options.show_success_toast => {
            let message = body
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Success");
            Some(Toast::success(message))
        }
        Ok(_) => None,
        Err(e) => Some(Toast::error(e.to_string())),
    }
}
