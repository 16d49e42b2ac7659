use crate::transport::TransportError;
use bytes::Bytes;
use reqwest::Method;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Structured error context for construction-time failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field or header that caused the error (e.g., "base_url", "headers.X-Trace")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "request_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for request execution.
///
/// Every execution path ends in either a response, a decoded value, or one of
/// these variants. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to resolve URL: {message}")]
    UrlResolution {
        message: String,
        #[source]
        source: Option<url::ParseError>,
    },

    #[error("failed to prepare request body: {0}")]
    BodyEncoding(#[source] serde_json::Error),

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] std::io::Error),

    #[error("failed to create request: {message}{}", format_context(.context))]
    RequestConstruction {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("request failed: method={method}, url={url}, status=0, error={source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Status(Box<StatusError>),

    #[error("failed to unmarshal response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("worker pool is shut down")]
    PoolShutDown,

    #[error("request task failed: {0}")]
    TaskFailed(String),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn request_construction(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::RequestConstruction {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::RequestConstruction { context, .. } | Error::Configuration { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// HTTP status of the failure, or 0 when no response was received.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Status(err) => err.status,
            _ => 0,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Transport { url, .. } => Some(url),
            Error::Status(err) => Some(&err.url),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&Method> {
        match self {
            Error::Transport { method, .. } => Some(method),
            Error::Status(err) => Some(&err.method),
            _ => None,
        }
    }

    /// Raw body of an HTTP-level failure.
    pub fn response_body(&self) -> Option<&[u8]> {
        self.as_status().map(|err| err.body.as_ref())
    }

    pub fn as_status(&self) -> Option<&StatusError> {
        match self {
            Error::Status(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Error::Status(_))
    }

    /// True for failures where no HTTP response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::Context(crate::ContextError::Canceled),
                ..
            }
        )
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::Context(crate::ContextError::DeadlineExceeded),
                ..
            }
        )
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// Transport failures other than an ended context, 429 and 5xx count as
    /// retryable. Construction and decoding failures never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { source, .. } => !matches!(source, TransportError::Context(_)),
            Error::Status(err) => err.status == 429 || err.status >= 500,
            _ => false,
        }
    }
}

/// HTTP-level failure: the server answered with status >= 400.
#[derive(Debug)]
pub struct StatusError {
    pub status: u16,
    pub url: String,
    pub method: Method,
    /// Raw failure body, kept regardless of whether detail decoding succeeded.
    pub body: Bytes,
    pub detail: Option<ErrorDetail>,
}

impl StatusError {
    /// The failure body decoded into the type registered with
    /// [`Request::set_error`](crate::Request::set_error).
    pub fn detail<E: Any>(&self) -> Option<&E> {
        self.detail.as_ref().and_then(|d| d.downcast_ref::<E>())
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request failed: method={}, url={}, status={}, error=request failed with status code {}",
            self.method, self.url, self.status, self.status
        )?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail.rendered)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatusError {}

/// A failure body decoded into a caller-chosen type.
#[derive(Clone)]
pub struct ErrorDetail {
    value: Arc<dyn Any + Send + Sync>,
    rendered: String,
}

impl ErrorDetail {
    pub(crate) fn decode<E>(body: &[u8]) -> Option<ErrorDetail>
    where
        E: serde::de::DeserializeOwned + fmt::Debug + Send + Sync + 'static,
    {
        let value: E = serde_json::from_slice(body).ok()?;
        Some(ErrorDetail {
            rendered: format!("{:?}", value),
            value: Arc::new(value),
        })
    }

    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.value.downcast_ref::<E>()
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Debug for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorDetail").field(&self.rendered).finish()
    }
}
