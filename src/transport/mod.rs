//! The network seam: one request/response exchange.
//!
//! Everything above this module works against [`Transport`], so a custom
//! implementation (or an interceptor chain, see [`crate::interceptors`]) can
//! stand in for the default reqwest-backed [`HttpTransport`].

mod http;

pub use http::HttpTransport;

use crate::context::ContextError;
use async_trait::async_trait;
use std::time::Duration;

/// Performs exactly one exchange. Implementations must not retry on their own
/// unless they are an explicit retry wrapper.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request canceled or timed out: {0}")]
    Context(#[from] ContextError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no response headers within {0:?}")]
    ResponseHeaderTimeout(Duration),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout(),
            TransportError::Timeout(_) | TransportError::ResponseHeaderTimeout(_) => true,
            TransportError::Context(ContextError::DeadlineExceeded) => true,
            _ => false,
        }
    }
}
