//! Transport decorators for cross-cutting concerns.
//!
//! An [`Interceptor`] receives each outgoing request together with [`Next`], the
//! rest of the chain. It may rewrite the request, observe the response, call
//! `next` several times (retries) or short-circuit. Interceptors compose by
//! wrapping: [`InterceptorPipeline::wrap`] turns a base [`Transport`] into a
//! decorated one.

mod retry;

pub use retry::RetryInterceptor;

use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The remainder of the chain below an interceptor.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    pub async fn run(
        self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, TransportError> {
        self.transport.round_trip(request).await
    }
}

#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(
        &self,
        request: reqwest::Request,
        next: Next<'_>,
    ) -> Result<reqwest::Response, TransportError>;
}

/// One interceptor bound to the transport it decorates.
struct Layer {
    interceptor: Arc<dyn Interceptor>,
    inner: Arc<dyn Transport>,
}

#[async_trait]
impl Transport for Layer {
    async fn round_trip(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, TransportError> {
        self.interceptor
            .intercept(request, Next::new(self.inner.as_ref()))
            .await
    }
}

/// Ordered interceptor list; the first one added sees the request first.
#[derive(Clone, Default)]
pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Decorate `base` with every interceptor in the pipeline.
    pub fn wrap(&self, base: Arc<dyn Transport>) -> Arc<dyn Transport> {
        self.interceptors
            .iter()
            .rev()
            .fold(base, |inner, interceptor| -> Arc<dyn Transport> {
                Arc::new(Layer {
                    interceptor: interceptor.clone(),
                    inner,
                })
            })
    }
}

/// Logs method, url, status and latency of every exchange.
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(
        &self,
        request: reqwest::Request,
        next: Next<'_>,
    ) -> Result<reqwest::Response, TransportError> {
        let method = request.method().clone();
        let url = request.url().to_string();
        let start = Instant::now();

        let result = next.run(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(resp) => info!(
                %method,
                %url,
                status = resp.status().as_u16(),
                elapsed_ms,
                "request completed"
            ),
            Err(e) => warn!(%method, %url, elapsed_ms, error = %e, "request failed"),
        }
        result
    }
}

/// Sets fixed headers on every request, overwriting same-named ones.
#[derive(Debug, Clone, Default)]
pub struct HeaderInterceptor {
    headers: HeaderMap,
}

impl HeaderInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalid names or values are skipped.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!(header = key, "skipping invalid interceptor header"),
        }
        self
    }
}

#[async_trait]
impl Interceptor for HeaderInterceptor {
    async fn intercept(
        &self,
        mut request: reqwest::Request,
        next: Next<'_>,
    ) -> Result<reqwest::Response, TransportError> {
        for (name, value) in &self.headers {
            request.headers_mut().insert(name.clone(), value.clone());
        }
        next.run(request).await
    }
}
