use super::auth::Credentials;
use crate::batch::Batch;
use crate::config::Config;
use crate::context::Context;
use crate::pool::WorkerPool;
use crate::recycle::{ObjectPool, PoolStats};
use crate::request::state::RequestState;
use crate::request::Request;
use crate::transport::{HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Entry point: owns the transport, base URL, global headers, auth state and
/// the request object pool.
///
/// Cloning is cheap and every clone shares the same state, including auth
/// changes made through any of them.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    base_url: String,
    global_headers: HeaderMap,
    timeout: Option<Duration>,
    credentials: ArcSwap<Credentials>,
    requests: ObjectPool<RequestState>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        if !config.base_url.is_empty() {
            Url::parse(&config.base_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid base URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("base_url")
                        .with_details(config.base_url.clone())
                        .with_source("client_builder"),
                )
            })?;
        }

        let mut global_headers = HeaderMap::new();
        for (key, value) in &config.global_headers {
            let context = || {
                ErrorContext::new()
                    .with_field_path(format!("global_headers.{}", key))
                    .with_source("client_builder")
            };
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                Error::configuration_with_context(format!("invalid header name: {}", e), context())
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::configuration_with_context(format!("invalid header value: {}", e), context())
            })?;
            global_headers.insert(name, value);
        }

        let base: Arc<dyn Transport> = match &config.transport {
            Some(custom) => custom.clone(),
            None => Arc::new(HttpTransport::new(&config)?),
        };
        Ok(Self::assemble(config, base, global_headers))
    }

    fn assemble(config: Config, base: Arc<dyn Transport>, global_headers: HeaderMap) -> Self {
        let transport = config.interceptors.wrap(base);

        debug!(
            base_url = %config.base_url,
            interceptors = config.interceptors.len(),
            custom_transport = config.transport.is_some(),
            "client created"
        );

        Self {
            inner: Arc::new(ClientInner {
                transport,
                base_url: config.base_url,
                global_headers,
                timeout: (!config.timeout.is_zero()).then_some(config.timeout),
                credentials: ArcSwap::from_pointee(Credentials::default()),
                requests: ObjectPool::new(config.request_pool_capacity),
            }),
        }
    }

    pub fn get(&self, endpoint: &str) -> Request {
        self.request(Method::GET, endpoint)
    }

    pub fn post(&self, endpoint: &str) -> Request {
        self.request(Method::POST, endpoint)
    }

    pub fn put(&self, endpoint: &str) -> Request {
        self.request(Method::PUT, endpoint)
    }

    pub fn patch(&self, endpoint: &str) -> Request {
        self.request(Method::PATCH, endpoint)
    }

    pub fn delete(&self, endpoint: &str) -> Request {
        self.request(Method::DELETE, endpoint)
    }

    pub fn get_with_context(&self, ctx: &Context, endpoint: &str) -> Request {
        self.request_with_context(ctx, Method::GET, endpoint)
    }

    pub fn post_with_context(&self, ctx: &Context, endpoint: &str) -> Request {
        self.request_with_context(ctx, Method::POST, endpoint)
    }

    pub fn put_with_context(&self, ctx: &Context, endpoint: &str) -> Request {
        self.request_with_context(ctx, Method::PUT, endpoint)
    }

    pub fn patch_with_context(&self, ctx: &Context, endpoint: &str) -> Request {
        self.request_with_context(ctx, Method::PATCH, endpoint)
    }

    pub fn delete_with_context(&self, ctx: &Context, endpoint: &str) -> Request {
        self.request_with_context(ctx, Method::DELETE, endpoint)
    }

    /// A request bound to the background context.
    pub fn request(&self, method: Method, endpoint: &str) -> Request {
        Request::new(self.clone(), Context::background(), method, endpoint)
    }

    pub fn request_with_context(&self, ctx: &Context, method: Method, endpoint: &str) -> Request {
        Request::new(self.clone(), ctx.clone(), method, endpoint)
    }

    /// Authenticate every subsequent request with `Authorization: Bearer <token>`.
    ///
    /// Mutates this client (and all its clones) in place. Requests already
    /// executing keep the credentials they started with.
    pub fn set_bearer_token(&self, token: impl Into<String>) -> &Self {
        let token = token.into();
        self.inner.credentials.rcu(|current| Credentials {
            bearer_token: Some(token.clone()),
            ..Credentials::clone(current)
        });
        self
    }

    /// Authenticate with basic credentials. Ignored while a bearer token is set.
    pub fn with_basic_auth(&self, username: impl Into<String>, password: impl Into<String>) -> &Self {
        let basic = (username.into(), password.into());
        self.inner.credentials.rcu(|current| Credentials {
            basic: Some(basic.clone()),
            ..Credentials::clone(current)
        });
        self
    }

    pub fn clear_auth(&self) -> &Self {
        self.inner.credentials.store(Arc::new(Credentials::default()));
        self
    }

    /// Snapshot of the current auth state.
    pub fn credentials(&self) -> Arc<Credentials> {
        self.inner.credentials.load_full()
    }

    /// A fresh, empty batch bound to this client.
    pub fn batch(&self) -> Batch {
        Batch::new()
    }

    /// Start a worker pool with `workers` workers (0 means 10).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn pool(&self, workers: usize) -> WorkerPool {
        WorkerPool::start(workers)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Join the base URL and `endpoint`.
    ///
    /// With an empty base URL the endpoint is used verbatim and must be absolute.
    pub fn resolve_url(&self, endpoint: &str) -> Result<Url> {
        let joined = join_url(&self.inner.base_url, endpoint);
        Url::parse(&joined).map_err(|e| Error::UrlResolution {
            message: format!("invalid URL {:?}: {}", joined, e),
            source: Some(e),
        })
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.inner.requests.stats()
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    pub(crate) fn global_headers(&self) -> &HeaderMap {
        &self.inner.global_headers
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    pub(crate) fn acquire_state(&self) -> RequestState {
        self.inner.requests.acquire()
    }

    pub(crate) fn release_state(&self, state: RequestState) {
        self.inner.requests.release(state);
    }
}

impl Default for Client {
    /// A client with the default configuration and no base URL.
    fn default() -> Self {
        let config = Config::default();
        let base: Arc<dyn Transport> = match HttpTransport::new(&config) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                warn!(error = %e, "failed to build configured HTTP transport, using reqwest defaults");
                Arc::new(HttpTransport::from_client(reqwest::Client::new()))
            }
        };
        Self::assemble(config, base, HeaderMap::new())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("global_headers", &self.inner.global_headers.len())
            .field("timeout", &self.inner.timeout)
            .field("credentials", &*self.inner.credentials.load())
            .finish()
    }
}

/// Exactly one `/` between the base path and the endpoint. A query string on
/// the endpoint is kept as is.
fn join_url(base: &str, endpoint: &str) -> String {
    if base.is_empty() {
        return endpoint.to_string();
    }
    if endpoint.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
