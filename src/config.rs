//! Client configuration.

use crate::interceptors::{Interceptor, InterceptorPipeline};
use crate::transport::Transport;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Settings consumed by [`Client::new`](crate::Client::new).
///
/// Connection-pool fields are handed to the default [`HttpTransport`](crate::transport::HttpTransport)
/// and have no effect when a custom `transport` is supplied.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    /// Upper bound on a whole round trip. `Duration::ZERO` disables it.
    pub timeout: Duration,
    pub global_headers: HashMap<String, String>,
    /// Replaces the default network layer.
    pub transport: Option<Arc<dyn Transport>>,
    /// Wrapped around whichever transport is in use; first added runs outermost.
    pub interceptors: InterceptorPipeline,
    /// Caps `max_idle_conns_per_host`; reqwest only pools per host.
    pub max_idle_conns: usize,
    pub max_idle_conns_per_host: usize,
    /// Accepted for completeness; reqwest does not limit connections per host.
    pub max_conns_per_host: usize,
    pub idle_conn_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub response_header_timeout: Duration,
    pub disable_keep_alives: bool,
    pub disable_compression: bool,
    pub proxy_url: Option<String>,
    /// Number of recycled request objects kept per client.
    pub request_pool_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            global_headers: HashMap::new(),
            transport: None,
            interceptors: InterceptorPipeline::new(),
            max_idle_conns: 100,
            max_idle_conns_per_host: 10,
            max_conns_per_host: 0,
            idle_conn_timeout: Duration::from_secs(90),
            tls_handshake_timeout: Duration::from_secs(10),
            response_header_timeout: Duration::from_secs(10),
            disable_keep_alives: false,
            disable_compression: false,
            proxy_url: None,
            request_pool_capacity: 256,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("global_headers", &self.global_headers)
            .field("custom_transport", &self.transport.is_some())
            .field("interceptors", &self.interceptors.len())
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_idle_conns_per_host", &self.max_idle_conns_per_host)
            .field("max_conns_per_host", &self.max_conns_per_host)
            .field("idle_conn_timeout", &self.idle_conn_timeout)
            .field("tls_handshake_timeout", &self.tls_handshake_timeout)
            .field("response_header_timeout", &self.response_header_timeout)
            .field("disable_keep_alives", &self.disable_keep_alives)
            .field("disable_compression", &self.disable_compression)
            .field("proxy_url", &self.proxy_url)
            .field("request_pool_capacity", &self.request_pool_capacity)
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `FLUENT_HTTP_*` environment variables.
    ///
    /// - `FLUENT_HTTP_BASE_URL`
    /// - `FLUENT_HTTP_TIMEOUT_SECS`
    /// - `FLUENT_HTTP_POOL_MAX_IDLE_PER_HOST`
    /// - `FLUENT_HTTP_POOL_IDLE_TIMEOUT_SECS`
    /// - `FLUENT_HTTP_PROXY_URL`
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        let mut cfg = Self::default();
        if let Some(base_url) = lookup("FLUENT_HTTP_BASE_URL") {
            cfg.base_url = base_url;
        }
        if let Some(timeout) = secs("FLUENT_HTTP_TIMEOUT_SECS") {
            cfg.timeout = timeout;
        }
        if let Some(n) = lookup("FLUENT_HTTP_POOL_MAX_IDLE_PER_HOST")
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            cfg.max_idle_conns_per_host = n;
        }
        if let Some(idle) = secs("FLUENT_HTTP_POOL_IDLE_TIMEOUT_SECS") {
            cfg.idle_conn_timeout = idle;
        }
        if let Some(proxy) = lookup("FLUENT_HTTP_PROXY_URL").filter(|s| !s.is_empty()) {
            cfg.proxy_url = Some(proxy);
        }
        cfg
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_global_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.global_headers = headers;
        self
    }

    pub fn with_global_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.global_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors = self.interceptors.with(interceptor);
        self
    }

    pub fn with_max_idle_conns(mut self, n: usize) -> Self {
        self.max_idle_conns = n;
        self
    }

    pub fn with_max_idle_conns_per_host(mut self, n: usize) -> Self {
        self.max_idle_conns_per_host = n;
        self
    }

    pub fn with_idle_conn_timeout(mut self, timeout: Duration) -> Self {
        self.idle_conn_timeout = timeout;
        self
    }

    pub fn with_tls_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.tls_handshake_timeout = timeout;
        self
    }

    pub fn with_response_header_timeout(mut self, timeout: Duration) -> Self {
        self.response_header_timeout = timeout;
        self
    }

    pub fn with_disable_keep_alives(mut self, disable: bool) -> Self {
        self.disable_keep_alives = disable;
        self
    }

    pub fn with_disable_compression(mut self, disable: bool) -> Self {
        self.disable_compression = disable;
        self
    }

    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn with_request_pool_capacity(mut self, capacity: usize) -> Self {
        self.request_pool_capacity = capacity;
        self
    }
}
