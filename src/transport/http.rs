use super::{Transport, TransportError};
use crate::config::Config;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::time::Duration;
use tracing::debug;

/// Default transport backed by a pooled `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
    response_header_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Build the connection pool from the transport-level knobs of `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let idle_per_host = if config.disable_keep_alives {
            0
        } else {
            config.max_idle_conns_per_host.min(config.max_idle_conns)
        };

        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(idle_per_host)
            .pool_idle_timeout(non_zero(config.idle_conn_timeout));

        if let Some(connect) = non_zero(config.tls_handshake_timeout) {
            builder = builder.connect_timeout(connect);
        }
        if config.disable_compression {
            builder = builder.no_gzip();
        }
        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy: {}", e),
                    ErrorContext::new()
                        .with_field_path("proxy_url")
                        .with_details(proxy_url.clone())
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to build HTTP client: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;

        Ok(Self::from_client(client).with_response_header_timeout(non_zero(
            config.response_header_timeout,
        )))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            response_header_timeout: None,
        }
    }

    pub fn with_response_header_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_header_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn round_trip(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<reqwest::Response, TransportError> {
        debug!(method = %request.method(), url = %request.url(), "sending request");
        // `execute` resolves once headers arrive; the body is read by the caller.
        let send = self.client.execute(request);
        match self.response_header_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| TransportError::ResponseHeaderTimeout(limit))?
                .map_err(TransportError::Http),
            None => send.await.map_err(TransportError::Http),
        }
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    if d.is_zero() {
        None
    } else {
        Some(d)
    }
}
