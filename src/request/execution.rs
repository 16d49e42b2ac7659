//! Single-attempt execution of a request.

use super::{Request, Response};
use crate::context::Context;
use crate::error::StatusError;
use crate::transport::TransportError;
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, debug_span, Instrument};
use url::Url;
use uuid::Uuid;

impl Request {
    /// Perform the one network round trip and fire the completion callbacks.
    pub(super) async fn perform(&mut self, scope: Option<&Context>) -> Result<Response> {
        let request_id = Uuid::new_v4();
        let span = debug_span!(
            "http_request",
            %request_id,
            method = %self.state.method,
            endpoint = %self.state.endpoint,
        );
        let outcome = self.exchange(scope).instrument(span).await;

        match &outcome {
            Ok(resp) => {
                if let Some(f) = self.state.on_success.take() {
                    f(resp);
                }
            }
            Err(err) => {
                if let Some(f) = self.state.on_error.take() {
                    f(err);
                }
            }
        }
        outcome
    }

    async fn exchange(&mut self, scope: Option<&Context>) -> Result<Response> {
        let client = self.client.clone();
        let method = self.state.method.clone();

        let mut url = client.resolve_url(&self.state.endpoint)?;
        merge_query(&mut url, &self.state.query);

        let body = match self.state.body.take() {
            Some(body) => Some(body.into_bytes().await?),
            None => None,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in client.global_headers() {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &self.state.headers {
            headers.insert(header_name(name)?, header_value(name, value)?);
        }
        if let Some(auth) = client.credentials().authorization() {
            let mut value = header_value("authorization", &auth)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let url_string = url.to_string();
        let mut request = reqwest::Request::new(method.clone(), url);
        *request.headers_mut() = headers;
        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }

        let fail = |source: TransportError| Error::Transport {
            method: method.clone(),
            url: url_string.clone(),
            source,
        };

        let ctx = self.state.ctx.clone();
        if let Some(cause) = ctx.err().or_else(|| scope.and_then(Context::err)) {
            return Err(fail(cause.into()));
        }

        let start = Instant::now();
        let transport = client.transport();
        // The response (and its connection) is owned by this future, so every
        // exit path below releases it.
        let exchange = async {
            let resp = transport.round_trip(request).await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?;
            Ok::<_, TransportError>((status, headers, body))
        };
        let outer = async {
            match scope {
                Some(scope) => scope.done().await,
                None => std::future::pending().await,
            }
        };
        // Bounds the whole chain, custom transports and interceptors included.
        let expiry = async {
            match client.timeout() {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        let (status, headers, body) = tokio::select! {
            res = exchange => res.map_err(&fail)?,
            cause = ctx.done() => return Err(fail(cause.into())),
            cause = outer => return Err(fail(cause.into())),
            limit = expiry => return Err(fail(TransportError::Timeout(limit))),
        };

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "response received"
        );

        if status.as_u16() >= 400 {
            let detail = self.state.error_decoder.and_then(|decode| decode(&body));
            return Err(Error::Status(Box::new(StatusError {
                status: status.as_u16(),
                url: url_string,
                method,
                body,
                detail,
            })));
        }

        Ok(Response::new(status, headers, body))
    }
}

/// Per-request params replace every existing value of the same key; the
/// resulting pairs are ordered by key.
fn merge_query(url: &mut Url, params: &HashMap<String, String>) {
    if params.is_empty() {
        return;
    }
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.contains_key(k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        Error::request_construction(
            format!("invalid header name: {}", e),
            ErrorContext::new()
                .with_field_path(format!("headers.{}", name))
                .with_source("request_builder"),
        )
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        Error::request_construction(
            format!("invalid header value: {}", e),
            ErrorContext::new()
                .with_field_path(format!("headers.{}", name))
                .with_source("request_builder"),
        )
    })
}
