//! The single-use request object.
//!
//! A [`Request`] is created by a [`Client`], configured through chained
//! setters, executed at most once, and handed back to the client's object
//! pool when it is consumed by [`Request::result`] / [`Request::into`] or
//! dropped. Ownership guarantees nothing can observe a request after its
//! terminal read.

mod body;
mod execution;
mod response;
pub(crate) mod state;

pub use body::Body;
pub use response::Response;

use crate::client::Client;
use crate::context::Context;
use crate::error::ErrorDetail;
use crate::{Error, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use state::RequestState;
use std::fmt;
use tokio::io::AsyncRead;

pub struct Request {
    client: Client,
    state: RequestState,
}

impl Request {
    pub(crate) fn new(client: Client, ctx: Context, method: Method, endpoint: &str) -> Self {
        let mut state = client.acquire_state();
        state.method = method;
        state.endpoint.push_str(endpoint);
        state.ctx = ctx;
        Self { client, state }
    }

    pub fn set_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.state
            .headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn set_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.state
                .headers
                .insert(k.into().to_ascii_lowercase(), v.into());
        }
        self
    }

    pub fn set_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.query.insert(key.into(), value.into());
        self
    }

    pub fn set_query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state
            .query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Raw bytes or text; see [`Body`] for the other forms.
    pub fn set_body(mut self, body: impl Into<Body>) -> Self {
        self.state.body = Some(body.into());
        self
    }

    /// Serialized to JSON when the request executes.
    pub fn set_json<T>(self, value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        self.set_body(Body::json(value))
    }

    pub fn set_reader<R>(self, reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        self.set_body(Body::reader(reader))
    }

    /// Decode failure bodies into `E`.
    ///
    /// Best-effort: if the body does not decode, the failure surfaces
    /// unchanged. On success the value is available through
    /// [`StatusError::detail`](crate::StatusError::detail) and is appended to
    /// the failure message.
    pub fn set_error<E>(mut self) -> Self
    where
        E: DeserializeOwned + fmt::Debug + Send + Sync + 'static,
    {
        self.state.error_decoder = Some(ErrorDetail::decode::<E>);
        self
    }

    /// Called once with the response if execution succeeds. Runs immediately
    /// when the request has already succeeded.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Response) + Send + 'static,
    {
        match &self.state.outcome {
            Some(Ok(resp)) => f(resp),
            Some(Err(_)) => {}
            None => self.state.on_success = Some(Box::new(f)),
        }
        self
    }

    /// Called once with the failure if execution fails. Runs immediately
    /// when the request has already failed.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        match &self.state.outcome {
            Some(Err(err)) => f(err),
            Some(Ok(_)) => {}
            None => self.state.on_error = Some(Box::new(f)),
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.state.method
    }

    pub fn endpoint(&self) -> &str {
        &self.state.endpoint
    }

    pub fn context(&self) -> &Context {
        &self.state.ctx
    }

    pub fn is_executed(&self) -> bool {
        self.state.is_executed()
    }

    /// Run the request if it has not run yet and borrow the cached outcome.
    ///
    /// Repeated calls never touch the network again.
    pub async fn execute(&mut self) -> std::result::Result<&Response, &Error> {
        self.settle(None).await.as_ref()
    }

    /// Terminal read: run if needed, return the outcome and recycle the request.
    pub async fn result(self) -> Result<Response> {
        self.finish(None).await
    }

    /// Terminal read that decodes a successful body into `T`.
    pub async fn into<T: DeserializeOwned>(self) -> Result<T> {
        let resp = self.result().await?;
        resp.json()
    }

    /// Like [`Request::result`], additionally bounded by `scope`.
    pub(crate) async fn result_within(self, scope: &Context) -> Result<Response> {
        self.finish(Some(scope)).await
    }

    async fn settle(&mut self, scope: Option<&Context>) -> &Result<Response> {
        let outcome = match self.state.outcome.take() {
            Some(cached) => cached,
            None => self.perform(scope).await,
        };
        self.state.outcome.insert(outcome)
    }

    async fn finish(mut self, scope: Option<&Context>) -> Result<Response> {
        // `self` drops at the end of this call, returning its state to the pool.
        match self.state.outcome.take() {
            Some(cached) => cached,
            None => self.perform(scope).await,
        }
    }
}

impl Drop for Request {
    fn drop(&mut self) {
        let state = std::mem::take(&mut self.state);
        self.client.release_state(state);
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.state.method)
            .field("endpoint", &self.state.endpoint)
            .field("headers", &self.state.headers.len())
            .field("query", &self.state.query)
            .field("body", &self.state.body)
            .field("executed", &self.state.is_executed())
            .finish()
    }
}
