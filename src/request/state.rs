use super::{Body, Response};
use crate::context::Context;
use crate::error::ErrorDetail;
use crate::recycle::Recycle;
use crate::{Error, Result};
use reqwest::Method;
use std::collections::HashMap;

pub(crate) type DetailDecoder = fn(&[u8]) -> Option<ErrorDetail>;
pub(crate) type SuccessHandler = Box<dyn FnOnce(&Response) + Send>;
pub(crate) type ErrorHandler = Box<dyn FnOnce(&Error) + Send>;

/// Everything a request accumulates between creation and its terminal read.
/// Lives in the client's object pool between uses.
pub(crate) struct RequestState {
    pub(crate) method: Method,
    pub(crate) endpoint: String,
    pub(crate) ctx: Context,
    /// Keyed by lowercased header name.
    pub(crate) headers: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
    pub(crate) body: Option<Body>,
    pub(crate) error_decoder: Option<DetailDecoder>,
    pub(crate) on_success: Option<SuccessHandler>,
    pub(crate) on_error: Option<ErrorHandler>,
    /// `Some` once executed.
    pub(crate) outcome: Option<Result<Response>>,
}

impl Default for RequestState {
    fn default() -> Self {
        Self {
            method: Method::GET,
            endpoint: String::new(),
            ctx: Context::background(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: None,
            error_decoder: None,
            on_success: None,
            on_error: None,
            outcome: None,
        }
    }
}

impl Recycle for RequestState {
    fn reset(&mut self) {
        self.method = Method::GET;
        self.endpoint.clear();
        self.ctx = Context::background();
        self.headers.clear();
        self.query.clear();
        self.body = None;
        self.error_decoder = None;
        self.on_success = None;
        self.on_error = None;
        self.outcome = None;
    }
}

impl RequestState {
    pub(crate) fn is_executed(&self) -> bool {
        self.outcome.is_some()
    }
}
