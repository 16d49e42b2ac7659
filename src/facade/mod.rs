//! Process-wide default client.
//!
//! Free functions mirror the [`Client`] API against a lazily created shared
//! client. The default client is configured from `FLUENT_HTTP_*` environment
//! variables on first use and can be replaced with [`set_default_client`].
//! Requests already created keep the client they were created from.

pub mod prelude;

use crate::batch::Batch;
use crate::client::Client;
use crate::config::Config;
use crate::context::Context;
use crate::pool::WorkerPool;
use crate::request::Request;
use crate::Result;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{info, warn};

static DEFAULT_CLIENT: Lazy<ArcSwap<Client>> = Lazy::new(|| {
    let client = Client::new(Config::from_env()).unwrap_or_else(|e| {
        warn!(error = %e, "invalid environment configuration, using defaults");
        Client::default()
    });
    ArcSwap::from_pointee(client)
});

/// The current default client. Clones share its state.
pub fn default_client() -> Client {
    Client::clone(&DEFAULT_CLIENT.load())
}

/// Replace the default client with one built from `config`.
///
/// On error the current default client stays in place.
pub fn set_default_client(config: Config) -> Result<()> {
    let client = Client::new(config)?;
    info!(base_url = client.base_url(), "default client replaced");
    DEFAULT_CLIENT.store(Arc::new(client));
    Ok(())
}

pub fn get(endpoint: &str) -> Request {
    default_client().get(endpoint)
}

pub fn post(endpoint: &str) -> Request {
    default_client().post(endpoint)
}

pub fn put(endpoint: &str) -> Request {
    default_client().put(endpoint)
}

pub fn patch(endpoint: &str) -> Request {
    default_client().patch(endpoint)
}

pub fn delete(endpoint: &str) -> Request {
    default_client().delete(endpoint)
}

pub fn get_with_context(ctx: &Context, endpoint: &str) -> Request {
    default_client().get_with_context(ctx, endpoint)
}

pub fn post_with_context(ctx: &Context, endpoint: &str) -> Request {
    default_client().post_with_context(ctx, endpoint)
}

pub fn put_with_context(ctx: &Context, endpoint: &str) -> Request {
    default_client().put_with_context(ctx, endpoint)
}

pub fn patch_with_context(ctx: &Context, endpoint: &str) -> Request {
    default_client().patch_with_context(ctx, endpoint)
}

pub fn delete_with_context(ctx: &Context, endpoint: &str) -> Request {
    default_client().delete_with_context(ctx, endpoint)
}

/// Set a bearer token on the default client.
pub fn set_bearer_token(token: impl Into<String>) {
    default_client().set_bearer_token(token);
}

/// Set basic credentials on the default client.
pub fn with_basic_auth(username: impl Into<String>, password: impl Into<String>) {
    default_client().with_basic_auth(username, password);
}

pub fn batch() -> Batch {
    default_client().batch()
}

/// Start a worker pool; must be called from within a Tokio runtime.
pub fn pool(workers: usize) -> WorkerPool {
    default_client().pool(workers)
}
