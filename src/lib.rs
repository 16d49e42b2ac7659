//! # fluent-client
//!
//! A fluent HTTP client built around pooled, single-use request objects.
//!
//! ## Overview
//!
//! A [`Client`] owns the transport, base URL, global headers and auth state.
//! Each call to [`Client::get`] (or `post`, `put`, ...) hands out a
//! [`Request`] drawn from the client's object pool. The request is configured
//! with chained setters, executed at most once, and returned to the pool when
//! its outcome is read or it is dropped.
//!
//! Beyond single requests the crate offers two executors:
//!
//! - [`Batch`]: run a group of requests concurrently, results aligned with
//!   insertion order;
//! - [`WorkerPool`]: a fixed number of workers fed through a bounded queue.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fluent_client::{Client, Config};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Post {
//!     id: u64,
//!     title: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct ApiError {
//!     message: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> fluent_client::Result<()> {
//!     let client = Client::new(Config::new().with_base_url("https://api.example.com"))?;
//!     client.set_bearer_token("my-token");
//!
//!     let post: Post = client
//!         .get("/posts/1")
//!         .set_query_param("expand", "author")
//!         .set_error::<ApiError>()
//!         .into()
//!         .await?;
//!     println!("{}: {}", post.id, post.title);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client handle, auth state, request factory |
//! | [`request`] | Request builder, body forms, response |
//! | [`batch`] | Concurrent fan-out / fan-in |
//! | [`pool`] | Bounded worker pool |
//! | [`context`] | Cancellation and deadlines |
//! | [`transport`] | Transport trait and the reqwest-backed default |
//! | [`interceptors`] | Transport decorators (logging, headers, retry) |
//! | [`facade`] | Process-wide default client |

pub mod batch;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod facade;
pub mod interceptors;
pub mod pool;
pub mod recycle;
pub mod request;
pub mod transport;

pub use batch::{Batch, BatchResult};
pub use client::{Client, Credentials};
pub use config::Config;
pub use context::{CancelHandle, Context, ContextError};
pub use error::{Error, ErrorContext, ErrorDetail, StatusError};
pub use interceptors::{
    HeaderInterceptor, Interceptor, InterceptorPipeline, LoggingInterceptor, Next,
    RetryInterceptor,
};
pub use pool::{Submission, WorkerPool};
pub use recycle::PoolStats;
pub use request::{Body, Request, Response};
pub use transport::{HttpTransport, Transport, TransportError};

pub use facade::{default_client, set_default_client};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
