//! Concurrent execution of a group of requests.
//!
//! A [`Batch`] collects requests, runs them all at once (one task each) and
//! returns a [`BatchResult`] whose slots line up with the order the requests
//! were added, regardless of completion order.
//!
//! ```rust,no_run
//! use fluent_client::{Client, Config, Context};
//!
//! # async fn run() -> fluent_client::Result<()> {
//! let client = Client::new(Config::new().with_base_url("https://api.example.com"))?;
//! let result = client
//!     .batch()
//!     .add(client.get("/posts/1"))
//!     .add(client.get("/posts/2"))
//!     .execute(&Context::background())
//!     .await;
//! assert_eq!(result.len(), 2);
//! # Ok(())
//! # }
//! ```

mod executor;

pub use executor::{Batch, BatchResult};
