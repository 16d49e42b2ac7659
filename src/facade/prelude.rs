//! Minimal prelude for application code.

pub use crate::batch::{Batch, BatchResult};
pub use crate::client::Client;
pub use crate::config::Config;
pub use crate::context::{CancelHandle, Context};
pub use crate::error::{Error, StatusError};
pub use crate::pool::{Submission, WorkerPool};
pub use crate::request::{Body, Request, Response};
pub use crate::Result;
