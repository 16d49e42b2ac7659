//! Batch executor.

use crate::context::Context;
use crate::request::{Request, Response};
use crate::{Error, Result};
use futures::future::join_all;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Index-aligned outcomes of a batch: slot `i` belongs to the `i`-th request
/// added, and exactly one of `responses[i]` / `errors[i]` is set.
#[derive(Debug)]
pub struct BatchResult {
    pub responses: Vec<Option<Response>>,
    pub errors: Vec<Option<Error>>,
    pub execution_time: Duration,
}

impl BatchResult {
    fn with_capacity(n: usize) -> Self {
        Self {
            responses: Vec::with_capacity(n),
            errors: Vec::with_capacity(n),
            execution_time: Duration::ZERO,
        }
    }

    fn push(&mut self, outcome: Result<Response>) {
        match outcome {
            Ok(resp) => {
                self.responses.push(Some(resp));
                self.errors.push(None);
            }
            Err(err) => {
                self.responses.push(None);
                self.errors.push(Some(err));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.errors.iter().all(Option::is_none)
    }

    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_some()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_some()).count()
    }

    pub fn into_parts(self) -> (Vec<Option<Response>>, Vec<Option<Error>>) {
        (self.responses, self.errors)
    }

    /// One `Result` per request, in insertion order.
    pub fn into_results(self) -> Vec<Result<Response>> {
        self.responses
            .into_iter()
            .zip(self.errors)
            .map(|slot| match slot {
                (Some(resp), _) => Ok(resp),
                (None, Some(err)) => Err(err),
                (None, None) => Err(Error::TaskFailed("missing batch outcome".to_string())),
            })
            .collect()
    }
}

/// Fan-out / fan-in executor for independent requests.
#[derive(Debug, Default)]
pub struct Batch {
    requests: Vec<Request>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, request: Request) -> Self {
        self.requests.push(request);
        self
    }

    pub fn push(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Run every request concurrently and wait for all of them.
    ///
    /// Each request stays bound to its own context; `ctx` additionally bounds
    /// the whole batch. Never returns early: every slot is filled.
    pub async fn execute(self, ctx: &Context) -> BatchResult {
        let start = Instant::now();
        let total = self.requests.len();
        debug!(requests = total, "executing batch");

        let handles: Vec<_> = self
            .requests
            .into_iter()
            .map(|request| {
                let ctx = ctx.clone();
                tokio::spawn(async move { request.result_within(&ctx).await })
            })
            .collect();

        let mut result = BatchResult::with_capacity(total);
        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            let outcome = joined.unwrap_or_else(|e| {
                warn!(index, error = %e, "batch task failed");
                Err(Error::TaskFailed(e.to_string()))
            });
            result.push(outcome);
        }
        result.execution_time = start.elapsed();

        debug!(
            requests = total,
            failures = result.failure_count(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            "batch finished"
        );
        result
    }
}

impl Extend<Request> for Batch {
    fn extend<I: IntoIterator<Item = Request>>(&mut self, iter: I) {
        self.requests.extend(iter);
    }
}
