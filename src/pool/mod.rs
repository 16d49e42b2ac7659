//! Fixed-size worker pool for requests.
//!
//! Workers share one job channel, so no more than `workers` requests are in
//! flight at a time; `submit` waits while every worker is busy and the queue
//! slot is taken. Each submission resolves to exactly one outcome through its
//! [`Submission`].

use crate::request::{Request, Response};
use crate::{Error, Result};
use futures::future::join_all;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Worker count used when zero is requested.
pub const DEFAULT_WORKERS: usize = 10;

struct Job {
    request: Request,
    reply: oneshot::Sender<Result<Response>>,
}

type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

pub struct WorkerPool {
    jobs: mpsc::Sender<Job>,
    shutdown: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` workers on the current Tokio runtime.
    pub fn start(workers: usize) -> Self {
        let count = if workers == 0 { DEFAULT_WORKERS } else { workers };
        let (tx, rx) = mpsc::channel(1);
        let queue: JobQueue = Arc::new(Mutex::new(rx));
        let shutdown = CancellationToken::new();

        let handles = (0..count)
            .map(|id| tokio::spawn(run_worker(id, queue.clone(), shutdown.clone())))
            .collect();
        info!(workers = count, "worker pool started");

        Self {
            jobs: tx,
            shutdown,
            workers: handles,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Queue `request` for execution.
    ///
    /// Waits for queue space. The returned [`Submission`] yields the
    /// request's outcome, [`Error::TaskFailed`] if one of its callbacks
    /// panicked, or [`Error::PoolShutDown`] if the pool stops before running
    /// it.
    pub async fn submit(&self, request: Request) -> Submission {
        let (reply, outcome) = oneshot::channel();
        if self.jobs.send(Job { request, reply }).await.is_err() {
            // Every worker is gone; the job (and its reply sender) was dropped.
            warn!("submit on a worker pool with no running workers");
        }
        Submission { outcome }
    }

    /// Stop accepting work and wait for every worker to exit.
    ///
    /// Workers finish the request they are running. Queued requests that no
    /// worker picked up resolve to [`Error::PoolShutDown`].
    pub async fn wait(self) {
        let Self {
            jobs,
            shutdown,
            workers,
        } = self;
        shutdown.cancel();
        drop(jobs);

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                warn!(error = %e, "worker exited abnormally");
            }
        }
        info!("worker pool shut down");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("shut_down", &self.shutdown.is_cancelled())
            .finish()
    }
}

async fn run_worker(id: usize, queue: JobQueue, shutdown: CancellationToken) {
    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            job = next_job(&queue) => match job {
                Some(job) => job,
                None => break,
            },
        };

        let Job { request, reply } = job;
        debug!(worker = id, method = %request.method(), endpoint = request.endpoint(), "worker picked up request");
        // A panicking callback takes down its own task, never the worker.
        let outcome = match tokio::spawn(request.result()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(worker = id, error = %e, "request task failed");
                Err(Error::TaskFailed(e.to_string()))
            }
        };
        if reply.send(outcome).is_err() {
            debug!(worker = id, "submission dropped before completion");
        }
    }
    debug!(worker = id, "worker stopped");
}

async fn next_job(queue: &JobQueue) -> Option<Job> {
    queue.lock().await.recv().await
}

/// Pending outcome of a submitted request.
#[derive(Debug)]
pub struct Submission {
    outcome: oneshot::Receiver<Result<Response>>,
}

impl Future for Submission {
    type Output = Result<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.outcome)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(Error::PoolShutDown)))
    }
}
