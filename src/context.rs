//! Cancellation and deadline scoping for requests.
//!
//! A [`Context`] is bound to a [`Request`](crate::Request) when it is created and
//! is consulted for the whole network exchange, including the body read. Child
//! contexts are canceled together with their parent.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation scope with an optional deadline.
///
/// `Context::background()` never ends and allocates nothing.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

/// Cancels the context it was created with (and all of its children).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Context {
    /// The root context: no cancellation, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child that can be canceled independently of `self`.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let token = match &self.token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let handle = CancelHandle {
            token: token.clone(),
        };
        (
            Context {
                token: Some(token),
                deadline: self.deadline,
            },
            handle,
        )
    }

    /// Derive a child that expires after `timeout` (or earlier, if the parent does).
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child that expires at `deadline` (or earlier, if the parent does).
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelHandle) {
        let (mut child, handle) = self.with_cancel();
        child.deadline = Some(match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        });
        (child, handle)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check; `None` while the context is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is canceled or its deadline passes.
    /// Never resolves for a background context.
    pub async fn done(&self) -> ContextError {
        match (&self.token, self.deadline) {
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => ContextError::Canceled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            (Some(token), None) => {
                token.cancelled().await;
                ContextError::Canceled
            }
            (None, Some(deadline)) => {
                tokio::time::sleep_until(deadline).await;
                ContextError::DeadlineExceeded
            }
            (None, None) => std::future::pending().await,
        }
    }
}
