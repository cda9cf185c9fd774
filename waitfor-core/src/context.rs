//! Cancellation and deadlines for resource tests.
//!
//! A [`Context`] is handed to every [`Resource::test`](crate::Resource::test)
//! call. It carries a cancellation token and an optional deadline; whichever
//! fires first aborts the work bound to it through [`Context::run`].

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Why a [`Context`] stopped the work bound to it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context was cancelled.
    #[error("context canceled")]
    Canceled,
    /// The context deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellable, optionally time-bounded execution context.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled on its own and has no deadline.
    pub fn background() -> Self {
        Default::default()
    }

    /// A context that expires `timeout` from now.
    ///
    /// A timeout too large to represent yields a context without deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::background(),
        }
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derives a context that is cancelled together with `self`, and may
    /// additionally be cancelled on its own.
    ///
    /// The child keeps the parent deadline unless `timeout` expires sooner.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout.and_then(|t| Instant::now().checked_add(t))) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called on this context or one
    /// of its parents.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The instant past which work bound to this context is abandoned.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reports why the context is done, or `None` while it is still live.
    ///
    /// Cancellation wins over an elapsed deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `fut` to completion unless the context is cancelled or its
    /// deadline elapses first, in which case `fut` is dropped.
    ///
    /// An already-done context returns its error without polling `fut`.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(ContextError::Canceled),
            () = expired => Err(ContextError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
