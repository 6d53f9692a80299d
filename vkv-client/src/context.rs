//! # Execution Context
//!
//! Purpose: Carry cancellation and an optional deadline for every call made
//! through one [`Client`](crate::Client).
//!
//! Each client owns its own context; clones share the cancellation flag so
//! the embedding application can keep a handle and cancel from elsewhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::OperationError;

#[derive(Debug)]
struct ContextInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

/// Cancellation/deadline carrier shared by all calls of one client.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::build(None)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(Instant::now() + timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Context {
            inner: Arc::new(ContextInner {
                cancelled: AtomicBool::new(false),
                deadline,
            }),
        }
    }

    /// Cancels this context and every clone of it. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline; `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the error a call would fail with right now, if any.
    ///
    /// Cancellation takes precedence over an elapsed deadline.
    pub fn err(&self) -> Option<OperationError> {
        if self.is_cancelled() {
            return Some(OperationError::Cancelled);
        }
        match self.remaining() {
            Some(left) if left.is_zero() => Some(OperationError::DeadlineExceeded),
            _ => None,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_never_errors() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = Context::background();
        let handle = ctx.clone();
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.err(), Some(OperationError::Cancelled)));
    }

    #[test]
    fn elapsed_deadline_reports_exceeded() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert!(matches!(ctx.err(), Some(OperationError::DeadlineExceeded)));
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_millis(1));
        ctx.cancel();
        assert!(matches!(ctx.err(), Some(OperationError::Cancelled)));
    }

    #[test]
    fn future_deadline_is_still_open() {
        let ctx = Context::with_timeout(Duration::from_secs(60));
        assert!(ctx.err().is_none());
        assert!(ctx.remaining().expect("deadline") > Duration::from_secs(30));
    }
}
