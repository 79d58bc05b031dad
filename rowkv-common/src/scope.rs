//! # Call Scopes
//!
//! Purpose: Bound every client request by a deadline and a cancellation flag,
//! created fresh for one call and released when the call returns.
//!
//! ## Design Principles
//! 1. **RAII Release**: Dropping a `CallScope` cancels it, on every return path.
//! 2. **Cooperative Checks**: Clients call `check()` at points where they can
//!    stop; the scope never interrupts a thread on its own.
//! 3. **Cheap Observers**: `CancelToken` shares the flag so work handed off to
//!    another thread can see that the caller has gone away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{ClientError, ClientResult};

/// Deadline-bound cancellation scope for a single client call.
#[derive(Debug)]
pub struct CallScope {
    // `None` when the timeout overflows `Instant`; treated as unbounded.
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallScope {
    /// Creates a scope that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        CallScope {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the absolute deadline, if bounded.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns time left before the deadline, saturating at zero.
    ///
    /// Returns `None` for an unbounded scope.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns true once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Returns true once the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Cancels the scope early. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Fails when the scope is cancelled or past its deadline.
    pub fn check(&self) -> ClientResult<()> {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        if self.is_expired() {
            return Err(ClientError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Returns a token that observes this scope's cancellation.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            deadline: self.deadline,
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Shared, clonable view of a `CallScope`.
#[derive(Debug, Clone)]
pub struct CancelToken {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Returns true when the owning scope was cancelled or dropped.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Same as `CallScope::check`, usable after the scope moved threads.
    pub fn check(&self) -> ClientResult<()> {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ClientError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scope_passes_check() {
        let scope = CallScope::with_timeout(Duration::from_secs(5));
        assert!(scope.check().is_ok());
        assert!(scope.remaining().unwrap() <= Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_already_expired() {
        let scope = CallScope::with_timeout(Duration::ZERO);
        assert!(scope.is_expired());
        assert_eq!(scope.check(), Err(ClientError::DeadlineExceeded));
        assert_eq!(scope.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn cancel_wins_over_deadline() {
        let scope = CallScope::with_timeout(Duration::ZERO);
        scope.cancel();
        assert_eq!(scope.check(), Err(ClientError::Cancelled));
    }

    #[test]
    fn drop_cancels_outstanding_tokens() {
        let token = {
            let scope = CallScope::with_timeout(Duration::from_secs(5));
            let token = scope.token();
            assert!(token.check().is_ok());
            token
        };
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(ClientError::Cancelled));
    }

    #[test]
    fn overflowing_timeout_is_unbounded() {
        let scope = CallScope::with_timeout(Duration::MAX);
        assert_eq!(scope.deadline(), None);
        assert_eq!(scope.remaining(), None);
        assert!(scope.check().is_ok());
    }
}
