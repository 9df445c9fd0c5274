//! Operation context carrying the caller's cancellation signal
//!
//! Every public catalogue operation receives an [`OperationContext`] and checks it
//! once, before doing any work. A context that is cancelled while an operation is
//! already running has no effect on that operation.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Reason an operation refused to start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    /// The caller cancelled the token
    Cancelled,
    /// The context deadline has passed
    DeadlineExceeded,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellationReason::Cancelled => write!(f, "context cancelled"),
            CancellationReason::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

/// Cancellation token plus optional deadline
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context that is never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Wrap an existing token, typically shared with a transport layer
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a context that expires `timeout` from now
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context with an absolute deadline; the earlier deadline wins
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The underlying token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Pre-flight check performed at operation entry
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(CatalogError::cancelled(CancellationReason::Cancelled));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(CatalogError::cancelled(CancellationReason::DeadlineExceeded));
            }
        }
        Ok(())
    }
}
