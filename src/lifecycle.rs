// SPDX-License-Identifier: MIT
//! Single-flight request lifecycle.
//!
//! The lifecycle manager is the single owner and allocator of request tokens.
//! Exactly one token is live at a time: beginning a new request invalidates
//! the previous one, so any async work that resolves late can check its
//! borrowed token and discard its own result. This is the ordering guarantee
//! that stops a slow, stale response from overwriting a faster, newer one.
//!
//! Cancellation is cooperative — an in-flight network call still completes,
//! but its result is dropped once its token is no longer current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

/// A handle tied to one generation attempt. Cheap to copy; consumers hold it
/// across await points and ask [`RequestLifecycle::is_current`] before
/// applying results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    id: u64,
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Allocates tokens and tracks which one is live. Clone-cheap handle.
#[derive(Debug, Clone, Default)]
pub struct RequestLifecycle {
    current: Arc<AtomicU64>,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate any prior token and mint a fresh live one.
    pub fn begin(&self) -> RequestToken {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(token = id, "request token issued");
        RequestToken { id }
    }

    /// Whether `token` is still the live request. A stale token means the
    /// caller's work was superseded and its result must be discarded.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.id
    }

    /// Invalidate the current token without starting a new request.
    /// Used on reset and on keystrokes that supersede in-flight work.
    pub fn abort_all(&self) {
        let prior = self.current.fetch_add(1, Ordering::SeqCst);
        debug!(invalidated = prior, "in-flight requests aborted");
    }
}
