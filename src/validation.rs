// SPDX-License-Identifier: MIT
//! Async link validation.
//!
//! The validator debounces rapid edits, issues at most one existence check
//! per settled value, and notifies exactly once per distinct value — a
//! repeat of the last-notified value is suppressed. It emits a typed
//! [`ValidationOutcome`]; the engine is the only consumer and the only
//! place state transitions happen.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backend::linkcheck::LinkMetadata;
use crate::backend::ExistenceProbe;
use crate::error::EngineError;
use crate::lifecycle::RequestLifecycle;

/// What a settled validation concluded.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// The value this outcome is about. The engine compares it against the
    /// live payload before acting — a stale outcome is dropped.
    pub value: String,
    /// `Some(true)` = resolves, `Some(false)` = conclusively not found,
    /// `None` = unknown (the probe itself failed).
    pub exists: Option<bool>,
    pub metadata: Option<LinkMetadata>,
    /// Probe-side trouble, distinct from "site not found".
    pub error: Option<String>,
    /// Set when the user skipped the check with "generate anyway".
    pub forced: bool,
}

impl ValidationOutcome {
    /// Field-level rendering of a negative or troubled outcome, for display
    /// next to the input. `None` for successes and forced approvals.
    pub fn field_error(&self) -> Option<EngineError> {
        if self.forced {
            return None;
        }
        match (self.exists, &self.error) {
            (Some(false), _) => Some(EngineError::LinkUnavailable {
                url: self.value.clone(),
            }),
            (None, Some(message)) => Some(EngineError::Validation {
                field: "url",
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

/// Debouncing existence checker. Clone-cheap handle; clones share the
/// debounce epoch and the exactly-once latch.
#[derive(Clone)]
pub struct LinkValidator {
    probe: Arc<dyn ExistenceProbe>,
    debounce: Duration,
    /// Epoch guard: each call supersedes the previous debounce window.
    settle: RequestLifecycle,
    /// Last value a conclusive outcome was delivered for.
    last_notified: Arc<Mutex<Option<String>>>,
}

impl LinkValidator {
    pub fn new(probe: Arc<dyn ExistenceProbe>, debounce: Duration) -> Self {
        Self {
            probe,
            debounce,
            settle: RequestLifecycle::new(),
            last_notified: Arc::new(Mutex::new(None)),
        }
    }

    /// Validate `url` once it has settled.
    ///
    /// Returns `None` when the call was superseded by a newer edit before
    /// the debounce window closed, or when `url` equals the last-notified
    /// value (duplicate suppression). Otherwise returns exactly one outcome.
    pub async fn validate(&self, url: &str) -> Option<ValidationOutcome> {
        let token = self.settle.begin();
        tokio::time::sleep(self.debounce).await;
        if !self.settle.is_current(token) {
            debug!(url, "validation superseded before settling");
            return None;
        }

        {
            let last = self.last_notified.lock().await;
            if last.as_deref() == Some(url) {
                debug!(url, "validation suppressed — value already notified");
                return None;
            }
        }

        let outcome = match self.probe.check(url).await {
            Ok(resp) if resp.error.is_none() => {
                // Conclusive verdict — latch so the same value is not
                // re-notified until it changes or a reset clears the latch.
                *self.last_notified.lock().await = Some(url.to_string());
                ValidationOutcome {
                    value: url.to_string(),
                    exists: Some(resp.exists),
                    metadata: resp.metadata,
                    error: None,
                    forced: false,
                }
            }
            Ok(resp) => ValidationOutcome {
                value: url.to_string(),
                exists: None,
                metadata: None,
                error: resp.error,
                forced: false,
            },
            Err(e) => {
                warn!(url, err = %e, "existence probe failed");
                ValidationOutcome {
                    value: url.to_string(),
                    exists: None,
                    metadata: None,
                    error: Some(e.to_string()),
                    forced: false,
                }
            }
        };

        Some(outcome)
    }

    /// "Generate anyway": mark `url` valid without a network check.
    pub async fn force_valid(&self, url: &str) -> ValidationOutcome {
        self.settle.abort_all();
        *self.last_notified.lock().await = Some(url.to_string());
        ValidationOutcome {
            value: url.to_string(),
            exists: Some(true),
            metadata: None,
            error: None,
            forced: true,
        }
    }

    /// Drop pending debounce windows and forget the last-notified value.
    pub async fn reset(&self) {
        self.settle.abort_all();
        *self.last_notified.lock().await = None;
    }
}
