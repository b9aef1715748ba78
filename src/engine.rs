// SPDX-License-Identifier: MIT
//! Generation orchestrator.
//!
//! The engine owns the snapshot, the request lifecycle, and the backends,
//! and exposes the five operations the UI layer drives: `set_typing`,
//! `set_validating`, `set_ready_to_generate`, `generate`, `reset`. All state
//! mutation funnels through [`crate::state::transition`] under the snapshot
//! write lock; composite operations hold that lock across their whole
//! read-decide-write step, so racing callers serialize and a request token
//! is only minted by the call that actually enters `Generating`. All
//! in-flight work is tied to its token, checked before any result is
//! applied.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::backend::enhanced::{EnhancedRequest, RenderDescriptor};
use crate::backend::legacy::LegacyRequest;
use crate::backend::{ExistenceProbe, HttpExistenceProbe, HttpRenderService, RenderService};
use crate::config::EngineConfig;
use crate::content::{is_placeholder, synthesize, ContentForm};
use crate::customization::{
    assemble, assemble_smart, classify, effective_ecc, visual_fingerprint, GenerateOptions,
    RenderMode,
};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EngineEventKind, EventBus};
use crate::lifecycle::{RequestLifecycle, RequestToken};
use crate::state::{self, GenerationPhase, GenerationSnapshot, RenderModeKind, StateUpdate};
use crate::validation::{LinkValidator, ValidationOutcome};

// ─── Results ──────────────────────────────────────────────────────────────────

/// What the backend produced, tagged by the path that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "path", content = "data", rename_all = "snake_case")]
pub enum RenderedArtifact {
    /// Legacy path: flat renderable markup.
    Markup(String),
    /// Enhanced path: structured render descriptor.
    Descriptor(RenderDescriptor),
}

/// A completed generation, as observed by the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub artifact: RenderedArtifact,
    pub mode: RenderModeKind,
    /// Engine-measured round trip, latency floor included.
    pub elapsed_ms: u64,
    /// Backend-reported processing time. Zero on the legacy path.
    pub backend_ms: u64,
    /// Backend-reported cache hit.
    pub cached: bool,
    /// Visual fingerprint of this render, used for duplicate suppression.
    pub fingerprint: String,
    pub completed_at: DateTime<Utc>,
}

/// Why a `generate` call did not produce a new result. None of these are
/// errors — skipped work is a normal outcome of racing inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A generation is already in flight; the call is a no-op.
    AlreadyGenerating,
    /// Same payload and visually relevant options as the last completed
    /// render — nothing to do.
    DuplicateRender,
    /// A newer request invalidated this one while it was in flight.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Completed(GenerationResult),
    Skipped(SkipReason),
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Clone-cheap engine handle. Clones share all state.
#[derive(Clone)]
pub struct GenerationEngine {
    config: Arc<EngineConfig>,
    snapshot: Arc<RwLock<GenerationSnapshot>>,
    lifecycle: RequestLifecycle,
    validator: LinkValidator,
    render: Arc<dyn RenderService>,
    events: EventBus,
    last_result: Arc<RwLock<Option<GenerationResult>>>,
    last_fingerprint: Arc<RwLock<Option<String>>>,
}

impl GenerationEngine {
    /// Build an engine over explicit backend implementations.
    pub fn new(
        config: EngineConfig,
        render: Arc<dyn RenderService>,
        probe: Arc<dyn ExistenceProbe>,
    ) -> Self {
        let debounce = Duration::from_millis(config.input.debounce_ms);
        Self {
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(GenerationSnapshot::initial())),
            lifecycle: RequestLifecycle::new(),
            validator: LinkValidator::new(probe, debounce),
            render,
            events: EventBus::new(),
            last_result: Arc::new(RwLock::new(None)),
            last_fingerprint: Arc::new(RwLock::new(None)),
        }
    }

    /// Build an engine wired to the production HTTP backends.
    pub fn with_http(config: EngineConfig) -> EngineResult<Self> {
        let render = Arc::new(HttpRenderService::new(&config.backends)?);
        let probe = Arc::new(HttpExistenceProbe::new(&config.backends)?);
        Ok(Self::new(config, render, probe))
    }

    // ─── Observation ─────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> GenerationSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.snapshot.read().await.is_loading()
    }

    pub async fn last_result(&self) -> Option<GenerationResult> {
        self.last_result.read().await.clone()
    }

    /// Current snapshot error, if the last generation failed.
    pub async fn error(&self) -> Option<String> {
        self.snapshot.read().await.error.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    // ─── UI operations ───────────────────────────────────────────────────

    /// Record a keystroke. A keystroke always supersedes in-flight work:
    /// any live request token is invalidated, and a mid-generation edit is
    /// routed through `Idle` so the payload lands without waiting. The check
    /// and the routing share one lock, so a generation starting concurrently
    /// cannot swallow the keystroke.
    pub async fn set_typing(&self, payload: impl Into<String>) -> GenerationSnapshot {
        let payload = payload.into();
        let mut guard = self.snapshot.write().await;
        if guard.phase == GenerationPhase::Generating {
            self.lifecycle.abort_all();
            self.apply_locked(
                &mut guard,
                GenerationPhase::Idle,
                StateUpdate {
                    payload: Some(payload),
                    ..Default::default()
                },
            );
            return self.apply_locked(&mut guard, GenerationPhase::Typing, StateUpdate::default());
        }
        self.apply_locked(
            &mut guard,
            GenerationPhase::Typing,
            StateUpdate {
                payload: Some(payload),
                ..Default::default()
            },
        )
    }

    pub async fn set_validating(&self) -> GenerationSnapshot {
        self.apply(GenerationPhase::Validating, StateUpdate::default())
            .await
    }

    /// Move to `ReadyToGenerate`. From `Typing` this routes through
    /// `Validating`, which is the only table path there.
    pub async fn set_ready_to_generate(&self) -> GenerationSnapshot {
        let mut guard = self.snapshot.write().await;
        if guard.phase == GenerationPhase::Typing {
            self.apply_locked(&mut guard, GenerationPhase::Validating, StateUpdate::default());
        }
        self.apply_locked(
            &mut guard,
            GenerationPhase::ReadyToGenerate,
            StateUpdate::default(),
        )
    }

    /// Debounced link validation for the current payload value.
    ///
    /// Returns `None` when the call was superseded, suppressed as a
    /// duplicate, or settled against a payload the user has since edited.
    /// A conclusive "exists" advances to `ReadyToGenerate`; a conclusive
    /// "not found" or a probe failure reverts to `Typing` — the outcome
    /// carries the detail either way.
    pub async fn validate_link(&self, url: &str) -> Option<ValidationOutcome> {
        self.apply(
            GenerationPhase::Validating,
            StateUpdate {
                payload: Some(url.to_string()),
                ..Default::default()
            },
        )
        .await;

        let outcome = self.validator.validate(url).await?;

        // Live-value comparison: a result for an edited payload is stale.
        // The compare and the settle transition share the write lock so a
        // keystroke cannot land between them.
        let snapshot = {
            let mut guard = self.snapshot.write().await;
            if guard.payload != outcome.value {
                debug!(value = %outcome.value, "validation result stale — payload has moved on");
                return None;
            }
            match outcome.exists {
                Some(true) => self.apply_locked(
                    &mut guard,
                    GenerationPhase::ReadyToGenerate,
                    StateUpdate::default(),
                ),
                // "Not found" and probe trouble both revert; neither is an
                // engine error. The caller surfaces the field-level detail.
                _ => self.apply_locked(&mut guard, GenerationPhase::Typing, StateUpdate::default()),
            }
        };
        self.events.validation_settled(&outcome, snapshot);
        Some(outcome)
    }

    /// "Generate anyway": mark the current payload valid without a network
    /// check and force the ready transition.
    pub async fn force_link_valid(&self) -> ValidationOutcome {
        let url = self.snapshot.read().await.payload.clone();
        let outcome = self.validator.force_valid(&url).await;
        let snapshot = self.set_ready_to_generate().await;
        self.events.validation_settled(&outcome, snapshot);
        outcome
    }

    /// Full reset: invalidate in-flight work, forget validation history,
    /// drop the last result, return to `Idle` with an empty payload.
    pub async fn reset(&self) {
        self.validator.reset().await;
        let mut guard = self.snapshot.write().await;
        self.lifecycle.abort_all();
        *self.last_result.write().await = None;
        *self.last_fingerprint.write().await = None;
        self.apply_locked(
            &mut guard,
            GenerationPhase::Idle,
            StateUpdate {
                payload: Some(String::new()),
                clear_mode: true,
                ..Default::default()
            },
        );
        info!("engine reset");
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Run one generation for the current payload under `options`.
    ///
    /// Single-flight: a call while one is already generating is a no-op.
    /// Duplicate suppression: an identical payload + visually relevant
    /// options while `Complete` makes no backend call. A superseded request
    /// is discarded silently and reported as skipped, never as an error.
    pub async fn generate(&self, options: GenerateOptions) -> EngineResult<GenerateOutcome> {
        // The gate check, duplicate check, token mint, and the Generating
        // transition form one critical section: of any number of racing
        // callers, exactly one leaves it holding the live token.
        let (token, payload, mode, fingerprint) = {
            let mut guard = self.snapshot.write().await;
            if guard.phase == GenerationPhase::Generating {
                warn!("generate called while already generating — ignored");
                return Ok(GenerateOutcome::Skipped(SkipReason::AlreadyGenerating));
            }

            // An empty payload renders the active category's sample content.
            let payload = if guard.payload.trim().is_empty() {
                synthesize(&ContentForm::empty(options.content))
            } else {
                guard.payload.clone()
            };

            let fingerprint = visual_fingerprint(&payload, &options);
            if guard.phase == GenerationPhase::Complete
                && self.last_fingerprint.read().await.as_deref() == Some(fingerprint.as_str())
            {
                debug!("identical render already on screen — skipped");
                return Ok(GenerateOutcome::Skipped(SkipReason::DuplicateRender));
            }

            let mode = classify(&payload, &options);
            let token = self.lifecycle.begin();
            self.apply_locked(
                &mut guard,
                GenerationPhase::Generating,
                StateUpdate {
                    payload: Some(payload.clone()),
                    mode: Some(mode.kind()),
                    ..Default::default()
                },
            );
            (token, payload, mode, fingerprint)
        };
        debug!(mode = ?mode.kind(), token = token.id(), "generation started");

        let started = Instant::now();
        let (artifact, backend_ms, cached) = match self.dispatch(&payload, &mode, &options).await {
            Ok(parts) => parts,
            Err(err) => return self.fail(token, err).await,
        };

        if !self.lifecycle.is_current(token) {
            debug!(token = token.id(), "stale result discarded");
            return Ok(GenerateOutcome::Skipped(SkipReason::Superseded));
        }

        // Latency floor: keep the loading animation perceivable on fast
        // round trips. Sample/placeholder payloads skip it entirely.
        let floor = Duration::from_millis(self.config.input.min_display_ms);
        let elapsed = started.elapsed();
        if elapsed < floor && !is_placeholder(&payload) {
            tokio::time::sleep(floor - elapsed).await;
        }

        let result = GenerationResult {
            artifact,
            mode: mode.kind(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            backend_ms,
            cached,
            fingerprint: fingerprint.clone(),
            completed_at: Utc::now(),
        };

        // The authoritative token check shares the lock with the Complete
        // transition and the stored result: every invalidation happens under
        // this lock too, so a superseding keystroke lands either before this
        // section (discarding the result) or after it, never inside.
        let snapshot = {
            let mut guard = self.snapshot.write().await;
            if !self.lifecycle.is_current(token) {
                debug!(token = token.id(), "superseded before completion");
                return Ok(GenerateOutcome::Skipped(SkipReason::Superseded));
            }
            let next =
                self.apply_locked(&mut guard, GenerationPhase::Complete, StateUpdate::default());
            *self.last_result.write().await = Some(result.clone());
            *self.last_fingerprint.write().await = Some(fingerprint);
            next
        };
        self.events.publish(
            EngineEventKind::GenerationFinished {
                enhanced: result.mode.is_enhanced(),
                cached: result.cached,
                elapsed_ms: result.elapsed_ms,
            },
            snapshot,
        );
        info!(
            mode = ?result.mode,
            elapsed_ms = result.elapsed_ms,
            cached = result.cached,
            "generation complete"
        );
        Ok(GenerateOutcome::Completed(result))
    }

    /// The single dispatch point: mode decides the contract.
    async fn dispatch(
        &self,
        payload: &str,
        mode: &RenderMode,
        options: &GenerateOptions,
    ) -> EngineResult<(RenderedArtifact, u64, bool)> {
        let max_logo = self.config.input.max_logo_bytes;
        match mode {
            RenderMode::Plain => {
                let request = LegacyRequest::from_options(payload.to_string(), options);
                let resp = self.render.render_legacy(&request).await?;
                match (resp.success, resp.rendered_markup) {
                    (true, Some(markup)) => Ok((RenderedArtifact::Markup(markup), 0, false)),
                    _ => Err(EngineError::Backend {
                        message: resp
                            .error
                            .unwrap_or_else(|| "render failed without detail".to_string()),
                    }),
                }
            }
            RenderMode::Customized | RenderMode::Smart { .. } => {
                let customization = match mode {
                    RenderMode::Smart { template } => {
                        assemble_smart(template, options, max_logo).await?
                    }
                    _ => assemble(options, max_logo).await?,
                };
                let request = EnhancedRequest {
                    payload: payload.to_string(),
                    error_correction: effective_ecc(options),
                    customization,
                };
                let resp = self.render.render_enhanced(&request).await?;
                match (resp.success, resp.data) {
                    (true, Some(descriptor)) => Ok((
                        RenderedArtifact::Descriptor(descriptor),
                        resp.metadata.processing_time_ms,
                        resp.metadata.cached,
                    )),
                    _ => Err(EngineError::Backend {
                        message: resp
                            .error
                            .unwrap_or_else(|| "render failed without detail".to_string()),
                    }),
                }
            }
        }
    }

    /// Failure path for an in-flight generation. A stale token means the
    /// failure belongs to superseded work and is discarded silently; the
    /// token check and the Error transition share the lock.
    async fn fail(&self, token: RequestToken, err: EngineError) -> EngineResult<GenerateOutcome> {
        let mut guard = self.snapshot.write().await;
        if !self.lifecycle.is_current(token) {
            debug!(token = token.id(), "stale failure discarded");
            return Ok(GenerateOutcome::Skipped(SkipReason::Superseded));
        }
        warn!(err = %err, "generation failed");
        self.apply_locked(
            &mut guard,
            GenerationPhase::Error,
            StateUpdate {
                error: Some(err.to_string()),
                ..Default::default()
            },
        );
        Err(err)
    }

    // ─── Transition plumbing ─────────────────────────────────────────────

    async fn apply(&self, requested: GenerationPhase, update: StateUpdate) -> GenerationSnapshot {
        let mut guard = self.snapshot.write().await;
        self.apply_locked(&mut guard, requested, update)
    }

    /// Apply a transition while the caller already holds the snapshot write
    /// lock, publishing the phase change when one took effect. Composite
    /// operations route through here so their read-decide-write sequences
    /// stay atomic against racing callers.
    fn apply_locked(
        &self,
        snapshot: &mut GenerationSnapshot,
        requested: GenerationPhase,
        update: StateUpdate,
    ) -> GenerationSnapshot {
        let from = snapshot.phase;
        let applied = state::is_legal(from, requested);
        let next = state::transition(snapshot.clone(), requested, update);
        *snapshot = next.clone();
        if applied && from != requested {
            self.events
                .phase_changed(&from.to_string(), &requested.to_string(), next.clone());
        }
        next
    }
}
