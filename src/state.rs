// SPDX-License-Identifier: MIT
//! Generation phase machine.
//!
//! Every other component reads and writes engine state exclusively through
//! [`transition`], which is the sole writer of [`GenerationSnapshot`]. There
//! is one logical writer and no thread-level races — ordering races between
//! async tasks are handled upstream by request-token invalidation, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The finite set of phases a generation run can be in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Typing,
    Validating,
    ReadyToGenerate,
    Generating,
    Complete,
    Error,
}

impl GenerationPhase {
    /// All phases, in declaration order. Used by exhaustive transition tests.
    pub const ALL: [GenerationPhase; 7] = [
        GenerationPhase::Idle,
        GenerationPhase::Typing,
        GenerationPhase::Validating,
        GenerationPhase::ReadyToGenerate,
        GenerationPhase::Generating,
        GenerationPhase::Complete,
        GenerationPhase::Error,
    ];

    /// Phases directly reachable from `self`, per the legality table.
    ///
    /// Same-phase re-entry is handled by [`is_legal`], not listed here —
    /// except where the table names it explicitly.
    pub fn successors(&self) -> &'static [GenerationPhase] {
        use GenerationPhase::*;
        match self {
            Idle => &[Typing, Validating, Generating, Idle],
            Typing => &[Idle, Validating, Typing, Generating],
            // Deliberately permissive: validation outcomes race against
            // continued typing.
            Validating => &[
                ReadyToGenerate,
                Error,
                Idle,
                Validating,
                Typing,
                Generating,
                Complete,
            ],
            ReadyToGenerate => &[Generating, Idle, Typing],
            Generating => &[Complete, Error, Idle],
            // Complete/Error permit direct re-entry into Generating so option
            // changes after a render don't pass back through Typing.
            Complete => &[Idle, Typing, Generating, Validating],
            Error => &[Idle, Typing, Generating, Validating],
        }
    }
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

/// Whether `from → to` is an accepted transition request.
///
/// Same-phase updates are allowed everywhere except `Generating → Generating`,
/// which is rejected to prevent duplicate in-flight work.
pub fn is_legal(from: GenerationPhase, to: GenerationPhase) -> bool {
    if from == to {
        return from != GenerationPhase::Generating;
    }
    from.successors().contains(&to)
}

// ─── Render mode tag ──────────────────────────────────────────────────────────

/// Which rendering path a classified request takes.
///
/// Stored on the snapshot as a single tagged value — the one source of truth
/// for "was this smart?" and "did this use the enhanced path?". `Plain` renders
/// through the legacy flat contract; `Customized` and `Smart` through the
/// enhanced structured contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderModeKind {
    Plain,
    Customized,
    Smart,
}

impl RenderModeKind {
    /// True for modes served by the enhanced structured backend.
    pub fn is_enhanced(&self) -> bool {
        !matches!(self, RenderModeKind::Plain)
    }
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// Materialized engine state. Cheap to clone; handed out by value to readers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSnapshot {
    pub phase: GenerationPhase,
    /// Canonical payload string — always reflects the most recent user input,
    /// even while a generation for an older payload is still in flight.
    pub payload: String,
    /// Mode of the active/last generation. `None` until first classified.
    pub mode: Option<RenderModeKind>,
    /// Operator-facing error description. Populated on `Error`, cleared by
    /// any applied transition that does not carry a new one.
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationSnapshot {
    pub fn initial() -> Self {
        Self {
            phase: GenerationPhase::Idle,
            payload: String::new(),
            mode: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    /// True while a render request is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == GenerationPhase::Generating
    }
}

/// Field updates applied together with an accepted phase change.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// Replace the payload. `None` keeps the current one.
    pub payload: Option<String>,
    /// Record the classified mode. `None` keeps the current one.
    pub mode: Option<RenderModeKind>,
    /// Drop the recorded mode (reset path).
    pub clear_mode: bool,
    /// Error description for this transition. Applied transitions always
    /// replace the slot — passing `None` clears a stale error.
    pub error: Option<String>,
}

/// Pure function: apply one requested phase change to the current snapshot
/// and return the new snapshot.
///
/// Deterministic — given the same snapshot and update it always produces the
/// same result (modulo `updated_at`). An illegal request is logged and the
/// snapshot is returned unchanged; this is a recoverable, expected condition
/// caused by racing UI events, not a failure.
pub fn transition(
    current: GenerationSnapshot,
    requested: GenerationPhase,
    update: StateUpdate,
) -> GenerationSnapshot {
    if !is_legal(current.phase, requested) {
        warn!(
            from = %current.phase,
            to = %requested,
            "illegal phase transition ignored"
        );
        return current;
    }

    let mode = if update.clear_mode {
        None
    } else {
        update.mode.or(current.mode)
    };

    GenerationSnapshot {
        phase: requested,
        payload: update.payload.unwrap_or(current.payload),
        mode,
        error: update.error,
        updated_at: Utc::now(),
    }
}
