// SPDX-License-Identifier: MIT
//! Scanforge Engine — client-side generation pipeline for scannable codes.
//!
//! The engine turns structured form input into canonical payloads, validates
//! link payloads against an existence probe, and drives single-flight render
//! requests through a legacy (flat) or enhanced (structured) backend, with
//! deterministic cancellation for superseded work.

pub mod backend;
pub mod config;
pub mod content;
pub mod customization;
pub mod engine;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod state;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{
    GenerateOutcome, GenerationEngine, GenerationResult, RenderedArtifact, SkipReason,
};
pub use error::{EngineError, EngineResult};
pub use state::{GenerationPhase, GenerationSnapshot, RenderModeKind};
