// SPDX-License-Identifier: MIT
//! Customization payload assembly and request classification.
//!
//! A [`CustomizationPayload`] is built deterministically from the raw option
//! set and never mutated afterwards — each generation call produces a fresh
//! one, fully assembled or not at all. The classifier reduces the loose
//! option surface to a single [`RenderMode`] tag consumed by one dispatch
//! point in the orchestrator.

pub mod logo;
pub mod smart;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::content::ContentKind;
use crate::error::EngineResult;
use crate::state::RenderModeKind;

pub use logo::{EmbeddedLogo, LogoOptions, LogoShape, LogoSource};
pub use smart::SmartTemplate;

// ─── Option atoms ─────────────────────────────────────────────────────────────

/// Error-correction capacity, lowest to highest redundancy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EccLevel {
    L,
    M,
    Q,
    H,
}

/// The scannable symbology being rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    #[default]
    Qr,
    Code128,
    Ean13,
    UpcA,
    Code39,
}

impl CodeKind {
    /// Linear symbologies take the legacy render path and accept no styling.
    pub fn is_linear(&self) -> bool {
        !matches!(self, CodeKind::Qr)
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            CodeKind::Qr => "qr",
            CodeKind::Code128 => "code128",
            CodeKind::Ean13 => "ean13",
            CodeKind::UpcA => "upca",
            CodeKind::Code39 => "code39",
        }
    }
}

/// Foreground/background pair, CSS hex notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorPair {
    pub foreground: String,
    pub background: String,
}

impl Default for ColorPair {
    fn default() -> Self {
        Self {
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradientStop {
    pub color: String,
    /// Stop offset, 0.0 to 1.0.
    pub position: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    /// Degrees, linear gradients only.
    pub angle: f32,
    /// Paint the finder-pattern eyes with the gradient too.
    pub apply_to_eyes: bool,
    /// Stroke module borders instead of filling.
    pub stroke_borders: bool,
}

/// Finder-pattern ("eye") shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EyeShape {
    #[default]
    Square,
    Rounded,
    Circle,
    Leaf,
    Shield,
}

/// Resolved eye styling: outer ring and inner square, independently shaped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EyeStyling {
    pub border: EyeShape,
    pub center: EyeShape,
}

/// Shape used for individual data modules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataPattern {
    #[default]
    Square,
    Dots,
    Rounded,
    Classy,
    Diamond,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrameStyle {
    Box,
    Balloon,
    Banner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub style: FrameStyle,
    pub caption: String,
    pub caption_position: CaptionPosition,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisualEffect {
    Shadow,
    Glow,
    Emboss,
}

// ─── Option set ───────────────────────────────────────────────────────────────

/// The full user-selected option set for one generation call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub kind: CodeKind,
    /// Active payload category — used to pick the placeholder when the
    /// payload is empty.
    pub content: ContentKind,
    /// Explicit ECC override. `None` lets [`effective_ecc`] decide.
    pub error_correction: Option<EccLevel>,
    pub colors: ColorPair,
    pub gradient: Option<Gradient>,
    /// Unified eye shape, applied to border and center together.
    pub eye_shape: EyeShape,
    /// Separated eye styles. These win over `eye_shape` when either one
    /// differs from the neutral default.
    pub eye_border: EyeShape,
    pub eye_center: EyeShape,
    pub data_pattern: DataPattern,
    pub logo: Option<LogoOptions>,
    pub frame: Option<Frame>,
    /// Applied in order.
    pub effects: Vec<VisualEffect>,
    /// Derive styling automatically from a template matched on the payload.
    pub smart: bool,
    /// Output pixel scale. Non-visual — excluded from the fingerprint.
    pub scale: u32,
    /// Quiet-zone width in modules.
    pub margin: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            kind: CodeKind::Qr,
            content: ContentKind::Link,
            error_correction: None,
            colors: ColorPair::default(),
            gradient: None,
            eye_shape: EyeShape::Square,
            eye_border: EyeShape::Square,
            eye_center: EyeShape::Square,
            data_pattern: DataPattern::Square,
            logo: None,
            frame: None,
            effects: Vec::new(),
            smart: false,
            scale: 10,
            margin: 4,
        }
    }
}

// ─── Wire payload ─────────────────────────────────────────────────────────────

/// Structured description of all visual styling, sent to the enhanced
/// rendering backend. Assembled all-or-nothing: a failing part (bad logo)
/// aborts the whole generation instead of sending a partial payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationPayload {
    pub colors: ColorPair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
    pub eyes: EyeStyling,
    pub data_pattern: DataPattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<EmbeddedLogo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<VisualEffect>,
}

// ─── Classification ───────────────────────────────────────────────────────────

/// Which rendering path a request takes, decided once per generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    /// Linear barcode or unstyled QR — legacy flat contract.
    Plain,
    /// Styled QR — enhanced structured contract.
    Customized,
    /// Auto-styled QR from a payload-matched template — enhanced contract.
    Smart { template: &'static SmartTemplate },
}

impl RenderMode {
    pub fn kind(&self) -> RenderModeKind {
        match self {
            RenderMode::Plain => RenderModeKind::Plain,
            RenderMode::Customized => RenderModeKind::Customized,
            RenderMode::Smart { .. } => RenderModeKind::Smart,
        }
    }
}

/// Classify a request from its payload and option set.
///
/// Linear symbologies are always plain. Smart mode applies only when a
/// template actually matches the payload; otherwise the request falls
/// through to the caller's own styling.
pub fn classify(payload: &str, options: &GenerateOptions) -> RenderMode {
    if options.kind.is_linear() {
        return RenderMode::Plain;
    }
    if options.smart {
        if let Some(template) = smart::match_template(payload) {
            return RenderMode::Smart { template };
        }
    }
    if has_styling(options) {
        RenderMode::Customized
    } else {
        RenderMode::Plain
    }
}

/// Whether any enhanced-path styling is selected. Plain color overrides are
/// not styling — the legacy contract carries those in its flat options.
fn has_styling(options: &GenerateOptions) -> bool {
    options.gradient.is_some()
        || options.logo.is_some()
        || options.frame.is_some()
        || !options.effects.is_empty()
        || options.data_pattern != DataPattern::Square
        || resolve_eye_styling(options) != EyeStyling::default()
}

/// Resolve the mutually exclusive eye option groups.
///
/// Separated border/center styles win whenever either differs from the
/// neutral default; otherwise the unified shape applies to both.
pub fn resolve_eye_styling(options: &GenerateOptions) -> EyeStyling {
    if options.eye_border != EyeShape::Square || options.eye_center != EyeShape::Square {
        EyeStyling {
            border: options.eye_border,
            center: options.eye_center,
        }
    } else {
        EyeStyling {
            border: options.eye_shape,
            center: options.eye_shape,
        }
    }
}

/// ECC selection: explicit choice wins; a logo bumps the default to `Q` so
/// the occluded modules stay recoverable; otherwise `M`.
pub fn effective_ecc(options: &GenerateOptions) -> EccLevel {
    if let Some(level) = options.error_correction {
        return level;
    }
    if options.logo.is_some() {
        EccLevel::Q
    } else {
        EccLevel::M
    }
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

/// Build the wire payload for a customized request. All option groups are
/// independently optional; a failing logo embed aborts the whole assembly.
pub async fn assemble(
    options: &GenerateOptions,
    max_logo_bytes: usize,
) -> EngineResult<CustomizationPayload> {
    let logo = match &options.logo {
        Some(opts) => Some(logo::embed(opts, max_logo_bytes).await?),
        None => None,
    };

    Ok(CustomizationPayload {
        colors: options.colors.clone(),
        gradient: options.gradient.clone(),
        eyes: resolve_eye_styling(options),
        data_pattern: options.data_pattern,
        logo,
        frame: options.frame.clone(),
        effects: options.effects.clone(),
    })
}

/// Build the wire payload for a smart request: the matched template supplies
/// colors, gradient, eyes, and pattern; the caller's logo, frame, and effects
/// carry through.
pub async fn assemble_smart(
    template: &SmartTemplate,
    options: &GenerateOptions,
    max_logo_bytes: usize,
) -> EngineResult<CustomizationPayload> {
    let logo = match &options.logo {
        Some(opts) => Some(logo::embed(opts, max_logo_bytes).await?),
        None => None,
    };

    Ok(CustomizationPayload {
        colors: template.colors.clone(),
        gradient: template.gradient.clone(),
        eyes: template.eyes,
        data_pattern: template.data_pattern,
        logo,
        frame: options.frame.clone(),
        effects: options.effects.clone(),
    })
}

// ─── Visual fingerprint ───────────────────────────────────────────────────────

/// Content hash over the payload plus the visually relevant option subset.
///
/// Raw pixel scale is excluded — re-rendering at a different scale is not a
/// new image as far as duplicate suppression is concerned. The JSON view uses
/// serde_json's sorted object keys, so the digest is canonical.
pub fn visual_fingerprint(payload: &str, options: &GenerateOptions) -> String {
    let view = serde_json::json!({
        "kind": options.kind,
        "error_correction": effective_ecc(options),
        "colors": options.colors,
        "gradient": options.gradient,
        "eyes": resolve_eye_styling(options),
        "data_pattern": options.data_pattern,
        "logo": options.logo,
        "frame": options.frame,
        "effects": options.effects,
        "smart": options.smart,
        "margin": options.margin,
    });

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update([0u8]);
    hasher.update(view.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
