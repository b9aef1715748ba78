// SPDX-License-Identifier: MIT
//! Enhanced rendering contract — `POST {base}/v2/render`.

use serde::{Deserialize, Serialize};

use crate::customization::{CustomizationPayload, EccLevel};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedRequest {
    pub payload: String,
    pub error_correction: EccLevel,
    pub customization: CustomizationPayload,
}

/// Structured render descriptor: module grid plus path geometry references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderDescriptor {
    /// Modules per side, quiet zone excluded.
    pub matrix_size: u32,
    /// SVG path data for the data modules.
    pub module_path: String,
    /// One path per finder pattern, top-left / top-right / bottom-left.
    pub eye_paths: Vec<String>,
    /// Symbol version (1–40).
    pub version: u8,
    pub error_correction: EccLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderMetadata {
    #[serde(default)]
    pub processing_time_ms: u64,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RenderDescriptor>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: RenderMetadata,
}
