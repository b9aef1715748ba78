// SPDX-License-Identifier: MIT
//! Legacy rendering contract — `POST {base}/generate`.
//!
//! Plain requests (linear barcodes and unstyled QR) use this minimal flat
//! contract; everything styled goes through the enhanced path instead.

use serde::{Deserialize, Serialize};

use crate::customization::{effective_ecc, EccLevel, GenerateOptions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatOptions {
    pub foreground: String,
    pub background: String,
    pub scale: u32,
    pub margin: u32,
    pub error_correction: EccLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyRequest {
    pub code_type: String,
    pub payload: String,
    pub options: FlatOptions,
}

impl LegacyRequest {
    /// Flatten the option set into the legacy shape. Styling options are
    /// ignored by construction — plain requests have none.
    pub fn from_options(payload: String, options: &GenerateOptions) -> Self {
        Self {
            code_type: options.kind.wire_name().to_string(),
            payload,
            options: FlatOptions {
                foreground: options.colors.foreground.clone(),
                background: options.colors.background.clone(),
                scale: options.scale,
                margin: options.margin,
                error_correction: effective_ecc(options),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyResponse {
    pub success: bool,
    #[serde(default)]
    pub rendered_markup: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
