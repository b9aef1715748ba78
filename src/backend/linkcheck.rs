// SPDX-License-Identifier: MIT
//! Link existence validator contract — `POST {base}/validate`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    /// Resolved URL after redirects, when it differs from the probed one.
    #[serde(default)]
    pub canonical_url: Option<String>,
}

/// Probe verdict. `error` is transport/service trouble on the validator's
/// side — distinct from `exists: false`, which is a conclusive "not found".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResponse {
    pub exists: bool,
    #[serde(default)]
    pub metadata: Option<LinkMetadata>,
    #[serde(default)]
    pub error: Option<String>,
}
