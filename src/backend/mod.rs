// SPDX-License-Identifier: MIT
//! Rendering backends and the link existence probe.
//!
//! Two render contracts exist side by side: the legacy flat contract for
//! plain requests and the enhanced structured contract for customized and
//! smart requests. Both are behind [`RenderService`] so the orchestrator
//! has a single seam, and tests can substitute an in-process double.

pub mod enhanced;
pub mod legacy;
pub mod linkcheck;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::BackendConfig;
use enhanced::{EnhancedRequest, EnhancedResponse};
use legacy::{LegacyRequest, LegacyResponse};
use linkcheck::{ProbeRequest, ProbeResponse};

/// Transport-level failures talking to any backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status from a backend.
    #[error("unexpected status {status}")]
    Status { status: u16 },
}

/// Seam for the two rendering contracts.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn render_enhanced(
        &self,
        request: &EnhancedRequest,
    ) -> Result<EnhancedResponse, BackendError>;

    async fn render_legacy(&self, request: &LegacyRequest)
        -> Result<LegacyResponse, BackendError>;
}

/// Seam for the link existence validator.
#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    async fn check(&self, url: &str) -> Result<ProbeResponse, BackendError>;
}

// ─── HTTP implementations ─────────────────────────────────────────────────────

/// Production render client. Timeouts are enforced here, at the call
/// boundary — never inside the state machine.
pub struct HttpRenderService {
    client: reqwest::Client,
    enhanced_base: String,
    legacy_base: String,
}

impl HttpRenderService {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            enhanced_base: config.enhanced_url.clone(),
            legacy_base: config.legacy_url.clone(),
        })
    }
}

#[async_trait]
impl RenderService for HttpRenderService {
    async fn render_enhanced(
        &self,
        request: &EnhancedRequest,
    ) -> Result<EnhancedResponse, BackendError> {
        let url = format!("{}/v2/render", self.enhanced_base);
        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    async fn render_legacy(
        &self,
        request: &LegacyRequest,
    ) -> Result<LegacyResponse, BackendError> {
        let url = format!("{}/generate", self.legacy_base);
        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }
}

/// Production existence probe client. Uses a shorter timeout than the
/// render path — probes are advisory.
pub struct HttpExistenceProbe {
    client: reqwest::Client,
    base: String,
}

impl HttpExistenceProbe {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: config.linkcheck_url.clone(),
        })
    }
}

#[async_trait]
impl ExistenceProbe for HttpExistenceProbe {
    async fn check(&self, url: &str) -> Result<ProbeResponse, BackendError> {
        let endpoint = format!("{}/validate", self.base);
        let resp = self
            .client
            .post(&endpoint)
            .json(&ProbeRequest {
                url: url.to_string(),
            })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }
}
