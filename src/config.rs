// SPDX-License-Identifier: MIT
//! Engine configuration.
//!
//! All fields are optional overrides: environment variables beat the TOML
//! file at `scanforge.toml`, which beats the built-in defaults. A malformed
//! file is logged and ignored rather than aborting startup — the engine is
//! expected to come up with defaults in embedded/offline contexts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

const DEFAULT_ENHANCED_URL: &str = "https://api.scanforge.dev";
const DEFAULT_LEGACY_URL: &str = "https://render.scanforge.dev";
const DEFAULT_LINKCHECK_URL: &str = "https://linkcheck.scanforge.dev";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 8;
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_MIN_DISPLAY_MS: u64 = 800;
const DEFAULT_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

// ─── BackendConfig ────────────────────────────────────────────────────────────

/// Remote endpoint configuration (`[backends]` in scanforge.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the enhanced render service (`POST {base}/v2/render`).
    pub enhanced_url: String,
    /// Base URL of the legacy render service (`POST {base}/generate`).
    pub legacy_url: String,
    /// Base URL of the link existence probe (`POST {base}/validate`).
    pub linkcheck_url: String,
    /// Render request timeout in seconds. Default: 15.
    pub request_timeout_secs: u64,
    /// Link probe timeout in seconds. Default: 8 — probes are advisory and
    /// must not hold the input pipeline hostage.
    pub probe_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enhanced_url: DEFAULT_ENHANCED_URL.to_string(),
            legacy_url: DEFAULT_LEGACY_URL.to_string(),
            linkcheck_url: DEFAULT_LINKCHECK_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

// ─── InputConfig ──────────────────────────────────────────────────────────────

/// Input pipeline tuning (`[input]` in scanforge.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Quiet period after the last keystroke before a link probe fires
    /// (milliseconds). Default: 500.
    pub debounce_ms: u64,
    /// Minimum time a generation is reported as in-flight (milliseconds),
    /// so near-instant renders do not flicker. Default: 800.
    /// Placeholder renders skip the floor entirely.
    pub min_display_ms: u64,
    /// Largest accepted logo file, in bytes. Default: 2 MiB.
    pub max_logo_bytes: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_display_ms: DEFAULT_MIN_DISPLAY_MS,
            max_logo_bytes: DEFAULT_MAX_LOGO_BYTES,
        }
    }
}

// ─── EngineConfig ─────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Remote endpoints (`[backends]`).
    pub backends: BackendConfig,
    /// Debounce / latency-floor / logo limits (`[input]`).
    pub input: InputConfig,
}

impl EngineConfig {
    /// Load config from a TOML file, applying env var overrides on top.
    ///
    /// Priority (highest to lowest):
    ///   1. `SCANFORGE_*` env vars
    ///   2. TOML file at `path`
    ///   3. Built-in defaults
    pub fn load(path: &Path) -> Self {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<EngineConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(e) => {
                    error!(path = %path.display(), err = %e, "failed to parse config — using defaults");
                    EngineConfig::default()
                }
            },
            Err(_) => EngineConfig::default(),
        };
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if let Some(url) = env_nonempty("SCANFORGE_ENHANCED_URL") {
            self.backends.enhanced_url = url;
        }
        if let Some(url) = env_nonempty("SCANFORGE_LEGACY_URL") {
            self.backends.legacy_url = url;
        }
        if let Some(url) = env_nonempty("SCANFORGE_LINKCHECK_URL") {
            self.backends.linkcheck_url = url;
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_when_file_missing() {
        let cfg = EngineConfig::load(Path::new("/nonexistent/scanforge.toml"));
        assert_eq!(cfg.backends.request_timeout_secs, 15);
        assert_eq!(cfg.input.debounce_ms, 500);
        assert_eq!(cfg.input.min_display_ms, 800);
        assert_eq!(cfg.input.max_logo_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn partial_toml_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanforge.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[input]\ndebounce_ms = 250").unwrap();

        let cfg = EngineConfig::load(&path);
        assert_eq!(cfg.input.debounce_ms, 250);
        // untouched sections keep their defaults
        assert_eq!(cfg.input.min_display_ms, 800);
        assert_eq!(cfg.backends.enhanced_url, DEFAULT_ENHANCED_URL);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanforge.toml");
        std::fs::write(&path, "backends = \"not a table").unwrap();

        let cfg = EngineConfig::load(&path);
        assert_eq!(cfg.input.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }
}
