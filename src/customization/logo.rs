// SPDX-License-Identifier: MIT
//! Logo normalization for customized requests.
//!
//! Vector logos carry internal `id` attributes that collide when several
//! rendered codes share one page, so every embed rewrites them with a fresh
//! random suffix before the markup is inlined. Raster logos are read as
//! binary. Both end up as a `data:` URI inside the customization payload.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// `id="name"` attribute declarations.
static ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"id="([A-Za-z_][\w.-]*)""#).expect("regex: id attr"));
/// `url(#name)` paint server references.
static URL_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"url\(#([A-Za-z_][\w.-]*)\)").expect("regex: url ref"));
/// `href="#name"` / `xlink:href="#name"` use references.
static HREF_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"(xlink:href|href)="#([A-Za-z_][\w.-]*)""##).expect("regex: href ref"));

/// Where a logo comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogoSource {
    /// Inline SVG markup.
    Svg { markup: String },
    /// Raster bytes already in memory.
    Raster { bytes: Vec<u8>, mime: String },
    /// A file on disk, read at assembly time.
    File { path: PathBuf },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogoShape {
    #[default]
    Square,
    Circle,
}

/// User-facing logo selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogoOptions {
    pub source: LogoSource,
    /// Logo width as a percentage of the code width. Default: 20.
    pub size_pct: u8,
    /// Clear padding around the logo, in modules. Default: 2.
    pub padding: u8,
    pub shape: LogoShape,
}

impl LogoOptions {
    pub fn svg(markup: impl Into<String>) -> Self {
        Self {
            source: LogoSource::Svg {
                markup: markup.into(),
            },
            size_pct: 20,
            padding: 2,
            shape: LogoShape::default(),
        }
    }
}

/// Normalized, transmission-ready logo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedLogo {
    /// `data:{mime};base64,{payload}`
    pub data_uri: String,
    pub size_pct: u8,
    pub padding: u8,
    pub shape: LogoShape,
}

/// Rewrite all internal identifiers with one fresh random suffix, keeping
/// declarations and references consistent with each other.
pub fn uniquify_ids(markup: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string()[..8].to_string();

    let markup = ID_ATTR.replace_all(markup, format!(r#"id="${{1}}-{suffix}""#).as_str());
    let markup = URL_REF.replace_all(&markup, format!(r"url(#${{1}}-{suffix})").as_str());
    let markup = HREF_REF
        .replace_all(&markup, format!(r##"${{1}}="#${{2}}-{suffix}""##).as_str());

    markup.into_owned()
}

/// Normalize a logo selection into its embeddable form.
///
/// Fails with an assembly error when the file cannot be read, the format is
/// not recognized, or the final bytes exceed `max_bytes` — any of which
/// aborts the whole generation rather than sending a partial payload.
pub async fn embed(options: &LogoOptions, max_bytes: usize) -> EngineResult<EmbeddedLogo> {
    let (bytes, mime) = match &options.source {
        LogoSource::Svg { markup } => (
            uniquify_ids(markup).into_bytes(),
            "image/svg+xml".to_string(),
        ),
        LogoSource::Raster { bytes, mime } => {
            if !mime.starts_with("image/") {
                return Err(EngineError::Assembly {
                    reason: format!("not an image mime type: {mime}"),
                });
            }
            (bytes.clone(), mime.clone())
        }
        LogoSource::File { path } => read_logo_file(path).await?,
    };

    if bytes.len() > max_bytes {
        return Err(EngineError::Assembly {
            reason: format!("logo is {} bytes, limit is {max_bytes}", bytes.len()),
        });
    }

    Ok(EmbeddedLogo {
        data_uri: format!("data:{mime};base64,{}", BASE64.encode(&bytes)),
        size_pct: options.size_pct,
        padding: options.padding,
        shape: options.shape,
    })
}

async fn read_logo_file(path: &Path) -> EngineResult<(Vec<u8>, String)> {
    let mime = mime_for_extension(path).ok_or_else(|| EngineError::Assembly {
        reason: format!("unsupported logo format: {}", path.display()),
    })?;

    // SVG files get the same id rewrite as inline markup.
    if mime == "image/svg+xml" {
        let markup = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::Assembly {
                reason: format!("could not read {}: {e}", path.display()),
            })?;
        return Ok((uniquify_ids(&markup).into_bytes(), mime.to_string()));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| EngineError::Assembly {
            reason: format!("could not read {}: {e}", path.display()),
        })?;
    Ok((bytes, mime.to_string()))
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const GRADIENT_SVG: &str = r##"<svg><defs><linearGradient id="grad1"/></defs><rect fill="url(#grad1)"/><use href="#grad1"/></svg>"##;

    #[test]
    fn uniquify_rewrites_declarations_and_references_together() {
        let out = uniquify_ids(GRADIENT_SVG);
        assert!(!out.contains(r#"id="grad1""#));
        assert!(!out.contains("url(#grad1)"));
        assert!(!out.contains(r##"href="#grad1""##));

        // declaration and both references share one rewritten name
        let id = Regex::new(r#"id="(grad1-\w{8})""#)
            .unwrap()
            .captures(&out)
            .expect("rewritten id present")[1]
            .to_string();
        assert!(out.contains(&format!("url(#{id})")));
        assert!(out.contains(&format!(r##"href="#{id}""##)));
    }

    #[test]
    fn uniquify_produces_distinct_suffixes_per_call() {
        let a = uniquify_ids(GRADIENT_SVG);
        let b = uniquify_ids(GRADIENT_SVG);
        assert_ne!(a, b);
    }

    #[test]
    fn markup_without_ids_passes_through() {
        let plain = "<svg><rect width=\"4\"/></svg>";
        assert_eq!(uniquify_ids(plain), plain);
    }

    #[tokio::test]
    async fn embed_svg_yields_decodable_data_uri() {
        let options = LogoOptions::svg(GRADIENT_SVG);
        let logo = embed(&options, 4096).await.unwrap();
        let b64 = logo
            .data_uri
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("svg data uri prefix");
        let markup = String::from_utf8(BASE64.decode(b64).unwrap()).unwrap();
        assert!(markup.contains("grad1-"));
    }

    #[tokio::test]
    async fn embed_raster_keeps_mime() {
        let options = LogoOptions {
            source: LogoSource::Raster {
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
                mime: "image/png".into(),
            },
            size_pct: 25,
            padding: 1,
            shape: LogoShape::Circle,
        };
        let logo = embed(&options, 64).await.unwrap();
        assert!(logo.data_uri.starts_with("data:image/png;base64,"));
        assert_eq!(logo.size_pct, 25);
        assert_eq!(logo.shape, LogoShape::Circle);
    }

    #[tokio::test]
    async fn embed_rejects_oversized_logo() {
        let options = LogoOptions {
            source: LogoSource::Raster {
                bytes: vec![0u8; 64],
                mime: "image/png".into(),
            },
            size_pct: 20,
            padding: 2,
            shape: LogoShape::Square,
        };
        let err = embed(&options, 16).await.unwrap_err();
        assert_eq!(err.kind(), "assembly");
    }

    #[tokio::test]
    async fn embed_reads_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[1, 2, 3, 4]).unwrap();

        let options = LogoOptions {
            source: LogoSource::File { path },
            size_pct: 20,
            padding: 2,
            shape: LogoShape::Square,
        };
        let logo = embed(&options, 64).await.unwrap();
        assert!(logo.data_uri.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn embed_rejects_unknown_extension() {
        let options = LogoOptions {
            source: LogoSource::File {
                path: PathBuf::from("/tmp/logo.tiff"),
            },
            size_pct: 20,
            padding: 2,
            shape: LogoShape::Square,
        };
        assert!(embed(&options, 64).await.is_err());
    }
}
