// SPDX-License-Identifier: MIT
//! Smart styling templates.
//!
//! A template pairs payload matchers (scheme prefixes or link domains) with
//! a ready-made visual identity. Smart mode walks the registry in order and
//! takes the first hit; an unmatched payload leaves smart mode without
//! effect and the caller's own styling applies.

use once_cell::sync::Lazy;

use super::{
    ColorPair, DataPattern, EyeShape, EyeStyling, Gradient, GradientKind, GradientStop,
};

#[derive(Debug, Clone, PartialEq)]
enum Matcher {
    /// Payload starts with this string.
    Prefix(&'static str),
    /// Link payload whose host is this domain or a subdomain of it.
    Domain(&'static str),
}

impl Matcher {
    fn matches(&self, payload: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => payload.starts_with(prefix),
            Matcher::Domain(domain) => link_host(payload)
                .map(|host| host == *domain || host.ends_with(&format!(".{domain}")))
                .unwrap_or(false),
        }
    }
}

/// Host portion of an http(s) link payload, if it is one.
fn link_host(payload: &str) -> Option<&str> {
    let rest = payload
        .strip_prefix("https://")
        .or_else(|| payload.strip_prefix("http://"))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    Some(host.split('@').next_back().unwrap_or(host))
}

/// A registered auto-styling identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartTemplate {
    pub id: &'static str,
    pub name: &'static str,
    matchers: Vec<Matcher>,
    pub colors: ColorPair,
    pub gradient: Option<Gradient>,
    pub eyes: EyeStyling,
    pub data_pattern: DataPattern,
}

fn stops(colors: &[&str]) -> Vec<GradientStop> {
    // A one-color palette pins its stop at 0.0; an empty one yields none.
    let last = colors.len().saturating_sub(1).max(1) as f32;
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| GradientStop {
            color: (*c).to_string(),
            position: i as f32 / last,
        })
        .collect()
}

static TEMPLATES: Lazy<Vec<SmartTemplate>> = Lazy::new(|| {
    vec![
        SmartTemplate {
            id: "whatsapp",
            name: "WhatsApp",
            matchers: vec![Matcher::Prefix("https://wa.me/")],
            colors: ColorPair {
                foreground: "#075e54".into(),
                background: "#ffffff".into(),
            },
            gradient: Some(Gradient {
                kind: GradientKind::Linear,
                stops: stops(&["#25d366", "#128c7e"]),
                angle: 135.0,
                apply_to_eyes: true,
                stroke_borders: false,
            }),
            eyes: EyeStyling {
                border: EyeShape::Rounded,
                center: EyeShape::Rounded,
            },
            data_pattern: DataPattern::Rounded,
        },
        SmartTemplate {
            id: "call",
            name: "Phone Call",
            matchers: vec![Matcher::Prefix("tel:")],
            colors: ColorPair {
                foreground: "#1d4ed8".into(),
                background: "#ffffff".into(),
            },
            gradient: None,
            eyes: EyeStyling {
                border: EyeShape::Circle,
                center: EyeShape::Circle,
            },
            data_pattern: DataPattern::Dots,
        },
        SmartTemplate {
            id: "sms",
            name: "SMS",
            matchers: vec![Matcher::Prefix("sms:")],
            colors: ColorPair {
                foreground: "#0ea5e9".into(),
                background: "#ffffff".into(),
            },
            gradient: None,
            eyes: EyeStyling {
                border: EyeShape::Rounded,
                center: EyeShape::Rounded,
            },
            data_pattern: DataPattern::Rounded,
        },
        SmartTemplate {
            id: "email",
            name: "Email",
            matchers: vec![Matcher::Prefix("mailto:")],
            colors: ColorPair {
                foreground: "#ea580c".into(),
                background: "#fffbf5".into(),
            },
            gradient: None,
            eyes: EyeStyling {
                border: EyeShape::Rounded,
                center: EyeShape::Square,
            },
            data_pattern: DataPattern::Classy,
        },
        SmartTemplate {
            id: "wifi",
            name: "WiFi",
            matchers: vec![Matcher::Prefix("WIFI:")],
            colors: ColorPair {
                foreground: "#4f46e5".into(),
                background: "#ffffff".into(),
            },
            gradient: Some(Gradient {
                kind: GradientKind::Radial,
                stops: stops(&["#6366f1", "#4338ca"]),
                angle: 0.0,
                apply_to_eyes: false,
                stroke_borders: false,
            }),
            eyes: EyeStyling {
                border: EyeShape::Circle,
                center: EyeShape::Circle,
            },
            data_pattern: DataPattern::Dots,
        },
        SmartTemplate {
            id: "vcard",
            name: "Contact Card",
            matchers: vec![Matcher::Prefix("BEGIN:VCARD")],
            colors: ColorPair {
                foreground: "#334155".into(),
                background: "#f8fafc".into(),
            },
            gradient: None,
            eyes: EyeStyling {
                border: EyeShape::Shield,
                center: EyeShape::Square,
            },
            data_pattern: DataPattern::Square,
        },
        SmartTemplate {
            id: "youtube",
            name: "YouTube",
            matchers: vec![Matcher::Domain("youtube.com"), Matcher::Domain("youtu.be")],
            colors: ColorPair {
                foreground: "#ff0000".into(),
                background: "#ffffff".into(),
            },
            gradient: None,
            eyes: EyeStyling {
                border: EyeShape::Rounded,
                center: EyeShape::Rounded,
            },
            data_pattern: DataPattern::Rounded,
        },
        SmartTemplate {
            id: "instagram",
            name: "Instagram",
            matchers: vec![Matcher::Domain("instagram.com")],
            colors: ColorPair {
                foreground: "#833ab4".into(),
                background: "#ffffff".into(),
            },
            gradient: Some(Gradient {
                kind: GradientKind::Linear,
                stops: stops(&["#f09433", "#dc2743", "#bc1888"]),
                angle: 45.0,
                apply_to_eyes: true,
                stroke_borders: false,
            }),
            eyes: EyeStyling {
                border: EyeShape::Rounded,
                center: EyeShape::Circle,
            },
            data_pattern: DataPattern::Dots,
        },
    ]
});

/// First registered template matching `payload`, if any.
pub fn match_template(payload: &str) -> Option<&'static SmartTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.matchers.iter().any(|m| m.matches(payload)))
}

/// All registered templates, in match order.
pub fn all() -> &'static [SmartTemplate] {
    &TEMPLATES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_prefixes_match() {
        assert_eq!(match_template("tel:+15551234").unwrap().id, "call");
        assert_eq!(
            match_template("WIFI:T:WPA;S:Net;P:pw;H:false;;").unwrap().id,
            "wifi"
        );
        assert_eq!(
            match_template("https://wa.me/15551234567?text=hi").unwrap().id,
            "whatsapp"
        );
    }

    #[test]
    fn domains_match_subdomains_but_not_paths() {
        assert_eq!(
            match_template("https://www.youtube.com/watch?v=x").unwrap().id,
            "youtube"
        );
        assert_eq!(match_template("https://youtu.be/x").unwrap().id, "youtube");
        // the domain appearing in the path is not a match
        assert!(match_template("https://example.com/youtube.com").is_none());
    }

    #[test]
    fn unmatched_payloads_return_none() {
        assert!(match_template("https://my-own-site.example").is_none());
        assert!(match_template("plain text payload").is_none());
    }

    #[test]
    fn registry_ids_are_unique() {
        let mut ids: Vec<_> = all().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn stop_positions_span_the_palette() {
        let spread = stops(&["#111111", "#222222", "#333333"]);
        let positions: Vec<f32> = spread.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);

        // degenerate palettes must not divide by zero
        assert_eq!(stops(&["#111111"])[0].position, 0.0);
        assert!(stops(&[]).is_empty());
    }

    #[test]
    fn registered_gradients_keep_stops_in_range() {
        for template in all() {
            if let Some(gradient) = &template.gradient {
                for stop in &gradient.stops {
                    assert!(stop.position.is_finite(), "{}: {:?}", template.id, stop);
                    assert!((0.0..=1.0).contains(&stop.position), "{}: {:?}", template.id, stop);
                }
            }
        }
    }
}
