// SPDX-License-Identifier: MIT
//! Content synthesis — structured form data to canonical payload strings.
//!
//! Every function here is deterministic and side-effect free: the same form
//! always synthesizes the same payload. Missing fields fall back to the
//! category's sample values rather than emitting empty record fields, so a
//! partially-filled form still previews as a valid scannable payload.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Characters escaped inside mailto:/sms:/wa.me query components.
const COMPONENT_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'&')
    .add(b'?')
    .add(b'=')
    .add(b'%')
    .add(b'+');

// ─── Field validators ─────────────────────────────────────────────────────────

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ().\-]{1,19}$").expect("regex: phone"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("regex: email"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://\S+|www\.\S+)$").expect("regex: url"));

// ─── Categories ───────────────────────────────────────────────────────────────

/// The supported payload categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[default]
    Link,
    Text,
    Email,
    Call,
    Sms,
    Whatsapp,
    Wifi,
    Vcard,
}

impl ContentKind {
    pub const ALL: [ContentKind; 8] = [
        ContentKind::Link,
        ContentKind::Text,
        ContentKind::Email,
        ContentKind::Call,
        ContentKind::Sms,
        ContentKind::Whatsapp,
        ContentKind::Wifi,
        ContentKind::Vcard,
    ];

    /// The pre-filled sample form shown before any user input.
    pub fn placeholder(&self) -> ContentForm {
        match self {
            ContentKind::Link => ContentForm::Link {
                url: "https://scanforge.dev".into(),
            },
            ContentKind::Text => ContentForm::Text {
                message: "Welcome to Scanforge".into(),
            },
            ContentKind::Email => ContentForm::Email {
                address: "hello@scanforge.dev".into(),
                subject: "Hello".into(),
                body: String::new(),
            },
            ContentKind::Call => ContentForm::Call {
                country_code: "+1".into(),
                phone_number: "5551234".into(),
            },
            ContentKind::Sms => ContentForm::Sms {
                country_code: "+1".into(),
                phone_number: "5551234".into(),
                message: "Hello".into(),
            },
            ContentKind::Whatsapp => ContentForm::Whatsapp {
                phone_number: "+1 (555) 123-4567".into(),
                message: "Hello".into(),
            },
            ContentKind::Wifi => ContentForm::Wifi {
                ssid: "MyNetwork".into(),
                password: "password123".into(),
                security: WifiSecurity::Wpa,
                hidden: false,
            },
            ContentKind::Vcard => ContentForm::Vcard {
                first_name: "Alex".into(),
                last_name: "Rivera".into(),
                organization: "Scanforge".into(),
                title: "Product Lead".into(),
                phone: "+1 555 010 0000".into(),
                email: "alex@scanforge.dev".into(),
                website: "https://scanforge.dev".into(),
                address: "1 Infinite Loop, Cupertino".into(),
            },
        }
    }
}

/// WiFi security type for the `WIFI:` record's `T:` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    Open,
}

impl WifiSecurity {
    fn record_tag(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Open => "nopass",
        }
    }
}

/// Per-category structured form state, as entered in the UI.
///
/// Empty string fields mean "not filled in" and synthesize from the
/// category placeholder instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentForm {
    Link {
        url: String,
    },
    Text {
        message: String,
    },
    Email {
        address: String,
        subject: String,
        body: String,
    },
    Call {
        country_code: String,
        phone_number: String,
    },
    Sms {
        country_code: String,
        phone_number: String,
        message: String,
    },
    Whatsapp {
        phone_number: String,
        message: String,
    },
    Wifi {
        ssid: String,
        password: String,
        security: WifiSecurity,
        hidden: bool,
    },
    Vcard {
        first_name: String,
        last_name: String,
        organization: String,
        title: String,
        phone: String,
        email: String,
        website: String,
        address: String,
    },
}

impl ContentForm {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentForm::Link { .. } => ContentKind::Link,
            ContentForm::Text { .. } => ContentKind::Text,
            ContentForm::Email { .. } => ContentKind::Email,
            ContentForm::Call { .. } => ContentKind::Call,
            ContentForm::Sms { .. } => ContentKind::Sms,
            ContentForm::Whatsapp { .. } => ContentKind::Whatsapp,
            ContentForm::Wifi { .. } => ContentKind::Wifi,
            ContentForm::Vcard { .. } => ContentKind::Vcard,
        }
    }

    /// An entirely blank form for the category. Synthesizing it yields the
    /// category's placeholder payload via the per-field fallbacks.
    pub fn empty(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Link => ContentForm::Link { url: String::new() },
            ContentKind::Text => ContentForm::Text {
                message: String::new(),
            },
            ContentKind::Email => ContentForm::Email {
                address: String::new(),
                subject: String::new(),
                body: String::new(),
            },
            ContentKind::Call => ContentForm::Call {
                country_code: String::new(),
                phone_number: String::new(),
            },
            ContentKind::Sms => ContentForm::Sms {
                country_code: String::new(),
                phone_number: String::new(),
                message: String::new(),
            },
            ContentKind::Whatsapp => ContentForm::Whatsapp {
                phone_number: String::new(),
                message: String::new(),
            },
            ContentKind::Wifi => ContentForm::Wifi {
                ssid: String::new(),
                password: String::new(),
                security: WifiSecurity::default(),
                hidden: false,
            },
            ContentKind::Vcard => ContentForm::Vcard {
                first_name: String::new(),
                last_name: String::new(),
                organization: String::new(),
                title: String::new(),
                phone: String::new(),
                email: String::new(),
                website: String::new(),
                address: String::new(),
            },
        }
    }

    /// Check user-entered fields against the category validators.
    ///
    /// Empty fields are not errors — they fall back at synthesis time.
    /// Failures here are inline field feedback and never reach the Error
    /// phase.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            ContentForm::Link { url } => check(url, &URL_RE, "url", "must be an http(s) URL"),
            ContentForm::Text { .. } => Ok(()),
            ContentForm::Email { address, .. } => {
                check(address, &EMAIL_RE, "address", "must be a valid email address")
            }
            ContentForm::Call {
                country_code,
                phone_number,
            } => {
                check_country_code(country_code)?;
                check(phone_number, &PHONE_RE, "phone_number", "must be a phone number")
            }
            ContentForm::Sms {
                country_code,
                phone_number,
                ..
            } => {
                check_country_code(country_code)?;
                check(phone_number, &PHONE_RE, "phone_number", "must be a phone number")
            }
            ContentForm::Whatsapp { phone_number, .. } => check(
                phone_number,
                &PHONE_RE,
                "phone_number",
                "must be a phone number",
            ),
            ContentForm::Wifi { .. } => Ok(()),
            ContentForm::Vcard { phone, email, website, .. } => {
                check(phone, &PHONE_RE, "phone", "must be a phone number")?;
                check(email, &EMAIL_RE, "email", "must be a valid email address")?;
                check(website, &URL_RE, "website", "must be an http(s) URL")
            }
        }
    }
}

fn check(
    value: &str,
    re: &Regex,
    field: &'static str,
    message: &str,
) -> EngineResult<()> {
    let value = value.trim();
    if value.is_empty() || re.is_match(value) {
        Ok(())
    } else {
        Err(EngineError::Validation {
            field,
            message: message.to_string(),
        })
    }
}

fn check_country_code(value: &str) -> EngineResult<()> {
    let value = value.trim();
    if value.is_empty() || (value.starts_with('+') && value[1..].chars().all(|c| c.is_ascii_digit()))
    {
        Ok(())
    } else {
        Err(EngineError::Validation {
            field: "country_code",
            message: "must be + followed by digits".to_string(),
        })
    }
}

// ─── Synthesis ────────────────────────────────────────────────────────────────

/// Map a structured form to its canonical payload string.
pub fn synthesize(form: &ContentForm) -> String {
    let fallback = form.kind().placeholder();
    match (form, &fallback) {
        (ContentForm::Link { url }, ContentForm::Link { url: d }) => {
            or_default(url, d).to_string()
        }

        (ContentForm::Text { message }, ContentForm::Text { message: d }) => {
            or_default(message, d).to_string()
        }

        (
            ContentForm::Email {
                address,
                subject,
                body,
            },
            ContentForm::Email {
                address: da,
                subject: ds,
                body: db,
            },
        ) => {
            let mut uri = format!("mailto:{}", or_default(address, da));
            let mut params = Vec::new();
            let subject = or_default(subject, ds);
            let body = or_default(body, db);
            if !subject.is_empty() {
                params.push(format!("subject={}", escape_component(subject)));
            }
            if !body.is_empty() {
                params.push(format!("body={}", escape_component(body)));
            }
            if !params.is_empty() {
                uri.push('?');
                uri.push_str(&params.join("&"));
            }
            uri
        }

        (
            ContentForm::Call {
                country_code,
                phone_number,
            },
            ContentForm::Call {
                country_code: dc,
                phone_number: dn,
            },
        ) => format!(
            "tel:{}{}",
            or_default(country_code, dc).trim(),
            or_default(phone_number, dn).trim()
        ),

        (
            ContentForm::Sms {
                country_code,
                phone_number,
                message,
            },
            ContentForm::Sms {
                country_code: dc,
                phone_number: dn,
                message: dm,
            },
        ) => {
            let mut uri = format!(
                "sms:{}{}",
                or_default(country_code, dc).trim(),
                or_default(phone_number, dn).trim()
            );
            let message = or_default(message, dm);
            if !message.is_empty() {
                uri.push_str("?body=");
                uri.push_str(&escape_component(message));
            }
            uri
        }

        (
            ContentForm::Whatsapp {
                phone_number,
                message,
            },
            ContentForm::Whatsapp {
                phone_number: dn,
                message: dm,
            },
        ) => {
            // wa.me accepts digits only — strip formatting characters.
            let digits: String = or_default(phone_number, dn)
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            let mut uri = format!("https://wa.me/{digits}");
            let message = or_default(message, dm);
            if !message.is_empty() {
                uri.push_str("?text=");
                uri.push_str(&escape_component(message));
            }
            uri
        }

        (
            ContentForm::Wifi {
                ssid,
                password,
                security,
                hidden,
            },
            ContentForm::Wifi {
                ssid: ds,
                password: dp,
                ..
            },
        ) => {
            let password = match security {
                WifiSecurity::Open => "",
                _ => or_default(password, dp),
            };
            format!(
                "WIFI:T:{};S:{};P:{};H:{};;",
                security.record_tag(),
                escape_wifi(or_default(ssid, ds)),
                escape_wifi(password),
                hidden
            )
        }

        (
            ContentForm::Vcard {
                first_name,
                last_name,
                organization,
                title,
                phone,
                email,
                website,
                address,
            },
            ContentForm::Vcard {
                first_name: df,
                last_name: dl,
                organization: do_,
                title: dt,
                phone: dp,
                email: de,
                website: dw,
                address: da,
            },
        ) => {
            let first = or_default(first_name, df);
            let last = or_default(last_name, dl);
            [
                "BEGIN:VCARD".to_string(),
                "VERSION:3.0".to_string(),
                format!("N:{last};{first}"),
                format!("FN:{first} {last}"),
                format!("ORG:{}", or_default(organization, do_)),
                format!("TITLE:{}", or_default(title, dt)),
                format!("TEL:{}", or_default(phone, dp)),
                format!("EMAIL:{}", or_default(email, de)),
                format!("URL:{}", or_default(website, dw)),
                format!("ADR:;;{};;;;", or_default(address, da)),
                "END:VCARD".to_string(),
            ]
            .join("\n")
        }

        // kind() guarantees the fallback is the same variant
        _ => unreachable!("placeholder variant mismatch"),
    }
}

/// Payloads synthesized from each category's blank form.
static PLACEHOLDER_PAYLOADS: Lazy<Vec<String>> = Lazy::new(|| {
    ContentKind::ALL
        .iter()
        .map(|kind| synthesize(&kind.placeholder()))
        .collect()
});

/// Whether `payload` is one of the pre-filled sample payloads. Placeholder
/// renders are exempt from the minimum-perceived-latency floor.
pub fn is_placeholder(payload: &str) -> bool {
    PLACEHOLDER_PAYLOADS.iter().any(|p| p == payload)
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

fn escape_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ESCAPE).to_string()
}

/// Escape the characters the WIFI: record reserves.
fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_fixed_record_format() {
        let form = ContentForm::Wifi {
            ssid: "Net".into(),
            password: "pw".into(),
            security: WifiSecurity::Wpa,
            hidden: false,
        };
        assert_eq!(synthesize(&form), "WIFI:T:WPA;S:Net;P:pw;H:false;;");
    }

    #[test]
    fn call_concatenates_country_code_and_number() {
        let form = ContentForm::Call {
            country_code: "+1".into(),
            phone_number: "5551234".into(),
        };
        assert_eq!(synthesize(&form), "tel:+15551234");
    }

    #[test]
    fn link_is_verbatim() {
        let form = ContentForm::Link {
            url: "https://example.com/a?b=c".into(),
        };
        assert_eq!(synthesize(&form), "https://example.com/a?b=c");
    }

    #[test]
    fn email_escapes_subject_and_body() {
        let form = ContentForm::Email {
            address: "a@b.com".into(),
            subject: "Hi there & hello".into(),
            body: "Line one".into(),
        };
        assert_eq!(
            synthesize(&form),
            "mailto:a@b.com?subject=Hi%20there%20%26%20hello&body=Line%20one"
        );
    }

    #[test]
    fn whatsapp_strips_number_formatting() {
        let form = ContentForm::Whatsapp {
            phone_number: "+1 (555) 123-4567".into(),
            message: "See you".into(),
        };
        assert_eq!(
            synthesize(&form),
            "https://wa.me/15551234567?text=See%20you"
        );
    }

    #[test]
    fn wifi_escapes_reserved_characters() {
        let form = ContentForm::Wifi {
            ssid: "Cafe;Net".into(),
            password: "a:b".into(),
            security: WifiSecurity::Wpa,
            hidden: true,
        };
        assert_eq!(
            synthesize(&form),
            "WIFI:T:WPA;S:Cafe\\;Net;P:a\\:b;H:true;;"
        );
    }

    #[test]
    fn open_network_omits_password() {
        let form = ContentForm::Wifi {
            ssid: "Lobby".into(),
            password: "ignored".into(),
            security: WifiSecurity::Open,
            hidden: false,
        };
        assert_eq!(synthesize(&form), "WIFI:T:nopass;S:Lobby;P:;H:false;;");
    }

    #[test]
    fn blank_form_synthesizes_placeholder() {
        for kind in ContentKind::ALL {
            let blank = synthesize(&ContentForm::empty(kind));
            let sample = synthesize(&kind.placeholder());
            assert_eq!(blank, sample, "{kind:?}");
            assert!(is_placeholder(&blank), "{kind:?}");
        }
    }

    #[test]
    fn user_content_is_not_placeholder() {
        assert!(!is_placeholder("https://my-own-site.example"));
        assert!(is_placeholder("https://scanforge.dev"));
    }

    #[test]
    fn partial_vcard_falls_back_per_field() {
        let form = ContentForm::Vcard {
            first_name: "Dana".into(),
            last_name: String::new(),
            organization: String::new(),
            title: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            address: String::new(),
        };
        let payload = synthesize(&form);
        assert!(payload.starts_with("BEGIN:VCARD\nVERSION:3.0\n"));
        assert!(payload.contains("FN:Dana Rivera"));
        assert!(payload.contains("ORG:Scanforge"));
        assert!(payload.ends_with("END:VCARD"));
    }

    #[test]
    fn validators_flag_malformed_input_only() {
        let bad = ContentForm::Call {
            country_code: "+1".into(),
            phone_number: "not a phone".into(),
        };
        assert!(bad.validate().is_err());

        let empty = ContentForm::Call {
            country_code: String::new(),
            phone_number: String::new(),
        };
        assert!(empty.validate().is_ok());

        let good = ContentForm::Email {
            address: "user@example.com".into(),
            subject: String::new(),
            body: String::new(),
        };
        assert!(good.validate().is_ok());
    }
}
