// SPDX-License-Identifier: MIT
// Content form synthesis and validation across every category.

use scanforge::content::{is_placeholder, synthesize, ContentForm, ContentKind, WifiSecurity};

// ─── Sample payloads ──────────────────────────────────────────────────────────

#[test]
fn every_category_synthesizes_its_sample_payload() {
    let expected = [
        (ContentKind::Link, "https://scanforge.dev".to_string()),
        (ContentKind::Text, "Welcome to Scanforge".to_string()),
        (
            ContentKind::Email,
            "mailto:hello@scanforge.dev?subject=Hello".to_string(),
        ),
        (ContentKind::Call, "tel:+15551234".to_string()),
        (ContentKind::Sms, "sms:+15551234?body=Hello".to_string()),
        (
            ContentKind::Whatsapp,
            "https://wa.me/15551234567?text=Hello".to_string(),
        ),
        (
            ContentKind::Wifi,
            "WIFI:T:WPA;S:MyNetwork;P:password123;H:false;;".to_string(),
        ),
        (
            ContentKind::Vcard,
            [
                "BEGIN:VCARD",
                "VERSION:3.0",
                "N:Rivera;Alex",
                "FN:Alex Rivera",
                "ORG:Scanforge",
                "TITLE:Product Lead",
                "TEL:+1 555 010 0000",
                "EMAIL:alex@scanforge.dev",
                "URL:https://scanforge.dev",
                "ADR:;;1 Infinite Loop, Cupertino;;;;",
                "END:VCARD",
            ]
            .join("\n"),
        ),
    ];
    for (kind, payload) in expected {
        assert_eq!(
            synthesize(&kind.placeholder()),
            payload,
            "sample payload drifted for {kind:?}"
        );
    }
}

#[test]
fn blank_forms_and_samples_are_indistinguishable() {
    for kind in ContentKind::ALL {
        let from_blank = synthesize(&ContentForm::empty(kind));
        let from_sample = synthesize(&kind.placeholder());
        assert_eq!(from_blank, from_sample, "blank {kind:?} must match its sample");
        assert!(
            is_placeholder(&from_blank),
            "blank {kind:?} must be detected as a sample"
        );
    }
    assert!(!is_placeholder("https://my-site.example"));
    assert!(!is_placeholder(""));
}

// ─── Per-field fallback ───────────────────────────────────────────────────────

#[test]
fn filled_fields_override_sample_values_per_field() {
    // Only the message is user input: number and country code fall back.
    let form = ContentForm::Sms {
        country_code: String::new(),
        phone_number: String::new(),
        message: "On my way".into(),
    };
    assert_eq!(synthesize(&form), "sms:+15551234?body=On%20my%20way");

    // Only the address is user input: the subject falls back to the sample.
    let form = ContentForm::Email {
        address: "me@my-site.example".into(),
        subject: String::new(),
        body: String::new(),
    };
    assert_eq!(synthesize(&form), "mailto:me@my-site.example?subject=Hello");
}

#[test]
fn mailto_parameters_join_and_encode() {
    let form = ContentForm::Email {
        address: "a@b.com".into(),
        subject: "Weekly sync".into(),
        body: "Agenda: 1+1".into(),
    };
    assert_eq!(
        synthesize(&form),
        "mailto:a@b.com?subject=Weekly%20sync&body=Agenda:%201%2B1"
    );

    // A blank body drops its parameter entirely.
    let form = ContentForm::Email {
        address: "a@b.com".into(),
        subject: "Weekly sync".into(),
        body: String::new(),
    };
    assert_eq!(synthesize(&form), "mailto:a@b.com?subject=Weekly%20sync");
}

#[test]
fn vcard_lines_are_ordered() {
    let form = ContentForm::Vcard {
        first_name: "Jo".into(),
        last_name: "Chen".into(),
        organization: "Acme".into(),
        title: "CTO".into(),
        phone: "+44 20 7946 0000".into(),
        email: "jo@acme.example".into(),
        website: "https://acme.example".into(),
        address: "12 Long Lane, London".into(),
    };
    let payload = synthesize(&form);
    let lines: Vec<&str> = payload.lines().collect();
    assert_eq!(lines[0], "BEGIN:VCARD");
    assert_eq!(lines[1], "VERSION:3.0");
    assert_eq!(lines[2], "N:Chen;Jo");
    assert_eq!(lines[3], "FN:Jo Chen");
    assert_eq!(lines[9], "ADR:;;12 Long Lane, London;;;;");
    assert_eq!(lines[10], "END:VCARD");
}

// ─── Validation ───────────────────────────────────────────────────────────────

#[test]
fn partial_forms_validate_clean() {
    // Empty fields are "not filled in", never validation failures.
    assert!(ContentForm::empty(ContentKind::Link).validate().is_ok());
    assert!(ContentForm::empty(ContentKind::Call).validate().is_ok());
    assert!(ContentForm::empty(ContentKind::Vcard).validate().is_ok());

    let half_filled = ContentForm::Vcard {
        first_name: "Jo".into(),
        last_name: String::new(),
        organization: String::new(),
        title: String::new(),
        phone: String::new(),
        email: String::new(),
        website: String::new(),
        address: String::new(),
    };
    assert!(half_filled.validate().is_ok());
}

#[test]
fn malformed_fields_reject_with_field_names() {
    let bad_url = ContentForm::Link {
        url: "not a url".into(),
    };
    let err = bad_url.validate().unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("invalid url"));

    let bad_address = ContentForm::Email {
        address: "nope".into(),
        subject: String::new(),
        body: String::new(),
    };
    let err = bad_address.validate().unwrap_err();
    assert!(err.to_string().contains("invalid address"));

    let bad_code = ContentForm::Call {
        country_code: "001".into(),
        phone_number: "5551234".into(),
    };
    let err = bad_code.validate().unwrap_err();
    assert!(err.to_string().contains("invalid country_code"));
}

// ─── Wire shape ───────────────────────────────────────────────────────────────

#[test]
fn forms_serialize_kind_tagged_in_snake_case() {
    let form = ContentForm::Wifi {
        ssid: "MyNetwork".into(),
        password: "password123".into(),
        security: WifiSecurity::Wpa,
        hidden: false,
    };
    let wire = serde_json::to_value(&form).unwrap();
    assert_eq!(wire["kind"], "wifi");
    assert_eq!(wire["ssid"], "MyNetwork");
    assert_eq!(wire["security"], "wpa");

    let parsed: ContentForm = serde_json::from_str(
        r#"{"kind": "call", "country_code": "+44", "phone_number": "2079460000"}"#,
    )
    .unwrap();
    assert_eq!(parsed.kind(), ContentKind::Call);
}
