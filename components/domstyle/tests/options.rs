/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

mod common;

use common::{append, matches, page_with};
use domstyle::{ComplianceMode, Document, DocumentOptions, ParserFlags, PropertyRegistration};
use url::Url;

#[test]
fn options_deserialize_with_defaults() {
    let options: DocumentOptions = serde_json::from_str(
        r#"{
            "compliance_mode": "quirks",
            "target_medium": "print",
            "url": "https://example.com/index.html#top"
        }"#,
    )
    .unwrap();
    assert_eq!(options.compliance_mode, Some(ComplianceMode::Quirks));
    assert!(options.html);
    assert!(options.style_cache);
    assert_eq!(options.parser_flags, ParserFlags::empty());

    let document = Document::new(Some("html"), options);
    assert!(document.compliance_mode().is_quirks());
    assert_eq!(document.target_medium(), "print");
    assert_eq!(document.url().and_then(Url::fragment), Some("top"));
}

#[test]
fn parser_flags_survive_serialization() {
    let options = DocumentOptions {
        parser_flags: ParserFlags::IGNORE_STYLE_ATTRIBUTES | ParserFlags::REPORT_CSS_ERRORS,
        html: false,
        ..DocumentOptions::default()
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: DocumentOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back.parser_flags, options.parser_flags);
    assert!(!back.html);
    assert_eq!(back.target_medium, "screen");
}

#[test]
fn property_registrations_deserialize() {
    let registration: PropertyRegistration =
        serde_json::from_str(r#"{ "name": "--accent", "inherits": true, "initial_value": "red" }"#)
            .unwrap();
    assert_eq!(registration.name, "--accent");
    assert_eq!(registration.syntax, "*");
    assert!(registration.inherits);
    assert_eq!(registration.initial_value.as_deref(), Some("red"));
}

#[test]
fn xml_documents_match_names_case_sensitively() {
    let options = DocumentOptions {
        html: false,
        ..DocumentOptions::default()
    };
    let mut page = page_with(Some("catalog"), options);
    let item = append(&mut page.document, page.body, "Item", &[("Kind", "book")]);
    assert!(matches(&page.document, item, "Item"));
    assert!(!matches(&page.document, item, "item"));
    assert!(matches(&page.document, item, "[Kind=book]"));
    assert!(page.document.element(item).unwrap().namespace().is_empty());
}
