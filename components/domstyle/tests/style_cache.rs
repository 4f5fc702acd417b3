/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

mod common;

use common::{Page, append, append_text, page, page_with};
use domstyle::{
    CacheState, Cascade, CascadeInputs, ComputedValues, Document, DocumentOptions, Error,
    ParserFlags, PropertyRegistration, PseudoElement, StyleSerial,
};
use servo_arc::Arc;

/// Applies presentational hints, then matching rules, then the `style`
/// attribute, last one wins. `color` inherits.
struct DeclaredValues;

impl Cascade for DeclaredValues {
    fn cascade(&self, inputs: &CascadeInputs<'_>) -> ComputedValues {
        let mut values = ComputedValues::new();
        if let Some(color) = inputs.parent_style.and_then(|parent| parent.get("color")) {
            values.insert("color", color);
        }
        for hint in inputs.presentational_hints {
            values.insert(hint.name.as_str(), hint.value.as_str());
        }
        for block in inputs.matching_rules() {
            for declaration in block.declarations {
                values.insert(declaration.name.as_str(), declaration.value.as_str());
            }
        }
        for declaration in inputs.style_attribute {
            values.insert(declaration.name.as_str(), declaration.value.as_str());
        }
        values
    }
}

fn styled(mut page: Page, css: &str) -> Page {
    page.document = page.document.with_cascade(DeclaredValues);
    let style = append(&mut page.document, page.head, "style", &[]);
    append_text(&mut page.document, style, css);
    page
}

#[test]
fn serial_starts_at_the_sentinel() {
    let document = Document::new(Some("html"), DocumentOptions::default());
    assert_eq!(document.style_serial(), StyleSerial::NEVER_COMPUTED);
    assert_eq!(document.cache_state(), CacheState::Dirty);
}

#[test]
fn reads_without_mutation_share_one_style() {
    let mut page = styled(page(), "p { color: red }");
    let p = append(&mut page.document, page.body, "p", &[]);

    let first = page.document.computed_style(p, None).unwrap();
    let second = page.document.computed_style(p, None).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.get("color"), Some("red"));
    assert_eq!(first.serial(), page.document.style_serial());

    page.document.set_attribute(p, "class", "x").unwrap();
    let third = page.document.computed_style(p, None).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert!(third.serial() > first.serial());
}

#[test]
fn rules_apply_by_specificity_then_source_order() {
    let mut page = styled(
        page(),
        "p.x { color: blue } p { color: red } p { background: white }",
    );
    let p = append(&mut page.document, page.body, "p", &[("class", "x")]);
    let span = append(&mut page.document, p, "span", &[]);
    let plain = append(&mut page.document, page.body, "p", &[("style", "color: green")]);

    let style = page.document.computed_style(p, None).unwrap();
    assert_eq!(style.get("color"), Some("blue"));
    assert_eq!(style.get("background"), Some("white"));
    let inherited = page.document.computed_style(span, None).unwrap();
    assert_eq!(inherited.get("color"), Some("blue"));
    assert!(Arc::ptr_eq(inherited.parent_style().unwrap(), &style));
    let overridden = page.document.computed_style(plain, None).unwrap();
    assert_eq!(overridden.get("color"), Some("green"));
}

#[test]
fn media_rules_follow_the_target_medium() {
    let mut page = styled(
        page(),
        "p { color: red } @media print { p { color: black } }",
    );
    let p = append(&mut page.document, page.body, "p", &[]);
    assert_eq!(
        page.document.computed_style(p, None).unwrap().get("color"),
        Some("red")
    );

    page.document.set_target_medium("print");
    assert_eq!(page.document.cache_state(), CacheState::Dirty);
    assert_eq!(
        page.document.computed_style(p, None).unwrap().get("color"),
        Some("black")
    );
}

#[test]
fn parent_styles_are_refreshed_when_the_child_is_read() {
    let mut page = styled(page(), ".warm { color: orange }");
    let div = append(&mut page.document, page.body, "div", &[]);
    let span = append(&mut page.document, div, "span", &[]);

    let before = page.document.computed_style(span, None).unwrap();
    assert_eq!(before.get("color"), None);

    page.document.set_attribute(div, "class", "warm").unwrap();
    let after = page.document.computed_style(span, None).unwrap();
    assert_eq!(after.get("color"), Some("orange"));
    let parent = page.document.computed_style(div, None).unwrap();
    assert!(Arc::ptr_eq(after.parent_style().unwrap(), &parent));
}

#[test]
fn pseudo_element_styles_inherit_from_their_element() {
    let mut page = styled(page(), "p { color: red } p::before { color: blue }");
    let p = append(&mut page.document, page.body, "p", &[]);

    let element = page.document.computed_style(p, None).unwrap();
    let before = page
        .document
        .computed_style(p, Some(PseudoElement::Before))
        .unwrap();
    assert_eq!(element.get("color"), Some("red"));
    assert_eq!(before.get("color"), Some("blue"));
    assert_eq!(before.pseudo_element(), Some(PseudoElement::Before));
    assert!(Arc::ptr_eq(before.parent_style().unwrap(), &element));

    let after = page
        .document
        .computed_style(p, Some(PseudoElement::After))
        .unwrap();
    assert_eq!(after.get("color"), Some("red"));
}

#[test]
fn disabled_cache_recomputes_every_read() {
    let options = DocumentOptions {
        style_cache: false,
        ..DocumentOptions::default()
    };
    let mut page = styled(page_with(Some("html"), options), "p { color: red }");
    let p = append(&mut page.document, page.body, "p", &[]);

    let first = page.document.computed_style(p, None).unwrap();
    let second = page.document.computed_style(p, None).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.values(), second.values());
}

#[test]
fn presentational_hints_and_style_attributes_can_be_ignored() {
    let mut page = styled(page(), "");
    let div = append(
        &mut page.document,
        page.body,
        "div",
        &[("hidden", ""), ("style", "color: teal")],
    );
    let style = page.document.computed_style(div, None).unwrap();
    assert_eq!(style.get("display"), Some("none"));
    assert_eq!(style.get("color"), Some("teal"));

    let options = DocumentOptions {
        parser_flags: ParserFlags::IGNORE_PRESENTATIONAL_HINTS | ParserFlags::IGNORE_STYLE_ATTRIBUTES,
        ..DocumentOptions::default()
    };
    let mut page = styled(page_with(Some("html"), options), "");
    let div = append(
        &mut page.document,
        page.body,
        "div",
        &[("hidden", ""), ("style", "color: teal")],
    );
    let style = page.document.computed_style(div, None).unwrap();
    assert_eq!(style.get("display"), None);
    assert_eq!(style.get("color"), None);
}

#[test]
fn only_sheet_affecting_mutations_dirty_the_cache() {
    let mut page = page();
    let style = append(&mut page.document, page.head, "style", &[]);
    let div = append(&mut page.document, page.body, "div", &[]);
    assert_eq!(page.document.cache_state(), CacheState::Dirty);
    page.document.style_sheets();
    assert_eq!(page.document.cache_state(), CacheState::Clean);

    let serial = page.document.style_serial();
    page.document.set_attribute(div, "class", "a").unwrap();
    assert!(page.document.style_serial() > serial);
    assert_eq!(page.document.cache_state(), CacheState::Clean);

    page.document.set_attribute(div, "style", "color: red").unwrap();
    assert_eq!(page.document.cache_state(), CacheState::Dirty);
    page.document.style_sheets();

    append_text(&mut page.document, style, "p {}");
    assert_eq!(page.document.cache_state(), CacheState::Dirty);
    page.document.style_sheets();

    page.document.set_attribute(style, "media", "print").unwrap();
    assert_eq!(page.document.cache_state(), CacheState::Dirty);
    page.document.style_sheets();

    page.document.rebuild_cascade();
    assert_eq!(page.document.cache_state(), CacheState::Dirty);
}

#[test]
fn registered_properties_take_their_initial_values() {
    let mut page = page();
    page.document.style_sheets();
    page.document
        .register_property(PropertyRegistration {
            name: "--gap".to_owned(),
            syntax: "<length>".to_owned(),
            inherits: false,
            initial_value: Some("4px".to_owned()),
        })
        .unwrap();
    assert_eq!(page.document.cache_state(), CacheState::Dirty);

    let style = page.document.computed_style(page.body, None).unwrap();
    assert_eq!(style.get("--gap"), Some("4px"));

    let duplicate = PropertyRegistration {
        name: "--gap".to_owned(),
        syntax: "*".to_owned(),
        inherits: true,
        initial_value: None,
    };
    assert_eq!(
        page.document.register_property(duplicate),
        Err(Error::InvalidModification)
    );
    let not_custom = PropertyRegistration {
        name: "color".to_owned(),
        syntax: "*".to_owned(),
        inherits: true,
        initial_value: None,
    };
    assert!(matches!(
        page.document.register_property(not_custom),
        Err(Error::Syntax(_))
    ));
}
