/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

mod common;

use common::{append, append_text, matches, page, page_with, selectors};
use domstyle::structural::{self, AnPlusB, NthFilter, RelativeCombinator};
use domstyle::{DocumentOptions, ElementState, PseudoElement, attr};
use quickcheck::quickcheck;
use url::Url;

#[test]
fn matching_is_idempotent() {
    let mut page = page();
    let div = append(&mut page.document, page.body, "div", &[("class", "a b")]);
    let list = selectors("body > div.b, p");
    let first = page.document.matches(div, &list, None);
    let second = page.document.matches(div, &list, None);
    assert!(first);
    assert_eq!(first, second);
    assert_eq!(page.document.matched_index(div, &list, None), Some(0));
    assert!(!page.document.matches(page.body, &list, None));
}

#[test]
fn specificity_comes_from_the_selector() {
    let mut page = page();
    let div = append(&mut page.document, page.body, "div", &[("id", "a"), ("class", "b")]);
    let element = page.document.element(div).unwrap();
    let by_id = element.matching_specificity(&selectors("#a")).unwrap();
    let by_class = element.matching_specificity(&selectors(".b")).unwrap();
    let by_type = element.matching_specificity(&selectors("div")).unwrap();
    assert!(by_id > by_class);
    assert!(by_class > by_type);
    assert_eq!(
        element.matching_specificity(&selectors("div, #a.b")),
        Some(by_id + by_class)
    );
    assert_eq!(element.matching_specificity(&selectors("span")), None);
}

#[test]
fn class_matching_follows_compliance_mode() {
    let mut strict = page();
    let div = append(&mut strict.document, strict.body, "div", &[("class", "ExampleClass")]);
    assert!(!matches(&strict.document, div, ".exampleclass"));
    assert!(matches(&strict.document, div, ".ExampleClass"));

    let mut quirks = page_with(None, DocumentOptions::default());
    assert!(quirks.document.compliance_mode().is_quirks());
    let div = append(
        &mut quirks.document,
        quirks.body,
        "div",
        &[("class", "ExampleClass"), ("id", "Foo")],
    );
    assert!(matches(&quirks.document, div, ".exampleclass"));
    assert!(matches(&quirks.document, div, "#foo"));
}

#[test]
fn local_names_ignore_case_in_html_documents() {
    let mut page = page();
    let div = append(&mut page.document, page.body, "DIV", &[]);
    assert!(matches(&page.document, div, "div"));
    assert_eq!(&**page.document.element(div).unwrap().local_name(), "DIV");
}

#[test]
fn nth_child_counts_from_one() {
    let mut page = page();
    let ul = append(&mut page.document, page.body, "ul", &[]);
    let items: Vec<_> = (0..5)
        .map(|_| append(&mut page.document, ul, "li", &[]))
        .collect();

    let even = page.document.query_selector_all(ul, "li:nth-child(even)").unwrap();
    assert_eq!(even, vec![items[1], items[3]]);
    let third = page.document.query_selector_all(ul, "li:nth-child(0n+3)").unwrap();
    assert_eq!(third, vec![items[2]]);
    let last_two = page.document.query_selector_all(ul, "li:nth-last-child(-n+2)").unwrap();
    assert_eq!(last_two, vec![items[3], items[4]]);

    let third = page.document.element(items[2]).unwrap();
    assert_eq!(structural::sibling_index(third, NthFilter::Any, false), Some(3));
    assert_eq!(structural::sibling_index(third, NthFilter::Any, true), Some(3));
    assert!(structural::nth_matches(third, AnPlusB::new(2, 1), NthFilter::Any, false));
}

#[test]
fn type_and_position_booleans() {
    let mut page = page();
    let div = append(&mut page.document, page.body, "div", &[]);
    let p = append(&mut page.document, div, "p", &[]);
    let span = append(&mut page.document, div, "span", &[]);
    let second_span = append(&mut page.document, div, "span", &[]);
    let doc = &page.document;

    assert!(matches(doc, p, ":first-child"));
    assert!(matches(doc, p, ":only-of-type"));
    assert!(matches(doc, span, ":first-of-type"));
    assert!(!matches(doc, span, ":last-of-type"));
    assert!(matches(doc, second_span, ":last-child"));
    assert!(!matches(doc, second_span, ":only-child"));
    assert!(matches(doc, page.html, ":root"));
    assert!(!matches(doc, page.body, ":root"));
    assert!(matches(doc, span, ":empty"));
    assert!(!matches(doc, div, ":empty"));
}

#[test]
fn empty_and_blank_differ_on_whitespace() {
    let mut page = page();
    let blank = append(&mut page.document, page.body, "p", &[]);
    append_text(&mut page.document, blank, " \n ");
    let comment_only = append(&mut page.document, page.body, "p", &[]);
    let comment = page.document.create_comment("note");
    page.document.append_child(comment_only, comment).unwrap();

    assert!(!matches(&page.document, blank, ":empty"));
    assert!(matches(&page.document, blank, ":blank"));
    assert!(matches(&page.document, comment_only, ":empty"));
}

#[test]
fn has_tracks_child_removal() {
    let mut page = page();
    let div = append(&mut page.document, page.body, "div", &[]);
    let img = append(&mut page.document, div, "img", &[]);
    let list = selectors("div:has(> img)");
    assert!(page.document.matches(div, &list, None));
    assert!(!page.document.matches(page.body, &list, None));
    assert!(matches(&page.document, page.body, "body:has(img)"));

    page.document.remove_child(div, img).unwrap();
    assert!(!page.document.matches(div, &list, None));
    assert!(!matches(&page.document, page.body, "body:has(img)"));
}

#[test]
fn lang_uses_the_nearest_declared_language() {
    let mut page = page();
    page.document.set_attribute(page.html, "lang", "de-DE").unwrap();
    let p = append(&mut page.document, page.body, "p", &[]);
    let quote = append(&mut page.document, p, "q", &[("lang", "en")]);
    let doc = &page.document;

    assert_eq!(attr::language(doc.element(p).unwrap()), "de-DE");
    assert!(matches(doc, p, ":lang(de)"));
    assert!(matches(doc, p, ":lang(de-DE)"));
    assert!(!matches(doc, p, ":lang(en)"));
    assert!(matches(doc, quote, ":lang(en)"));
    assert!(matches(doc, quote, ":lang(fr, en)"));
}

#[test]
fn dir_follows_the_directionality_algorithm() {
    let mut page = page();
    page.document.set_attribute(page.html, "dir", "rtl").unwrap();
    let p = append(&mut page.document, page.body, "p", &[]);
    let ltr = append(&mut page.document, p, "span", &[("dir", "ltr")]);
    let hebrew = append(&mut page.document, page.body, "bdi", &[]);
    append_text(&mut page.document, hebrew, "123 \u{05D0}\u{05D1}");
    let latin = append(&mut page.document, page.body, "bdi", &[]);
    append_text(&mut page.document, latin, "abc \u{05D0}");
    let tel = append(&mut page.document, page.body, "input", &[("type", "tel")]);
    let auto = append(
        &mut page.document,
        page.body,
        "input",
        &[("dir", "auto"), ("value", "\u{05D0}")],
    );
    let doc = &page.document;

    assert!(matches(doc, p, ":dir(rtl)"));
    assert!(!matches(doc, p, ":dir(ltr)"));
    assert!(matches(doc, ltr, ":dir(ltr)"));
    assert!(matches(doc, hebrew, ":dir(rtl)"));
    assert!(matches(doc, latin, ":dir(ltr)"));
    assert!(matches(doc, tel, ":dir(ltr)"));
    assert!(matches(doc, auto, ":dir(rtl)"));
}

#[test]
fn default_button_is_the_first_enabled_submit_button() {
    let mut page = page();
    let form = append(&mut page.document, page.body, "form", &[]);
    let first = append(&mut page.document, form, "button", &[]);
    let second = append(&mut page.document, form, "input", &[("type", "submit")]);
    let reset = append(&mut page.document, form, "button", &[("type", "reset")]);
    let orphan = append(&mut page.document, page.body, "input", &[("type", "submit")]);
    let second_orphan = append(&mut page.document, page.body, "button", &[]);

    assert!(matches(&page.document, first, ":default"));
    assert!(!matches(&page.document, second, ":default"));
    assert!(!matches(&page.document, reset, ":default"));
    // Submit buttons without a form owner share the absent owner.
    assert!(matches(&page.document, orphan, ":default"));
    assert!(!matches(&page.document, second_orphan, ":default"));

    page.document.set_attribute(first, "disabled", "").unwrap();
    assert!(!matches(&page.document, first, ":default"));
    assert!(matches(&page.document, second, ":default"));
}

#[test]
fn checked_options_and_inputs_are_default() {
    let mut page = page();
    let checkbox = append(
        &mut page.document,
        page.body,
        "input",
        &[("type", "checkbox"), ("checked", "")],
    );
    let select = append(&mut page.document, page.body, "select", &[]);
    let option = append(&mut page.document, select, "option", &[("selected", "")]);
    let doc = &page.document;
    assert!(matches(doc, checkbox, ":default"));
    assert!(matches(doc, checkbox, ":checked"));
    assert!(matches(doc, option, ":default"));
    assert!(matches(doc, option, ":checked"));
}

#[test]
fn fieldsets_disable_all_but_their_first_legend() {
    let mut page = page();
    let fieldset = append(&mut page.document, page.body, "fieldset", &[("disabled", "")]);
    let legend = append(&mut page.document, fieldset, "legend", &[]);
    let in_legend = append(&mut page.document, legend, "input", &[]);
    let outside = append(&mut page.document, fieldset, "input", &[]);
    let optgroup = append(&mut page.document, page.body, "optgroup", &[("disabled", "")]);
    let option = append(&mut page.document, optgroup, "option", &[]);
    let doc = &page.document;

    assert!(matches(doc, in_legend, ":enabled"));
    assert!(matches(doc, outside, ":disabled"));
    assert!(!matches(doc, outside, ":enabled"));
    assert!(matches(doc, option, ":disabled"));
    assert!(!matches(doc, legend, ":enabled"));
    assert!(!matches(doc, legend, ":disabled"));
}

#[test]
fn disabled_fieldsets_disable_every_descendant_outside_the_first_legend() {
    let mut page = page();
    let fieldset = append(&mut page.document, page.body, "fieldset", &[("disabled", "")]);
    let legend = append(&mut page.document, fieldset, "legend", &[]);
    let in_legend = append(&mut page.document, legend, "span", &[]);
    let second_legend = append(&mut page.document, fieldset, "legend", &[]);
    let div = append(&mut page.document, fieldset, "div", &[]);
    let nested = append(&mut page.document, div, "span", &[]);
    let optgroup = append(&mut page.document, fieldset, "optgroup", &[]);
    let doc = &page.document;

    assert!(!matches(doc, legend, ":disabled"));
    assert!(!matches(doc, in_legend, ":disabled"));
    assert!(matches(doc, second_legend, ":disabled"));
    assert!(matches(doc, div, ":disabled"));
    assert!(matches(doc, nested, ":disabled"));
    assert!(matches(doc, optgroup, ":disabled"));
    // `:enabled` still only applies to elements that can be disabled.
    assert!(!matches(doc, div, ":enabled"));

    page.document.remove_attribute(fieldset, "disabled").unwrap();
    assert!(!matches(&page.document, div, ":disabled"));
    assert!(matches(&page.document, optgroup, ":enabled"));
}

#[test]
fn text_control_pseudo_classes() {
    let mut page = page();
    let empty = append(
        &mut page.document,
        page.body,
        "input",
        &[("placeholder", "Name"), ("required", "")],
    );
    let filled = append(
        &mut page.document,
        page.body,
        "input",
        &[("placeholder", "Name"), ("value", "x"), ("readonly", "")],
    );
    let editable = append(&mut page.document, page.body, "div", &[("contenteditable", "")]);
    let plain = append(&mut page.document, page.body, "div", &[]);
    let doc = &page.document;

    assert!(matches(doc, empty, ":placeholder-shown"));
    assert!(!matches(doc, filled, ":placeholder-shown"));
    assert!(matches(doc, empty, ":required"));
    assert!(matches(doc, filled, ":optional"));
    assert!(matches(doc, empty, ":read-write"));
    assert!(matches(doc, filled, ":read-only"));
    assert!(matches(doc, editable, ":read-write"));
    assert!(matches(doc, plain, ":read-only"));
}

#[test]
fn indeterminate_radios_and_progress() {
    let mut page = page();
    let a = append(&mut page.document, page.body, "input", &[("type", "radio"), ("name", "g")]);
    let b = append(&mut page.document, page.body, "input", &[("type", "radio"), ("name", "g")]);
    let progress = append(&mut page.document, page.body, "progress", &[]);
    assert!(matches(&page.document, a, ":indeterminate"));
    assert!(matches(&page.document, progress, ":indeterminate"));

    page.document.set_attribute(b, "checked", "").unwrap();
    page.document.set_attribute(progress, "value", "0.5").unwrap();
    assert!(!matches(&page.document, a, ":indeterminate"));
    assert!(matches(&page.document, b, ":checked"));
    assert!(!matches(&page.document, progress, ":indeterminate"));
}

#[test]
fn runtime_states_come_from_the_registry() {
    let mut page = page();
    let form = append(&mut page.document, page.body, "form", &[]);
    let input = append(&mut page.document, form, "input", &[]);
    let sibling = append(&mut page.document, page.body, "div", &[]);
    let link = append(&mut page.document, page.body, "a", &[("href", "#top")]);

    assert!(!matches(&page.document, input, ":hover"));
    page.document.set_element_state(input, ElementState::HOVER, true).unwrap();
    page.document
        .set_element_state(input, ElementState::FOCUS | ElementState::FOCUS_VISIBLE, true)
        .unwrap();
    let doc = &page.document;
    assert!(matches(doc, input, ":hover"));
    assert!(matches(doc, input, ":focus"));
    assert!(matches(doc, input, ":focus-visible"));
    assert!(matches(doc, form, ":focus-within"));
    assert!(matches(doc, page.body, ":focus-within"));
    assert!(!matches(doc, sibling, ":focus-within"));

    assert!(matches(doc, link, ":link"));
    assert!(matches(doc, link, ":any-link"));
    page.document.set_element_state(link, ElementState::VISITED, true).unwrap();
    assert!(!matches(&page.document, link, ":link"));
    assert!(matches(&page.document, link, ":visited"));

    page.document.add_custom_state(sibling, "open").unwrap();
    assert!(matches(&page.document, sibling, ":state(open)"));
    page.document.remove_custom_state(sibling, "open").unwrap();
    assert!(!matches(&page.document, sibling, ":state(open)"));

    page.document.clear_element_state(input).unwrap();
    assert!(!matches(&page.document, input, ":hover"));
    assert!(!matches(&page.document, form, ":focus-within"));
}

#[test]
fn target_follows_the_url_fragment() {
    let mut page = page();
    let section = append(&mut page.document, page.body, "section", &[("id", "sec 1")]);
    let other = append(&mut page.document, page.body, "section", &[("id", "sec2")]);
    assert!(!matches(&page.document, section, ":target"));

    page.document
        .set_url(Some(Url::parse("https://example.com/page#sec%201").unwrap()));
    assert!(matches(&page.document, section, ":target"));
    assert!(!matches(&page.document, other, ":target"));

    page.document
        .set_url(Some(Url::parse("https://example.com/page#sec2").unwrap()));
    assert!(!matches(&page.document, section, ":target"));
    assert!(matches(&page.document, other, ":target"));
}

#[test]
fn pseudo_elements_only_match_their_handle() {
    let mut page = page();
    let p = append(&mut page.document, page.body, "p", &[]);
    let list = selectors("p::before, p::after");
    assert!(!page.document.matches(p, &list, None));
    assert!(page.document.matches(p, &list, Some(PseudoElement::Before)));
    assert_eq!(
        page.document.matched_index(p, &list, Some(PseudoElement::After)),
        Some(1)
    );
    assert!(!page.document.matches(p, &list, Some(PseudoElement::Marker)));
}

#[test]
fn attribute_lookup_falls_back_to_the_local_part() {
    let mut page = page();
    let a = append(&mut page.document, page.body, "a", &[("href", "#x")]);
    page.document
        .set_attribute_ns(a, Some("urn:other"), "o:title", "t")
        .unwrap();
    let element = page.document.element(a).unwrap();

    assert_eq!(attr::attribute_value(element, "href"), Some("#x"));
    assert_eq!(attr::attribute_value(element, "html:HREF"), Some("#x"));
    assert_eq!(attr::attribute_value(element, "o:title"), Some("t"));
    assert_eq!(attr::attribute_value(element, "x:title"), None);
    assert!(!attr::has_attribute(element, "HREF"));
    assert!(matches(&page.document, a, "[href='#x']"));
    assert!(matches(&page.document, a, "[HREF]"));
}

#[test]
fn relative_selectors_look_at_later_siblings() {
    let mut page = page();
    let heading = append(&mut page.document, page.body, "h1", &[]);
    let paragraph = append(&mut page.document, page.body, "p", &[]);
    let list = append(&mut page.document, page.body, "ul", &[]);
    let doc = &page.document;

    assert!(matches(doc, heading, "h1:has(+ p)"));
    assert!(!matches(doc, heading, "h1:has(+ ul)"));
    assert!(matches(doc, heading, "h1:has(~ ul)"));
    assert!(matches(doc, paragraph, "p:has(+ ul)"));
    assert!(!matches(doc, list, ":has(~ *)"));
    assert!(!matches(doc, paragraph, ":has(~ h1)"));
}

#[test]
fn nth_child_of_a_selector_only_counts_matching_siblings() {
    let mut page = page();
    let ul = append(&mut page.document, page.body, "ul", &[]);
    let a = append(&mut page.document, ul, "li", &[("class", "x")]);
    let b = append(&mut page.document, ul, "li", &[]);
    let c = append(&mut page.document, ul, "li", &[("class", "x")]);
    let d = append(&mut page.document, ul, "li", &[("class", "x")]);
    let doc = &page.document;

    assert!(matches(doc, c, ":nth-child(2 of .x)"));
    assert!(!matches(doc, b, ":nth-child(2 of .x)"));
    assert!(!matches(doc, b, ":nth-child(1 of .x)"));
    assert!(matches(doc, a, ":nth-last-child(3 of .x)"));
    assert!(matches(doc, d, ":nth-child(odd of .x)"));
    assert_eq!(doc.query_selector_all(ul, ":nth-child(-n+2 of .x)").unwrap(), vec![a, c]);
}

#[test]
fn sibling_positions_agree_with_selector_matching() {
    let mut page = page();
    let ul = append(&mut page.document, page.body, "ul", &[]);
    let items: Vec<_> = (0..6)
        .map(|i| {
            let name = if i % 3 == 0 { "li" } else { "p" };
            let class = if i % 2 == 0 { "x" } else { "y" };
            append(&mut page.document, ul, name, &[("class", class)])
        })
        .collect();
    let filter_list = selectors(".x");
    let formulas = [
        ("2n+1", AnPlusB::new(2, 1)),
        ("-n+3", AnPlusB::new(-1, 3)),
        ("3n", AnPlusB::new(3, 0)),
    ];
    let doc = &page.document;

    for &item in &items {
        let element = doc.element(item).unwrap();
        for &(text, formula) in &formulas {
            let cases = [
                (format!(":nth-child({})", text), NthFilter::Any, false),
                (format!(":nth-last-child({})", text), NthFilter::Any, true),
                (format!(":nth-of-type({})", text), NthFilter::SameType, false),
                (format!(":nth-last-of-type({})", text), NthFilter::SameType, true),
                (format!(":nth-child({} of .x)", text), NthFilter::Selectors(&filter_list), false),
            ];
            for (selector, filter, from_end) in cases {
                assert_eq!(
                    structural::nth_matches(element, formula, filter, from_end),
                    matches(doc, item, &selector),
                    "{} on item {:?}",
                    selector,
                    item
                );
            }
        }
    }

    let combinators = [
        (RelativeCombinator::Child, ":has(> .x)"),
        (RelativeCombinator::Descendant, ":has(.x)"),
        (RelativeCombinator::NextSibling, ":has(+ .x)"),
        (RelativeCombinator::LaterSibling, ":has(~ .x)"),
    ];
    for id in std::iter::once(ul).chain(items.iter().copied()) {
        let element = doc.element(id).unwrap();
        for &(combinator, selector) in &combinators {
            assert_eq!(
                structural::matches_relative(element, combinator, &filter_list),
                matches(doc, id, selector),
                "{} on {:?}",
                selector,
                id
            );
        }
    }
}

#[test]
fn quirks_mode_compares_attribute_values_case_insensitively() {
    let mut strict = page();
    let div = append(&mut strict.document, strict.body, "div", &[("data-kind", "Book")]);
    assert!(matches(&strict.document, div, "[data-kind=Book]"));
    assert!(!matches(&strict.document, div, "[data-kind=book]"));
    assert!(matches(&strict.document, div, "[data-kind=book i]"));

    let mut quirks = page_with(None, DocumentOptions::default());
    let div = append(&mut quirks.document, quirks.body, "div", &[("data-kind", "Book")]);
    assert!(matches(&quirks.document, div, "[data-kind=book]"));
    assert!(matches(&quirks.document, div, "[data-kind^=BO]"));
    assert!(!matches(&quirks.document, div, "[data-kind=magazine]"));
}

#[test]
fn identity_ignores_attributes_in_foreign_namespaces() {
    let mut page = page();
    let div = append(&mut page.document, page.body, "div", &[]);
    page.document
        .set_attribute_ns(div, Some("urn:other"), "o:class", "warm")
        .unwrap();
    page.document
        .set_attribute_ns(div, Some("urn:other"), "o:id", "main")
        .unwrap();
    let element = page.document.element(div).unwrap();

    assert_eq!(attr::attribute_value(element, "o:class"), Some("warm"));
    assert_eq!(attr::attribute_value(element, "x:class"), None);
    assert_eq!(attr::attribute_value(element, "x:id"), None);
    assert!(!attr::has_attribute(element, "x:ID"));
    assert_eq!(attr::id(element), None);
    assert!(!matches(&page.document, div, ".warm"));
    assert!(!matches(&page.document, div, "#main"));

    page.document.set_attribute(div, "class", "cool").unwrap();
    let element = page.document.element(div).unwrap();
    assert_eq!(attr::attribute_value(element, "x:CLASS"), Some("cool"));
    assert!(matches(&page.document, div, ".cool"));
    assert!(!matches(&page.document, div, ".warm"));
}

#[test]
fn queries_walk_in_tree_order() {
    let mut page = page();
    let ul = append(&mut page.document, page.body, "ul", &[("class", "list")]);
    let first = append(&mut page.document, ul, "li", &[]);
    let nested = append(&mut page.document, first, "ul", &[]);
    let inner = append(&mut page.document, nested, "li", &[]);
    let second = append(&mut page.document, ul, "li", &[]);
    let doc = &page.document;

    assert_eq!(
        doc.query_selector_all(doc.root(), "li").unwrap(),
        vec![first, inner, second]
    );
    assert_eq!(doc.query_selector(ul, "li").unwrap(), Some(first));
    assert_eq!(doc.closest(inner, "ul").unwrap(), Some(nested));
    assert_eq!(doc.closest(inner, "ul.list").unwrap(), Some(ul));
    assert!(doc.element_matches(inner, "li li").unwrap());
    assert!(doc.query_selector(ul, "li:bogus").is_err());
}

quickcheck! {
    fn an_plus_b_matches_some_non_negative_n(step: i8, offset: i8, index: u8) -> bool {
        let index = i32::from(index) + 1;
        let expected = (0..=1024).any(|n| i32::from(step) * n + i32::from(offset) == index);
        AnPlusB::new(step.into(), offset.into()).matches(index) == expected
    }
}
