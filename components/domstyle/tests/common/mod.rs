/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![allow(dead_code)]

use domstyle::{Document, DocumentOptions, NodeId, SelectorImpl, parse_selector_list};
use selectors::parser::SelectorList;

/// A document with `<html><head></head><body></body></html>`.
pub struct Page {
    pub document: Document,
    pub html: NodeId,
    pub head: NodeId,
    pub body: NodeId,
}

pub fn page() -> Page {
    page_with(Some("html"), DocumentOptions::default())
}

pub fn page_with(doctype: Option<&str>, options: DocumentOptions) -> Page {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut document = Document::new(doctype, options);
    let root = document.root();
    let html = document.create_element("html").unwrap();
    document.append_child(root, html).unwrap();
    let head = append(&mut document, html, "head", &[]);
    let body = append(&mut document, html, "body", &[]);
    Page {
        document,
        html,
        head,
        body,
    }
}

/// Creates an element with `attrs` and appends it to `parent`.
pub fn append(document: &mut Document, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
    let element = document.create_element(name).unwrap();
    for &(name, value) in attrs {
        document.set_attribute(element, name, value).unwrap();
    }
    document.append_child(parent, element).unwrap();
    element
}

pub fn append_text(document: &mut Document, parent: NodeId, data: &str) -> NodeId {
    let text = document.create_text_node(data);
    document.append_child(parent, text).unwrap();
    text
}

pub fn selectors(text: &str) -> SelectorList<SelectorImpl> {
    parse_selector_list(text).unwrap()
}

pub fn matches(document: &Document, node: NodeId, selector: &str) -> bool {
    document.matches(node, &selectors(selector), None)
}
