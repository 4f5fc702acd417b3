/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Attribute and identity resolution.
//!
//! Lookups here never fail: a missing namespace, prefix or attribute simply
//! resolves to `None`.

use html5ever::{LocalName, Namespace, QualName, local_name, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};

use crate::matching::ElementRef;
use crate::node::Attribute;
use crate::selector_parser::{AtomString, CssLocalName, CssNamespace};

fn qualified_name_is(name: &QualName, qualified_name: &str) -> bool {
    match name.prefix {
        Some(ref prefix) => qualified_name
            .split_once(':')
            .is_some_and(|(p, local)| **prefix == *p && *name.local == *local),
        None => *name.local == *qualified_name,
    }
}

/// The namespace unprefixed markup attributes are expected to live in when
/// a prefixed lookup has to fall back to the local name.
fn is_host_namespace(element: ElementRef<'_>, namespace: &Namespace) -> bool {
    *namespace == ns!() || *namespace == *element.namespace()
}

/// Resolves an attribute by qualified name.
///
/// An exact match on the qualified name wins. Failing that, a prefixed name
/// is retried by its local part, ASCII case-insensitively, among attributes
/// in no namespace or in the element's own namespace. Attributes in any
/// other namespace are never matched by the fallback.
pub fn attribute_value<'dom>(element: ElementRef<'dom>, qualified_name: &str) -> Option<&'dom str> {
    find_attribute(element, qualified_name).map(|attr| &*attr.value)
}

/// Whether [`attribute_value`] resolves to anything.
pub fn has_attribute(element: ElementRef<'_>, qualified_name: &str) -> bool {
    find_attribute(element, qualified_name).is_some()
}

fn find_attribute<'dom>(element: ElementRef<'dom>, qualified_name: &str) -> Option<&'dom Attribute> {
    let attrs = element.element_data().attributes();
    if let Some(attr) = attrs
        .iter()
        .find(|attr| qualified_name_is(&attr.name, qualified_name))
    {
        return Some(attr);
    }

    let (_, local) = qualified_name.split_once(':')?;
    attrs.iter().find(|attr| {
        (*attr.name.local).eq_ignore_ascii_case(local) && is_host_namespace(element, &attr.name.ns)
    })
}

/// The element's id, accepting the legacy uppercase `ID` spelling.
pub fn id(element: ElementRef<'_>) -> Option<&str> {
    let data = element.element_data();
    data.get_plain_attr(&local_name!("id"))
        .or_else(|| data.get_plain_attr(&LocalName::from("ID")))
}

/// The case sensitivity selectors compare identities and attribute values
/// with. Quirks mode documents compare everything ASCII case-insensitively.
fn effective_case_sensitivity(
    element: ElementRef<'_>,
    requested: CaseSensitivity,
) -> CaseSensitivity {
    if element.compliance_mode().is_quirks() {
        CaseSensitivity::AsciiCaseInsensitive
    } else {
        requested
    }
}

pub(crate) fn has_id(element: ElementRef<'_>, name: &str, case_sensitivity: CaseSensitivity) -> bool {
    let case_sensitivity = effective_case_sensitivity(element, case_sensitivity);
    id(element).is_some_and(|id| !id.is_empty() && case_sensitivity.eq(id.as_bytes(), name.as_bytes()))
}

/// Whether the whitespace-separated `class` attribute contains `name`.
pub fn has_class(element: ElementRef<'_>, name: &str, case_sensitivity: CaseSensitivity) -> bool {
    let case_sensitivity = effective_case_sensitivity(element, case_sensitivity);
    element
        .element_data()
        .get_plain_attr(&local_name!("class"))
        .is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(class.as_bytes(), name.as_bytes()))
        })
}

/// The language of the element: the first non-empty `xml:lang`, `lang` or
/// `LANG` attribute on the element or its ancestors, or the empty string.
///
/// <https://html.spec.whatwg.org/multipage/#language>
pub fn language(element: ElementRef<'_>) -> String {
    let mut current = Some(element);
    while let Some(element) = current {
        let data = element.element_data();
        let lang = data
            .get_attr(&ns!(xml), &local_name!("lang"))
            .filter(|lang| !lang.is_empty())
            .or_else(|| data.get_plain_attr(&local_name!("lang")).filter(|lang| !lang.is_empty()))
            .or_else(|| {
                data.get_plain_attr(&LocalName::from("LANG"))
                    .filter(|lang| !lang.is_empty())
            });
        if let Some(lang) = lang {
            return lang.to_owned();
        }
        current = element.parent_element();
    }
    String::new()
}

/// Evaluates an attribute selector against the element.
pub(crate) fn attr_matches(
    element: ElementRef<'_>,
    namespace: &NamespaceConstraint<&CssNamespace>,
    local_name: &CssLocalName,
    operation: &AttrSelectorOperation<&AtomString>,
) -> bool {
    // Attribute names are matched ASCII case-insensitively on HTML elements
    // in HTML documents.
    let ignore_case = element.is_html_element_in_html_document();
    element
        .element_data()
        .attributes()
        .iter()
        .filter(|attr| match *namespace {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Specific(namespace) => attr.name.ns == namespace.0,
        })
        .filter(|attr| {
            attr.name.local == local_name.0 ||
                (ignore_case && attr.name.local.eq_ignore_ascii_case(&local_name.0))
        })
        .any(|attr| match *operation {
            AttrSelectorOperation::Exists => true,
            AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                value,
            } => operator.eval_str(
                &attr.value,
                value.as_ref(),
                effective_case_sensitivity(element, case_sensitivity),
            ),
        })
}
