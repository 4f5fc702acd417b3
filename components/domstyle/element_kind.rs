/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Element kinds and their capability table.
//!
//! Behaviour that depends on which HTML element a node is (presentational
//! hints, reactions to mutations, whether it defines a style sheet) is
//! looked up here rather than spread over the selector matching code.

use html5ever::{QualName, local_name, ns};

use crate::matching::ElementRef;
use crate::style_cache::StyleInvalidation;
use crate::stylesheet_set::SheetOrigin;
use crate::stylesheets::Declaration;

/// The HTML elements the style system knows something about.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementKind {
    Anchor,
    Area,
    Base,
    Bdi,
    Body,
    Button,
    FieldSet,
    Font,
    Form,
    Img,
    Input,
    Legend,
    Link,
    Meta,
    OptGroup,
    Option,
    Progress,
    Script,
    Select,
    Style,
    Table,
    TableCell,
    TableRow,
    TableSection,
    TextArea,
    Other,
}

impl ElementKind {
    /// Classifies an element name. Only elements in the HTML namespace, or
    /// in no namespace at all, get a specific kind.
    pub fn from_name(name: &QualName) -> ElementKind {
        if name.ns != ns!(html) && name.ns != ns!() {
            return ElementKind::Other;
        }
        match &*name.local.to_ascii_lowercase() {
            "a" => ElementKind::Anchor,
            "area" => ElementKind::Area,
            "base" => ElementKind::Base,
            "bdi" => ElementKind::Bdi,
            "body" => ElementKind::Body,
            "button" => ElementKind::Button,
            "fieldset" => ElementKind::FieldSet,
            "font" => ElementKind::Font,
            "form" => ElementKind::Form,
            "img" => ElementKind::Img,
            "input" => ElementKind::Input,
            "legend" => ElementKind::Legend,
            "link" => ElementKind::Link,
            "meta" => ElementKind::Meta,
            "optgroup" => ElementKind::OptGroup,
            "option" => ElementKind::Option,
            "progress" => ElementKind::Progress,
            "script" => ElementKind::Script,
            "select" => ElementKind::Select,
            "style" => ElementKind::Style,
            "table" => ElementKind::Table,
            "td" | "th" => ElementKind::TableCell,
            "tr" => ElementKind::TableRow,
            "tbody" | "thead" | "tfoot" => ElementKind::TableSection,
            "textarea" => ElementKind::TextArea,
            _ => ElementKind::Other,
        }
    }

    /// <https://html.spec.whatwg.org/multipage/#concept-element-disabled>
    pub fn is_disableable(self) -> bool {
        matches!(
            self,
            ElementKind::Button |
                ElementKind::FieldSet |
                ElementKind::Input |
                ElementKind::OptGroup |
                ElementKind::Option |
                ElementKind::Select |
                ElementKind::TextArea
        )
    }

    /// <https://html.spec.whatwg.org/multipage/#category-listed>
    pub fn is_listed(self) -> bool {
        matches!(
            self,
            ElementKind::Button |
                ElementKind::FieldSet |
                ElementKind::Input |
                ElementKind::Select |
                ElementKind::TextArea
        )
    }

    pub(crate) fn capabilities(self) -> &'static ElementCapabilities {
        match self {
            ElementKind::Link => &LINK,
            ElementKind::Style => &STYLE,
            ElementKind::Base => &BASE,
            ElementKind::Meta => &META,
            ElementKind::Body |
            ElementKind::Table |
            ElementKind::TableCell |
            ElementKind::TableRow |
            ElementKind::TableSection => &TABLE_LIKE,
            ElementKind::Img => &IMG,
            ElementKind::Font => &FONT,
            _ => &GENERIC,
        }
    }
}

/// A change observed on an element, reported by the document.
#[derive(Debug)]
pub(crate) enum Mutation<'a> {
    /// An attribute was added, changed or removed.
    Attribute(&'a QualName),
    /// A child was inserted or removed, or a text child was edited.
    ChildrenChanged,
    /// The element was inserted into the document.
    Inserted,
    /// The element was removed from the document.
    Removed,
}

/// What the style system needs to know about one element kind.
pub(crate) struct ElementCapabilities {
    /// Synthesizes declarations from legacy presentational attributes.
    pub(crate) presentational_hints: fn(ElementRef<'_>, &mut Vec<Declaration>),
    /// Computes the invalidation a mutation of the element requires.
    pub(crate) mutation_hook: fn(ElementRef<'_>, &Mutation<'_>) -> StyleInvalidation,
    /// Whether the element currently defines a style sheet.
    pub(crate) style_definer: fn(ElementRef<'_>) -> Option<SheetOrigin>,
}

static GENERIC: ElementCapabilities = ElementCapabilities {
    presentational_hints: generic_hints,
    mutation_hook: generic_mutation,
    style_definer: no_style_sheet,
};

static LINK: ElementCapabilities = ElementCapabilities {
    presentational_hints: generic_hints,
    mutation_hook: link_mutation,
    style_definer: link_style_sheet,
};

static STYLE: ElementCapabilities = ElementCapabilities {
    presentational_hints: generic_hints,
    mutation_hook: style_mutation,
    style_definer: style_style_sheet,
};

static BASE: ElementCapabilities = ElementCapabilities {
    presentational_hints: generic_hints,
    mutation_hook: base_mutation,
    style_definer: no_style_sheet,
};

static META: ElementCapabilities = ElementCapabilities {
    presentational_hints: generic_hints,
    mutation_hook: meta_mutation,
    style_definer: no_style_sheet,
};

static TABLE_LIKE: ElementCapabilities = ElementCapabilities {
    presentational_hints: table_like_hints,
    mutation_hook: generic_mutation,
    style_definer: no_style_sheet,
};

static IMG: ElementCapabilities = ElementCapabilities {
    presentational_hints: img_hints,
    mutation_hook: generic_mutation,
    style_definer: no_style_sheet,
};

static FONT: ElementCapabilities = ElementCapabilities {
    presentational_hints: font_hints,
    mutation_hook: generic_mutation,
    style_definer: no_style_sheet,
};

fn no_style_sheet(_: ElementRef<'_>) -> Option<SheetOrigin> {
    None
}

fn generic_mutation(_: ElementRef<'_>, mutation: &Mutation<'_>) -> StyleInvalidation {
    match *mutation {
        Mutation::Attribute(name) if is_plain(name, &local_name!("style")) => {
            StyleInvalidation::StyleSheets
        },
        _ => StyleInvalidation::Restyle,
    }
}

#[inline]
fn is_plain(name: &QualName, local: &html5ever::LocalName) -> bool {
    name.ns == ns!() && name.local == *local
}

fn any_of(name: &QualName, locals: &[html5ever::LocalName]) -> bool {
    name.ns == ns!() && locals.iter().any(|local| name.local == *local)
}

// https://html.spec.whatwg.org/multipage/#link-type-stylesheet
fn link_style_sheet(element: ElementRef<'_>) -> Option<SheetOrigin> {
    if !element.is_connected() {
        return None;
    }
    let rel = element.get_plain_attr(&local_name!("rel"))?;
    let is_stylesheet = rel
        .split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"));
    if !is_stylesheet || element.get_plain_attr(&local_name!("href")).is_none() {
        return None;
    }
    if !type_is_css(element) {
        return None;
    }
    Some(SheetOrigin::Linked)
}

fn style_style_sheet(element: ElementRef<'_>) -> Option<SheetOrigin> {
    if !element.is_connected() || !type_is_css(element) {
        return None;
    }
    Some(SheetOrigin::Embedded)
}

fn type_is_css(element: ElementRef<'_>) -> bool {
    match element.get_plain_attr(&local_name!("type")) {
        None => true,
        Some(type_) => type_.is_empty() || type_.trim().eq_ignore_ascii_case("text/css"),
    }
}

fn link_mutation(element: ElementRef<'_>, mutation: &Mutation<'_>) -> StyleInvalidation {
    match *mutation {
        Mutation::Attribute(name)
            if any_of(
                name,
                &[
                    local_name!("href"),
                    local_name!("rel"),
                    local_name!("media"),
                    local_name!("title"),
                    local_name!("type"),
                    local_name!("disabled"),
                ],
            ) =>
        {
            StyleInvalidation::StyleSheets
        },
        Mutation::Inserted | Mutation::Removed => StyleInvalidation::StyleSheets,
        _ => generic_mutation(element, mutation),
    }
}

fn style_mutation(element: ElementRef<'_>, mutation: &Mutation<'_>) -> StyleInvalidation {
    match *mutation {
        Mutation::Attribute(name)
            if any_of(
                name,
                &[local_name!("media"), local_name!("title"), local_name!("type")],
            ) =>
        {
            StyleInvalidation::StyleSheets
        },
        Mutation::ChildrenChanged | Mutation::Inserted | Mutation::Removed => {
            StyleInvalidation::StyleSheets
        },
        _ => generic_mutation(element, mutation),
    }
}

// https://html.spec.whatwg.org/multipage/#the-base-element
fn base_mutation(element: ElementRef<'_>, mutation: &Mutation<'_>) -> StyleInvalidation {
    match *mutation {
        Mutation::Attribute(name) if is_plain(name, &local_name!("href")) => {
            StyleInvalidation::StyleSheets
        },
        Mutation::Inserted | Mutation::Removed => StyleInvalidation::StyleSheets,
        _ => generic_mutation(element, mutation),
    }
}

// https://html.spec.whatwg.org/multipage/#attr-meta-http-equiv-default-style
fn meta_mutation(element: ElementRef<'_>, mutation: &Mutation<'_>) -> StyleInvalidation {
    match *mutation {
        Mutation::Attribute(name) if is_plain(name, &local_name!("http-equiv")) => {
            StyleInvalidation::StyleSheets
        },
        Mutation::Attribute(name) if is_plain(name, &local_name!("content")) => {
            if is_default_style_meta(element) {
                StyleInvalidation::StyleSheets
            } else {
                StyleInvalidation::Restyle
            }
        },
        Mutation::Inserted | Mutation::Removed if is_default_style_meta(element) => {
            StyleInvalidation::StyleSheets
        },
        _ => generic_mutation(element, mutation),
    }
}

pub(crate) fn is_default_style_meta(element: ElementRef<'_>) -> bool {
    element.kind() == ElementKind::Meta &&
        element
            .get_plain_attr(&local_name!("http-equiv"))
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("default-style"))
}

fn push_hint(hints: &mut Vec<Declaration>, name: &str, value: &str) {
    hints.push(Declaration {
        name: name.to_owned(),
        value: value.trim().to_owned(),
        important: false,
    });
}

/// Turns a legacy dimension attribute into a CSS length.
///
/// <https://html.spec.whatwg.org/multipage/#rules-for-parsing-dimension-values>
fn dimension_value(value: &str) -> Option<String> {
    let value = value.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let digits = value
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(value.len());
    if digits == 0 {
        return None;
    }
    let number = &value[..digits];
    number.parse::<f32>().ok()?;
    if value[digits..].starts_with('%') {
        Some(format!("{}%", number))
    } else {
        Some(format!("{}px", number))
    }
}

// https://html.spec.whatwg.org/multipage/#the-hidden-attribute
fn generic_hints(element: ElementRef<'_>, hints: &mut Vec<Declaration>) {
    if element.get_plain_attr(&local_name!("hidden")).is_some() {
        push_hint(hints, "display", "none");
    }
}

// https://html.spec.whatwg.org/multipage/#tables-2
fn table_like_hints(element: ElementRef<'_>, hints: &mut Vec<Declaration>) {
    generic_hints(element, hints);
    if let Some(color) = element.get_plain_attr(&local_name!("bgcolor")) {
        if !color.trim().is_empty() {
            push_hint(hints, "background-color", color);
        }
    }
    if let Some(align) = element.get_plain_attr(&local_name!("align")) {
        let align = align.trim();
        if ["left", "right", "center", "justify"]
            .iter()
            .any(|keyword| align.eq_ignore_ascii_case(keyword))
        {
            push_hint(hints, "text-align", &align.to_ascii_lowercase());
        }
    }
    if matches!(element.kind(), ElementKind::Table | ElementKind::TableCell) {
        dimension_hints(element, hints);
    }
}

fn img_hints(element: ElementRef<'_>, hints: &mut Vec<Declaration>) {
    generic_hints(element, hints);
    dimension_hints(element, hints);
}

fn dimension_hints(element: ElementRef<'_>, hints: &mut Vec<Declaration>) {
    if let Some(width) = element
        .get_plain_attr(&local_name!("width"))
        .and_then(dimension_value)
    {
        push_hint(hints, "width", &width);
    }
    if let Some(height) = element
        .get_plain_attr(&local_name!("height"))
        .and_then(dimension_value)
    {
        push_hint(hints, "height", &height);
    }
}

// https://html.spec.whatwg.org/multipage/#phrasing-content-3
fn font_hints(element: ElementRef<'_>, hints: &mut Vec<Declaration>) {
    generic_hints(element, hints);
    if let Some(color) = element.get_plain_attr(&local_name!("color")) {
        push_hint(hints, "color", color);
    }
    if let Some(face) = element.get_plain_attr(&local_name!("face")) {
        push_hint(hints, "font-family", face);
    }
}
