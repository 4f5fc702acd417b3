/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tree-structural predicates: sibling positions, emptiness, relative
//! selectors, language ranges and the target element.
//!
//! Selector matching counts siblings and walks `:has()` inside `selectors`.
//! [`sibling_index`], [`nth_matches`] and [`matches_relative`] answer the
//! same questions for callers that hold an element rather than a selector,
//! such as list numbering, and must agree with the engine.

use cssparser::{Parser as CssParser, ParserInput};
use percent_encoding::percent_decode_str;
use selectors::parser::SelectorList;

use crate::attr;
use crate::element_state::ElementState;
use crate::matching::ElementRef;
use crate::node::NodeData;
use crate::selector_parser::SelectorImpl;

/// The `An+B` microsyntax.
///
/// <https://drafts.csswg.org/css-syntax/#anb-microsyntax>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnPlusB {
    pub step: i32,
    pub offset: i32,
}

impl AnPlusB {
    pub const fn new(step: i32, offset: i32) -> AnPlusB {
        AnPlusB { step, offset }
    }

    /// Parses `odd`, `even`, `3`, `-n+2`, `2n + 1` and friends.
    pub fn parse(text: &str) -> Option<AnPlusB> {
        let mut input = ParserInput::new(text);
        let mut parser = CssParser::new(&mut input);
        let (step, offset) = cssparser::parse_nth(&mut parser).ok()?;
        parser.expect_exhausted().ok()?;
        Some(AnPlusB { step, offset })
    }

    /// Whether the 1-based `index` is `A*n + B` for some `n >= 0`.
    ///
    /// The remainder is taken with floored modulo so that negative steps
    /// behave: `-n+3` selects 1, 2 and 3.
    pub fn matches(self, index: i32) -> bool {
        let step = i64::from(self.step);
        let diff = i64::from(index) - i64::from(self.offset);
        if step == 0 {
            return diff == 0;
        }
        diff.rem_euclid(step) == 0 && diff / step >= 0
    }
}

/// Which siblings a position count includes.
#[derive(Clone, Copy, Debug)]
pub enum NthFilter<'a> {
    /// `:nth-child()`
    Any,
    /// `:nth-of-type()`
    SameType,
    /// `:nth-child(An+B of S)`
    Selectors(&'a SelectorList<SelectorImpl>),
}

impl NthFilter<'_> {
    fn accepts(&self, element: ElementRef<'_>, sibling: ElementRef<'_>) -> bool {
        match *self {
            NthFilter::Any => true,
            NthFilter::SameType => element.is_same_type_as(sibling),
            NthFilter::Selectors(list) => sibling.matches_selector_list(list),
        }
    }
}

/// The 1-based position of `element` among its siblings passing `filter`,
/// counted from the end when `from_end` is set. `None` when the element
/// does not pass the filter itself.
pub fn sibling_index(element: ElementRef<'_>, filter: NthFilter<'_>, from_end: bool) -> Option<usize> {
    if !filter.accepts(element, element) {
        return None;
    }
    let accepts = |sibling: ElementRef<'_>| filter.accepts(element, sibling);
    Some(if from_end {
        element.reverse_index_of(accepts)
    } else {
        element.index_of(accepts)
    })
}

/// `:nth-child()` and its variants.
pub fn nth_matches(
    element: ElementRef<'_>,
    formula: AnPlusB,
    filter: NthFilter<'_>,
    from_end: bool,
) -> bool {
    sibling_index(element, filter, from_end)
        .and_then(|index| i32::try_from(index).ok())
        .is_some_and(|index| formula.matches(index))
}

pub fn is_first_child(element: ElementRef<'_>) -> bool {
    element.prev_sibling_element().is_none()
}

pub fn is_last_child(element: ElementRef<'_>) -> bool {
    element.next_sibling_element().is_none()
}

pub fn is_only_child(element: ElementRef<'_>) -> bool {
    is_first_child(element) && is_last_child(element)
}

pub fn is_first_of_type(element: ElementRef<'_>) -> bool {
    element
        .preceding_sibling_elements()
        .all(|sibling| !element.is_same_type_as(sibling))
}

pub fn is_last_of_type(element: ElementRef<'_>) -> bool {
    element
        .following_sibling_elements()
        .all(|sibling| !element.is_same_type_as(sibling))
}

pub fn is_only_of_type(element: ElementRef<'_>) -> bool {
    is_first_of_type(element) && is_last_of_type(element)
}

/// The document element.
pub fn is_root(element: ElementRef<'_>) -> bool {
    element
        .parent_node_data()
        .is_some_and(|data| matches!(data, NodeData::Document))
}

/// `:empty`: no element children and no text or entity reference children
/// carrying any character at all. Comments and processing instructions are
/// ignored.
pub fn is_empty(element: ElementRef<'_>) -> bool {
    element.child_nodes().all(|child| match *child.data() {
        NodeData::Element(_) => false,
        _ => child.character_data().is_none_or(str::is_empty),
    })
}

/// `:blank`: as `:empty`, but whitespace-only text is allowed.
///
/// <https://drafts.csswg.org/selectors-4/#the-blank-pseudo>
pub fn is_blank(element: ElementRef<'_>) -> bool {
    element.child_nodes().all(|child| match *child.data() {
        NodeData::Element(_) => false,
        _ => child
            .character_data()
            .is_none_or(|text| text.chars().all(char::is_whitespace)),
    })
}

/// The leading combinator of a relative selector such as `:has(> img)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelativeCombinator {
    /// `> X`
    Child,
    /// `X`
    Descendant,
    /// `+ X`
    NextSibling,
    /// `~ X`
    LaterSibling,
}

/// Whether any element reached from `anchor` through `combinator` matches
/// `list`. Each candidate is tested through the regular matching entry
/// point.
pub fn matches_relative(
    anchor: ElementRef<'_>,
    combinator: RelativeCombinator,
    list: &SelectorList<SelectorImpl>,
) -> bool {
    match combinator {
        RelativeCombinator::Child => anchor
            .child_elements()
            .any(|child| child.matches_selector_list(list)),
        RelativeCombinator::Descendant => anchor
            .descendant_elements()
            .any(|descendant| descendant.matches_selector_list(list)),
        RelativeCombinator::NextSibling => anchor
            .next_sibling_element()
            .is_some_and(|sibling| sibling.matches_selector_list(list)),
        RelativeCombinator::LaterSibling => anchor
            .following_sibling_elements()
            .any(|sibling| sibling.matches_selector_list(list)),
    }
}

fn is_valid_range_subtag(subtag: &str) -> bool {
    subtag == "*" ||
        (!subtag.is_empty() &&
            subtag.len() <= 8 &&
            subtag.bytes().all(|byte| byte.is_ascii_alphanumeric()))
}

/// Extended filtering of a language tag against a language range.
/// Malformed ranges match nothing.
///
/// <https://www.rfc-editor.org/rfc/rfc4647#section-3.3.2>
pub fn lang_range_matches(language: &str, range: &str) -> bool {
    let range: Vec<&str> = range.split('-').collect();
    if !range.iter().all(|subtag| is_valid_range_subtag(subtag)) {
        return false;
    }
    if language.is_empty() {
        return false;
    }
    let tag: Vec<&str> = language.split('-').collect();

    if range[0] != "*" && !range[0].eq_ignore_ascii_case(tag[0]) {
        return false;
    }

    let (mut r, mut t) = (1, 1);
    while r < range.len() {
        if range[r] == "*" {
            r += 1;
            continue;
        }
        let Some(subtag) = tag.get(t) else {
            return false;
        };
        if range[r].eq_ignore_ascii_case(subtag) {
            r += 1;
            t += 1;
            continue;
        }
        // A singleton introduces an extension or private use section that
        // the range cannot skip over.
        if subtag.len() == 1 {
            return false;
        }
        t += 1;
    }
    true
}

/// `:lang()`. Matches when any of the ranges matches the element language.
pub fn matches_lang<S: AsRef<str>>(element: ElementRef<'_>, ranges: &[S]) -> bool {
    let language = attr::language(element);
    ranges
        .iter()
        .any(|range| lang_range_matches(&language, range.as_ref()))
}

/// `:target`: the element id equals the decoded fragment of the document
/// URL.
///
/// <https://html.spec.whatwg.org/multipage/#the-indicated-part-of-the-document>
pub fn is_target(element: ElementRef<'_>) -> bool {
    let Some(fragment) = element.document().url().and_then(|url| url.fragment()) else {
        return false;
    };
    if fragment.is_empty() {
        return false;
    }
    let Some(id) = attr::id(element).filter(|id| !id.is_empty()) else {
        return false;
    };
    let decoded = percent_decode_str(fragment).decode_utf8_lossy();
    *decoded == *id
}

/// `:focus-within`: the element or one of its descendants has focus.
pub fn has_focus_within(element: ElementRef<'_>) -> bool {
    let document = element.document();
    document
        .states()
        .nodes_with(ElementState::FOCUS)
        .any(|focused| document.is_inclusive_ancestor(element.node_id(), focused))
}
