/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The HTML directionality of elements, as matched by `:dir()`.
//!
//! <https://html.spec.whatwg.org/multipage/#the-directionality>

use html5ever::local_name;
use unicode_bidi::{BidiClass, bidi_class};

use crate::element_kind::ElementKind;
use crate::form_controls::{self, InputType};
use crate::matching::ElementRef;
use crate::node::NodeData;
use crate::selector_parser::Direction;

/// A resolved directionality.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Whether `:dir(direction)` matches an element with this directionality.
    pub fn matches(self, direction: &Direction) -> bool {
        match *direction {
            Direction::Ltr => self == TextDirection::Ltr,
            Direction::Rtl => self == TextDirection::Rtl,
            Direction::Other(_) => false,
        }
    }
}

/// The value of the `dir` attribute, if it is one of the keywords.
enum DirAttribute {
    Ltr,
    Rtl,
    Auto,
}

fn dir_attribute(element: ElementRef<'_>) -> Option<DirAttribute> {
    let value = element.get_plain_attr(&local_name!("dir"))?;
    if value.eq_ignore_ascii_case("ltr") {
        Some(DirAttribute::Ltr)
    } else if value.eq_ignore_ascii_case("rtl") {
        Some(DirAttribute::Rtl)
    } else if value.eq_ignore_ascii_case("auto") {
        Some(DirAttribute::Auto)
    } else {
        None
    }
}

/// The direction of the first character with a strong bidi class.
pub fn first_strong_direction(text: &str) -> Option<TextDirection> {
    text.chars().find_map(|ch| match bidi_class(ch) {
        BidiClass::L => Some(TextDirection::Ltr),
        BidiClass::R | BidiClass::AL => Some(TextDirection::Rtl),
        _ => None,
    })
}

/// The directionality of an element.
pub fn directionality(element: ElementRef<'_>) -> TextDirection {
    match dir_attribute(element) {
        Some(DirAttribute::Ltr) => return TextDirection::Ltr,
        Some(DirAttribute::Rtl) => return TextDirection::Rtl,
        Some(DirAttribute::Auto) => return auto_directionality(element),
        None => {},
    }

    match element.kind() {
        ElementKind::Bdi => return auto_directionality(element),
        ElementKind::Input if form_controls::input_type(element) == InputType::Tel => {
            return TextDirection::Ltr;
        },
        _ => {},
    }

    match element.parent_element() {
        Some(parent) => directionality(parent),
        None => TextDirection::Ltr,
    }
}

/// <https://html.spec.whatwg.org/multipage/#auto-directionality>
fn auto_directionality(element: ElementRef<'_>) -> TextDirection {
    if form_controls::is_auto_directionality_form_associated(element) {
        let value = form_controls::value(element);
        return first_strong_direction(&value).unwrap_or(TextDirection::Ltr);
    }
    contained_text_directionality(element).unwrap_or(TextDirection::Ltr)
}

/// Walks the descendants in tree order looking for strong text, skipping
/// subtrees whose directionality does not come from their parent.
fn contained_text_directionality(element: ElementRef<'_>) -> Option<TextDirection> {
    let document = element.document();
    let mut iter = document.traverse_preorder(element.node_id());
    // The element itself.
    iter.next();
    while let Some(id) = iter.next() {
        let Some(node) = document.get(id) else {
            continue;
        };
        match *node.data() {
            NodeData::Element(_) => {
                let Some(descendant) = document.element(id) else {
                    continue;
                };
                let skipped = matches!(
                    descendant.kind(),
                    ElementKind::Bdi |
                        ElementKind::Script |
                        ElementKind::Style |
                        ElementKind::TextArea
                ) || dir_attribute(descendant).is_some();
                if skipped {
                    iter.skip_children();
                }
            },
            _ => {
                if let Some(direction) = node.character_data().and_then(first_strong_direction) {
                    return Some(direction);
                }
            },
        }
    }
    None
}
