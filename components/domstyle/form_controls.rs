/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Form-control pseudo-classes.
//!
//! <https://html.spec.whatwg.org/multipage/#pseudo-classes>

use html5ever::local_name;

use crate::attr;
use crate::element_kind::ElementKind;
use crate::element_state::ElementState;
use crate::matching::ElementRef;
use crate::node::NodeId;

/// The state of an `input` element, from its `type` attribute.
///
/// <https://html.spec.whatwg.org/multipage/#attr-input-type>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputType {
    Button,
    Checkbox,
    Color,
    Date,
    DatetimeLocal,
    Email,
    File,
    Hidden,
    Image,
    Month,
    Number,
    Password,
    Radio,
    Range,
    Reset,
    Search,
    Submit,
    Tel,
    Text,
    Time,
    Url,
    Week,
}

impl InputType {
    /// Missing and unknown values are the text state.
    fn from_attribute(value: Option<&str>) -> InputType {
        let Some(value) = value else {
            return InputType::Text;
        };
        match &*value.trim().to_ascii_lowercase() {
            "button" => InputType::Button,
            "checkbox" => InputType::Checkbox,
            "color" => InputType::Color,
            "date" => InputType::Date,
            "datetime-local" => InputType::DatetimeLocal,
            "email" => InputType::Email,
            "file" => InputType::File,
            "hidden" => InputType::Hidden,
            "image" => InputType::Image,
            "month" => InputType::Month,
            "number" => InputType::Number,
            "password" => InputType::Password,
            "radio" => InputType::Radio,
            "range" => InputType::Range,
            "reset" => InputType::Reset,
            "search" => InputType::Search,
            "submit" => InputType::Submit,
            "tel" => InputType::Tel,
            "time" => InputType::Time,
            "url" => InputType::Url,
            "week" => InputType::Week,
            _ => InputType::Text,
        }
    }

    /// Whether the control takes free text from the user.
    fn is_textual(self) -> bool {
        matches!(
            self,
            InputType::Text |
                InputType::Search |
                InputType::Url |
                InputType::Tel |
                InputType::Email |
                InputType::Password |
                InputType::Number |
                InputType::Date |
                InputType::DatetimeLocal |
                InputType::Month |
                InputType::Week |
                InputType::Time
        )
    }

    fn supports_placeholder(self) -> bool {
        matches!(
            self,
            InputType::Text |
                InputType::Search |
                InputType::Url |
                InputType::Tel |
                InputType::Email |
                InputType::Password |
                InputType::Number
        )
    }

    fn supports_required(self) -> bool {
        !matches!(
            self,
            InputType::Hidden |
                InputType::Button |
                InputType::Reset |
                InputType::Submit |
                InputType::Image |
                InputType::Range |
                InputType::Color
        )
    }
}

/// The input type of `element`; the text state for anything but `input`.
pub fn input_type(element: ElementRef<'_>) -> InputType {
    InputType::from_attribute(element.get_plain_attr(&local_name!("type")))
}

/// `input` in the text, search, telephone, URL or email state, and
/// `textarea`.
///
/// <https://html.spec.whatwg.org/multipage/#auto-directionality-form-associated-elements>
pub(crate) fn is_auto_directionality_form_associated(element: ElementRef<'_>) -> bool {
    match element.kind() {
        ElementKind::Input => matches!(
            input_type(element),
            InputType::Text |
                InputType::Search |
                InputType::Tel |
                InputType::Url |
                InputType::Email
        ),
        ElementKind::TextArea => true,
        _ => false,
    }
}

/// The value of a text control: the `value` attribute of an `input`, or
/// the text content of a `textarea`.
pub fn value(element: ElementRef<'_>) -> String {
    match element.kind() {
        ElementKind::TextArea => element.child_text_content(),
        _ => element
            .get_plain_attr(&local_name!("value"))
            .unwrap_or_default()
            .to_owned(),
    }
}

/// <https://html.spec.whatwg.org/multipage/#form-owner>
pub fn form_owner(element: ElementRef<'_>) -> Option<NodeId> {
    if element.kind().is_listed() {
        if let Some(form_id) = element.get_plain_attr(&local_name!("form")) {
            return element
                .document()
                .element_by_id(form_id)
                .filter(|form| form.kind() == ElementKind::Form)
                .map(|form| form.node_id());
        }
    }
    element
        .ancestor_elements()
        .find(|ancestor| ancestor.kind() == ElementKind::Form)
        .map(|form| form.node_id())
}

/// <https://html.spec.whatwg.org/multipage/#concept-element-disabled>
pub fn is_disabled(element: ElementRef<'_>) -> bool {
    if element.get_plain_attr(&local_name!("disabled")).is_some() {
        return true;
    }

    if element.kind() == ElementKind::Option &&
        element.parent_element().is_some_and(|parent| {
            parent.kind() == ElementKind::OptGroup &&
                parent.get_plain_attr(&local_name!("disabled")).is_some()
        })
    {
        return true;
    }

    is_disabled_by_fieldset(element)
}

/// A disabled `fieldset` ancestor disables its descendants, except those
/// inside its first `legend` child.
fn is_disabled_by_fieldset(element: ElementRef<'_>) -> bool {
    let mut child = element;
    for ancestor in element.ancestor_elements() {
        if ancestor.kind() == ElementKind::FieldSet &&
            ancestor.get_plain_attr(&local_name!("disabled")).is_some()
        {
            let first_legend = ancestor
                .child_elements()
                .find(|candidate| candidate.kind() == ElementKind::Legend);
            let in_first_legend = first_legend.is_some_and(|legend| legend == child);
            if !in_first_legend {
                return true;
            }
        }
        child = ancestor;
    }
    false
}

/// `:enabled` only applies to elements that can be disabled.
pub fn is_enabled(element: ElementRef<'_>) -> bool {
    element.kind().is_disableable() && !is_disabled(element)
}

fn is_editing_host(element: ElementRef<'_>) -> bool {
    for current in std::iter::once(element).chain(element.ancestor_elements()) {
        if let Some(value) = current.get_plain_attr(&local_name!("contenteditable")) {
            let value = value.trim();
            if value.is_empty() ||
                value.eq_ignore_ascii_case("true") ||
                value.eq_ignore_ascii_case("plaintext-only")
            {
                return true;
            }
            if value.eq_ignore_ascii_case("false") {
                return false;
            }
        }
    }
    false
}

/// <https://html.spec.whatwg.org/multipage/#selector-read-write>
pub fn is_read_write(element: ElementRef<'_>) -> bool {
    let mutable_control = match element.kind() {
        ElementKind::Input => Some(input_type(element).is_textual()),
        ElementKind::TextArea => Some(true),
        _ => None,
    };
    match mutable_control {
        Some(true) => {
            element.get_plain_attr(&local_name!("readonly")).is_none() && !is_disabled(element)
        },
        Some(false) => false,
        None => is_editing_host(element),
    }
}

/// <https://html.spec.whatwg.org/multipage/#selector-placeholder-shown>
pub fn is_placeholder_shown(element: ElementRef<'_>) -> bool {
    let supported = match element.kind() {
        ElementKind::Input => input_type(element).supports_placeholder(),
        ElementKind::TextArea => true,
        _ => false,
    };
    supported &&
        element.get_plain_attr(&local_name!("placeholder")).is_some() &&
        value(element).is_empty()
}

fn is_checkable(element: ElementRef<'_>) -> bool {
    element.kind() == ElementKind::Input &&
        matches!(input_type(element), InputType::Checkbox | InputType::Radio)
}

/// <https://html.spec.whatwg.org/multipage/#selector-checked>
pub fn is_checked(element: ElementRef<'_>) -> bool {
    let default = match element.kind() {
        ElementKind::Input if is_checkable(element) => local_name!("checked"),
        ElementKind::Option => local_name!("selected"),
        _ => return false,
    };
    element.get_plain_attr(&default).is_some() ||
        element.state().contains(ElementState::CHECKED)
}

/// <https://html.spec.whatwg.org/multipage/#selector-indeterminate>
pub fn is_indeterminate(element: ElementRef<'_>) -> bool {
    match element.kind() {
        ElementKind::Input => match input_type(element) {
            InputType::Checkbox => element.state().contains(ElementState::INDETERMINATE),
            InputType::Radio => !radio_group(element).any(is_checked),
            _ => false,
        },
        ElementKind::Progress => element
            .get_plain_attr(&local_name!("value"))
            .is_none_or(|value| value.trim().parse::<f64>().is_err()),
        _ => false,
    }
}

/// The radio buttons sharing `radio`'s group, `radio` included.
///
/// <https://html.spec.whatwg.org/multipage/#radio-button-group>
fn radio_group<'dom>(radio: ElementRef<'dom>) -> Box<dyn Iterator<Item = ElementRef<'dom>> + 'dom> {
    let name = match radio.get_plain_attr(&local_name!("name")) {
        Some(name) if !name.is_empty() => name,
        _ => return Box::new(std::iter::once(radio)),
    };
    let owner = form_owner(radio);
    let document = radio.document();
    Box::new(
        document
            .traverse_preorder(document.root())
            .filter_map(move |id| document.element(id))
            .filter(move |candidate| {
                candidate.kind() == ElementKind::Input &&
                    input_type(*candidate) == InputType::Radio &&
                    candidate.get_plain_attr(&local_name!("name")) == Some(name) &&
                    form_owner(*candidate) == owner
            }),
    )
}

/// `input[type=submit|image]` and `button` without a type or with a
/// submit type.
///
/// <https://html.spec.whatwg.org/multipage/#concept-submit-button>
pub fn is_submit_button(element: ElementRef<'_>) -> bool {
    match element.kind() {
        ElementKind::Input => matches!(input_type(element), InputType::Submit | InputType::Image),
        ElementKind::Button => element
            .get_plain_attr(&local_name!("type"))
            .is_none_or(|type_| {
                let type_ = type_.trim();
                !type_.eq_ignore_ascii_case("reset") && !type_.eq_ignore_ascii_case("button")
            }),
        _ => false,
    }
}

/// The default button: the first submit button in tree order that shares
/// the candidate's form owner and is not disabled. Submit buttons without
/// a form owner are grouped together.
///
/// <https://html.spec.whatwg.org/multipage/#default-button>
fn is_default_button(element: ElementRef<'_>) -> bool {
    if !is_submit_button(element) || is_disabled(element) {
        return false;
    }
    let owner = form_owner(element);
    let document = element.document();
    for id in document.traverse_preorder(document.root()) {
        if id == element.node_id() {
            return true;
        }
        let Some(candidate) = document.element(id) else {
            continue;
        };
        if is_submit_button(candidate) &&
            !is_disabled(candidate) &&
            form_owner(candidate) == owner
        {
            return false;
        }
    }
    false
}

/// <https://html.spec.whatwg.org/multipage/#selector-default>
pub fn is_default(element: ElementRef<'_>) -> bool {
    match element.kind() {
        ElementKind::Input if is_checkable(element) => {
            element.get_plain_attr(&local_name!("checked")).is_some()
        },
        ElementKind::Option => element.get_plain_attr(&local_name!("selected")).is_some(),
        ElementKind::Input | ElementKind::Button => is_default_button(element),
        _ => false,
    }
}

fn supports_required(element: ElementRef<'_>) -> bool {
    match element.kind() {
        ElementKind::Input => input_type(element).supports_required(),
        ElementKind::Select | ElementKind::TextArea => true,
        _ => false,
    }
}

/// <https://html.spec.whatwg.org/multipage/#selector-required>
pub fn is_required(element: ElementRef<'_>) -> bool {
    supports_required(element) && element.get_plain_attr(&local_name!("required")).is_some()
}

/// <https://html.spec.whatwg.org/multipage/#selector-optional>
pub fn is_optional(element: ElementRef<'_>) -> bool {
    supports_required(element) && element.get_plain_attr(&local_name!("required")).is_none()
}

/// `:link` and `:any-link` apply to `a`, `area` and `link` with `href`.
///
/// <https://html.spec.whatwg.org/multipage/#selector-link>
pub fn is_link(element: ElementRef<'_>) -> bool {
    matches!(
        element.kind(),
        ElementKind::Anchor | ElementKind::Area | ElementKind::Link
    ) && attr::has_attribute(element, "href")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_types_default_to_text() {
        assert_eq!(InputType::from_attribute(None), InputType::Text);
        assert_eq!(InputType::from_attribute(Some("frob")), InputType::Text);
        assert_eq!(InputType::from_attribute(Some(" CheckBox ")), InputType::Checkbox);
        assert!(InputType::Email.is_textual());
        assert!(!InputType::Checkbox.is_textual());
        assert!(!InputType::Submit.supports_required());
    }
}
