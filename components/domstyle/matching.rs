/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The matcher facade: the element handle the `selectors` crate calls back
//! into.
//!
//! An [`ElementRef`] is a copyable `(document, node, pseudo-element)` triple.
//! It holds no match results; every query reads the live tree.

use std::fmt;
use std::ptr;

use html5ever::{LocalName, Namespace, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, SelectorCaches,
};
use selectors::parser::{Selector, SelectorList};
use selectors::{Element, OpaqueElement};

use crate::directionality;
use crate::document::Document;
use crate::element_kind::ElementKind;
use crate::element_state::ElementState;
use crate::form_controls;
use crate::node::{ElementData, Node, NodeData, NodeId};
use crate::opts::ComplianceMode;
use crate::selector_parser::{
    AtomIdent, AtomString, CssLocalName, CssNamespace, NonTSPseudoClass, PseudoElement,
    SelectorImpl,
};
use crate::{attr, structural};

/// A handle to an element of a [`Document`], optionally standing for one of
/// its pseudo-elements.
#[derive(Clone, Copy)]
pub struct ElementRef<'dom> {
    document: &'dom Document,
    node: NodeId,
    data: &'dom ElementData,
    pseudo: Option<PseudoElement>,
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}", self.data.local_name())?;
        if let Some(id) = attr::id(*self) {
            write!(f, " id={}", id)?;
        }
        write!(f, "> ({:?})", self.node)?;
        if let Some(pseudo) = self.pseudo {
            write!(f, " {:?}", pseudo)?;
        }
        Ok(())
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.document, other.document) &&
            self.node == other.node &&
            self.pseudo == other.pseudo
    }
}

impl Eq for ElementRef<'_> {}

impl<'dom> ElementRef<'dom> {
    /// `None` unless `node` is an element of `document`.
    pub fn new(document: &'dom Document, node: NodeId) -> Option<ElementRef<'dom>> {
        let data = document.get(node)?.as_element()?;
        Some(ElementRef {
            document,
            node,
            data,
            pseudo: None,
        })
    }

    #[inline]
    pub fn document(&self) -> &'dom Document {
        self.document
    }

    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn element_data(&self) -> &'dom ElementData {
        self.data
    }

    #[inline]
    pub fn local_name(&self) -> &'dom LocalName {
        self.data.local_name()
    }

    #[inline]
    pub fn namespace(&self) -> &'dom Namespace {
        self.data.namespace()
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    #[inline]
    pub fn compliance_mode(&self) -> ComplianceMode {
        self.document.compliance_mode()
    }

    #[inline]
    pub fn pseudo_element(&self) -> Option<PseudoElement> {
        self.pseudo
    }

    /// The same element, standing for `pseudo` in subsequent matches.
    pub fn with_pseudo_element(self, pseudo: Option<PseudoElement>) -> ElementRef<'dom> {
        ElementRef { pseudo, ..self }
    }

    pub fn set_pseudo_element(&mut self, pseudo: Option<PseudoElement>) {
        self.pseudo = pseudo;
    }

    #[inline]
    pub fn get_attr(&self, namespace: &Namespace, local_name: &LocalName) -> Option<&'dom str> {
        self.data.get_attr(namespace, local_name)
    }

    #[inline]
    pub fn get_plain_attr(&self, local_name: &LocalName) -> Option<&'dom str> {
        self.data.get_plain_attr(local_name)
    }

    /// Whether the element is in its document's tree.
    pub fn is_connected(&self) -> bool {
        self.document.is_connected(self.node)
    }

    #[inline]
    pub fn state(&self) -> ElementState {
        self.document.states().state(self.node)
    }

    pub fn is_html_element_in_html_document(&self) -> bool {
        *self.namespace() == ns!(html) && self.document.is_html_document()
    }

    /// Same namespace, and the same local name compared ASCII
    /// case-insensitively.
    pub fn is_same_type_as(&self, other: ElementRef<'_>) -> bool {
        self.namespace() == other.namespace() &&
            self.local_name().eq_ignore_ascii_case(other.local_name())
    }

    pub(crate) fn parent_node_data(&self) -> Option<&'dom NodeData> {
        let parent = self.document.get(self.node)?.parent()?;
        Some(self.document.get(parent)?.data())
    }

    pub fn parent_element(&self) -> Option<ElementRef<'dom>> {
        let parent = self.document.get(self.node)?.parent()?;
        ElementRef::new(self.document, parent)
    }

    pub fn ancestor_elements(&self) -> impl Iterator<Item = ElementRef<'dom>> + 'dom {
        let document = self.document;
        self.document
            .inclusive_ancestors(self.node)
            .skip(1)
            .map_while(move |id| ElementRef::new(document, id))
    }

    pub fn prev_sibling_element(&self) -> Option<ElementRef<'dom>> {
        self.preceding_sibling_elements().next()
    }

    pub fn next_sibling_element(&self) -> Option<ElementRef<'dom>> {
        self.following_sibling_elements().next()
    }

    /// Preceding element siblings, nearest first.
    pub fn preceding_sibling_elements(&self) -> impl Iterator<Item = ElementRef<'dom>> + 'dom {
        let document = self.document;
        document
            .inclusively_preceding_siblings(self.node)
            .skip(1)
            .filter_map(move |id| ElementRef::new(document, id))
    }

    /// Following element siblings, nearest first.
    pub fn following_sibling_elements(&self) -> impl Iterator<Item = ElementRef<'dom>> + 'dom {
        let document = self.document;
        document
            .inclusively_following_siblings(self.node)
            .skip(1)
            .filter_map(move |id| ElementRef::new(document, id))
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &'dom Node> + 'dom {
        let document = self.document;
        document
            .children(self.node)
            .filter_map(move |id| document.get(id))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = ElementRef<'dom>> + 'dom {
        let document = self.document;
        document
            .children(self.node)
            .filter_map(move |id| ElementRef::new(document, id))
    }

    /// Descendant elements in tree order, the element itself excluded.
    pub fn descendant_elements(&self) -> impl Iterator<Item = ElementRef<'dom>> + 'dom {
        let document = self.document;
        document
            .traverse_preorder(self.node)
            .skip(1)
            .filter_map(move |id| ElementRef::new(document, id))
    }

    /// The concatenated data of the text children.
    ///
    /// <https://dom.spec.whatwg.org/#concept-child-text-content>
    pub fn child_text_content(&self) -> String {
        self.child_nodes()
            .filter_map(Node::character_data)
            .collect()
    }

    /// The 1-based position of the element among its preceding element
    /// siblings that pass `filter`. The element itself is counted without
    /// consulting the filter.
    pub fn index_of<F>(&self, filter: F) -> usize
    where
        F: Fn(ElementRef<'dom>) -> bool,
    {
        1 + self
            .preceding_sibling_elements()
            .filter(|sibling| filter(*sibling))
            .count()
    }

    /// As [`Self::index_of`], counting from the last sibling.
    pub fn reverse_index_of<F>(&self, filter: F) -> usize
    where
        F: Fn(ElementRef<'dom>) -> bool,
    {
        1 + self
            .following_sibling_elements()
            .filter(|sibling| filter(*sibling))
            .count()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        structural::is_root(*self)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        structural::is_empty(*self)
    }

    fn selectors_for_pseudo<'a>(
        &self,
        list: &'a SelectorList<SelectorImpl>,
    ) -> impl Iterator<Item = (usize, &'a Selector<SelectorImpl>)> + 'a {
        let pseudo = self.pseudo;
        list.slice()
            .iter()
            .enumerate()
            .filter(move |(_, selector)| selector.pseudo_element().copied() == pseudo)
    }

    /// The index of the first selector of `list` that matches, or `None`.
    /// Only selectors targeting the handle's pseudo-element are considered.
    pub fn matched_index(&self, list: &SelectorList<SelectorImpl>) -> Option<usize> {
        with_matching_context(self.document, |context| {
            self.selectors_for_pseudo(list)
                .find(|&(_, selector)| matching::matches_selector(selector, 0, None, self, context))
                .map(|(index, _)| index)
        })
    }

    pub fn matches_selector_list(&self, list: &SelectorList<SelectorImpl>) -> bool {
        self.matched_index(list).is_some()
    }

    /// The highest specificity among the matching selectors of `list`.
    pub fn matching_specificity(&self, list: &SelectorList<SelectorImpl>) -> Option<u32> {
        with_matching_context(self.document, |context| {
            self.selectors_for_pseudo(list)
                .filter(|&(_, selector)| matching::matches_selector(selector, 0, None, self, context))
                .map(|(_, selector)| selector.specificity())
                .max()
        })
    }
}

/// Runs `f` with a fresh matching context for `document`. Nothing survives
/// the call, so no match result outlives a tree mutation.
pub(crate) fn with_matching_context<R>(
    document: &Document,
    f: impl FnOnce(&mut MatchingContext<SelectorImpl>) -> R,
) -> R {
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        document.compliance_mode().quirks_mode(),
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );
    f(&mut context)
}

impl<'dom> ::selectors::Element for ElementRef<'dom> {
    type Impl = SelectorImpl;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.data)
    }

    fn parent_element(&self) -> Option<Self> {
        if self.pseudo.is_some() {
            return None;
        }
        ElementRef::parent_element(self)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    #[inline]
    fn is_pseudo_element(&self) -> bool {
        self.pseudo.is_some()
    }

    #[inline]
    fn pseudo_element_originating_element(&self) -> Option<Self> {
        self.pseudo.map(|_| self.with_pseudo_element(None))
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        ElementRef::prev_sibling_element(self)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        ElementRef::next_sibling_element(self)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.child_elements().next()
    }

    fn is_html_element_in_html_document(&self) -> bool {
        ElementRef::is_html_element_in_html_document(self)
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        if ElementRef::is_html_element_in_html_document(self) {
            self.local_name().eq_ignore_ascii_case(&name.0)
        } else {
            *self.local_name() == name.0
        }
    }

    #[inline]
    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        *self.namespace() == ns.0
    }

    #[inline]
    fn is_same_type(&self, other: &Self) -> bool {
        self.is_same_type_as(*other)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&AtomString>,
    ) -> bool {
        attr::attr_matches(*self, ns, local_name, operation)
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo_class: &NonTSPseudoClass,
        _: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        let element = *self;
        match *pseudo_class {
            NonTSPseudoClass::Link => {
                form_controls::is_link(element) && !self.state().contains(ElementState::VISITED)
            },
            NonTSPseudoClass::Visited => {
                form_controls::is_link(element) && self.state().contains(ElementState::VISITED)
            },
            NonTSPseudoClass::AnyLink => form_controls::is_link(element),

            NonTSPseudoClass::Active => self.state().contains(ElementState::ACTIVE),
            NonTSPseudoClass::Focus => self.state().contains(ElementState::FOCUS),
            NonTSPseudoClass::FocusVisible => self.state().contains(ElementState::FOCUS_VISIBLE),
            NonTSPseudoClass::Hover => self.state().contains(ElementState::HOVER),
            NonTSPseudoClass::FocusWithin => structural::has_focus_within(element),
            NonTSPseudoClass::CustomState(ref state) => self.has_custom_state(state),

            NonTSPseudoClass::Blank => structural::is_blank(element),
            NonTSPseudoClass::Lang(ref ranges) => structural::matches_lang(element, ranges),
            NonTSPseudoClass::Dir(ref direction) => {
                directionality::directionality(element).matches(direction)
            },
            NonTSPseudoClass::Target => structural::is_target(element),

            NonTSPseudoClass::Checked => form_controls::is_checked(element),
            NonTSPseudoClass::Default => form_controls::is_default(element),
            NonTSPseudoClass::Disabled => form_controls::is_disabled(element),
            NonTSPseudoClass::Enabled => form_controls::is_enabled(element),
            NonTSPseudoClass::Indeterminate => form_controls::is_indeterminate(element),
            NonTSPseudoClass::Optional => form_controls::is_optional(element),
            NonTSPseudoClass::PlaceholderShown => form_controls::is_placeholder_shown(element),
            NonTSPseudoClass::ReadOnly => !form_controls::is_read_write(element),
            NonTSPseudoClass::ReadWrite => form_controls::is_read_write(element),
            NonTSPseudoClass::Required => form_controls::is_required(element),
        }
    }

    fn match_pseudo_element(
        &self,
        pseudo: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        self.pseudo == Some(*pseudo)
    }

    #[inline]
    fn is_link(&self) -> bool {
        form_controls::is_link(*self)
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    #[inline]
    fn has_id(&self, id: &AtomIdent, case_sensitivity: CaseSensitivity) -> bool {
        attr::has_id(*self, id, case_sensitivity)
    }

    #[inline]
    fn has_class(&self, name: &AtomIdent, case_sensitivity: CaseSensitivity) -> bool {
        attr::has_class(*self, name, case_sensitivity)
    }

    fn has_custom_state(&self, name: &AtomIdent) -> bool {
        self.document
            .states()
            .has_custom_state(self.node, &name.0)
    }

    fn imported_part(&self, _: &AtomIdent) -> Option<AtomIdent> {
        None
    }

    fn is_part(&self, _name: &AtomIdent) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        ElementRef::is_empty(self)
    }

    fn is_root(&self) -> bool {
        ElementRef::is_root(self)
    }

    // Nothing is cached between matches, so there is nothing to flag.
    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}
