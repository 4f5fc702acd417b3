/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The document: node arena, mutation API and style entry points.
//!
//! Every mutating method takes `&mut Document` and reports what it changed
//! to the element-kind capability table, which decides how much style state
//! goes stale. Style reads take `&Document` and fill the caches lazily.

use std::cmp::Ordering;
use std::fmt;

use html5ever::{LocalName, Namespace, Prefix, QualName, local_name, ns};
use indexmap::IndexMap;
use log::debug;
use selectors::parser::SelectorList;
use servo_arc::Arc;
use string_cache::DefaultAtom as Atom;
use url::{Position, Url};

use crate::cascade::{Cascade, InitialValues, PropertyRegistration};
use crate::element_kind::{ElementKind, Mutation};
use crate::element_state::{ElementState, StateRegistry};
use crate::error::{Error, Fallible};
use crate::matching::ElementRef;
use crate::node::{Attribute, ElementData, Node, NodeData, NodeId, SimpleNodeIterator, TreeIterator};
use crate::opts::{ComplianceMode, DocumentOptions};
use crate::selector_parser::{self, PseudoElement, SelectorImpl};
use crate::style_cache::{self, CacheState, ComputedStyle, StyleCache, StyleInvalidation, StyleSerial};
use crate::stylesheet_loader::{DataUrlLoader, StylesheetLoader};
use crate::stylesheet_set::{self, SheetOrigin, StyleSheetList, StyleSheetSets};
use crate::stylesheets::Stylesheet;

/// A document and everything the style system keeps about it.
pub struct Document {
    nodes: Vec<Node>,
    options: DocumentOptions,
    compliance_mode: ComplianceMode,
    url: Option<Url>,
    target_medium: String,
    registered_properties: IndexMap<String, PropertyRegistration>,
    states: StateRegistry,
    style_sets: StyleSheetSets,
    style_cache: StyleCache,
    loader: Box<dyn StylesheetLoader>,
    cascade: Box<dyn Cascade>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("compliance_mode", &self.compliance_mode)
            .field("url", &self.url)
            .field("style_serial", &self.style_cache.serial())
            .finish()
    }
}

impl Document {
    /// Creates an empty document. When `doctype` is given a doctype node
    /// with that name becomes the first child of the document.
    ///
    /// The compliance mode is fixed here: the one forced by `options`, or
    /// quirks mode exactly when there is no doctype.
    pub fn new(doctype: Option<&str>, options: DocumentOptions) -> Document {
        let compliance_mode = options
            .compliance_mode
            .unwrap_or_else(|| ComplianceMode::from_doctype_presence(doctype.is_some()));
        let mut document = Document {
            nodes: vec![Node::new(NodeData::Document)],
            compliance_mode,
            url: options.url.clone(),
            target_medium: options.target_medium.clone(),
            registered_properties: IndexMap::new(),
            states: StateRegistry::default(),
            style_sets: StyleSheetSets::default(),
            style_cache: StyleCache::new(options.style_cache),
            loader: Box::new(DataUrlLoader),
            cascade: Box::new(InitialValues),
            options,
        };
        if let Some(name) = doctype {
            let doctype = document.push(NodeData::Doctype {
                name: name.to_owned(),
                public_id: String::new(),
                system_id: String::new(),
            });
            let root = document.root();
            document.link(root, doctype, None);
        }
        debug!("Created document in {:?} mode", compliance_mode);
        document
    }

    /// Replaces the loader used for linked style sheets.
    pub fn with_loader(mut self, loader: impl StylesheetLoader + 'static) -> Document {
        self.loader = Box::new(loader);
        self.style_sets.forget_all_contents();
        self.invalidate(StyleInvalidation::StyleSheets);
        self
    }

    /// Replaces the cascade computed styles are produced by.
    pub fn with_cascade(mut self, cascade: impl Cascade + 'static) -> Document {
        self.cascade = Box::new(cascade);
        self.invalidate(StyleInvalidation::StyleSheets);
        self
    }

    #[inline]
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    #[inline]
    pub fn compliance_mode(&self) -> ComplianceMode {
        self.compliance_mode
    }

    #[inline]
    pub fn is_html_document(&self) -> bool {
        self.options.html
    }

    /// The document URL.
    #[inline]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The URL relative style sheet references resolve against: the `href`
    /// of the first `<base>` in tree order, resolved against the document
    /// URL, else the document URL.
    ///
    /// <https://html.spec.whatwg.org/multipage/#document-base-url>
    pub fn base_url(&self) -> Option<Url> {
        let href = self
            .traverse_preorder(self.root())
            .filter_map(|id| self.element(id))
            .filter(|element| element.kind() == ElementKind::Base)
            .find_map(|base| base.get_plain_attr(&local_name!("href")));
        let Some(href) = href else {
            return self.url.clone();
        };
        let resolved = match self.url {
            Some(ref url) => url.join(href.trim()),
            None => Url::parse(href.trim()),
        };
        resolved.ok().or_else(|| self.url.clone())
    }

    #[inline]
    pub fn target_medium(&self) -> &str {
        &self.target_medium
    }

    #[inline]
    pub fn registered_properties(&self) -> &IndexMap<String, PropertyRegistration> {
        &self.registered_properties
    }

    #[inline]
    pub(crate) fn states(&self) -> &StateRegistry {
        &self.states
    }

    #[inline]
    pub(crate) fn style_sets(&self) -> &StyleSheetSets {
        &self.style_sets
    }

    #[inline]
    pub(crate) fn style_cache(&self) -> &StyleCache {
        &self.style_cache
    }

    #[inline]
    pub(crate) fn loader(&self) -> &dyn StylesheetLoader {
        &*self.loader
    }

    #[inline]
    pub(crate) fn cascade(&self) -> &dyn Cascade {
        &*self.cascade
    }

    /// The current style serial.
    #[inline]
    pub fn style_serial(&self) -> StyleSerial {
        self.style_cache.serial()
    }

    /// Whether the merged style sheet list reflects the tree.
    #[inline]
    pub fn cache_state(&self) -> CacheState {
        self.style_cache.state()
    }

    // Tree access.

    /// The document node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// A matching handle on `id`, if it is an element of this document.
    #[inline]
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        ElementRef::new(self, id)
    }

    pub fn doctype(&self) -> Option<NodeId> {
        self.children(self.root())
            .find(|&id| matches!(self.get(id).map(Node::data), Some(NodeData::Doctype { .. })))
    }

    /// <https://dom.spec.whatwg.org/#document-element>
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .find(|&id| self.get(id).is_some_and(Node::is_element))
    }

    pub fn children(&self, id: NodeId) -> SimpleNodeIterator<'_, impl Fn(&Node) -> Option<NodeId>> {
        SimpleNodeIterator {
            document: self,
            current: self.get(id).and_then(Node::first_child),
            next_node: Node::next_sibling,
        }
    }

    pub fn inclusive_ancestors(
        &self,
        id: NodeId,
    ) -> SimpleNodeIterator<'_, impl Fn(&Node) -> Option<NodeId>> {
        SimpleNodeIterator {
            document: self,
            current: self.get(id).map(|_| id),
            next_node: Node::parent,
        }
    }

    pub fn inclusively_following_siblings(
        &self,
        id: NodeId,
    ) -> SimpleNodeIterator<'_, impl Fn(&Node) -> Option<NodeId>> {
        SimpleNodeIterator {
            document: self,
            current: self.get(id).map(|_| id),
            next_node: Node::next_sibling,
        }
    }

    pub fn inclusively_preceding_siblings(
        &self,
        id: NodeId,
    ) -> SimpleNodeIterator<'_, impl Fn(&Node) -> Option<NodeId>> {
        SimpleNodeIterator {
            document: self,
            current: self.get(id).map(|_| id),
            next_node: Node::prev_sibling,
        }
    }

    /// The subtree rooted at `id` in tree order, `id` included.
    #[inline]
    pub fn traverse_preorder(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, id)
    }

    /// <https://dom.spec.whatwg.org/#connected>
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.inclusive_ancestors(id).last() == Some(self.root())
    }

    /// <https://dom.spec.whatwg.org/#concept-tree-inclusive-ancestor>
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inclusive_ancestors(node).any(|id| id == ancestor)
    }

    /// Orders two nodes in tree order. Nodes of different trees are ordered
    /// by id so that the result stays consistent.
    pub fn compare_tree_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let mut chain_a: Vec<NodeId> = self.inclusive_ancestors(a).collect();
        let mut chain_b: Vec<NodeId> = self.inclusive_ancestors(b).collect();
        chain_a.reverse();
        chain_b.reverse();
        let common = chain_a
            .iter()
            .zip(chain_b.iter())
            .take_while(|(x, y)| x == y)
            .count();
        if common == 0 {
            return a.cmp(&b);
        }
        match (chain_a.get(common), chain_b.get(common)) {
            (None, _) => Ordering::Less,
            (_, None) => Ordering::Greater,
            (Some(&x), Some(&y)) => {
                if self.inclusively_following_siblings(x).any(|id| id == y) {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            },
        }
    }

    /// The first element in tree order whose id is `id`.
    ///
    /// <https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid>
    pub fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        if id.is_empty() {
            return None;
        }
        self.traverse_preorder(self.root())
            .filter_map(|node| self.element(node))
            .find(|element| crate::attr::id(*element) == Some(id))
    }

    // Node creation. New nodes have no parent.

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Creates an element in the HTML namespace, or in no namespace for
    /// an XML document. The name keeps its case.
    ///
    /// <https://dom.spec.whatwg.org/#dom-document-createelement>
    pub fn create_element(&mut self, local_name: &str) -> Fallible<NodeId> {
        if !is_valid_name(local_name) {
            return Err(Error::InvalidCharacter);
        }
        let namespace = if self.is_html_document() {
            ns!(html)
        } else {
            ns!()
        };
        let name = QualName::new(None, namespace, LocalName::from(local_name));
        Ok(self.push(NodeData::Element(ElementData::new(name))))
    }

    /// <https://dom.spec.whatwg.org/#dom-document-createelementns>
    pub fn create_element_ns(
        &mut self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Fallible<NodeId> {
        let name = validate_and_extract(namespace, qualified_name)?;
        Ok(self.push(NodeData::Element(ElementData::new(name))))
    }

    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Text(data.to_owned()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Comment(data.to_owned()))
    }

    /// Creates an unexpanded entity reference whose replacement text is
    /// `text`.
    pub fn create_entity_reference(&mut self, name: &str, text: &str) -> Fallible<NodeId> {
        if !is_valid_name(name) {
            return Err(Error::InvalidCharacter);
        }
        Ok(self.push(NodeData::EntityReference {
            name: name.to_owned(),
            text: text.to_owned(),
        }))
    }

    /// <https://dom.spec.whatwg.org/#dom-document-createprocessinginstruction>
    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> Fallible<NodeId> {
        if !is_valid_name(target) || data.contains("?>") {
            return Err(Error::InvalidCharacter);
        }
        Ok(self.push(NodeData::ProcessingInstruction {
            target: target.to_owned(),
            data: data.to_owned(),
        }))
    }

    // Tree mutation.

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Fallible<()> {
        self.insert_before(parent, node, None)
    }

    /// Inserts `node` into `parent` before `child`, or last when `child` is
    /// `None`. A node that already has a parent is moved.
    ///
    /// <https://dom.spec.whatwg.org/#concept-node-pre-insert>
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Fallible<()> {
        self.ensure_pre_insertion_validity(parent, node, child)?;

        let reference = if child == Some(node) {
            self.nodes[node.index()].next_sibling
        } else {
            child
        };
        if let Some(old_parent) = self.nodes[node.index()].parent {
            self.remove_child(old_parent, node)?;
        }
        self.link(parent, node, reference);

        let inserted: Vec<NodeId> = self.traverse_preorder(node).collect();
        for id in inserted {
            self.notify(id, Mutation::Inserted);
        }
        self.notify(parent, Mutation::ChildrenChanged);
        Ok(())
    }

    /// <https://dom.spec.whatwg.org/#concept-node-remove>
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Fallible<()> {
        if self.get(parent).is_none() || self.get(child).and_then(Node::parent) != Some(parent) {
            return Err(Error::NotFound);
        }
        self.unlink(child);

        let removed: Vec<NodeId> = self.traverse_preorder(child).collect();
        for id in removed {
            self.style_cache.forget(id);
            self.notify(id, Mutation::Removed);
        }
        self.notify(parent, Mutation::ChildrenChanged);
        Ok(())
    }

    // https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity
    fn ensure_pre_insertion_validity(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Fallible<()> {
        let parent_data = self.get(parent).ok_or(Error::NotFound)?.data();
        let node_data = self.get(node).ok_or(Error::NotFound)?.data();
        let parent_is_document = match *parent_data {
            NodeData::Document => true,
            NodeData::Element(_) => false,
            _ => return Err(Error::HierarchyRequest),
        };
        if self.is_inclusive_ancestor(node, parent) {
            return Err(Error::HierarchyRequest);
        }
        if let Some(child) = child {
            if self.get(child).and_then(Node::parent) != Some(parent) {
                return Err(Error::NotFound);
            }
        }
        match *node_data {
            NodeData::Document => return Err(Error::HierarchyRequest),
            NodeData::Text(_) | NodeData::EntityReference { .. } if parent_is_document => {
                return Err(Error::HierarchyRequest);
            },
            NodeData::Doctype { .. } if !parent_is_document => {
                return Err(Error::HierarchyRequest);
            },
            _ => {},
        }
        if parent_is_document {
            let same_kind = |id: NodeId| {
                id != node &&
                    self.get(id).is_some_and(|other| {
                        std::mem::discriminant(other.data()) == std::mem::discriminant(node_data)
                    })
            };
            let unique = matches!(*node_data, NodeData::Element(_) | NodeData::Doctype { .. });
            if unique && self.children(parent).any(same_kind) {
                return Err(Error::HierarchyRequest);
            }
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) {
        let prev = match before {
            Some(before) => self.nodes[before.index()].prev_sibling,
            None => self.nodes[parent.index()].last_child,
        };
        {
            let node = &mut self.nodes[node.index()];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = before;
        }
        match prev {
            Some(prev) => self.nodes[prev.index()].next_sibling = Some(node),
            None => self.nodes[parent.index()].first_child = Some(node),
        }
        match before {
            Some(before) => self.nodes[before.index()].prev_sibling = Some(node),
            None => self.nodes[parent.index()].last_child = Some(node),
        }
    }

    fn unlink(&mut self, node: NodeId) {
        let (parent, prev, next) = {
            let node = &mut self.nodes[node.index()];
            (
                node.parent.take(),
                node.prev_sibling.take(),
                node.next_sibling.take(),
            )
        };
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(prev) => self.nodes[prev.index()].next_sibling = next,
            None => self.nodes[parent.index()].first_child = next,
        }
        match next {
            Some(next) => self.nodes[next.index()].prev_sibling = prev,
            None => self.nodes[parent.index()].last_child = prev,
        }
    }

    // Attributes and character data.

    fn ensure_element(&self, node: NodeId) -> Fallible<()> {
        match self.get(node) {
            None => Err(Error::NotFound),
            Some(node) if !node.is_element() => Err(Error::InvalidNodeType),
            Some(_) => Ok(()),
        }
    }

    fn element_data_mut(&mut self, node: NodeId) -> Fallible<&mut ElementData> {
        self.nodes
            .get_mut(node.index())
            .ok_or(Error::NotFound)?
            .as_element_mut()
            .ok_or(Error::InvalidNodeType)
    }

    fn lowercases_attribute_names(&self, node: NodeId) -> bool {
        self.element(node)
            .is_some_and(|element| element.is_html_element_in_html_document())
    }

    /// Sets the first attribute whose qualified name is `name`, creating
    /// one in no namespace if there is none. HTML elements of HTML
    /// documents lowercase `name` first.
    ///
    /// <https://dom.spec.whatwg.org/#dom-element-setattribute>
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Fallible<()> {
        if !is_valid_name(name) {
            return Err(Error::InvalidCharacter);
        }
        self.ensure_element(node)?;
        let name = if self.lowercases_attribute_names(node) {
            name.to_ascii_lowercase()
        } else {
            name.to_owned()
        };
        let element = self.element_data_mut(node)?;
        let qualified_name = match element
            .attrs
            .iter_mut()
            .find(|attr| attr.qualified_name() == name)
        {
            Some(attr) => {
                attr.value = value.to_owned();
                attr.name.clone()
            },
            None => {
                let qualified_name = QualName::new(None, ns!(), LocalName::from(&*name));
                element.attrs.push(Attribute {
                    name: qualified_name.clone(),
                    value: value.to_owned(),
                });
                qualified_name
            },
        };
        self.notify(node, Mutation::Attribute(&qualified_name));
        Ok(())
    }

    /// <https://dom.spec.whatwg.org/#dom-element-setattributens>
    pub fn set_attribute_ns(
        &mut self,
        node: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Fallible<()> {
        let name = validate_and_extract(namespace, qualified_name)?;
        let element = self.element_data_mut(node)?;
        match element
            .attrs
            .iter_mut()
            .find(|attr| attr.name.ns == name.ns && attr.name.local == name.local)
        {
            Some(attr) => attr.value = value.to_owned(),
            None => element.attrs.push(Attribute {
                name: name.clone(),
                value: value.to_owned(),
            }),
        }
        self.notify(node, Mutation::Attribute(&name));
        Ok(())
    }

    /// Removes the first attribute whose qualified name is `name`. Removing
    /// a missing attribute is not an error.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Fallible<()> {
        self.ensure_element(node)?;
        let name = if self.lowercases_attribute_names(node) {
            name.to_ascii_lowercase()
        } else {
            name.to_owned()
        };
        let element = self.element_data_mut(node)?;
        let Some(index) = element
            .attrs
            .iter()
            .position(|attr| attr.qualified_name() == name)
        else {
            return Ok(());
        };
        let removed = element.attrs.remove(index);
        self.notify(node, Mutation::Attribute(&removed.name));
        Ok(())
    }

    pub fn remove_attribute_ns(
        &mut self,
        node: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Fallible<()> {
        let namespace = Namespace::from(namespace.unwrap_or_default());
        let local_name = LocalName::from(local_name);
        let element = self.element_data_mut(node)?;
        let Some(index) = element
            .attrs
            .iter()
            .position(|attr| attr.name.ns == namespace && attr.name.local == local_name)
        else {
            return Ok(());
        };
        let removed = element.attrs.remove(index);
        self.notify(node, Mutation::Attribute(&removed.name));
        Ok(())
    }

    /// Replaces the data of a text, comment, entity reference or
    /// processing instruction node.
    pub fn set_character_data(&mut self, node: NodeId, data: &str) -> Fallible<()> {
        let target = self.nodes.get_mut(node.index()).ok_or(Error::NotFound)?;
        match target.data {
            NodeData::Text(ref mut text) | NodeData::Comment(ref mut text) => {
                *text = data.to_owned()
            },
            NodeData::EntityReference { ref mut text, .. } => *text = data.to_owned(),
            NodeData::ProcessingInstruction {
                data: ref mut existing,
                ..
            } => *existing = data.to_owned(),
            _ => return Err(Error::InvalidNodeType),
        }
        if let Some(parent) = target.parent {
            self.notify(parent, Mutation::ChildrenChanged);
        }
        Ok(())
    }

    // Document-level state.

    /// Changes the document URL. A change of the fragment alone only
    /// affects `:target`; anything else may change how linked sheets
    /// resolve.
    pub fn set_url(&mut self, url: Option<Url>) {
        let same_resource = match (&self.url, &url) {
            (Some(old), Some(new)) => old[..Position::AfterQuery] == new[..Position::AfterQuery],
            (None, None) => true,
            _ => false,
        };
        self.url = url;
        if same_resource {
            self.invalidate(StyleInvalidation::Restyle);
        } else {
            self.style_sets.forget_all_contents();
            self.invalidate(StyleInvalidation::StyleSheets);
        }
    }

    /// Sets the `Default-Style` header value that applies when no
    /// `<meta http-equiv=default-style>` is in the tree.
    pub fn set_default_style_header(&mut self, value: Option<&str>) {
        self.style_sets
            .set_default_style_header(value.map(str::to_owned));
        self.invalidate(StyleInvalidation::StyleSheets);
    }

    pub fn set_target_medium(&mut self, medium: &str) {
        if self.target_medium == medium {
            return;
        }
        self.target_medium = medium.to_owned();
        self.invalidate(StyleInvalidation::StyleSheets);
    }

    /// <https://drafts.css-houdini.org/css-properties-values-api/#the-registerproperty-function>
    pub fn register_property(&mut self, registration: PropertyRegistration) -> Fallible<()> {
        if !registration.name.starts_with("--") || registration.name.len() == 2 {
            return Err(Error::Syntax(format!(
                "`{}` is not a custom property name",
                registration.name
            )));
        }
        if self.registered_properties.contains_key(&registration.name) {
            return Err(Error::InvalidModification);
        }
        debug!("Registered custom property {}", registration.name);
        self.registered_properties
            .insert(registration.name.clone(), registration);
        self.invalidate(StyleInvalidation::StyleSheets);
        Ok(())
    }

    /// Forces the style sheet list and every computed style to be rebuilt.
    pub fn rebuild_cascade(&mut self) {
        self.invalidate(StyleInvalidation::StyleSheets);
    }

    // Runtime state.

    pub fn element_state(&self, node: NodeId) -> ElementState {
        self.states.state(node)
    }

    pub fn set_element_state(
        &mut self,
        node: NodeId,
        state: ElementState,
        value: bool,
    ) -> Fallible<()> {
        self.ensure_element(node)?;
        if self.states.set_state(node, state, value) {
            self.invalidate(StyleInvalidation::Restyle);
        }
        Ok(())
    }

    /// <https://html.spec.whatwg.org/multipage/#custom-state-pseudo-class>
    pub fn add_custom_state(&mut self, node: NodeId, name: &str) -> Fallible<()> {
        self.ensure_element(node)?;
        if self.states.add_custom_state(node, Atom::from(name)) {
            self.invalidate(StyleInvalidation::Restyle);
        }
        Ok(())
    }

    pub fn remove_custom_state(&mut self, node: NodeId, name: &str) -> Fallible<()> {
        self.ensure_element(node)?;
        if self.states.remove_custom_state(node, &Atom::from(name)) {
            self.invalidate(StyleInvalidation::Restyle);
        }
        Ok(())
    }

    /// Drops every runtime state and custom state of `node`.
    pub fn clear_element_state(&mut self, node: NodeId) -> Fallible<()> {
        self.ensure_element(node)?;
        self.states.forget(node);
        self.invalidate(StyleInvalidation::Restyle);
        Ok(())
    }

    // Invalidation.

    /// Reports a mutation of `node` to its element kind and applies the
    /// resulting invalidation. Mutations of non-elements are ignored.
    fn notify(&mut self, node: NodeId, mutation: Mutation<'_>) {
        let Some(element) = self.element(node) else {
            return;
        };
        let kind = element.kind();
        let capabilities = kind.capabilities();
        let invalidation = (capabilities.mutation_hook)(element, &mutation);
        let definer = (capabilities.style_definer)(element);

        if invalidation == StyleInvalidation::StyleSheets {
            match kind {
                ElementKind::Link | ElementKind::Style => {
                    self.style_sets.forget_contents(node);
                    self.update_style_definer(node, definer);
                },
                ElementKind::Base => self.style_sets.forget_all_contents(),
                _ => {},
            }
        }
        self.invalidate(invalidation);
    }

    /// Keeps the linked and embedded definer lists in tree order.
    fn update_style_definer(&mut self, node: NodeId, definer: Option<SheetOrigin>) {
        match definer {
            Some(origin) if self.style_sets.is_registered(node, origin) => {},
            Some(origin) => {
                self.style_sets.remove(node);
                let index = self
                    .style_sets
                    .definers(origin)
                    .partition_point(|&other| self.compare_tree_order(other, node) == Ordering::Less);
                self.style_sets.insert(origin, index, node);
                debug!("{:?} now defines a {:?} style sheet", node, origin);
            },
            None => self.style_sets.remove(node),
        }
    }

    fn invalidate(&mut self, invalidation: StyleInvalidation) {
        self.style_cache.invalidate(invalidation);
        if invalidation == StyleInvalidation::StyleSheets {
            self.style_sets.invalidate();
        }
    }

    // Selector matching.

    /// Whether `node`, or its `pseudo` pseudo-element, matches `list`.
    /// Non-elements match nothing.
    pub fn matches(
        &self,
        node: NodeId,
        list: &SelectorList<SelectorImpl>,
        pseudo: Option<PseudoElement>,
    ) -> bool {
        self.matched_index(node, list, pseudo).is_some()
    }

    /// The index of the first selector of `list` matching `node`.
    pub fn matched_index(
        &self,
        node: NodeId,
        list: &SelectorList<SelectorImpl>,
        pseudo: Option<PseudoElement>,
    ) -> Option<usize> {
        self.element(node)?
            .with_pseudo_element(pseudo)
            .matched_index(list)
    }

    /// <https://dom.spec.whatwg.org/#dom-element-matches>
    pub fn element_matches(&self, node: NodeId, selectors: &str) -> Fallible<bool> {
        self.ensure_element(node)?;
        let list = selector_parser::parse_selector_list(selectors)?;
        Ok(self.matches(node, &list, None))
    }

    /// The first descendant element of `scope` matching `selectors`.
    ///
    /// <https://dom.spec.whatwg.org/#dom-parentnode-queryselector>
    pub fn query_selector(&self, scope: NodeId, selectors: &str) -> Fallible<Option<NodeId>> {
        let list = selector_parser::parse_selector_list(selectors)?;
        Ok(self
            .traverse_preorder(scope)
            .skip(1)
            .find(|&id| self.matches(id, &list, None)))
    }

    /// <https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall>
    pub fn query_selector_all(&self, scope: NodeId, selectors: &str) -> Fallible<Vec<NodeId>> {
        let list = selector_parser::parse_selector_list(selectors)?;
        Ok(self
            .traverse_preorder(scope)
            .skip(1)
            .filter(|&id| self.matches(id, &list, None))
            .collect())
    }

    /// <https://dom.spec.whatwg.org/#dom-element-closest>
    pub fn closest(&self, node: NodeId, selectors: &str) -> Fallible<Option<NodeId>> {
        self.ensure_element(node)?;
        let list = selector_parser::parse_selector_list(selectors)?;
        Ok(self
            .inclusive_ancestors(node)
            .find(|&id| self.matches(id, &list, None)))
    }

    // Style.

    /// The computed style of `node`, or of its `pseudo` pseudo-element.
    /// Two reads without a style-affecting mutation in between return the
    /// same `Arc`.
    pub fn computed_style(
        &self,
        node: NodeId,
        pseudo: Option<PseudoElement>,
    ) -> Option<Arc<ComputedStyle>> {
        let element = self.element(node)?.with_pseudo_element(pseudo);
        Some(style_cache::resolve_style(self, element))
    }

    /// The document's style sheets, rebuilt first if a mutation made the
    /// list stale.
    ///
    /// <https://drafts.csswg.org/cssom/#dom-document-stylesheets>
    pub fn style_sheets(&self) -> Arc<StyleSheetList> {
        if let Some(list) = self.style_sets.cached_list() {
            return list;
        }
        let list = Arc::new(stylesheet_set::build(self));
        self.style_sets.store_list(list.clone());
        self.style_cache.mark_clean();
        list
    }

    /// The contents of the enabled sheets whose media matches the target
    /// medium, linked sheets first.
    pub(crate) fn applicable_stylesheets(&self) -> Vec<Arc<Stylesheet>> {
        let medium = self.target_medium();
        self.style_sheets()
            .iter()
            .filter(|sheet| sheet.applies(medium))
            .map(|sheet| sheet.contents.clone())
            .collect()
    }

    /// <https://html.spec.whatwg.org/multipage/#dom-document-stylesheetsets>
    pub fn style_sheet_sets(&self) -> Vec<String> {
        self.style_sheets().style_sheet_sets().to_vec()
    }

    /// <https://html.spec.whatwg.org/multipage/#dom-document-selectedstylesheetset>
    pub fn selected_style_sheet_set(&self) -> Option<String> {
        self.style_sheets()
            .selected_style_sheet_set()
            .map(str::to_owned)
    }

    /// Enables the titled sheets of set `name` and disables the others.
    /// The empty string disables every titled sheet. Names that no sheet
    /// carries are ignored.
    pub fn set_selected_style_sheet_set(&mut self, name: &str) {
        if !name.is_empty() && !self.style_sheets().has_set(name) {
            debug!("Ignoring selection of unknown style sheet set {:?}", name);
            return;
        }
        debug!("Selecting style sheet set {:?}", name);
        self.style_sets.select(name);
        self.invalidate(StyleInvalidation::StyleSheets);
    }

    /// <https://html.spec.whatwg.org/multipage/#dom-document-laststylesheetset>
    pub fn last_style_sheet_set(&self) -> Option<&str> {
        self.style_sets.last_selected()
    }

    /// <https://html.spec.whatwg.org/multipage/#dom-document-preferredstylesheetset>
    pub fn preferred_style_sheet_set(&self) -> Option<String> {
        stylesheet_set::preferred_style_sheet_set(self)
    }

    /// Enables the titled sheets of set `name` on top of the selected set,
    /// until the next explicit selection.
    pub fn enable_style_sheets_for_set(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.style_sets.enable_additional(name);
        self.invalidate(StyleInvalidation::StyleSheets);
    }
}

/// A relaxed version of the XML `Name` production.
fn is_valid_name(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() || first == '-' || first == '.' {
        return false;
    }
    name.chars().all(|c| {
        !c.is_whitespace() &&
            !c.is_control() &&
            !matches!(c, '<' | '>' | '&' | '"' | '\'' | '/' | '=')
    })
}

// https://dom.spec.whatwg.org/#validate-and-extract
fn validate_and_extract(namespace: Option<&str>, qualified_name: &str) -> Fallible<QualName> {
    let namespace = Namespace::from(namespace.unwrap_or_default());
    let (prefix, local) = match qualified_name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qualified_name),
    };
    if !is_valid_name(local) ||
        local.contains(':') ||
        prefix.is_some_and(|prefix| !is_valid_name(prefix))
    {
        return Err(Error::InvalidCharacter);
    }
    if prefix.is_some() && namespace == ns!() {
        return Err(Error::Namespace);
    }
    if prefix == Some("xml") && namespace != ns!(xml) {
        return Err(Error::Namespace);
    }
    let is_xmlns = qualified_name == "xmlns" || prefix == Some("xmlns");
    if is_xmlns != (namespace == ns!(xmlns)) {
        return Err(Error::Namespace);
    }
    Ok(QualName::new(
        prefix.map(Prefix::from),
        namespace,
        LocalName::from(local),
    ))
}
