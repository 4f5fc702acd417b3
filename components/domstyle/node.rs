/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The node tree observed by the style system.
//!
//! Nodes live in an arena owned by the [`Document`]. A node knows its parent
//! and siblings by id only; the parent owns the child list.

use html5ever::{LocalName, Namespace, QualName, ns};

use crate::document::Document;
use crate::element_kind::ElementKind;

/// The identity of a node in its document.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// An attribute of an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// The qualified name, `prefix:local` or just `local`.
    pub fn qualified_name(&self) -> String {
        match self.name.prefix {
            Some(ref prefix) => format!("{}:{}", prefix, self.name.local),
            None => self.name.local.to_string(),
        }
    }
}

/// The element-specific part of a node.
#[derive(Debug)]
pub struct ElementData {
    pub(crate) name: QualName,
    pub(crate) kind: ElementKind,
    pub(crate) attrs: Vec<Attribute>,
}

impl ElementData {
    pub(crate) fn new(name: QualName) -> ElementData {
        let kind = ElementKind::from_name(&name);
        ElementData {
            name,
            kind,
            attrs: vec![],
        }
    }

    #[inline]
    pub fn local_name(&self) -> &LocalName {
        &self.name.local
    }

    #[inline]
    pub fn namespace(&self) -> &Namespace {
        &self.name.ns
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Looks an attribute up by namespace and exact local name.
    pub fn get_attr(&self, namespace: &Namespace, local_name: &LocalName) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name.ns == *namespace && attr.name.local == *local_name)
            .map(|attr| &*attr.value)
    }

    /// Shorthand for an attribute in the null namespace.
    #[inline]
    pub fn get_plain_attr(&self, local_name: &LocalName) -> Option<&str> {
        self.get_attr(&ns!(), local_name)
    }
}

/// The payload of a node.
#[derive(Debug)]
pub enum NodeData {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(String),
    Comment(String),
    /// An unexpanded entity reference. `text` is its replacement text.
    EntityReference {
        name: String,
        text: String,
    },
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// A node in the arena.
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Node {
        Node {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            data,
        }
    }

    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    #[inline]
    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match self.data {
            NodeData::Element(ref element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self.data {
            NodeData::Element(ref mut element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// The character data a text-like node contributes to its parent's
    /// content. Entity references contribute their replacement text.
    pub fn character_data(&self) -> Option<&str> {
        match self.data {
            NodeData::Text(ref text) => Some(text),
            NodeData::EntityReference { ref text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Walks a chain of nodes by repeatedly applying `next_node`.
pub struct SimpleNodeIterator<'dom, I>
where
    I: Fn(&Node) -> Option<NodeId>,
{
    pub(crate) document: &'dom Document,
    pub(crate) current: Option<NodeId>,
    pub(crate) next_node: I,
}

impl<I> Iterator for SimpleNodeIterator<'_, I>
where
    I: Fn(&Node) -> Option<NodeId>,
{
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.current.take()?;
        self.current = self
            .document
            .get(current)
            .and_then(|node| (self.next_node)(node));
        Some(current)
    }
}

/// Pre-order traversal of the subtree rooted at a node, the root included.
pub struct TreeIterator<'dom> {
    document: &'dom Document,
    current: Option<NodeId>,
    depth: usize,
}

impl<'dom> TreeIterator<'dom> {
    pub(crate) fn new(document: &'dom Document, root: NodeId) -> TreeIterator<'dom> {
        TreeIterator {
            document,
            current: Some(root),
            depth: 0,
        }
    }

    /// Skips the descendants of the node last returned by `next`.
    pub fn skip_children(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        // `current` is the first child of the last returned node when that
        // node had children; climb back to it and move on to its sibling.
        let Some(last) = self.document.get(current).and_then(Node::parent) else {
            return;
        };
        if self.depth == 0 {
            return;
        }
        if self.document.get(last).and_then(Node::first_child) != Some(current) {
            return;
        }
        self.depth -= 1;
        self.current = self.next_skipping_children(last);
    }

    fn next_skipping_children(&mut self, current: NodeId) -> Option<NodeId> {
        let mut node = current;
        loop {
            if self.depth == 0 {
                return None;
            }
            let data = self.document.get(node)?;
            if let Some(next_sibling) = data.next_sibling {
                return Some(next_sibling);
            }
            self.depth -= 1;
            node = data.parent?;
        }
    }
}

impl Iterator for TreeIterator<'_> {
    type Item = NodeId;

    // https://dom.spec.whatwg.org/#concept-tree-order
    fn next(&mut self) -> Option<NodeId> {
        let current = self.current.take()?;
        if let Some(first_child) = self.document.get(current).and_then(Node::first_child) {
            self.current = Some(first_child);
            self.depth += 1;
            return Some(current);
        }
        self.current = self.next_skipping_children(current);
        Some(current)
    }
}
