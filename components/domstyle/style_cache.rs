/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The style cache coordinator.
//!
//! A document-wide style serial is bumped by every style-affecting mutation.
//! Computed styles are tagged with the serial they were computed at and are
//! only handed out again while it is current. Stale entries are never
//! patched; they are replaced the next time they are read.

use std::cell::{Cell, RefCell};
use std::fmt;

use html5ever::local_name;
use indexmap::IndexMap;
use log::trace;
use rustc_hash::FxHashMap;
use servo_arc::Arc;

use crate::cascade::CascadeInputs;
use crate::document::Document;
use crate::matching::ElementRef;
use crate::node::NodeId;
use crate::opts::ParserFlags;
use crate::selector_parser::PseudoElement;
use crate::stylesheets::{self, Declaration};

/// A value of the document's style serial.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StyleSerial(u64);

impl StyleSerial {
    /// The serial of a document whose styles were never read or mutated.
    /// No cached style is ever valid at this serial.
    pub const NEVER_COMPUTED: StyleSerial = StyleSerial(0);

    #[inline]
    fn next(self) -> StyleSerial {
        StyleSerial(self.0 + 1)
    }
}

/// What a mutation requires of the style cache coordinator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StyleInvalidation {
    /// Selector matching may have changed: computed styles are stale.
    Restyle,
    /// The merged style sheet may have changed: computed styles are stale
    /// and the style sheet list must be rebuilt.
    StyleSheets,
}

/// Whether the merged style sheet reflects the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheState {
    Clean,
    Dirty,
}

/// Property values produced by a cascade, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComputedValues(IndexMap<String, String>);

impl ComputedValues {
    pub fn new() -> ComputedValues {
        ComputedValues::default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ComputedValues(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// The computed style of an element or one of its pseudo-elements.
pub struct ComputedStyle {
    values: ComputedValues,
    parent: Option<Arc<ComputedStyle>>,
    pseudo: Option<PseudoElement>,
    serial: StyleSerial,
}

impl fmt::Debug for ComputedStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ComputedStyle")
            .field("values", &self.values)
            .field("pseudo", &self.pseudo)
            .field("serial", &self.serial)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl ComputedStyle {
    #[inline]
    pub fn values(&self) -> &ComputedValues {
        &self.values
    }

    #[inline]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.values.get(property)
    }

    /// The style this one inherits from: the parent element's, or the
    /// originating element's for a pseudo-element.
    #[inline]
    pub fn parent_style(&self) -> Option<&Arc<ComputedStyle>> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn pseudo_element(&self) -> Option<PseudoElement> {
        self.pseudo
    }

    /// The style serial this style was computed at.
    #[inline]
    pub fn serial(&self) -> StyleSerial {
        self.serial
    }
}

type CacheKey = (NodeId, Option<PseudoElement>);

/// Per-document serial, state and computed-style cache.
pub(crate) struct StyleCache {
    enabled: bool,
    serial: Cell<StyleSerial>,
    state: Cell<CacheState>,
    styles: RefCell<FxHashMap<CacheKey, Arc<ComputedStyle>>>,
}

impl StyleCache {
    pub(crate) fn new(enabled: bool) -> StyleCache {
        StyleCache {
            enabled,
            serial: Cell::new(StyleSerial::NEVER_COMPUTED),
            state: Cell::new(CacheState::Dirty),
            styles: RefCell::new(FxHashMap::default()),
        }
    }

    #[inline]
    pub(crate) fn serial(&self) -> StyleSerial {
        self.serial.get()
    }

    #[inline]
    pub(crate) fn state(&self) -> CacheState {
        self.state.get()
    }

    /// Records a first serial if none was recorded yet, so that styles read
    /// before any mutation can be cached.
    fn current_serial(&self) -> StyleSerial {
        let serial = self.serial.get();
        if serial != StyleSerial::NEVER_COMPUTED {
            return serial;
        }
        let serial = serial.next();
        self.serial.set(serial);
        serial
    }

    pub(crate) fn invalidate(&mut self, invalidation: StyleInvalidation) {
        let serial = self.serial.get().next();
        self.serial.set(serial);
        if invalidation == StyleInvalidation::StyleSheets {
            self.state.set(CacheState::Dirty);
        }
        trace!("Style invalidation {:?}, serial now {:?}", invalidation, serial);
    }

    pub(crate) fn mark_clean(&self) {
        self.state.set(CacheState::Clean);
    }

    fn lookup(&self, key: &CacheKey, serial: StyleSerial) -> Option<Arc<ComputedStyle>> {
        self.styles
            .borrow()
            .get(key)
            .filter(|style| style.serial == serial)
            .cloned()
    }

    fn store(&self, key: CacheKey, style: Arc<ComputedStyle>) {
        if self.enabled {
            self.styles.borrow_mut().insert(key, style);
        }
    }

    pub(crate) fn forget(&mut self, node: NodeId) {
        self.styles.get_mut().retain(|(cached, _), _| *cached != node);
    }
}

/// Returns the computed style of `element`, recomputing it through the
/// document's cascade if the cached one is stale.
pub(crate) fn resolve_style(document: &Document, element: ElementRef<'_>) -> Arc<ComputedStyle> {
    let cache = document.style_cache();
    let serial = cache.current_serial();
    let pseudo = element.pseudo_element();
    let key = (element.node_id(), pseudo);
    if let Some(style) = cache.lookup(&key, serial) {
        return style;
    }

    trace!("Computing style of {:?} at {:?}", element, serial);
    // The parent is revalidated through the same protocol, so a stale
    // parent reference is only refreshed when the child is read.
    let parent = match pseudo {
        Some(_) => Some(resolve_style(document, element.with_pseudo_element(None))),
        None => element
            .parent_element()
            .map(|parent| resolve_style(document, parent)),
    };

    let flags = document.options().parser_flags;
    let stylesheets = document.applicable_stylesheets();
    let style_attribute = match element.get_plain_attr(&local_name!("style")) {
        Some(text) if pseudo.is_none() && !flags.contains(ParserFlags::IGNORE_STYLE_ATTRIBUTES) => {
            stylesheets::parse_style_attribute(text, flags)
        },
        _ => vec![],
    };
    let mut presentational_hints: Vec<Declaration> = vec![];
    if pseudo.is_none() && !flags.contains(ParserFlags::IGNORE_PRESENTATIONAL_HINTS) {
        (element.kind().capabilities().presentational_hints)(element, &mut presentational_hints);
    }

    let inputs = CascadeInputs {
        element,
        parent_style: parent.as_deref(),
        stylesheets: &stylesheets,
        style_attribute: &style_attribute,
        presentational_hints: &presentational_hints,
        registered_properties: document.registered_properties(),
        medium: document.target_medium(),
    };
    let values = document.cascade().cascade(&inputs);

    let style = Arc::new(ComputedStyle {
        values,
        parent,
        pseudo,
        serial,
    });
    cache.store(key, style.clone());
    style
}
