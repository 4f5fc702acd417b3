/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The document's style sheet list and style sheet sets.
//!
//! Style-definer elements register here as they are connected or change.
//! The list itself is a projection rebuilt lazily after any change: all
//! linked sheets in tree order, then all embedded sheets in tree order.
//!
//! <https://html.spec.whatwg.org/multipage/#interactions-of-styling-and-scripting>

use std::cell::RefCell;

use html5ever::local_name;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use servo_arc::Arc;
use url::Url;

use crate::document::Document;
use crate::element_kind;
use crate::matching::ElementRef;
use crate::media_queries::MediaList;
use crate::node::NodeId;
use crate::stylesheets::Stylesheet;

/// How a style-definer element provides its sheet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SheetOrigin {
    /// `<link rel=stylesheet href>`
    Linked,
    /// `<style>`
    Embedded,
}

/// An entry of the style sheet list.
#[derive(Clone, Debug)]
pub struct DocumentStyleSheet {
    pub owner: NodeId,
    pub origin: SheetOrigin,
    /// The non-empty `title`. Untitled sheets are persistent.
    pub title: Option<String>,
    /// Linked with `rel="alternate stylesheet"`.
    pub alternate: bool,
    pub media: MediaList,
    pub href: Option<Url>,
    pub contents: Arc<Stylesheet>,
    pub disabled: bool,
}

impl DocumentStyleSheet {
    /// Persistent sheets are never toggled by set selection.
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.title.is_none()
    }

    /// Whether the sheet takes part in the cascade for `medium`.
    pub fn applies(&self, medium: &str) -> bool {
        !self.disabled && self.media.evaluate(medium)
    }
}

/// The ordered list of a document's style sheets, with its style sheet set
/// view.
#[derive(Debug, Default)]
pub struct StyleSheetList {
    sheets: Vec<DocumentStyleSheet>,
    sets: Vec<String>,
    selected_set: Option<String>,
}

impl StyleSheetList {
    #[inline]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&DocumentStyleSheet> {
        self.sheets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentStyleSheet> {
        self.sheets.iter()
    }

    /// The distinct titles of the titled sheets, in list order.
    ///
    /// <https://html.spec.whatwg.org/multipage/#dom-document-stylesheetsets>
    pub fn style_sheet_sets(&self) -> &[String] {
        &self.sets
    }

    /// The set that was enabled when the list was built. The empty string
    /// means every titled sheet is disabled.
    pub fn selected_style_sheet_set(&self) -> Option<&str> {
        self.selected_set.as_deref()
    }

    pub fn has_set(&self, name: &str) -> bool {
        self.sets.iter().any(|set| set == name)
    }
}

impl<'a> IntoIterator for &'a StyleSheetList {
    type Item = &'a DocumentStyleSheet;
    type IntoIter = std::slice::Iter<'a, DocumentStyleSheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}

/// Style-definer membership, set selection state and the cached list.
#[derive(Default)]
pub(crate) struct StyleSheetSets {
    linked: Vec<NodeId>,
    embedded: Vec<NodeId>,
    /// <https://html.spec.whatwg.org/multipage/#last-style-sheet-set-name>
    last_selected: Option<String>,
    /// Sets enabled on top of the selected one.
    additional_sets: Vec<String>,
    /// The `Default-Style` header, which precedes any `<meta>` in the tree.
    default_style_header: Option<String>,
    /// `None` while the list needs a rebuild.
    list: RefCell<Option<Arc<StyleSheetList>>>,
    /// Parsed sheet per definer. `None` records a failed load.
    contents: RefCell<FxHashMap<NodeId, Option<LoadedSheet>>>,
}

/// A parsed sheet and the URL it was fetched from.
type LoadedSheet = (Arc<Stylesheet>, Option<Url>);

impl StyleSheetSets {
    pub(crate) fn definers(&self, origin: SheetOrigin) -> &[NodeId] {
        match origin {
            SheetOrigin::Linked => &self.linked,
            SheetOrigin::Embedded => &self.embedded,
        }
    }

    /// Registers `node` at `index` of its origin's list, dropping any other
    /// registration first. `index` must keep the list in tree order.
    pub(crate) fn insert(&mut self, origin: SheetOrigin, index: usize, node: NodeId) {
        let definers = match origin {
            SheetOrigin::Linked => &mut self.linked,
            SheetOrigin::Embedded => &mut self.embedded,
        };
        definers.insert(index, node);
    }

    pub(crate) fn remove(&mut self, node: NodeId) {
        self.linked.retain(|definer| *definer != node);
        self.embedded.retain(|definer| *definer != node);
    }

    pub(crate) fn is_registered(&self, node: NodeId, origin: SheetOrigin) -> bool {
        self.definers(origin).contains(&node)
    }

    /// Marks the list for a rebuild on next read.
    pub(crate) fn invalidate(&mut self) {
        *self.list.get_mut() = None;
    }

    pub(crate) fn forget_contents(&mut self, node: NodeId) {
        self.contents.get_mut().remove(&node);
    }

    pub(crate) fn forget_all_contents(&mut self) {
        self.contents.get_mut().clear();
    }

    pub(crate) fn cached_list(&self) -> Option<Arc<StyleSheetList>> {
        self.list.borrow().clone()
    }

    pub(crate) fn store_list(&self, list: Arc<StyleSheetList>) {
        *self.list.borrow_mut() = Some(list);
    }

    pub(crate) fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    pub(crate) fn select(&mut self, name: &str) {
        self.last_selected = Some(name.to_owned());
        self.additional_sets.clear();
    }

    pub(crate) fn enable_additional(&mut self, name: &str) {
        if !self.additional_sets.iter().any(|set| set == name) {
            self.additional_sets.push(name.to_owned());
        }
    }

    pub(crate) fn default_style_header(&self) -> Option<&str> {
        self.default_style_header.as_deref()
    }

    pub(crate) fn set_default_style_header(&mut self, value: Option<String>) {
        self.default_style_header = value;
    }
}

/// The preferred style sheet set: the last `<meta http-equiv=default-style>`
/// in tree order, else the `Default-Style` header.
///
/// <https://html.spec.whatwg.org/multipage/#attr-meta-http-equiv-default-style>
pub(crate) fn preferred_style_sheet_set(document: &Document) -> Option<String> {
    document
        .traverse_preorder(document.root())
        .filter_map(|id| document.element(id))
        .filter(|element| element_kind::is_default_style_meta(*element))
        .filter_map(|meta| meta.get_plain_attr(&local_name!("content")))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .last()
        .map(str::to_owned)
        .or_else(|| {
            document
                .style_sets()
                .default_style_header()
                .map(str::trim)
                .filter(|header| !header.is_empty())
                .map(str::to_owned)
        })
}

fn load_contents(
    document: &Document,
    element: ElementRef<'_>,
    origin: SheetOrigin,
) -> Option<LoadedSheet> {
    let flags = document.options().parser_flags;
    match origin {
        SheetOrigin::Embedded => {
            let text = element.child_text_content();
            Some((
                Arc::new(Stylesheet::parse(&text, document.base_url(), flags)),
                None,
            ))
        },
        SheetOrigin::Linked => {
            let href = element.get_plain_attr(&local_name!("href"))?;
            let url = match document.base_url() {
                Some(base) => base.join(href.trim()),
                None => Url::parse(href.trim()),
            };
            let url = match url {
                Ok(url) => url,
                Err(error) => {
                    warn!("Ignoring style sheet with invalid href {:?}: {}", href, error);
                    return None;
                },
            };
            match document.loader().load(&url) {
                Ok(text) => Some((
                    Arc::new(Stylesheet::parse(&text, Some(url.clone()), flags)),
                    Some(url),
                )),
                Err(error) => {
                    warn!("Failed to load style sheet {}: {}", url, error);
                    None
                },
            }
        },
    }
}

/// The parsed sheet of a definer, from the per-definer cache when possible.
fn contents(
    document: &Document,
    sets: &StyleSheetSets,
    element: ElementRef<'_>,
    origin: SheetOrigin,
) -> Option<LoadedSheet> {
    let node = element.node_id();
    if let Some(cached) = sets.contents.borrow().get(&node) {
        return cached.clone();
    }
    let loaded = load_contents(document, element, origin);
    sets.contents.borrow_mut().insert(node, loaded.clone());
    loaded
}

/// Rebuilds the style sheet list: clear, then linked sheets in order, then
/// embedded sheets in order, then resolve the selected set.
pub(crate) fn build(document: &Document) -> StyleSheetList {
    let sets = document.style_sets();
    let mut sheets = vec![];

    for origin in [SheetOrigin::Linked, SheetOrigin::Embedded] {
        for &node in sets.definers(origin) {
            let Some(element) = document.element(node) else {
                continue;
            };
            let alternate = origin == SheetOrigin::Linked &&
                element
                    .get_plain_attr(&local_name!("rel"))
                    .is_some_and(|rel| {
                        rel.split_ascii_whitespace()
                            .any(|token| token.eq_ignore_ascii_case("alternate"))
                    });
            let title = element
                .get_plain_attr(&local_name!("title"))
                .filter(|title| !title.is_empty())
                .map(str::to_owned);
            // https://html.spec.whatwg.org/multipage/#rel-alternate
            if alternate && title.is_none() {
                continue;
            }
            let Some((contents, href)) = contents(document, sets, element, origin) else {
                continue;
            };
            let media = MediaList::parse(
                element
                    .get_plain_attr(&local_name!("media"))
                    .unwrap_or_default(),
            );
            let disabled = origin == SheetOrigin::Linked &&
                element.get_plain_attr(&local_name!("disabled")).is_some();
            sheets.push(DocumentStyleSheet {
                owner: node,
                origin,
                title,
                alternate,
                media,
                href,
                contents,
                disabled,
            });
        }
    }

    let mut names: Vec<String> = vec![];
    for title in sheets.iter().filter_map(|sheet| sheet.title.as_ref()) {
        if !names.contains(title) {
            names.push(title.clone());
        }
    }

    let selected = resolve_selected_set(document, sets, &sheets, &names);
    for sheet in sheets.iter_mut() {
        let Some(ref title) = sheet.title else {
            continue;
        };
        let enabled = selected.as_deref() == Some(title.as_str()) ||
            sets.additional_sets.contains(title);
        if !enabled {
            sheet.disabled = true;
        }
    }

    debug!(
        "Rebuilt style sheet list: {} sheets, sets {:?}, selected {:?}",
        sheets.len(),
        names,
        selected
    );
    StyleSheetList {
        sheets,
        sets: names,
        selected_set: selected,
    }
}

/// In priority order: the last explicitly selected set while it still
/// names a set (the empty string always does), the preferred set, and the
/// first titled non-alternate sheet.
fn resolve_selected_set(
    document: &Document,
    sets: &StyleSheetSets,
    sheets: &[DocumentStyleSheet],
    names: &[String],
) -> Option<String> {
    if let Some(last) = sets.last_selected() {
        if last.is_empty() || names.iter().any(|name| name == last) {
            return Some(last.to_owned());
        }
    }
    if let Some(preferred) = preferred_style_sheet_set(document) {
        if names.contains(&preferred) {
            return Some(preferred);
        }
    }
    sheets
        .iter()
        .find(|sheet| !sheet.alternate && sheet.title.is_some())
        .and_then(|sheet| sheet.title.clone())
}
