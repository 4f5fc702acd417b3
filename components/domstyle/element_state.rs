/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Runtime pseudo-class state supplied by the embedder.
//!
//! Selector matching never infers user interaction itself; it only asks the
//! registry whether a flag or custom state was set for a node.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use string_cache::DefaultAtom as Atom;

use crate::node::NodeId;

bitflags! {
    /// Event-based element states.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ElementState: u16 {
        /// <https://html.spec.whatwg.org/multipage/#selector-active>
        const ACTIVE = 1 << 0;
        /// <https://html.spec.whatwg.org/multipage/#selector-focus>
        const FOCUS = 1 << 1;
        /// <https://html.spec.whatwg.org/multipage/#selector-hover>
        const HOVER = 1 << 2;
        /// <https://drafts.csswg.org/selectors-4/#the-focus-visible-pseudo>
        const FOCUS_VISIBLE = 1 << 3;
        /// <https://html.spec.whatwg.org/multipage/#selector-visited>
        const VISITED = 1 << 4;
        /// <https://html.spec.whatwg.org/multipage/#selector-checked>
        const CHECKED = 1 << 5;
        /// <https://html.spec.whatwg.org/multipage/#selector-indeterminate>
        const INDETERMINATE = 1 << 6;
    }
}

/// Per-document map from nodes to their runtime states.
#[derive(Debug, Default)]
pub(crate) struct StateRegistry {
    states: FxHashMap<NodeId, ElementState>,
    custom_states: FxHashMap<NodeId, FxHashSet<Atom>>,
}

impl StateRegistry {
    pub(crate) fn state(&self, node: NodeId) -> ElementState {
        self.states.get(&node).copied().unwrap_or_default()
    }

    /// Returns whether anything changed.
    pub(crate) fn set_state(&mut self, node: NodeId, state: ElementState, value: bool) -> bool {
        let old = self.state(node);
        let mut new = old;
        new.set(state, value);
        if new == old {
            return false;
        }
        if new.is_empty() {
            self.states.remove(&node);
        } else {
            self.states.insert(node, new);
        }
        true
    }

    pub(crate) fn has_custom_state(&self, node: NodeId, name: &Atom) -> bool {
        self.custom_states
            .get(&node)
            .is_some_and(|states| states.contains(name))
    }

    pub(crate) fn add_custom_state(&mut self, node: NodeId, name: Atom) -> bool {
        self.custom_states.entry(node).or_default().insert(name)
    }

    pub(crate) fn remove_custom_state(&mut self, node: NodeId, name: &Atom) -> bool {
        let Some(states) = self.custom_states.get_mut(&node) else {
            return false;
        };
        let removed = states.remove(name);
        if states.is_empty() {
            self.custom_states.remove(&node);
        }
        removed
    }

    /// The nodes with any of `state` set.
    pub(crate) fn nodes_with(&self, state: ElementState) -> impl Iterator<Item = NodeId> + '_ {
        self.states
            .iter()
            .filter(move |(_, flags)| flags.intersects(state))
            .map(|(node, _)| *node)
    }

    pub(crate) fn forget(&mut self, node: NodeId) {
        self.states.remove(&node);
        self.custom_states.remove(&node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_state_reports_changes() {
        let mut registry = StateRegistry::default();
        let node = NodeId(3);
        assert!(registry.set_state(node, ElementState::HOVER, true));
        assert!(!registry.set_state(node, ElementState::HOVER, true));
        assert_eq!(registry.state(node), ElementState::HOVER);
        assert!(registry.set_state(node, ElementState::HOVER, false));
        assert!(registry.state(node).is_empty());
    }

    #[test]
    fn custom_states_are_per_node() {
        let mut registry = StateRegistry::default();
        assert!(registry.add_custom_state(NodeId(1), Atom::from("open")));
        assert!(registry.has_custom_state(NodeId(1), &Atom::from("open")));
        assert!(!registry.has_custom_state(NodeId(2), &Atom::from("open")));
        assert!(registry.remove_custom_state(NodeId(1), &Atom::from("open")));
        assert!(!registry.remove_custom_state(NodeId(1), &Atom::from("open")));
    }
}
