/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selector matching and style cache coordination for a mutable tree of
//! attributed nodes.
//!
//! A [`Document`] owns the tree. [`ElementRef`] implements
//! `selectors::Element` on top of it, so any `selectors` selector list can be
//! matched against its elements. Mutations made through the document keep
//! the style serial, the style sheet list and the computed style cache
//! coherent.

#![deny(unsafe_code)]

pub mod attr;
pub mod cascade;
pub mod directionality;
pub mod document;
mod element_kind;
pub mod element_state;
pub mod error;
pub mod form_controls;
pub mod matching;
pub mod media_queries;
pub mod node;
pub mod opts;
pub mod selector_parser;
pub mod structural;
pub mod style_cache;
pub mod stylesheet_loader;
pub mod stylesheet_set;
pub mod stylesheets;

pub use crate::cascade::{ApplicableDeclarations, Cascade, CascadeInputs, InitialValues, PropertyRegistration};
pub use crate::document::Document;
pub use crate::element_kind::ElementKind;
pub use crate::element_state::ElementState;
pub use crate::error::{Error, Fallible};
pub use crate::matching::ElementRef;
pub use crate::node::{Attribute, ElementData, Node, NodeData, NodeId};
pub use crate::opts::{ComplianceMode, DocumentOptions, ParserFlags};
pub use crate::selector_parser::{PseudoElement, SelectorImpl, parse_selector_list};
pub use crate::style_cache::{CacheState, ComputedStyle, ComputedValues, StyleSerial};
pub use crate::stylesheet_loader::{DataUrlLoader, StylesheetLoadError, StylesheetLoader};
pub use crate::stylesheet_set::{DocumentStyleSheet, SheetOrigin, StyleSheetList};
