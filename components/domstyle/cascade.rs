/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The boundary to the cascade.
//!
//! Property resolution belongs to the embedder. The style cache coordinator
//! gathers everything that can influence an element's style into
//! [`CascadeInputs`] and hands it to a [`Cascade`] whenever a cached style
//! is stale.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use servo_arc::Arc;

use crate::matching::ElementRef;
use crate::selector_parser::PseudoElement;
use crate::style_cache::{ComputedStyle, ComputedValues};
use crate::stylesheets::{Declaration, Stylesheet};

/// A custom property registered with `Document::register_property`.
///
/// <https://drafts.css-houdini.org/css-properties-values-api/#the-propertydefinition-dictionary>
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PropertyRegistration {
    pub name: String,
    #[serde(default = "universal_syntax")]
    pub syntax: String,
    pub inherits: bool,
    #[serde(default)]
    pub initial_value: Option<String>,
}

fn universal_syntax() -> String {
    "*".to_owned()
}

/// A block of declarations whose selector matched, with what orders it.
#[derive(Clone, Copy, Debug)]
pub struct ApplicableDeclarations<'a> {
    pub declarations: &'a [Declaration],
    pub specificity: u32,
    /// Position of the rule among all rules of the applicable style sheets.
    pub source_order: usize,
}

/// Everything the cascade may look at for one element.
pub struct CascadeInputs<'a> {
    /// The element, carrying the pseudo-element being styled if any.
    pub element: ElementRef<'a>,
    pub parent_style: Option<&'a ComputedStyle>,
    /// Enabled style sheets whose media matches, linked sheets first.
    pub stylesheets: &'a [Arc<Stylesheet>],
    pub style_attribute: &'a [Declaration],
    pub presentational_hints: &'a [Declaration],
    pub registered_properties: &'a IndexMap<String, PropertyRegistration>,
    pub medium: &'a str,
}

impl<'a> CascadeInputs<'a> {
    #[inline]
    pub fn pseudo_element(&self) -> Option<PseudoElement> {
        self.element.pseudo_element()
    }

    /// The declaration blocks of the style rules matching the element,
    /// sorted by specificity then source order.
    pub fn matching_rules(&self) -> Vec<ApplicableDeclarations<'a>> {
        let mut source_order = 0;
        let mut applicable = vec![];
        for sheet in self.stylesheets {
            for rule in sheet.effective_style_rules(self.medium) {
                if let Some(specificity) = self.element.matching_specificity(&rule.selectors) {
                    applicable.push(ApplicableDeclarations {
                        declarations: &rule.declarations,
                        specificity,
                        source_order,
                    });
                }
                source_order += 1;
            }
        }
        applicable.sort_by_key(|block| (block.specificity, block.source_order));
        applicable
    }
}

/// Computes property values for an element.
pub trait Cascade {
    fn cascade(&self, inputs: &CascadeInputs<'_>) -> ComputedValues;
}

/// A cascade that resolves registered custom properties to their initial
/// values, inheriting the inherited ones, and nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct InitialValues;

impl Cascade for InitialValues {
    fn cascade(&self, inputs: &CascadeInputs<'_>) -> ComputedValues {
        let mut values = ComputedValues::new();
        for (name, registration) in inputs.registered_properties {
            let inherited = registration
                .inherits
                .then_some(inputs.parent_style)
                .flatten()
                .and_then(|parent| parent.get(name));
            if let Some(value) = inherited.or(registration.initial_value.as_deref()) {
                values.insert(name.as_str(), value);
            }
        }
        values
    }
}
