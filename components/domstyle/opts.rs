/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Configuration options for a single document. Created by the embedder and
//! handed to [`Document::new`](crate::Document::new).

use bitflags::bitflags;
use selectors::matching::QuirksMode;
use serde::{Deserialize, Serialize};
use url::Url;

/// The compliance mode of a document.
///
/// <https://dom.spec.whatwg.org/#concept-document-mode>
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceMode {
    Strict,
    Quirks,
}

impl ComplianceMode {
    /// The mode a document gets when the embedder does not force one.
    pub fn from_doctype_presence(has_doctype: bool) -> Self {
        if has_doctype {
            ComplianceMode::Strict
        } else {
            ComplianceMode::Quirks
        }
    }

    #[inline]
    pub fn is_quirks(self) -> bool {
        self == ComplianceMode::Quirks
    }

    pub(crate) fn quirks_mode(self) -> QuirksMode {
        match self {
            ComplianceMode::Strict => QuirksMode::NoQuirks,
            ComplianceMode::Quirks => QuirksMode::Quirks,
        }
    }
}

bitflags! {
    /// Flags tweaking how CSS text handed to the document is parsed.
    #[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(transparent)]
    pub struct ParserFlags: u8 {
        /// Report CSS parse errors at `warn` level instead of `debug`.
        const REPORT_CSS_ERRORS = 1 << 0;
        /// Do not honour `style` attributes.
        const IGNORE_STYLE_ATTRIBUTES = 1 << 1;
        /// Do not synthesize declarations from presentational attributes.
        const IGNORE_PRESENTATIONAL_HINTS = 1 << 2;
    }
}

impl Default for ParserFlags {
    fn default() -> Self {
        ParserFlags::empty()
    }
}

/// Per-document options.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Forces a compliance mode. When `None` the mode follows the presence
    /// of a doctype at creation time.
    pub compliance_mode: Option<ComplianceMode>,

    /// Whether the document is an HTML document. XML documents have no host
    /// namespace and match local names case-sensitively.
    pub html: bool,

    /// True to cache computed styles between reads.
    pub style_cache: bool,

    pub parser_flags: ParserFlags,

    /// The medium style sheets and media rules are matched against.
    pub target_medium: String,

    /// The initial document URL, used for `:target` and to resolve linked
    /// style sheets.
    pub url: Option<Url>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            compliance_mode: None,
            html: true,
            style_cache: true,
            parser_flags: ParserFlags::default(),
            target_medium: "screen".to_owned(),
            url: None,
        }
    }
}
