/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Errors reported by the tree mutation and selector parsing entry points.
//!
//! Style reads never fail: a selector that cannot be evaluated does not match,
//! and a style that cannot be computed reflects initial values.

use std::fmt;

/// An error raised by a document operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// <https://dom.spec.whatwg.org/#hierarchyrequesterror>
    HierarchyRequest,
    /// <https://dom.spec.whatwg.org/#notfounderror>
    NotFound,
    /// <https://dom.spec.whatwg.org/#invalidcharactererror>
    InvalidCharacter,
    /// <https://dom.spec.whatwg.org/#invalidnodetypeerror>
    InvalidNodeType,
    /// <https://dom.spec.whatwg.org/#invalidmodificationerror>
    InvalidModification,
    /// <https://dom.spec.whatwg.org/#namespaceerror>
    Namespace,
    /// <https://dom.spec.whatwg.org/#syntaxerror>
    Syntax(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::HierarchyRequest => f.write_str("the operation would yield an incorrect node tree"),
            Error::NotFound => f.write_str("the node was not found"),
            Error::InvalidCharacter => f.write_str("the string contains invalid characters"),
            Error::InvalidNodeType => f.write_str("the node is of the wrong type"),
            Error::InvalidModification => f.write_str("the object cannot be modified this way"),
            Error::Namespace => f.write_str("the operation is not allowed by namespaces"),
            Error::Syntax(ref message) => write!(f, "syntax error: {}", message),
        }
    }
}

impl std::error::Error for Error {}

/// The result of an operation that may fail with an [`Error`].
pub type Fallible<T> = Result<T, Error>;
