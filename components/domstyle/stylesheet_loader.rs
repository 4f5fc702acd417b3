/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Fetching the text of linked style sheets.
//!
//! Loads are synchronous. Timeouts and retries, if any, are the loader's
//! business.

use std::fmt;

use data_url::DataUrl;
use encoding_rs::{Encoding, UTF_8};
use url::Url;

/// Why a linked style sheet could not be fetched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StylesheetLoadError {
    /// The loader does not handle this URL scheme.
    UnsupportedScheme(String),
    /// The resource exists but could not be decoded as a style sheet.
    Malformed(String),
    /// The fetch itself failed.
    Network(String),
}

impl fmt::Display for StylesheetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StylesheetLoadError::UnsupportedScheme(ref scheme) => {
                write!(f, "unsupported URL scheme `{}`", scheme)
            },
            StylesheetLoadError::Malformed(ref reason) => write!(f, "malformed resource: {}", reason),
            StylesheetLoadError::Network(ref reason) => write!(f, "network error: {}", reason),
        }
    }
}

impl std::error::Error for StylesheetLoadError {}

/// Fetches the text of a linked style sheet.
pub trait StylesheetLoader {
    fn load(&self, url: &Url) -> Result<String, StylesheetLoadError>;
}

/// The default loader. It only understands `data:` URLs.
///
/// <https://fetch.spec.whatwg.org/#data-urls>
#[derive(Clone, Copy, Debug, Default)]
pub struct DataUrlLoader;

impl StylesheetLoader for DataUrlLoader {
    fn load(&self, url: &Url) -> Result<String, StylesheetLoadError> {
        if url.scheme() != "data" {
            return Err(StylesheetLoadError::UnsupportedScheme(url.scheme().to_owned()));
        }
        let data = DataUrl::process(url.as_str())
            .map_err(|error| StylesheetLoadError::Malformed(format!("{:?}", error)))?;
        let (body, _fragment) = data
            .decode_to_vec()
            .map_err(|error| StylesheetLoadError::Malformed(format!("{:?}", error)))?;

        // Style sheets without a usable charset are decoded as UTF-8.
        let encoding = data
            .mime_type()
            .parameters
            .iter()
            .find(|(name, _)| name == "charset")
            .and_then(|(_, label)| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&body);
        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_textual_data_urls() {
        let url = Url::parse("data:text/css,p%20%7B%20color:%20red%20%7D").unwrap();
        assert_eq!(DataUrlLoader.load(&url).unwrap(), "p { color: red }");
    }

    #[test]
    fn rejects_other_urls() {
        let url = Url::parse("https://example.com/a.css").unwrap();
        assert_eq!(
            DataUrlLoader.load(&url),
            Err(StylesheetLoadError::UnsupportedScheme("https".to_owned()))
        );
        let url = Url::parse("data:text/css;base64,cCB7f").unwrap();
        assert!(matches!(
            DataUrlLoader.load(&url),
            Err(StylesheetLoadError::Malformed(_))
        ));
    }

    #[test]
    fn decodes_base64_bodies_and_charsets() {
        let url = Url::parse("data:text/css;base64,cCB7fQ==").unwrap();
        assert_eq!(DataUrlLoader.load(&url).unwrap(), "p {}");

        let url = Url::parse("data:text/css;charset=windows-1252,p::before%7Bcontent:'%E9'%7D")
            .unwrap();
        assert_eq!(DataUrlLoader.load(&url).unwrap(), "p::before{content:'\u{e9}'}");
    }
}
