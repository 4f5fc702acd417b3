/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Media lists, evaluated against the document's target medium.
//!
//! Only media types are evaluated; feature expressions such as
//! `(min-width: 30em)` are assumed to hold.
//!
//! <https://drafts.csswg.org/mediaqueries/#media-query-list>

use std::fmt;

use cssparser::{Delimiter, ParseError, Parser, ParserInput};

/// One comma-separated entry of a media list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MediaQuery {
    /// `not` qualifier.
    pub negated: bool,
    /// The lower-cased media type, `None` standing for `all`.
    pub media_type: Option<String>,
    /// True if the query could not be understood. Such queries never match.
    pub invalid: bool,
}

impl MediaQuery {
    fn never_matching() -> MediaQuery {
        MediaQuery {
            negated: false,
            media_type: None,
            invalid: true,
        }
    }

    /// <https://drafts.csswg.org/mediaqueries/#mq-syntax>
    fn parse<'i>(input: &mut Parser<'i, '_>) -> Result<MediaQuery, ParseError<'i, ()>> {
        let negated = input.try_parse(|input| input.expect_ident_matching("not")).is_ok();
        let only = !negated && input.try_parse(|input| input.expect_ident_matching("only")).is_ok();

        let media_type = match input.try_parse(|input| input.expect_ident_cloned()) {
            Ok(ident) => {
                let reserved = ["not", "only", "and", "or", "layer"];
                if reserved.iter().any(|word| ident.eq_ignore_ascii_case(word)) {
                    return Err(input.new_custom_error(()));
                }
                while input.try_parse(|input| input.expect_ident_matching("and")).is_ok() {
                    parse_feature(input)?;
                }
                if ident.eq_ignore_ascii_case("all") {
                    None
                } else {
                    Some(ident.to_ascii_lowercase())
                }
            },
            // A bare media condition such as `(color)` or `not (color)`.
            Err(_) if !only => {
                parse_condition(input)?;
                None
            },
            Err(error) => return Err(error.into()),
        };

        Ok(MediaQuery {
            negated,
            media_type,
            invalid: false,
        })
    }

    /// Whether the query holds for the given medium.
    pub fn matches(&self, medium: &str) -> bool {
        if self.invalid {
            return false;
        }
        let type_matches = self
            .media_type
            .as_ref()
            .is_none_or(|media_type| media_type.eq_ignore_ascii_case(medium));
        type_matches != self.negated
    }
}

/// `(feature)` or `(feature: value)`. Feature expressions are not
/// evaluated, so only their block structure is checked.
fn parse_feature<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    input.expect_parenthesis_block()?;
    input.parse_nested_block(|input| {
        while input.next().is_ok() {}
        Ok(())
    })
}

fn parse_condition<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    parse_feature(input)?;
    loop {
        let combined = input.try_parse(|input| input.expect_ident_matching("and")).is_ok() ||
            input.try_parse(|input| input.expect_ident_matching("or")).is_ok();
        if !combined {
            return Ok(());
        }
        parse_feature(input)?;
    }
}

/// A parsed media list. An empty list matches every medium.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MediaList {
    pub queries: Vec<MediaQuery>,
}

impl MediaList {
    /// Parses the value of a `media` attribute.
    pub fn parse(text: &str) -> MediaList {
        let mut input = ParserInput::new(text);
        MediaList::parse_css(&mut Parser::new(&mut input))
    }

    /// Parses a comma-separated media query list until the input runs out.
    /// Queries that fail to parse are kept and never match.
    pub fn parse_css(input: &mut Parser<'_, '_>) -> MediaList {
        let mut queries = vec![];
        if input.is_exhausted() {
            return MediaList { queries };
        }
        loop {
            let query = input
                .parse_until_before(Delimiter::Comma, |input| MediaQuery::parse(input))
                .unwrap_or_else(|_| MediaQuery::never_matching());
            queries.push(query);
            if input.next().is_err() {
                break;
            }
        }
        MediaList { queries }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Whether any query of the list holds for `medium`.
    pub fn evaluate(&self, medium: &str) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|query| query.matches(medium))
    }
}

impl fmt::Display for MediaList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for query in &self.queries {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            if query.negated {
                f.write_str("not ")?;
            }
            f.write_str(query.media_type.as_deref().unwrap_or("all"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_matches_everything() {
        assert!(MediaList::parse("").evaluate("print"));
        assert!(MediaList::parse("  ").evaluate("screen"));
    }

    #[test]
    fn media_types() {
        let list = MediaList::parse("print, Screen and (min-width: 30em)");
        assert!(list.evaluate("screen"));
        assert!(list.evaluate("print"));
        assert!(!list.evaluate("speech"));

        assert!(MediaList::parse("all").evaluate("tv"));
        assert!(MediaList::parse("(color)").evaluate("screen"));
    }

    #[test]
    fn negation_and_garbage() {
        let list = MediaList::parse("not print");
        assert!(list.evaluate("screen"));
        assert!(!list.evaluate("print"));

        assert!(!MediaList::parse("scr$en").evaluate("screen"));
        assert!(!MediaList::parse("not").evaluate("screen"));
        assert!(!MediaList::parse("only").evaluate("screen"));
        assert!(!MediaList::parse("and").evaluate("screen"));
        assert!(!MediaList::parse("not (color)").evaluate("screen"));
    }

    #[test]
    fn commas_inside_blocks_do_not_split_queries() {
        let list = MediaList::parse("screen and (grid: a, b), print");
        assert_eq!(list.queries.len(), 2);
        assert!(list.evaluate("screen"));
        assert!(list.evaluate("print"));
        assert!(!list.evaluate("tv"));

        let list = MediaList::parse("only screen and (min-width: 1px) or (color), tv");
        assert_eq!(list.queries.len(), 2);
        assert!(list.queries[0].invalid);
        assert!(list.evaluate("tv"));
        assert!(!list.evaluate("screen"));
    }
}
