/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Style sheet contents as handed to the cascade.
//!
//! Only the structure the cascade needs is kept: style rules with their
//! compiled selectors and raw declarations, and `@media` blocks. Property
//! values are not interpreted here.

use std::fmt;

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, Delimiter, ParseError, Parser, ParserInput,
    ParserState, QualifiedRuleParser, SourceLocation, StyleSheetParser, parse_important,
};
use log::{debug, warn};
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use smallvec::SmallVec;
use url::Url;

use crate::media_queries::MediaList;
use crate::opts::ParserFlags;
use crate::selector_parser::{SelectorImpl, SelectorParser};

/// A single `name: value` declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    /// The property name, lower-cased unless it is a custom property.
    pub name: String,
    /// The unparsed value, without the `!important` marker.
    pub value: String,
    pub important: bool,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// A style rule, that is, a selector list and a block of declarations.
#[derive(Clone, Debug)]
pub struct StyleRule {
    pub selectors: SelectorList<SelectorImpl>,
    pub declarations: Vec<Declaration>,
    pub source_location: SourceLocation,
}

/// An `@media` block.
#[derive(Clone, Debug)]
pub struct MediaRule {
    pub media: MediaList,
    pub rules: Vec<CssRule>,
}

#[derive(Clone, Debug)]
pub enum CssRule {
    Style(StyleRule),
    Media(MediaRule),
}

/// The parsed contents of a style sheet.
#[derive(Clone, Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
    /// The URL relative references inside the sheet resolve against.
    pub base_url: Option<Url>,
}

impl Stylesheet {
    /// Parses `css`. Invalid rules are reported and dropped, so this never
    /// fails.
    pub fn parse(css: &str, base_url: Option<Url>, flags: ParserFlags) -> Stylesheet {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let rules = parse_rule_list(&mut parser, flags);
        debug!("Parsed style sheet with {} top-level rules", rules.len());
        Stylesheet { rules, base_url }
    }

    /// The style rules that apply for `medium`, in source order, looking
    /// through `@media` blocks whose media list holds.
    pub fn effective_style_rules<'a>(&'a self, medium: &'a str) -> EffectiveStyleRules<'a> {
        let mut stack = SmallVec::new();
        stack.push(self.rules.iter());
        EffectiveStyleRules { stack, medium }
    }
}

/// Iterator returned by [`Stylesheet::effective_style_rules`].
pub struct EffectiveStyleRules<'a> {
    stack: SmallVec<[std::slice::Iter<'a, CssRule>; 4]>,
    medium: &'a str,
}

impl<'a> Iterator for EffectiveStyleRules<'a> {
    type Item = &'a StyleRule;

    fn next(&mut self) -> Option<&'a StyleRule> {
        loop {
            let Some(rule) = self.stack.last_mut()?.next() else {
                self.stack.pop();
                continue;
            };
            match *rule {
                CssRule::Style(ref style_rule) => return Some(style_rule),
                CssRule::Media(ref media_rule) => {
                    if media_rule.media.evaluate(self.medium) {
                        self.stack.push(media_rule.rules.iter());
                    }
                },
            }
        }
    }
}

/// Parses the value of a `style` attribute.
///
/// <https://drafts.csswg.org/css-style-attr/#syntax>
pub fn parse_style_attribute(text: &str, flags: ParserFlags) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_declaration_list(&mut parser, flags)
}

fn report_error<E: fmt::Debug>(flags: ParserFlags, error: &ParseError<'_, E>, slice: &str) {
    let location = error.location;
    if flags.contains(ParserFlags::REPORT_CSS_ERRORS) {
        warn!(
            "CSS error at {}:{}: {:?} in `{}`",
            location.line, location.column, error.kind, slice
        );
    } else {
        debug!(
            "CSS error at {}:{}: {:?} in `{}`",
            location.line, location.column, error.kind, slice
        );
    }
}

struct RuleParser {
    flags: ParserFlags,
}

fn parse_rule_list(input: &mut Parser<'_, '_>, flags: ParserFlags) -> Vec<CssRule> {
    let mut rule_parser = RuleParser { flags };
    let mut rules = vec![];
    for result in StyleSheetParser::new(input, &mut rule_parser) {
        match result {
            Ok(rule) => rules.push(rule),
            Err((error, slice)) => report_error(flags, &error, slice),
        }
    }
    rules
}

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = SelectorList<SelectorImpl>;
    type QualifiedRule = CssRule;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        SelectorList::parse(&SelectorParser, input, ParseRelative::No)
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssRule, ParseError<'i, Self::Error>> {
        Ok(CssRule::Style(StyleRule {
            selectors,
            declarations: parse_declaration_list(input, self.flags),
            source_location: start.source_location(),
        }))
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = MediaList;
    type AtRule = CssRule;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<MediaList, ParseError<'i, Self::Error>> {
        if !name.eq_ignore_ascii_case("media") {
            return Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)));
        }
        Ok(MediaList::parse_css(input))
    }

    fn parse_block<'t>(
        &mut self,
        media: MediaList,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<CssRule, ParseError<'i, Self::Error>> {
        Ok(CssRule::Media(MediaRule {
            media,
            rules: parse_rule_list(input, self.flags),
        }))
    }
}

/// Parses a `;`-separated list of declarations until the input runs out.
pub(crate) fn parse_declaration_list(
    input: &mut Parser<'_, '_>,
    flags: ParserFlags,
) -> Vec<Declaration> {
    let mut declarations = vec![];
    loop {
        input.skip_whitespace();
        if input.is_exhausted() {
            break;
        }
        if input.try_parse(|input| input.expect_semicolon()).is_ok() {
            continue;
        }
        let start = input.position();
        match input.parse_until_after(Delimiter::Semicolon, |input| {
            parse_one_declaration(input)
        }) {
            Ok(declaration) => declarations.push(declaration),
            Err(error) => report_error(flags, &error, input.slice_from(start)),
        }
    }
    declarations
}

fn parse_one_declaration<'i>(input: &mut Parser<'i, '_>) -> Result<Declaration, ParseError<'i, ()>> {
    let name = input.expect_ident()?.clone();
    input.expect_colon()?;
    let value_start = input.position();
    input.parse_until_before(Delimiter::Bang, |input| {
        while input.next().is_ok() {}
        Ok::<_, ParseError<'i, ()>>(())
    })?;
    let value = input.slice_from(value_start).trim();
    if value.is_empty() {
        return Err(input.new_custom_error(()));
    }
    let value = value.to_owned();
    let important = input.try_parse(parse_important).is_ok();
    input.expect_exhausted()?;
    let name = if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    };
    Ok(Declaration {
        name,
        value,
        important,
    })
}
