/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The selector implementation handed to the `selectors` crate: atoms,
//! pseudo-classes, pseudo-elements, and the parser that produces them.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use cssparser::{
    CowRcStr, ParseError, Parser as CssParser, ParserInput, SourceLocation, ToCss,
    match_ignore_ascii_case, serialize_identifier, serialize_string,
};
use html5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::visitor::SelectorVisitor;
use string_cache::DefaultAtom as Atom;

use crate::error::{Error, Fallible};

/// An identifier, as used for ids, classes and custom states.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AtomIdent(pub Atom);

impl<'a> From<&'a str> for AtomIdent {
    fn from(value: &'a str) -> Self {
        AtomIdent(Atom::from(value))
    }
}

impl Deref for AtomIdent {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl ToCss for AtomIdent {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for AtomIdent {
    #[inline]
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

/// A string appearing in a selector, such as an attribute value.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AtomString(pub Atom);

impl<'a> From<&'a str> for AtomString {
    fn from(value: &'a str) -> Self {
        AtomString(Atom::from(value))
    }
}

impl AsRef<str> for AtomString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for AtomString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        serialize_string(&self.0, dest)
    }
}

/// A local name as it appears in a selector.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CssLocalName(pub LocalName);

impl<'a> From<&'a str> for CssLocalName {
    fn from(value: &'a str) -> Self {
        CssLocalName(LocalName::from(value))
    }
}

impl ToCss for CssLocalName {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssLocalName {
    #[inline]
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

/// A namespace URL as it appears in a selector.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CssNamespace(pub Namespace);

impl<'a> From<&'a str> for CssNamespace {
    fn from(value: &'a str) -> Self {
        CssNamespace(Namespace::from(value))
    }
}

impl Borrow<Namespace> for CssNamespace {
    fn borrow(&self) -> &Namespace {
        &self.0
    }
}

impl ToCss for CssNamespace {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        serialize_string(&self.0, dest)
    }
}

impl PrecomputedHash for CssNamespace {
    #[inline]
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

/// The argument of `:dir()`.
///
/// <https://drafts.csswg.org/selectors-4/#the-dir-pseudo>
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Ltr,
    Rtl,
    /// Any other identifier. Valid, but never matches.
    Other(Box<str>),
}

impl Direction {
    fn parse(ident: &str) -> Direction {
        match_ignore_ascii_case! { ident,
            "ltr" => Direction::Ltr,
            "rtl" => Direction::Rtl,
            _ => Direction::Other(ident.into()),
        }
    }
}

impl ToCss for Direction {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            Direction::Ltr => dest.write_str("ltr"),
            Direction::Rtl => dest.write_str("rtl"),
            Direction::Other(ref ident) => serialize_identifier(ident, dest),
        }
    }
}

/// A pseudo-element.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PseudoElement {
    After,
    Before,
    FirstLetter,
    FirstLine,
    Marker,
    Placeholder,
    Selection,
}

impl PseudoElement {
    /// Whether the pseudo-element is generated content that inherits from
    /// its originating element.
    pub fn is_before_or_after(&self) -> bool {
        matches!(*self, PseudoElement::Before | PseudoElement::After)
    }
}

impl ::selectors::parser::PseudoElement for PseudoElement {
    type Impl = SelectorImpl;
}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            PseudoElement::After => "::after",
            PseudoElement::Before => "::before",
            PseudoElement::FirstLetter => "::first-letter",
            PseudoElement::FirstLine => "::first-line",
            PseudoElement::Marker => "::marker",
            PseudoElement::Placeholder => "::placeholder",
            PseudoElement::Selection => "::selection",
        })
    }
}

/// A non tree-structural pseudo-class.
/// See <https://drafts.csswg.org/selectors-4/#structural-pseudos>
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum NonTSPseudoClass {
    Active,
    AnyLink,
    Blank,
    Checked,
    CustomState(AtomIdent),
    Default,
    Dir(Direction),
    Disabled,
    Enabled,
    Focus,
    FocusVisible,
    FocusWithin,
    Hover,
    Indeterminate,
    Lang(Box<[AtomString]>),
    Link,
    Optional,
    PlaceholderShown,
    ReadOnly,
    ReadWrite,
    Required,
    Target,
    Visited,
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        use self::NonTSPseudoClass::*;
        match *self {
            Lang(ref ranges) => {
                dest.write_str(":lang(")?;
                let mut first = true;
                for range in ranges.iter() {
                    if !first {
                        dest.write_str(", ")?;
                    }
                    first = false;
                    serialize_identifier(range.as_ref(), dest)?;
                }
                return dest.write_str(")");
            },
            Dir(ref direction) => {
                dest.write_str(":dir(")?;
                direction.to_css(dest)?;
                return dest.write_str(")");
            },
            CustomState(ref state) => {
                dest.write_str(":state(")?;
                state.to_css(dest)?;
                return dest.write_str(")");
            },
            _ => {},
        }

        dest.write_str(match *self {
            Active => ":active",
            AnyLink => ":any-link",
            Blank => ":blank",
            Checked => ":checked",
            Default => ":default",
            Disabled => ":disabled",
            Enabled => ":enabled",
            Focus => ":focus",
            FocusVisible => ":focus-visible",
            FocusWithin => ":focus-within",
            Hover => ":hover",
            Indeterminate => ":indeterminate",
            Link => ":link",
            Optional => ":optional",
            PlaceholderShown => ":placeholder-shown",
            ReadOnly => ":read-only",
            ReadWrite => ":read-write",
            Required => ":required",
            Target => ":target",
            Visited => ":visited",
            Lang(_) | Dir(_) | CustomState(_) => unreachable!(),
        })
    }
}

impl ::selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = SelectorImpl;

    #[inline]
    fn is_active_or_hover(&self) -> bool {
        matches!(*self, NonTSPseudoClass::Active | NonTSPseudoClass::Hover)
    }

    #[inline]
    fn is_user_action_state(&self) -> bool {
        matches!(
            *self,
            NonTSPseudoClass::Active |
                NonTSPseudoClass::Hover |
                NonTSPseudoClass::Focus |
                NonTSPseudoClass::FocusVisible |
                NonTSPseudoClass::FocusWithin
        )
    }

    fn visit<V>(&self, _: &mut V) -> bool
    where
        V: SelectorVisitor<Impl = Self::Impl>,
    {
        true
    }
}

/// The abstract struct we implement the selector parser implementation on top
/// of.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectorImpl;

impl ::selectors::SelectorImpl for SelectorImpl {
    type ExtraMatchingData<'a> = ();
    type AttrValue = AtomString;
    type Identifier = AtomIdent;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;

    type PseudoElement = PseudoElement;
    type NonTSPseudoClass = NonTSPseudoClass;
}

/// Parses selectors with the pseudo-classes and pseudo-elements above.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectorParser;

impl<'i> ::selectors::parser::Parser<'i> for SelectorParser {
    type Impl = SelectorImpl;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_nth_child_of(&self) -> bool {
        true
    }

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_has(&self) -> bool {
        true
    }

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<NonTSPseudoClass, ParseError<'i, Self::Error>> {
        use self::NonTSPseudoClass::*;
        let pseudo_class = match_ignore_ascii_case! { &name,
            "active" => Active,
            "any-link" => AnyLink,
            "blank" => Blank,
            "checked" => Checked,
            "default" => Default,
            "disabled" => Disabled,
            "enabled" => Enabled,
            "focus" => Focus,
            "focus-visible" => FocusVisible,
            "focus-within" => FocusWithin,
            "hover" => Hover,
            "indeterminate" => Indeterminate,
            "link" => Link,
            "optional" => Optional,
            "placeholder-shown" => PlaceholderShown,
            "read-only" => ReadOnly,
            "read-write" => ReadWrite,
            "required" => Required,
            "target" => Target,
            "visited" => Visited,
            _ => return Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name.clone())
            )),
        };

        Ok(pseudo_class)
    }

    fn parse_non_ts_functional_pseudo_class<'t>(
        &self,
        name: CowRcStr<'i>,
        parser: &mut CssParser<'i, 't>,
        _after_part: bool,
    ) -> Result<NonTSPseudoClass, ParseError<'i, Self::Error>> {
        use self::NonTSPseudoClass::*;
        let pseudo_class = match_ignore_ascii_case! { &name,
            "lang" => {
                let ranges = parser.parse_comma_separated(|input| {
                    Ok(AtomString::from(&**input.expect_ident_or_string()?))
                })?;
                Lang(ranges.into_boxed_slice())
            },
            "dir" => Dir(Direction::parse(parser.expect_ident()?)),
            "state" => CustomState(AtomIdent::from(&**parser.expect_ident()?)),
            _ => return Err(parser.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name.clone())
            )),
        };

        Ok(pseudo_class)
    }

    fn parse_pseudo_element(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<PseudoElement, ParseError<'i, Self::Error>> {
        use self::PseudoElement::*;
        let pseudo_element = match_ignore_ascii_case! { &name,
            "after" => After,
            "before" => Before,
            "first-letter" => FirstLetter,
            "first-line" => FirstLine,
            "marker" => Marker,
            "placeholder" => Placeholder,
            "selection" => Selection,
            _ => return Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name.clone())
            )),
        };

        Ok(pseudo_element)
    }
}

/// Parses a selector list, as accepted by `querySelector()` and friends.
pub fn parse_selector_list(text: &str) -> Fallible<SelectorList<SelectorImpl>> {
    let mut input = ParserInput::new(text);
    let mut parser = CssParser::new(&mut input);
    SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No)
        .map_err(|error| Error::Syntax(format!("{:?} in `{}`", error.kind, text)))
}

#[cfg(test)]
mod tests {
    use cssparser::ToCss;

    use super::*;

    #[test]
    fn parses_functional_pseudo_classes() {
        let list = parse_selector_list(":lang(de, \"en\"):dir(RTL):state(open)").unwrap();
        assert_eq!(list.slice().len(), 1);
        let css = list.to_css_string();
        assert!(css.contains(":lang(de, en)"), "{}", css);
        assert!(css.contains(":dir(rtl)"), "{}", css);
        assert!(css.contains(":state(open)"), "{}", css);
    }

    #[test]
    fn rejects_unknown_pseudos() {
        assert!(parse_selector_list("p:frobnicate").is_err());
        assert!(parse_selector_list("p::frobnicate").is_err());
        assert!(parse_selector_list("p:has(> img), :is(a, b):nth-child(2n of .x)").is_ok());
    }
}
