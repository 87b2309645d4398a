//! CSS selector parsing
//!
//! This module parses selector lists per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) from the
//! tokenizer's output. Matching lives in [`matcher`].

mod matcher;

use thiserror::Error;

use crate::tokenizer::{CSSToken, CSSTokenizer, SpannedToken};

/// Reasons a selector cannot be parsed or evaluated.
///
/// Every variant is recoverable: callers fall back to stripping the
/// offending pseudo tokens and retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector (or one entry of a list) is empty.
    #[error("empty selector")]
    Empty,
    /// A token that cannot appear where it was found.
    #[error("unexpected `{token}` at byte {offset}")]
    UnexpectedToken {
        /// The offending token, as written.
        token: String,
        /// Byte offset of the token in the selector text.
        offset: usize,
    },
    /// The selector ended in the middle of a construct.
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    /// A pseudo-element, which never matches an element.
    #[error("pseudo-element `{0}` cannot be matched against an element")]
    PseudoElement(String),
    /// A pseudo-class this engine does not know.
    #[error("unknown pseudo-class `:{0}`")]
    UnknownPseudoClass(String),
    /// A known pseudo-class this engine deliberately does not evaluate.
    #[error("pseudo-class `:{0}` is not supported")]
    Unsupported(String),
    /// An `An+B` argument that does not parse.
    #[error("invalid An+B expression `{0}`")]
    InvalidNth(String),
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Stored lowercased; HTML element names match case-insensitively.
    Type(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,
    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
    /// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),
    /// A user-action or location pseudo-class (`:hover`, `:focus`,
    /// `:visited`, ...). A static tree is never in those states.
    NeverMatch(String),
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// The attribute name, lowercased.
    pub name: String,
    /// The comparison, or `None` for a bare presence test (`[attr]`).
    pub operator: Option<(AttributeOperator, String)>,
    /// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    ///
    /// Set by the `i` flag.
    pub case_insensitive: bool,
}

/// The comparison operators of attribute selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]`: one of the whitespace-separated words.
    Includes,
    /// `[attr|=value]`: exactly `value` or starting with `value-`.
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

/// [§ 14 Tree-structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
/// and the other pseudo-classes a static tree can answer.
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    /// `:root`
    Root,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:empty`
    Empty,
    /// `:nth-child(An+B [of S]?)`
    NthChild(Nth, Option<SelectorList>),
    /// `:nth-last-child(An+B [of S]?)`
    NthLastChild(Nth, Option<SelectorList>),
    /// `:nth-of-type(An+B)`
    NthOfType(Nth),
    /// `:nth-last-of-type(An+B)`
    NthLastOfType(Nth),
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    Not(SelectorList),
    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches)
    Is(SelectorList),
    /// [§ 4.4 :where()](https://www.w3.org/TR/selectors-4/#zero-matches)
    Where(SelectorList),
    /// `:link` and `:any-link`: an `a` or `area` element with `href`.
    AnyLink,
    /// `:checked`
    Checked,
    /// `:disabled`
    Disabled,
    /// `:enabled`
    Enabled,
    /// `:required`
    Required,
    /// `:optional`
    Optional,
}

/// [§ 6.1 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Matches the 1-based positions `a*n + b` for some `n >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// The step.
    pub a: i32,
    /// The offset.
    pub b: i32,
}

impl Nth {
    /// Parse `odd`, `even`, `B`, `An`, `An+B` and their signed variants.
    /// Whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidNth`] for anything else.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let invalid = || SelectorError::InvalidNth(text.trim().to_string());
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "" => return Err(invalid()),
            "odd" => return Ok(Self { a: 2, b: 1 }),
            "even" => return Ok(Self { a: 2, b: 0 }),
            _ => {}
        }

        let Some((step, offset)) = compact.split_once('n') else {
            let b = compact.parse().map_err(|_| invalid())?;
            return Ok(Self { a: 0, b });
        };
        let a = match step {
            "" | "+" => 1,
            "-" => -1,
            digits => digits.parse().map_err(|_| invalid())?,
        };
        let b = match offset {
            "" => 0,
            signed if signed.starts_with(['+', '-']) => {
                signed.parse().map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        };
        Ok(Self { a, b })
    }

    /// Whether the 1-based `index` is one of the matched positions.
    #[must_use]
    pub fn matches(self, index: usize) -> bool {
        let Ok(index) = i64::try_from(index) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// [§ 16.1 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the parent.
    Child,
    /// `+`: the immediately preceding element sibling.
    NextSibling,
    /// `~`: any preceding element sibling.
    SubsequentSibling,
}

/// [§ 3.1 Compound selector](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator."
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    /// The conditions, all of which must hold.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 3.1 Complex selector](https://www.w3.org/TR/selectors-4/#complex)
///
/// Compounds in source order; `combinators[i]` joins `compounds[i]` to
/// `compounds[i + 1]`. The last compound is the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    /// The compound selectors, left to right.
    pub compounds: Vec<CompoundSelector>,
    /// The combinators between adjacent compounds.
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// The compound the matched element itself must satisfy.
    #[must_use]
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.compounds.last()
    }

    /// [§ 17 Calculating a selector's specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .flat_map(|compound| &compound.simple_selectors)
            .map(simple_specificity)
            .fold(Specificity::default(), Specificity::add)
    }
}

/// [§ 3.1 Selector list](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// Matches an element if any of its complex selectors does.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// The highest specificity among the list's selectors.
    #[must_use]
    pub fn max_specificity(&self) -> Specificity {
        self.0
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }
}

/// [§ 17 Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// (ID selectors, class-like selectors, type selectors), compared
/// lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

fn simple_specificity(simple: &SimpleSelector) -> Specificity {
    match simple {
        SimpleSelector::Id(_) => Specificity(1, 0, 0),
        SimpleSelector::Class(_) | SimpleSelector::Attribute(_) | SimpleSelector::NeverMatch(_) => {
            Specificity(0, 1, 0)
        }
        SimpleSelector::Type(_) => Specificity(0, 0, 1),
        SimpleSelector::Universal => Specificity::default(),
        SimpleSelector::PseudoClass(pseudo) => match pseudo {
            // "The specificity of an :is(), :not(), or :has() pseudo-class is
            // replaced by the specificity of the most specific complex
            // selector in its selector list argument."
            PseudoClass::Not(list) | PseudoClass::Is(list) => list.max_specificity(),
            // "The specificity of a :where() pseudo-class is replaced by zero."
            PseudoClass::Where(_) => Specificity::default(),
            // "The specificity of an :nth-child() or :nth-last-child() selector
            // is the specificity of the pseudo class itself (counting as one
            // pseudo-class selector) plus the specificity of the most specific
            // complex selector in its selector list argument (if any)."
            PseudoClass::NthChild(_, Some(of)) | PseudoClass::NthLastChild(_, Some(of)) => {
                Specificity(0, 1, 0).add(of.max_specificity())
            }
            _ => Specificity(0, 1, 0),
        },
    }
}

/// Parse a selector list such as `ul > li.item, a[href^="https"]:not(.x)`.
///
/// # Errors
///
/// Returns a [`SelectorError`] for syntax this engine cannot represent:
/// malformed selectors, pseudo-elements, unknown pseudo-classes and `:has()`.
pub fn parse_selector(raw: &str) -> Result<SelectorList, SelectorError> {
    let tokens = CSSTokenizer::tokenize(raw);
    let mut parser = SelectorParser {
        source: raw,
        tokens: &tokens,
        position: 0,
    };
    let list = parser.parse_list()?;
    let _ = parser.skip_whitespace();
    match parser.peek() {
        CSSToken::EOF => Ok(list),
        _ => Err(parser.unexpected()),
    }
}

/// Recursive-descent parser over a token slice. Functional pseudo-classes
/// recurse with a sub-parser over their argument tokens.
struct SelectorParser<'a> {
    source: &'a str,
    tokens: &'a [SpannedToken],
    position: usize,
}

impl<'a> SelectorParser<'a> {
    fn peek(&self) -> &CSSToken {
        self.tokens
            .get(self.position)
            .map_or(&CSSToken::EOF, |spanned| &spanned.token)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_whitespace() {
            self.advance();
            skipped = true;
        }
        skipped
    }

    fn unexpected(&self) -> SelectorError {
        match self.tokens.get(self.position) {
            Some(spanned) if !spanned.token.is_eof() => SelectorError::UnexpectedToken {
                token: spanned.token.to_string(),
                offset: spanned.start,
            },
            _ => SelectorError::UnexpectedEnd,
        }
    }

    /// `<complex-selector-list>`: complex selectors separated by commas,
    /// stopping at end of input or an unmatched `)`.
    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = vec![self.parse_complex()?];
        while matches!(self.peek(), CSSToken::Comma) {
            self.advance();
            selectors.push(self.parse_complex()?);
        }
        Ok(SelectorList(selectors))
    }

    /// `<complex-selector>`
    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let _ = self.skip_whitespace();
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();

        loop {
            let compound = self.parse_compound()?;
            if compound.simple_selectors.is_empty() {
                return Err(if compounds.is_empty() && self.at_list_end() {
                    SelectorError::Empty
                } else {
                    self.unexpected()
                });
            }
            compounds.push(compound);

            let saw_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                CSSToken::Delim('>') => Combinator::Child,
                CSSToken::Delim('+') => Combinator::NextSibling,
                CSSToken::Delim('~') => Combinator::SubsequentSibling,
                _ if self.at_list_end() => break,
                _ if saw_whitespace => {
                    combinators.push(Combinator::Descendant);
                    continue;
                }
                _ => return Err(self.unexpected()),
            };
            self.advance();
            let _ = self.skip_whitespace();
            combinators.push(combinator);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn at_list_end(&self) -> bool {
        matches!(
            self.peek(),
            CSSToken::EOF | CSSToken::Comma | CSSToken::RightParen
        )
    }

    /// `<compound-selector>`: an optional type or universal selector
    /// followed by any number of subclass and pseudo-class selectors.
    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut simple_selectors = Vec::new();

        match self.peek() {
            CSSToken::Ident(name) => {
                simple_selectors.push(SimpleSelector::Type(name.to_ascii_lowercase()));
                self.advance();
            }
            CSSToken::Delim('*') => {
                simple_selectors.push(SimpleSelector::Universal);
                self.advance();
            }
            _ => {}
        }
        if matches!(self.peek(), CSSToken::Delim('|')) {
            return Err(SelectorError::Unsupported("namespace prefix".to_string()));
        }

        loop {
            match self.peek().clone() {
                CSSToken::Hash { value, is_id: true } => {
                    simple_selectors.push(SimpleSelector::Id(value));
                    self.advance();
                }
                CSSToken::Delim('.') => {
                    self.advance();
                    let CSSToken::Ident(class) = self.peek().clone() else {
                        return Err(self.unexpected());
                    };
                    simple_selectors.push(SimpleSelector::Class(class));
                    self.advance();
                }
                CSSToken::LeftBracket => {
                    self.advance();
                    simple_selectors.push(SimpleSelector::Attribute(self.parse_attribute()?));
                }
                CSSToken::Colon => {
                    self.advance();
                    simple_selectors.push(self.parse_pseudo()?);
                }
                _ => return Ok(CompoundSelector { simple_selectors }),
            }
        }
    }

    /// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
    ///
    /// Called after the `[`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let _ = self.skip_whitespace();
        let CSSToken::Ident(name) = self.peek().clone() else {
            return Err(self.unexpected());
        };
        self.advance();
        let _ = self.skip_whitespace();

        let operator = match self.peek() {
            CSSToken::RightBracket => {
                self.advance();
                return Ok(AttributeSelector {
                    name: name.to_ascii_lowercase(),
                    operator: None,
                    case_insensitive: false,
                });
            }
            CSSToken::Delim('=') => None,
            CSSToken::Delim('~') => Some(AttributeOperator::Includes),
            CSSToken::Delim('|') => Some(AttributeOperator::DashMatch),
            CSSToken::Delim('^') => Some(AttributeOperator::Prefix),
            CSSToken::Delim('$') => Some(AttributeOperator::Suffix),
            CSSToken::Delim('*') => Some(AttributeOperator::Substring),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        let operator = match operator {
            None => AttributeOperator::Equals,
            Some(operator) => {
                if !matches!(self.peek(), CSSToken::Delim('=')) {
                    return Err(self.unexpected());
                }
                self.advance();
                operator
            }
        };

        let _ = self.skip_whitespace();
        let value = match self.peek().clone() {
            CSSToken::Ident(value) | CSSToken::String(value) => value,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        let _ = self.skip_whitespace();

        let mut case_insensitive = false;
        if let CSSToken::Ident(flag) = self.peek() {
            if flag.eq_ignore_ascii_case("i") {
                case_insensitive = true;
            } else if !flag.eq_ignore_ascii_case("s") {
                return Err(self.unexpected());
            }
            self.advance();
            let _ = self.skip_whitespace();
        }

        if !matches!(self.peek(), CSSToken::RightBracket) {
            return Err(self.unexpected());
        }
        self.advance();
        Ok(AttributeSelector {
            name: name.to_ascii_lowercase(),
            operator: Some((operator, value)),
            case_insensitive,
        })
    }

    /// A pseudo-class or pseudo-element, called after the first `:`.
    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        match self.peek().clone() {
            CSSToken::Colon => {
                self.advance();
                match self.peek() {
                    CSSToken::Ident(name) | CSSToken::Function(name) => {
                        Err(SelectorError::PseudoElement(format!("::{name}")))
                    }
                    _ => Err(self.unexpected()),
                }
            }
            CSSToken::Ident(name) => {
                self.advance();
                parse_pseudo_class_ident(&name.to_ascii_lowercase())
            }
            CSSToken::Function(name) => {
                self.advance();
                let name = name.to_ascii_lowercase();
                let arguments = self.take_arguments()?;
                self.parse_pseudo_class_function(&name, arguments)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Consume tokens up to the `)` matching an already-consumed function
    /// token and return the argument tokens.
    fn take_arguments(&mut self) -> Result<&'a [SpannedToken], SelectorError> {
        let tokens = self.tokens;
        let start = self.position;
        let mut depth = 0_usize;
        loop {
            let token = self.peek();
            if token.is_eof() {
                return Err(SelectorError::UnexpectedEnd);
            }
            if token.opens_block() {
                depth += 1;
            } else if token.closes_block() {
                if depth == 0 {
                    let arguments = &tokens[start..self.position];
                    self.advance();
                    return Ok(arguments);
                }
                depth -= 1;
            }
            self.advance();
        }
    }

    fn parse_pseudo_class_function(
        &self,
        name: &str,
        arguments: &'a [SpannedToken],
    ) -> Result<SimpleSelector, SelectorError> {
        let pseudo = match name {
            "not" => PseudoClass::Not(self.parse_nested_list(arguments)?),
            "is" | "matches" | "any" => PseudoClass::Is(self.parse_nested_list(arguments)?),
            "where" => PseudoClass::Where(self.parse_nested_list(arguments)?),
            "nth-child" | "nth-last-child" => {
                let (nth, of) = self.parse_nth_of(arguments)?;
                if name == "nth-child" {
                    PseudoClass::NthChild(nth, of)
                } else {
                    PseudoClass::NthLastChild(nth, of)
                }
            }
            "nth-of-type" => PseudoClass::NthOfType(Nth::parse(self.text_of(arguments))?),
            "nth-last-of-type" => PseudoClass::NthLastOfType(Nth::parse(self.text_of(arguments))?),
            "has" => return Err(SelectorError::Unsupported("has".to_string())),
            "dir" | "lang" | "host" | "host-context" | "state" => {
                return Err(SelectorError::Unsupported(name.to_string()));
            }
            _ => return Err(SelectorError::UnknownPseudoClass(format!("{name}()"))),
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    fn parse_nested_list(&self, arguments: &'a [SpannedToken]) -> Result<SelectorList, SelectorError> {
        let mut nested = SelectorParser {
            source: self.source,
            tokens: arguments,
            position: 0,
        };
        let list = nested.parse_list()?;
        let _ = nested.skip_whitespace();
        if nested.peek().is_eof() {
            Ok(list)
        } else {
            Err(nested.unexpected())
        }
    }

    /// `An+B [of <complex-selector-list>]?`
    fn parse_nth_of(
        &self,
        arguments: &'a [SpannedToken],
    ) -> Result<(Nth, Option<SelectorList>), SelectorError> {
        let of_position = arguments.iter().position(
            |spanned| matches!(&spanned.token, CSSToken::Ident(word) if word.eq_ignore_ascii_case("of")),
        );
        match of_position {
            Some(index) => {
                let nth = Nth::parse(self.text_of(&arguments[..index]))?;
                let of = self.parse_nested_list(&arguments[index + 1..])?;
                Ok((nth, Some(of)))
            }
            None => Ok((Nth::parse(self.text_of(arguments))?, None)),
        }
    }

    /// The source text the tokens were read from.
    fn text_of(&self, tokens: &[SpannedToken]) -> &str {
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return "";
        };
        self.source.get(first.start..last.end).unwrap_or("")
    }
}

/// A pseudo-class written without arguments.
fn parse_pseudo_class_ident(name: &str) -> Result<SimpleSelector, SelectorError> {
    let pseudo = match name {
        "root" => PseudoClass::Root,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        "empty" => PseudoClass::Empty,
        "link" | "any-link" => PseudoClass::AnyLink,
        "checked" => PseudoClass::Checked,
        "disabled" => PseudoClass::Disabled,
        "enabled" => PseudoClass::Enabled,
        "required" => PseudoClass::Required,
        "optional" => PseudoClass::Optional,
        "hover" | "focus" | "active" | "visited" | "focus-within" | "focus-visible"
        | "target" => return Ok(SimpleSelector::NeverMatch(name.to_string())),
        // CSS 2 pseudo-elements still accept the single-colon syntax.
        "before" | "after" | "first-line" | "first-letter" => {
            return Err(SelectorError::PseudoElement(format!(":{name}")));
        }
        _ => return Err(SelectorError::UnknownPseudoClass(name.to_string())),
    };
    Ok(SimpleSelector::PseudoClass(pseudo))
}
