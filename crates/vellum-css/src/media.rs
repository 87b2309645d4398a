//! Media query parsing and evaluation
//!
//! [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/)
//!
//! Queries are parsed from tokens into a small tree and evaluated against
//! an explicit [`MediaEnvironment`]. Anything outside the supported feature
//! set is a [`MediaQueryError`]; callers decide how permissive to be.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::tokenizer::{CSSToken, CSSTokenizer, SpannedToken};

/// Reasons a media query cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaQueryError {
    /// A token that cannot appear where it was found.
    #[error("unexpected `{token}` at byte {offset}")]
    UnexpectedToken {
        /// The offending token, as written.
        token: String,
        /// Byte offset of the token in the query text.
        offset: usize,
    },
    /// The query ended in the middle of a construct.
    #[error("unexpected end of media query")]
    UnexpectedEnd,
    /// A media feature this evaluator does not know.
    #[error("unknown media feature `{0}`")]
    UnknownFeature(String),
    /// A known feature compared against a value of the wrong kind.
    #[error("invalid value `{value}` for media feature `{feature}`")]
    InvalidValue {
        /// The feature name.
        feature: String,
        /// The value, as written.
        value: String,
    },
    /// `and` and `or` mixed at one level without parentheses.
    #[error("`and` and `or` cannot be mixed without parentheses")]
    MixedOperators,
}

/// [§ 2.3 Media types](https://www.w3.org/TR/mediaqueries-4/#media-types)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    /// Screens of any kind.
    #[default]
    Screen,
    /// Paged output.
    Print,
}

/// [§ 11.5 prefers-color-scheme](https://drafts.csswg.org/mediaqueries-5/#prefers-color-scheme)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    /// A light theme.
    #[default]
    Light,
    /// A dark theme.
    Dark,
}

/// [§ 11.1 prefers-reduced-motion](https://drafts.csswg.org/mediaqueries-5/#prefers-reduced-motion)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ReducedMotion {
    /// No preference expressed.
    #[default]
    NoPreference,
    /// The user asked for less motion.
    Reduce,
}

/// [§ 7.2 hover](https://www.w3.org/TR/mediaqueries-4/#hover)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Hover {
    /// The primary input cannot hover.
    None,
    /// The primary input can hover.
    #[default]
    Hover,
}

/// [§ 7.1 pointer](https://www.w3.org/TR/mediaqueries-4/#pointer)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Pointer {
    /// No pointing device.
    None,
    /// A pointing device of limited accuracy, such as a finger.
    Coarse,
    /// An accurate pointing device, such as a mouse.
    #[default]
    Fine,
}

/// [§ 4.2 orientation](https://www.w3.org/TR/mediaqueries-4/#orientation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Orientation {
    /// "The orientation media feature is portrait when the value of the
    /// height media feature is greater than or equal to the value of the
    /// width media feature."
    Portrait,
    /// Otherwise.
    Landscape,
}

/// The device a media query is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaEnvironment {
    /// The media type.
    pub media_type: MediaType,
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Viewport height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub resolution: f64,
    /// The initial font size, in pixels, that `em` and `rem` resolve against.
    pub font_size: f64,
    /// The preferred colour scheme.
    pub color_scheme: ColorScheme,
    /// The motion preference.
    pub reduced_motion: ReducedMotion,
    /// Hover capability of the primary input.
    pub hover: Hover,
    /// Accuracy of the primary pointing device.
    pub pointer: Pointer,
}

impl Default for MediaEnvironment {
    fn default() -> Self {
        Self {
            media_type: MediaType::Screen,
            width: 1280.0,
            height: 800.0,
            resolution: 1.0,
            font_size: 16.0,
            color_scheme: ColorScheme::Light,
            reduced_motion: ReducedMotion::NoPreference,
            hover: Hover::Hover,
            pointer: Pointer::Fine,
        }
    }
}

impl MediaEnvironment {
    /// The default environment resized to `width` x `height`.
    #[must_use]
    pub fn with_viewport(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the colour scheme.
    #[must_use]
    pub const fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }

    /// Set the media type.
    #[must_use]
    pub const fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    const fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// [§ 3 Syntax](https://www.w3.org/TR/mediaqueries-4/#mq-syntax)
///
/// "A media query list is a comma-separated list of media queries." It
/// matches if any of its queries does; an empty list matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQueryList(pub Vec<MediaQuery>);

/// One query of a list: `[not|only]? <media-type> [and <condition>]?` or a
/// bare `<condition>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    /// Set by a leading `not`.
    pub negated: bool,
    /// The media type, lowercased. `None` means `all`.
    pub media_type: Option<String>,
    /// The condition, if any.
    pub condition: Option<MediaCondition>,
}

/// [§ 3.1 Combining media features](https://www.w3.org/TR/mediaqueries-4/#media-conditions)
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCondition {
    /// A single `(feature ...)` test.
    Feature(MediaFeature),
    /// `not <condition>`
    Not(Box<MediaCondition>),
    /// Conditions joined by `and`.
    And(Vec<MediaCondition>),
    /// Conditions joined by `or`.
    Or(Vec<MediaCondition>),
}

/// The media features this evaluator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FeatureName {
    /// [§ 4.1 width](https://www.w3.org/TR/mediaqueries-4/#width)
    Width,
    /// [§ 4.2 height](https://www.w3.org/TR/mediaqueries-4/#height)
    Height,
    /// [§ 4.3 aspect-ratio](https://www.w3.org/TR/mediaqueries-4/#aspect-ratio)
    AspectRatio,
    /// [§ 4.4 orientation](https://www.w3.org/TR/mediaqueries-4/#orientation)
    Orientation,
    /// [§ 5.1 resolution](https://www.w3.org/TR/mediaqueries-4/#resolution)
    Resolution,
    /// `prefers-color-scheme`
    PrefersColorScheme,
    /// `prefers-reduced-motion`
    PrefersReducedMotion,
    /// `hover`, and `any-hover` evaluated the same way.
    #[strum(to_string = "hover", serialize = "any-hover")]
    Hover,
    /// `pointer`, and `any-pointer` evaluated the same way.
    #[strum(to_string = "pointer", serialize = "any-pointer")]
    Pointer,
}

impl FeatureName {
    /// "range" type features accept `min-`/`max-` prefixes and range syntax.
    const fn is_range(self) -> bool {
        matches!(
            self,
            Self::Width | Self::Height | Self::AspectRatio | Self::Resolution
        )
    }
}

/// How a feature value is compared: `feature <op> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`, or the plain `name: value` form.
    Equal,
    /// `<`
    Less,
    /// `<=`, or a `max-` prefix.
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`, or a `min-` prefix.
    GreaterOrEqual,
}

impl Comparison {
    /// The comparison with its operands swapped: `value < feature` becomes
    /// `feature > value`.
    const fn flipped(self) -> Self {
        match self {
            Self::Equal => Self::Equal,
            Self::Less => Self::Greater,
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::Greater => Self::Less,
            Self::GreaterOrEqual => Self::LessOrEqual,
        }
    }

    fn holds(self, actual: f64, expected: f64) -> bool {
        const EPSILON: f64 = 1e-6;
        let equal = (actual - expected).abs() < EPSILON;
        match self {
            Self::Equal => equal,
            Self::Less => actual < expected && !equal,
            Self::LessOrEqual => actual < expected || equal,
            Self::Greater => actual > expected && !equal,
            Self::GreaterOrEqual => actual > expected || equal,
        }
    }
}

/// A value on the right-hand side of a feature test.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaValue {
    /// A length, resolved against the environment at evaluation time.
    Length(f64, LengthUnit),
    /// A resolution in dots per CSS pixel.
    Resolution(f64),
    /// A ratio or plain number.
    Ratio(f64),
    /// A keyword, lowercased.
    Keyword(String),
}

/// Length units accepted in media queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// CSS pixels.
    Px,
    /// "In media queries, relative length units are based on the initial
    /// value", so `em` and `rem` both use the environment's font size.
    Em,
}

/// [§ 2.4 Media features](https://www.w3.org/TR/mediaqueries-4/#mq-features)
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFeature {
    /// The feature tested.
    pub name: FeatureName,
    /// The comparisons that must all hold. Empty in boolean context.
    pub constraints: Vec<(Comparison, MediaValue)>,
}

impl MediaQueryList {
    /// Parse a media query list, as written after `@media`.
    ///
    /// # Errors
    ///
    /// Returns a [`MediaQueryError`] for malformed queries, unknown
    /// features and values of the wrong kind.
    pub fn parse(text: &str) -> Result<Self, MediaQueryError> {
        let tokens: Vec<SpannedToken> = CSSTokenizer::tokenize(text)
            .into_iter()
            .filter(|spanned| !spanned.token.is_whitespace())
            .collect();
        let mut parser = MediaQueryParser {
            tokens: &tokens,
            position: 0,
        };
        let mut queries = Vec::new();
        if parser.peek().is_eof() {
            return Ok(Self(queries));
        }
        loop {
            queries.push(parser.parse_query()?);
            match parser.peek() {
                CSSToken::Comma => parser.advance(),
                CSSToken::EOF => return Ok(Self(queries)),
                _ => return Err(parser.unexpected()),
            }
        }
    }

    /// Whether any query in the list matches `env`.
    #[must_use]
    pub fn matches(&self, env: &MediaEnvironment) -> bool {
        self.0.is_empty() || self.0.iter().any(|query| query.matches(env))
    }
}

impl MediaQuery {
    /// [§ 2.2 Evaluating media queries](https://www.w3.org/TR/mediaqueries-4/#mq-boolean-context)
    #[must_use]
    pub fn matches(&self, env: &MediaEnvironment) -> bool {
        let type_matches = self
            .media_type
            .as_deref()
            .is_none_or(|ty| ty == "all" || ty == env.media_type.to_string());
        let result = type_matches
            && self
                .condition
                .as_ref()
                .is_none_or(|condition| condition.matches(env));
        result != self.negated
    }
}

impl MediaCondition {
    /// Evaluate the condition.
    #[must_use]
    pub fn matches(&self, env: &MediaEnvironment) -> bool {
        match self {
            Self::Feature(feature) => feature.matches(env),
            Self::Not(inner) => !inner.matches(env),
            Self::And(all) => all.iter().all(|condition| condition.matches(env)),
            Self::Or(any) => any.iter().any(|condition| condition.matches(env)),
        }
    }
}

impl MediaFeature {
    /// Evaluate the feature test.
    #[must_use]
    pub fn matches(&self, env: &MediaEnvironment) -> bool {
        if self.constraints.is_empty() {
            return self.matches_boolean(env);
        }
        self.constraints
            .iter()
            .all(|(comparison, value)| self.compare(env, *comparison, value))
    }

    /// [§ 2.4.2 Evaluating media features in a boolean context](https://www.w3.org/TR/mediaqueries-4/#mq-boolean-context)
    fn matches_boolean(&self, env: &MediaEnvironment) -> bool {
        match self.name {
            FeatureName::Width => !is_zero(env.width),
            FeatureName::Height => !is_zero(env.height),
            FeatureName::Resolution => !is_zero(env.resolution),
            FeatureName::AspectRatio | FeatureName::Orientation | FeatureName::PrefersColorScheme => {
                true
            }
            FeatureName::PrefersReducedMotion => env.reduced_motion == ReducedMotion::Reduce,
            FeatureName::Hover => env.hover != Hover::None,
            FeatureName::Pointer => env.pointer != Pointer::None,
        }
    }

    fn compare(&self, env: &MediaEnvironment, comparison: Comparison, value: &MediaValue) -> bool {
        let actual = match self.name {
            FeatureName::Width => env.width,
            FeatureName::Height => env.height,
            FeatureName::Resolution => env.resolution,
            FeatureName::AspectRatio => {
                if is_zero(env.height) {
                    return false;
                }
                env.width / env.height
            }
            FeatureName::Orientation => return keyword_is(value, env.orientation()),
            FeatureName::PrefersColorScheme => return keyword_is(value, env.color_scheme),
            FeatureName::PrefersReducedMotion => return keyword_is(value, env.reduced_motion),
            FeatureName::Hover => return keyword_is(value, env.hover),
            FeatureName::Pointer => return keyword_is(value, env.pointer),
        };
        let expected = match value {
            MediaValue::Length(length, LengthUnit::Px) => *length,
            MediaValue::Length(length, LengthUnit::Em) => length * env.font_size,
            MediaValue::Resolution(dppx) | MediaValue::Ratio(dppx) => *dppx,
            MediaValue::Keyword(_) => return false,
        };
        comparison.holds(actual, expected)
    }
}

fn is_zero(value: f64) -> bool {
    value.abs() < f64::EPSILON
}

fn keyword_is(value: &MediaValue, actual: impl ToString) -> bool {
    matches!(value, MediaValue::Keyword(keyword) if *keyword == actual.to_string())
}

/// Parse and evaluate a media query list in one step.
///
/// # Errors
///
/// See [`MediaQueryList::parse`].
pub fn evaluate_media_query(text: &str, env: &MediaEnvironment) -> Result<bool, MediaQueryError> {
    Ok(MediaQueryList::parse(text)?.matches(env))
}

/// Recursive-descent parser over whitespace-free tokens.
struct MediaQueryParser<'a> {
    tokens: &'a [SpannedToken],
    position: usize,
}

impl<'a> MediaQueryParser<'a> {
    fn peek(&self) -> &'a CSSToken {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &'a CSSToken {
        self.tokens
            .get(self.position + offset)
            .map_or(&CSSToken::EOF, |spanned| &spanned.token)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn unexpected(&self) -> MediaQueryError {
        match self.tokens.get(self.position) {
            Some(spanned) if !spanned.token.is_eof() => MediaQueryError::UnexpectedToken {
                token: spanned.token.to_string(),
                offset: spanned.start,
            },
            _ => MediaQueryError::UnexpectedEnd,
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), CSSToken::Ident(word) if word.eq_ignore_ascii_case(keyword))
    }

    /// `<media-query>`
    fn parse_query(&mut self) -> Result<MediaQuery, MediaQueryError> {
        let starts_with_type = match (self.peek(), self.peek_at(1)) {
            (CSSToken::Ident(word), CSSToken::Ident(_))
                if word.eq_ignore_ascii_case("not") || word.eq_ignore_ascii_case("only") =>
            {
                true
            }
            (CSSToken::Ident(word), _) => !word.eq_ignore_ascii_case("not"),
            _ => false,
        };
        if !starts_with_type {
            return Ok(MediaQuery {
                negated: false,
                media_type: None,
                condition: Some(self.parse_condition(true)?),
            });
        }

        let negated = self.peek_keyword("not");
        if negated || self.peek_keyword("only") {
            self.advance();
        }
        let CSSToken::Ident(media_type) = self.peek() else {
            return Err(self.unexpected());
        };
        let media_type = media_type.to_ascii_lowercase();
        if matches!(media_type.as_str(), "and" | "or" | "not" | "only" | "layer") {
            return Err(self.unexpected());
        }
        self.advance();

        let condition = if self.peek_keyword("and") {
            self.advance();
            Some(self.parse_condition(false)?)
        } else {
            None
        };
        Ok(MediaQuery {
            negated,
            media_type: Some(media_type),
            condition,
        })
    }

    /// `<media-condition>`, or `<media-condition-without-or>` when
    /// `allow_or` is false.
    fn parse_condition(&mut self, allow_or: bool) -> Result<MediaCondition, MediaQueryError> {
        if self.peek_keyword("not") {
            self.advance();
            return Ok(MediaCondition::Not(Box::new(self.parse_in_parens()?)));
        }

        let first = self.parse_in_parens()?;
        let joiner = if self.peek_keyword("and") {
            "and"
        } else if allow_or && self.peek_keyword("or") {
            "or"
        } else {
            return Ok(first);
        };

        let mut operands = vec![first];
        while self.peek_keyword(joiner) {
            self.advance();
            operands.push(self.parse_in_parens()?);
        }
        if self.peek_keyword("and") || self.peek_keyword("or") {
            return Err(MediaQueryError::MixedOperators);
        }
        Ok(if joiner == "and" {
            MediaCondition::And(operands)
        } else {
            MediaCondition::Or(operands)
        })
    }

    /// `<media-in-parens>`: a parenthesized condition or feature.
    fn parse_in_parens(&mut self) -> Result<MediaCondition, MediaQueryError> {
        if !matches!(self.peek(), CSSToken::LeftParen) {
            return Err(self.unexpected());
        }
        self.advance();

        let nested = matches!(self.peek(), CSSToken::LeftParen) || self.peek_keyword("not");
        if nested {
            let condition = self.parse_condition(true)?;
            if !matches!(self.peek(), CSSToken::RightParen) {
                return Err(self.unexpected());
            }
            self.advance();
            return Ok(condition);
        }

        let start = self.position;
        while !matches!(self.peek(), CSSToken::RightParen) {
            if self.peek().is_eof() || self.peek().opens_block() {
                return Err(self.unexpected());
            }
            self.advance();
        }
        let feature_tokens = &self.tokens[start..self.position];
        self.advance();
        Ok(MediaCondition::Feature(parse_feature(feature_tokens)?))
    }
}

/// `<media-feature>`: `(name)`, `(name: value)` or a range form.
fn parse_feature(tokens: &[SpannedToken]) -> Result<MediaFeature, MediaQueryError> {
    let kinds: Vec<&CSSToken> = tokens.iter().map(|spanned| &spanned.token).collect();
    match kinds.as_slice() {
        [] => Err(MediaQueryError::UnexpectedEnd),
        [CSSToken::Ident(name)] => {
            let name = feature_name(name)?;
            Ok(MediaFeature {
                name,
                constraints: Vec::new(),
            })
        }
        [CSSToken::Ident(name), CSSToken::Colon, value @ ..] => parse_plain_feature(name, value),
        _ => parse_range_feature(tokens),
    }
}

fn feature_name(name: &str) -> Result<FeatureName, MediaQueryError> {
    FeatureName::from_str(name).map_err(|_| MediaQueryError::UnknownFeature(name.to_string()))
}

/// `name: value`, with `min-`/`max-` prefixes for range features.
fn parse_plain_feature(name: &str, value: &[&CSSToken]) -> Result<MediaFeature, MediaQueryError> {
    let lowered = name.to_ascii_lowercase();
    let (comparison, base) = if let Some(base) = lowered.strip_prefix("min-") {
        (Comparison::GreaterOrEqual, base)
    } else if let Some(base) = lowered.strip_prefix("max-") {
        (Comparison::LessOrEqual, base)
    } else {
        (Comparison::Equal, lowered.as_str())
    };
    let feature = feature_name(base)?;
    if comparison != Comparison::Equal && !feature.is_range() {
        return Err(MediaQueryError::UnknownFeature(name.to_string()));
    }

    let (parsed, rest) = parse_value(feature, value)?;
    if !rest.is_empty() {
        return Err(invalid_value(feature, value));
    }
    Ok(MediaFeature {
        name: feature,
        constraints: vec![(comparison, parsed)],
    })
}

/// [§ 2.4.3 Range context](https://www.w3.org/TR/mediaqueries-4/#mq-range-context):
/// `name op value`, `value op name` or `value op name op value`.
fn parse_range_feature(tokens: &[SpannedToken]) -> Result<MediaFeature, MediaQueryError> {
    let kinds: Vec<&CSSToken> = tokens.iter().map(|spanned| &spanned.token).collect();
    let Some(name_index) = kinds.iter().position(|token| {
        matches!(token, CSSToken::Ident(word) if FeatureName::from_str(word).is_ok())
    }) else {
        return Err(match kinds.first() {
            Some(CSSToken::Ident(word)) => MediaQueryError::UnknownFeature(word.clone()),
            _ => unexpected_at(tokens, 0),
        });
    };
    let CSSToken::Ident(name) = kinds[name_index] else {
        return Err(unexpected_at(tokens, name_index));
    };
    let feature = feature_name(name)?;
    if !feature.is_range() {
        return Err(unexpected_at(tokens, name_index));
    }

    let mut constraints = Vec::new();

    let before = &kinds[..name_index];
    if !before.is_empty() {
        let (value, rest) = parse_value(feature, before)?;
        let (comparison, rest) = parse_comparison(rest).ok_or_else(|| invalid_value(feature, before))?;
        if !rest.is_empty() {
            return Err(invalid_value(feature, before));
        }
        constraints.push((comparison.flipped(), value));
    }

    let after = &kinds[name_index + 1..];
    if !after.is_empty() {
        let (comparison, rest) = parse_comparison(after).ok_or_else(|| unexpected_at(tokens, name_index + 1))?;
        let (value, rest) = parse_value(feature, rest)?;
        if !rest.is_empty() {
            return Err(invalid_value(feature, after));
        }
        constraints.push((comparison, value));
    }

    if constraints.is_empty() {
        return Err(unexpected_at(tokens, name_index));
    }
    Ok(MediaFeature {
        name: feature,
        constraints,
    })
}

/// `<`, `<=`, `>`, `>=` or `=`, returning the remaining tokens.
fn parse_comparison<'t>(tokens: &'t [&'t CSSToken]) -> Option<(Comparison, &'t [&'t CSSToken])> {
    match tokens {
        [CSSToken::Delim('<'), CSSToken::Delim('='), rest @ ..] => {
            Some((Comparison::LessOrEqual, rest))
        }
        [CSSToken::Delim('>'), CSSToken::Delim('='), rest @ ..] => {
            Some((Comparison::GreaterOrEqual, rest))
        }
        [CSSToken::Delim('<'), rest @ ..] => Some((Comparison::Less, rest)),
        [CSSToken::Delim('>'), rest @ ..] => Some((Comparison::Greater, rest)),
        [CSSToken::Delim('='), rest @ ..] => Some((Comparison::Equal, rest)),
        _ => None,
    }
}

/// Parse the value at the start of `tokens` as the kind `feature` takes,
/// returning the remaining tokens.
fn parse_value<'t>(
    feature: FeatureName,
    tokens: &'t [&'t CSSToken],
) -> Result<(MediaValue, &'t [&'t CSSToken]), MediaQueryError> {
    let invalid = || invalid_value(feature, tokens);
    let value = match (feature, tokens) {
        (FeatureName::Width | FeatureName::Height, [CSSToken::Dimension { value, unit, .. }, rest @ ..]) => {
            let length = match unit.to_ascii_lowercase().as_str() {
                "px" => MediaValue::Length(*value, LengthUnit::Px),
                "em" | "rem" => MediaValue::Length(*value, LengthUnit::Em),
                _ => return Err(invalid()),
            };
            (length, rest)
        }
        (FeatureName::Width | FeatureName::Height, [CSSToken::Number { value, .. }, rest @ ..])
            if is_zero(*value) =>
        {
            (MediaValue::Length(0.0, LengthUnit::Px), rest)
        }
        (FeatureName::Resolution, [CSSToken::Dimension { value, unit, .. }, rest @ ..]) => {
            let dppx = match unit.to_ascii_lowercase().as_str() {
                "dppx" | "x" => *value,
                "dpi" => value / 96.0,
                "dpcm" => value * 2.54 / 96.0,
                _ => return Err(invalid()),
            };
            (MediaValue::Resolution(dppx), rest)
        }
        (
            FeatureName::AspectRatio,
            [CSSToken::Number { value: width, .. }, CSSToken::Delim('/'), CSSToken::Number { value: height, .. }, rest @ ..],
        ) => {
            if is_zero(*height) {
                return Err(invalid());
            }
            (MediaValue::Ratio(width / height), rest)
        }
        (FeatureName::AspectRatio, [CSSToken::Number { value, .. }, rest @ ..]) => {
            (MediaValue::Ratio(*value), rest)
        }
        (
            FeatureName::Orientation
            | FeatureName::PrefersColorScheme
            | FeatureName::PrefersReducedMotion
            | FeatureName::Hover
            | FeatureName::Pointer,
            [CSSToken::Ident(keyword), rest @ ..],
        ) => {
            let keyword = keyword.to_ascii_lowercase();
            let known = match feature {
                FeatureName::Orientation => Orientation::from_str(&keyword).is_ok(),
                FeatureName::PrefersColorScheme => ColorScheme::from_str(&keyword).is_ok(),
                FeatureName::PrefersReducedMotion => ReducedMotion::from_str(&keyword).is_ok(),
                FeatureName::Hover => Hover::from_str(&keyword).is_ok(),
                _ => Pointer::from_str(&keyword).is_ok(),
            };
            if !known {
                return Err(invalid());
            }
            (MediaValue::Keyword(keyword), rest)
        }
        _ => return Err(invalid()),
    };
    Ok(value)
}

fn invalid_value(feature: FeatureName, tokens: &[&CSSToken]) -> MediaQueryError {
    MediaQueryError::InvalidValue {
        feature: feature.to_string(),
        value: tokens.iter().map(ToString::to_string).collect(),
    }
}

fn unexpected_at(tokens: &[SpannedToken], index: usize) -> MediaQueryError {
    tokens
        .get(index)
        .map_or(MediaQueryError::UnexpectedEnd, |spanned| {
            MediaQueryError::UnexpectedToken {
                token: spanned.token.to_string(),
                offset: spanned.start,
            }
        })
}
