use std::fmt;

use vellum_dom::SourceRange;

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Markup tokens carry `span`, the byte range of source text they were read
/// from (`<` through `>` for tags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag."
    ///
    /// Only the name is kept; a fragment parser ignores DOCTYPEs.
    Doctype {
        /// "a name"
        name: Option<String>,
        /// Source range of the whole declaration.
        span: SourceRange,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name", ASCII-lowercased.
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes", duplicates removed.
        attributes: Vec<Attribute>,
        /// Source range of the tag.
        span: SourceRange,
    },

    /// End tag token. Attributes on end tags are parse errors and dropped.
    EndTag {
        /// "a tag name", ASCII-lowercased.
        name: String,
        /// Source range of the tag.
        span: SourceRange,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
        /// Source range of the comment including its delimiters.
        span: SourceRange,
    },

    /// "Comment and character tokens have data."
    Character {
        /// "data"
        data: char,
    },

    /// End-of-file token signals the end of input.
    EndOfFile {
        /// Length of the input in bytes.
        offset: usize,
    },
}

impl Token {
    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    #[must_use]
    pub const fn new_start_tag(start: usize) -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
            span: SourceRange { start, end: start },
        }
    }

    /// Create a new end tag token per spec.
    #[must_use]
    pub const fn new_end_tag(start: usize) -> Self {
        Self::EndTag {
            name: String::new(),
            span: SourceRange { start, end: start },
        }
    }

    /// Create a new comment token with empty data.
    #[must_use]
    pub const fn new_comment(start: usize) -> Self {
        Self::Comment {
            data: String::new(),
            span: SourceRange { start, end: start },
        }
    }

    /// "When a DOCTYPE token is created, its name ... must be marked as
    /// missing"
    #[must_use]
    pub const fn new_doctype(start: usize) -> Self {
        Self::Doctype {
            name: None,
            span: SourceRange { start, end: start },
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile { .. })
    }

    /// The source range of a markup token. Character tokens have none; the
    /// end-of-file token has an empty range at the end of input.
    #[must_use]
    pub const fn span(&self) -> Option<SourceRange> {
        match self {
            Self::Doctype { span, .. }
            | Self::StartTag { span, .. }
            | Self::EndTag { span, .. }
            | Self::Comment { span, .. } => Some(*span),
            Self::Character { .. } => None,
            Self::EndOfFile { offset } => Some(SourceRange {
                start: *offset,
                end: *offset,
            }),
        }
    }

    /// Record where the token's source text ends.
    pub const fn set_span_end(&mut self, end: usize) {
        match self {
            Self::Doctype { span, .. }
            | Self::StartTag { span, .. }
            | Self::EndTag { span, .. }
            | Self::Comment { span, .. } => span.end = end,
            Self::Character { .. } | Self::EndOfFile { .. } => {}
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name, .. } = self {
            name.push(c);
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    ///
    /// "Append the current input character to the current DOCTYPE token's name."
    pub fn append_to_doctype_name(&mut self, c: char) {
        if let Self::Doctype { name, .. } = self {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    ///
    /// "Set the self-closing flag of the current tag token."
    pub const fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    ///
    /// "Append the current input character to the comment token's data."
    pub fn append_to_comment(&mut self, c: char) {
        if let Self::Comment { data, .. } = self {
            data.push(c);
        }
    }

    /// Append a string to the comment token's data.
    pub fn append_str_to_comment(&mut self, s: &str) {
        if let Self::Comment { data, .. } = self {
            data.push_str(s);
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// "Start a new attribute in the current tag token."
    ///
    /// Attributes started on an end tag are discarded.
    pub fn start_new_attribute(&mut self) {
        if let Self::StartTag { attributes, .. } = self {
            attributes.push(Attribute {
                name: String::new(),
                value: String::new(),
            });
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "Append the current input character to the current attribute's name."
    pub fn append_to_current_attribute_name(&mut self, c: char) {
        if let Self::StartTag { attributes, .. } = self
            && let Some(attr) = attributes.last_mut()
        {
            attr.name.push(c);
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    ///
    /// "Append the current input character to the current attribute's value."
    pub fn append_to_current_attribute_value(&mut self, c: char) {
        if let Self::StartTag { attributes, .. } = self
            && let Some(attr) = attributes.last_mut()
        {
            attr.value.push(c);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    ///
    /// Values keep flowing into the last attribute while the tag is being
    /// read, so duplicates are removed once, when the token is emitted.
    /// Returns whether anything was removed.
    pub fn remove_duplicate_attributes(&mut self) -> bool {
        let Self::StartTag { attributes, .. } = self else {
            return false;
        };
        let before = attributes.len();
        let mut seen: Vec<String> = Vec::with_capacity(before);
        attributes.retain(|attr| {
            if seen.contains(&attr.name) {
                false
            } else {
                seen.push(attr.name.clone());
                true
            }
        });
        attributes.len() != before
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { name, .. } => match name {
                Some(n) => write!(f, "DOCTYPE {n}"),
                None => write!(f, "DOCTYPE"),
            },
            Self::StartTag {
                name,
                self_closing,
                attributes,
                ..
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name, .. } => write!(f, "</{name}>"),
            Self::Comment { data, .. } => write!(f, "<!--{data}-->"),
            Self::Character { data } => match data {
                '\n' => write!(f, "Character(\\n)"),
                '\t' => write!(f, "Character(\\t)"),
                ' ' => write!(f, "Character(SPACE)"),
                c => write!(f, "Character({c})"),
            },
            Self::EndOfFile { .. } => write!(f, "EOF"),
        }
    }
}
