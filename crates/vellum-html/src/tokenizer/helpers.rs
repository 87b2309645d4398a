//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! State transitions, input lookahead, token emission and the raw text end
//! tag handling shared by the RCDATA, RAWTEXT and script data states.

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input_at(self.current_pos).chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Byte offset of the current input character, or of the end of input
    /// once it has been reached.
    pub(super) fn current_character_start(&self) -> usize {
        self.current_input_character
            .map_or(self.current_pos, |c| self.current_pos - c.len_utf8())
    }

    /// The remaining input from byte `offset`. Out-of-range offsets yield the
    /// empty string.
    pub(super) fn input_at(&self, offset: usize) -> &str {
        self.input.get(offset..).unwrap_or_default()
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "If the next few characters are..." an ASCII case-insensitive match
    /// for `target`, starting at byte `offset`.
    pub(super) fn next_few_characters_are_case_insensitive(
        &self,
        offset: usize,
        target: &str,
    ) -> bool {
        self.input_at(offset)
            .as_bytes()
            .get(..target.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(target.as_bytes()))
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE."
    ///
    /// CR is included because input is not newline-normalized.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }

    /// "U+0000 NULL: This is an unexpected-null-character parse error.
    /// Append a U+FFFD REPLACEMENT CHARACTER character ..."
    pub(super) const fn replace_null(c: char) -> char {
        if c == '\0' {
            char::REPLACEMENT_CHARACTER
        } else {
            c
        }
    }
}

// =============================================================================
// Token Construction Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Append the current input character to the current attribute's value."
    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_current_attribute_value(c);
        }
    }

    /// "Append the current input character to the comment token's data."
    pub(super) fn append_to_comment(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_comment(c);
        }
    }

    /// Append a string to the comment token's data.
    pub(super) fn append_str_to_comment(&mut self, s: &str) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_str_to_comment(s);
        }
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Emit the current token"
    ///
    /// The token's source range ends at the current position, which is just
    /// past its closing `>` (or at the end of input).
    pub(super) fn emit_token(&mut self) {
        let Some(mut token) = self.current_token.take() else {
            return;
        };
        token.set_span_end(self.current_pos);

        if token.remove_duplicate_attributes() {
            self.log_parse_error("duplicate-attribute");
        }

        if let Token::StartTag {
            ref name,
            self_closing,
            ..
        } = token
        {
            self.last_start_tag_name = Some(name.clone());

            // [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
            //
            // The tree builder would switch the tokenizer; since tokens are
            // produced before tree construction, the switch happens here.
            // A self-closing tag opens no element and thus no text content.
            if !self_closing && let Some(state) = Self::text_state_for(name) {
                self.switch_to(state);
            }
        }

        self.token_stream.push(token);
    }

    /// Tokenizer state for the content of a raw text or escapable raw text
    /// element.
    fn text_state_for(tag_name: &str) -> Option<TokenizerState> {
        match tag_name {
            // "A start tag whose tag name is one of: "title", "textarea""
            // "Switch the tokenizer to the RCDATA state."
            "title" | "textarea" => Some(TokenizerState::RCDATA),
            // "A start tag whose tag name is one of: "style", "xmp",
            // "iframe", "noembed", "noframes", "noscript""
            // "Switch the tokenizer to the RAWTEXT state."
            "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                Some(TokenizerState::RAWTEXT)
            }
            // "Switch the tokenizer to the script data state."
            "script" => Some(TokenizerState::ScriptData),
            // "A start tag whose tag name is "plaintext""
            // "Switch the tokenizer to the PLAINTEXT state."
            "plaintext" => Some(TokenizerState::PLAINTEXT),
            _ => None,
        }
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.token_stream.push(Token::Character { data: c });
    }

    /// "Emit an end-of-file token."
    ///
    /// At most one end-of-file token is ever emitted.
    pub(super) fn emit_eof_token(&mut self) {
        if self.token_stream.last().is_some_and(Token::is_eof) {
            return;
        }
        self.token_stream.push(Token::EndOfFile {
            offset: self.input.len(),
        });
    }
}

// =============================================================================
// RCDATA/RAWTEXT Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name, .. })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "Anything else":
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer... Reconsume in the RCDATA state."
    pub(super) fn emit_text_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        self.emit_character_token('<');
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.emit_character_token('/');
        // STEP 3: "Emit a character token for each of the characters in the temporary buffer"
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token(c);
        }
        // STEP 4: Discard the current end tag token
        self.current_token = None;
        // STEP 5: "Reconsume in the ... state"
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are not fatal; the tokenizer recovers and continues.
    pub(super) fn log_parse_error(&mut self, code: &str) {
        self.parse_errors += 1;
        log::trace!(
            target: "vellum::html",
            "tokenizer parse error {code} at byte {}",
            self.current_character_start()
        );
    }
}
