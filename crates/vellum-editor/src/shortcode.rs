//! Shortcode placeholders in source text.
//!
//! A shortcode is a CMS template placeholder written in square brackets:
//! `[gallery ids="1,2"]`, `[note /]`, or an enclosing pair such as
//! `[quote cite="x"]text[/quote]`. The editor cannot render them itself; it
//! asks a [`crate::ShortcodeExpander`] for their HTML.
//!
//! `[[name]]` is an escaped placeholder and is left alone.

use serde::{Deserialize, Serialize};
use vellum_dom::SourceRange;

/// One placeholder found in source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcode {
    /// The shortcode's name.
    pub name: String,
    /// Where the whole placeholder sits, closing tag included.
    pub range: SourceRange,
    /// The placeholder's source text.
    pub fragment: String,
}

/// Find every shortcode in `text`, in source order.
///
/// An opening tag followed later by `[/name]` encloses everything up to and
/// including that closing tag; otherwise the opening tag stands alone.
/// Shortcodes inside an enclosing shortcode belong to it and are not
/// reported separately.
#[must_use]
pub fn find_shortcodes(text: &str) -> Vec<Shortcode> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text.get(pos..).and_then(|rest| rest.find('[')) {
        let open = pos + offset;
        if bytes.get(open + 1) == Some(&b'[') {
            pos = text
                .get(open..)
                .and_then(|rest| rest.find("]]"))
                .map_or(open + 2, |close| open + close + 2);
            continue;
        }

        let Some((name, tag_end, self_closed)) = opening_tag_at(text, open) else {
            pos = open + 1;
            continue;
        };

        let closing = format!("[/{name}]");
        let end = if self_closed {
            tag_end
        } else {
            text.get(tag_end..)
                .and_then(|rest| rest.find(&closing))
                .map_or(tag_end, |close| tag_end + close + closing.len())
        };

        found.push(Shortcode {
            name: name.to_string(),
            range: SourceRange { start: open, end },
            fragment: text[open..end].to_string(),
        });
        pos = end;
    }
    found
}

/// Parse an opening tag starting at the `[` at `open`: its name, the offset
/// just past its `]`, and whether it ended with `/]`.
fn opening_tag_at(text: &str, open: usize) -> Option<(&str, usize, bool)> {
    let rest = text.get(open + 1..)?;
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }

    let after_name = &rest[name_len..];
    if !after_name.starts_with(|c: char| c == ']' || c == '/' || c.is_whitespace()) {
        return None;
    }

    let mut quote = None;
    for (index, c) in after_name.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '[' => return None,
            None if c == ']' => {
                let self_closed = after_name[..index].trim_end().ends_with('/');
                return Some((name, open + 1 + name_len + index + 1, self_closed));
            }
            None => {}
        }
    }
    None
}
