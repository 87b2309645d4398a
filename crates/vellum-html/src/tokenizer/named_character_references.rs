//! Named character reference lookup table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html#named-character-references)
//!
//! The full table defines 2,231 entities. Editor content overwhelmingly uses a
//! few dozen of them; unknown names are left in the text untouched, which the
//! serializer then reproduces with the `&` escaped.

/// Entity names (without `&` and `;`) and their replacement text.
const ENTITIES: &[(&str, &str)] = &[
    ("AElig", "\u{00C6}"),
    ("Aacute", "\u{00C1}"),
    ("Agrave", "\u{00C0}"),
    ("Alpha", "\u{0391}"),
    ("Aring", "\u{00C5}"),
    ("Auml", "\u{00C4}"),
    ("Beta", "\u{0392}"),
    ("Ccedil", "\u{00C7}"),
    ("Delta", "\u{0394}"),
    ("Eacute", "\u{00C9}"),
    ("Gamma", "\u{0393}"),
    ("Lambda", "\u{039B}"),
    ("Ntilde", "\u{00D1}"),
    ("Oacute", "\u{00D3}"),
    ("Omega", "\u{03A9}"),
    ("Ouml", "\u{00D6}"),
    ("Pi", "\u{03A0}"),
    ("Sigma", "\u{03A3}"),
    ("Uuml", "\u{00DC}"),
    ("aacute", "\u{00E1}"),
    ("acute", "\u{00B4}"),
    ("aelig", "\u{00E6}"),
    ("agrave", "\u{00E0}"),
    ("alpha", "\u{03B1}"),
    ("amp", "&"),
    ("apos", "'"),
    ("aring", "\u{00E5}"),
    ("auml", "\u{00E4}"),
    ("beta", "\u{03B2}"),
    ("brvbar", "\u{00A6}"),
    ("bull", "\u{2022}"),
    ("ccedil", "\u{00E7}"),
    ("cedil", "\u{00B8}"),
    ("cent", "\u{00A2}"),
    ("check", "\u{2713}"),
    ("copy", "\u{00A9}"),
    ("curren", "\u{00A4}"),
    ("dagger", "\u{2020}"),
    ("darr", "\u{2193}"),
    ("deg", "\u{00B0}"),
    ("delta", "\u{03B4}"),
    ("divide", "\u{00F7}"),
    ("eacute", "\u{00E9}"),
    ("ecirc", "\u{00EA}"),
    ("egrave", "\u{00E8}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("epsilon", "\u{03B5}"),
    ("euml", "\u{00EB}"),
    ("euro", "\u{20AC}"),
    ("frac12", "\u{00BD}"),
    ("frac14", "\u{00BC}"),
    ("frac34", "\u{00BE}"),
    ("gamma", "\u{03B3}"),
    ("ge", "\u{2265}"),
    ("gt", ">"),
    ("harr", "\u{2194}"),
    ("hearts", "\u{2665}"),
    ("hellip", "\u{2026}"),
    ("iacute", "\u{00ED}"),
    ("iexcl", "\u{00A1}"),
    ("infin", "\u{221E}"),
    ("iquest", "\u{00BF}"),
    ("iuml", "\u{00EF}"),
    ("lambda", "\u{03BB}"),
    ("laquo", "\u{00AB}"),
    ("larr", "\u{2190}"),
    ("ldquo", "\u{201C}"),
    ("le", "\u{2264}"),
    ("lsaquo", "\u{2039}"),
    ("lsquo", "\u{2018}"),
    ("lt", "<"),
    ("macr", "\u{00AF}"),
    ("mdash", "\u{2014}"),
    ("micro", "\u{00B5}"),
    ("middot", "\u{00B7}"),
    ("minus", "\u{2212}"),
    ("mu", "\u{03BC}"),
    ("nbsp", "\u{00A0}"),
    ("ndash", "\u{2013}"),
    ("ne", "\u{2260}"),
    ("not", "\u{00AC}"),
    ("ntilde", "\u{00F1}"),
    ("oacute", "\u{00F3}"),
    ("omega", "\u{03C9}"),
    ("ordf", "\u{00AA}"),
    ("ordm", "\u{00BA}"),
    ("ouml", "\u{00F6}"),
    ("para", "\u{00B6}"),
    ("pi", "\u{03C0}"),
    ("plusmn", "\u{00B1}"),
    ("pound", "\u{00A3}"),
    ("quot", "\""),
    ("raquo", "\u{00BB}"),
    ("rarr", "\u{2192}"),
    ("rdquo", "\u{201D}"),
    ("reg", "\u{00AE}"),
    ("rsaquo", "\u{203A}"),
    ("rsquo", "\u{2019}"),
    ("sect", "\u{00A7}"),
    ("shy", "\u{00AD}"),
    ("sigma", "\u{03C3}"),
    ("sup1", "\u{00B9}"),
    ("sup2", "\u{00B2}"),
    ("sup3", "\u{00B3}"),
    ("szlig", "\u{00DF}"),
    ("theta", "\u{03B8}"),
    ("thinsp", "\u{2009}"),
    ("times", "\u{00D7}"),
    ("trade", "\u{2122}"),
    ("uacute", "\u{00FA}"),
    ("uarr", "\u{2191}"),
    ("uuml", "\u{00FC}"),
    ("yen", "\u{00A5}"),
    ("zwj", "\u{200D}"),
    ("zwnj", "\u{200C}"),
];

/// Entities that also match without a trailing semicolon, for legacy content.
///
/// "some legacy entities work without it (e.g., `&amp` matches `&amp;`)"
const LEGACY_WITHOUT_SEMICOLON: &[&str] = &[
    "AElig", "Aacute", "Agrave", "Aring", "Auml", "Ccedil", "Eacute", "Ntilde", "Oacute", "Ouml",
    "Uuml", "aacute", "acute", "aelig", "agrave", "amp", "aring", "auml", "brvbar", "ccedil",
    "cedil", "cent", "copy", "curren", "deg", "divide", "eacute", "ecirc", "egrave", "euml",
    "frac12", "frac14", "frac34", "gt", "iacute", "iexcl", "iquest", "iuml", "laquo", "lt",
    "macr", "micro", "middot", "nbsp", "not", "ntilde", "oacute", "ordf", "ordm", "ouml", "para",
    "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1", "sup2", "sup3", "szlig",
    "times", "uacute", "uuml", "yen",
];

/// A named reference found at the start of some input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMatch {
    /// Bytes of input the reference name occupies, excluding the `&` and
    /// including the `;` when present.
    pub len: usize,
    /// Replacement text.
    pub replacement: &'static str,
    /// Whether the match ended with `;`.
    pub terminated: bool,
}

/// Find the longest named reference at the start of `input` (the text right
/// after an `&`).
///
/// [§ 13.2.5.73](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
/// "Consume the maximum number of characters possible, where the consumed
/// characters are one of the identifiers in the first column of the named
/// character references table."
///
/// ```ignore
/// longest_match("amp;x")   // len 4, "&", terminated
/// longest_match("ampx")    // len 3, "&", not terminated (legacy)
/// longest_match("xyz;")    // None
/// ```
#[must_use]
pub fn longest_match(input: &str) -> Option<EntityMatch> {
    let mut best: Option<EntityMatch> = None;
    for &(name, replacement) in ENTITIES {
        let Some(rest) = input.strip_prefix(name) else {
            continue;
        };
        let candidate = if rest.starts_with(';') {
            EntityMatch {
                len: name.len() + 1,
                replacement,
                terminated: true,
            }
        } else if LEGACY_WITHOUT_SEMICOLON.contains(&name) {
            EntityMatch {
                len: name.len(),
                replacement,
                terminated: false,
            }
        } else {
            continue;
        };
        if best.is_none_or(|b| candidate.len > b.len) {
            best = Some(candidate);
        }
    }
    best
}

/// Look up an entity by its exact name (without `&`, with or without `;`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    let bare = name.strip_suffix(';').unwrap_or(name);
    let (_, replacement) = ENTITIES.iter().find(|(n, _)| *n == bare)?;
    if name.ends_with(';') || LEGACY_WITHOUT_SEMICOLON.contains(&bare) {
        Some(replacement)
    } else {
        None
    }
}
