//! JSON Query Operators
//!
//! Shared machinery behind the `JSON.*` verbs: path→pointer conversion for
//! `JSON.GET`, WHERE equality matching for the filtering forms, and the
//! recursive whole-word search used by `JSON.SEARCH`.
//!
//! Documents are stored in compact serialized form; `serde_json` is built
//! with `preserve_order` so object key insertion order survives a
//! parse/serialize round trip.

use serde_json::Value;

/// Converts a `$.`-style path into a JSON pointer for [`Value::pointer`]:
/// `$.a.b[0]` becomes `/a/b/0`. A bare `$` (or empty path) addresses the
/// whole document.
pub fn to_pointer(path: &str) -> String {
    if path.is_empty() || path == "$" {
        return String::new();
    }
    let p = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);
    let mut out = String::with_capacity(p.len() + 1);
    for c in p.chars() {
        match c {
            '.' | '[' => out.push('/'),
            ']' => {}
            _ => out.push(c),
        }
    }
    if out.starts_with('/') {
        out
    } else {
        format!("/{}", out)
    }
}

/// The member name a path gets in a `JSON.GET` result object: the `$.`
/// prefix is stripped; `$[0]`-style paths keep their bracket form.
pub fn display_key(path: &str) -> &str {
    if let Some(stripped) = path.strip_prefix("$.") {
        stripped
    } else if path.starts_with("$[") {
        &path[1..]
    } else {
        path
    }
}

/// Parses a command argument as JSON when possible; anything that does not
/// parse is treated as a bare string. `1` compares as a number, `"1"` and
/// `one` as strings.
pub fn parse_literal(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

/// WHERE match: the element is an object whose `field` member equals
/// `needle` exactly.
pub fn matches_where(item: &Value, field: &str, needle: &Value) -> bool {
    item.as_object()
        .and_then(|obj| obj.get(field))
        .map(|v| v == needle)
        .unwrap_or(false)
}

/// A word delimiter is any byte outside `[A-Za-z0-9]`. Multi-byte UTF-8
/// sequences therefore delimit, which keeps the check byte-exact and
/// locale-independent.
#[inline]
fn is_word_delimiter(b: u8) -> bool {
    !b.is_ascii_alphanumeric()
}

/// Case-insensitive whole-word search within one string. Positions 0 and
/// `len(text)` count as implicit delimiters.
fn text_contains_word(text: &str, term: &str) -> bool {
    let text = text.as_bytes();
    let term = term.as_bytes();
    if term.is_empty() || term.len() > text.len() {
        return false;
    }
    for i in 0..=(text.len() - term.len()) {
        if !text[i..i + term.len()].eq_ignore_ascii_case(term) {
            continue;
        }
        let left_ok = i == 0 || is_word_delimiter(text[i - 1]);
        let right_ok = i + term.len() == text.len() || is_word_delimiter(text[i + term.len()]);
        if left_ok && right_ok {
            return true;
        }
    }
    false
}

/// Recursively searches every string node of a document for a whole-word,
/// case-insensitive occurrence of `term`.
pub fn contains_word(value: &Value, term: &str) -> bool {
    match value {
        Value::String(text) => text_contains_word(text, term),
        Value::Object(map) => map.values().any(|v| contains_word(v, term)),
        Value::Array(items) => items.iter().any(|v| contains_word(v, term)),
        _ => false,
    }
}
