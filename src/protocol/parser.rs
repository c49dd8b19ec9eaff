//! Command Tokenizer
//!
//! Splits one command line into `[verb, arg, …]`. Parsing is verb-sensitive
//! because some values are allowed to contain arbitrary whitespace and quote
//! characters:
//!
//! - `SET` and `UPDATE` require the value to be wrapped in double quotes;
//!   `JSON.SET` and `JSON.APPEND` require single quotes. The value is the
//!   text between the first opening quote and the *last* quote character on
//!   the line, taken literally (no escape processing). Anything after the
//!   closing quote (the `EX n` suffix) splits into further tokens.
//! - Every other verb splits on runs of whitespace outside single or double
//!   quotes; a quoted run becomes part of a single argument with the quote
//!   characters stripped.
//! - For `JSON.GET` and `JSON.UPDATE`, `where`/`set` tokens after the key
//!   are canonicalized to uppercase so the handlers can match exactly.
//!
//! The tokenizer never fails. Malformed input produces a short or odd token
//! list which the handler rejects by arity or syntax.

/// Tokenizes one command line. The verb is element 0, unchanged in case.
pub fn tokenize(line: &str) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }

    let (verb, rest) = match line.find(' ') {
        Some(pos) => (&line[..pos], &line[pos + 1..]),
        None => (line, ""),
    };

    let required_quote = if verb.eq_ignore_ascii_case("SET") || verb.eq_ignore_ascii_case("UPDATE")
    {
        Some('"')
    } else if verb.eq_ignore_ascii_case("JSON.SET") || verb.eq_ignore_ascii_case("JSON.APPEND") {
        Some('\'')
    } else {
        None
    };

    let mut args = vec![verb.to_string()];
    match required_quote {
        Some(quote) => tokenize_quoted_value(rest, quote, &mut args),
        None => {
            tokenize_whitespace(rest, &mut args);
            if verb.eq_ignore_ascii_case("JSON.GET") || verb.eq_ignore_ascii_case("JSON.UPDATE") {
                for arg in args.iter_mut().skip(1) {
                    if arg.eq_ignore_ascii_case("where") {
                        *arg = "WHERE".to_string();
                    } else if arg.eq_ignore_ascii_case("set") {
                        *arg = "SET".to_string();
                    }
                }
            }
        }
    }
    args
}

/// `<key> <quote>value<quote> [EX n]`. The value keeps every byte between
/// the opening quote and the last quote on the line.
fn tokenize_quoted_value(rest: &str, quote: char, args: &mut Vec<String>) {
    if rest.is_empty() {
        return;
    }
    let (key, after_key) = match rest.find(' ') {
        Some(pos) => (
            &rest[..pos],
            rest[pos + 1..].trim_start_matches(|c| c == ' ' || c == '\t'),
        ),
        None => {
            // just a key, no value; the handler rejects by arity
            args.push(rest.to_string());
            return;
        }
    };
    args.push(key.to_string());

    if !after_key.starts_with(quote) {
        return;
    }
    let closing = match after_key.rfind(quote) {
        Some(pos) if pos > 0 => pos,
        _ => return, // no closing quote
    };

    args.push(after_key[quote.len_utf8()..closing].to_string());
    for token in after_key[closing + quote.len_utf8()..].split_whitespace() {
        args.push(token.to_string());
    }
}

/// Whitespace splitting with quote awareness: quote characters toggle a
/// quoted region and are dropped; whitespace inside a region is literal.
fn tokenize_whitespace(rest: &str, args: &mut Vec<String>) {
    let mut current = String::new();
    let mut open_quote: Option<char> = None;

    for c in rest.chars() {
        match open_quote {
            None if c == '\'' || c == '"' => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
                open_quote = Some(c);
            }
            Some(q) if c == q => open_quote = None,
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
}
