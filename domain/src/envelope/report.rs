//! Report sanitizer for the light-HTML delivery contract.
//!
//! Channels render reports with a restricted tag set: `<b>`, `<i>`,
//! `<code>`, `<s>`, `<u>` and `<a href="...">`. Everything else must arrive
//! escaped. When the allowed tags are not properly nested the whole report is
//! escaped, so a channel never rejects the message.

const ALLOWED_TAGS: &[&str] = &["b", "i", "code", "s", "u", "a"];

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    /// Well-formed entity reference (`&amp;`, `&#8212;`)
    Entity(&'a str),
    Open { name: &'a str, raw: &'a str },
    Close { name: &'a str, raw: &'a str },
}

/// Escape `&`, `<` and `>`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Keep well-formed allowed tags and escape the rest.
pub fn sanitize_report(report: &str) -> String {
    let tokens = tokenize(report);

    let mut stack: Vec<&str> = Vec::new();
    for token in &tokens {
        match token {
            Token::Open { name, .. } => stack.push(*name),
            Token::Close { name, .. } => {
                if stack.pop() != Some(*name) {
                    return escape_html(report);
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return escape_html(report);
    }

    let mut out = String::with_capacity(report.len());
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(&escape_html(text)),
            Token::Entity(raw) | Token::Open { raw, .. } | Token::Close { raw, .. } => {
                out.push_str(raw)
            }
        }
    }
    out
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let matched = match rest.as_bytes()[0] {
            b'<' => parse_tag(rest),
            b'&' => parse_entity(rest).map(|len| (Token::Entity(&rest[..len]), len)),
            _ => None,
        };

        match matched {
            Some((token, len)) => {
                if text_start < pos {
                    tokens.push(Token::Text(&input[text_start..pos]));
                }
                tokens.push(token);
                pos += len;
                text_start = pos;
            }
            None => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if text_start < input.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }
    tokens
}

fn parse_tag(rest: &str) -> Option<(Token<'_>, usize)> {
    let end = rest.find('>')?;
    let raw = &rest[..=end];
    let inner = &rest[1..end];

    if let Some(name) = inner.strip_prefix('/') {
        return ALLOWED_TAGS
            .contains(&name)
            .then_some((Token::Close { name, raw }, raw.len()));
    }

    if ALLOWED_TAGS.contains(&inner) && inner != "a" {
        return Some((Token::Open { name: inner, raw }, raw.len()));
    }

    let href = inner.strip_prefix("a href=\"")?.strip_suffix('"')?;
    if href.is_empty() || href.contains(['"', '<']) {
        return None;
    }
    Some((Token::Open { name: "a", raw }, raw.len()))
}

fn parse_entity(rest: &str) -> Option<usize> {
    let end = rest[1..].find(';')? + 1;
    let body = &rest[1..end];
    let valid = match body.strip_prefix('#') {
        Some(num) => !num.is_empty() && num.len() <= 7 && num.bytes().all(|b| b.is_ascii_digit()),
        None => matches!(body, "amp" | "lt" | "gt" | "quot"),
    };
    valid.then_some(end + 1)
}
