//! Wire format codec.
//!
//! Plain text is emitted verbatim; newlines stay raw `\n` bytes. A mention is
//! emitted as a JSON-like token prefixed with `@`:
//!
//! ```text
//! @{"id":42,"name":"Bob","isNew":true}
//! ```
//!
//! Names are written unescaped unless they contain a `"`, in which case the
//! name becomes a JSON string literal. On decode the unescaped reading
//! (`"name":"<non-quote chars>"`) is preferred; the JSON reading is used only
//! when it covers a longer token, which is exactly the case for escaped names.
//!
//! After the name, a token may carry further `,"key":<scalar>` pairs before
//! its closing `}`. Anything that does not parse as a complete token is plain
//! text. Decoding never fails.

use crate::segment::Segment;
use crate::segment::UserId;

const TOKEN_OPEN: &str = "@{\"id\":";
const NAME_KEY: &str = ",\"name\":\"";
const TOKEN_TAIL: &str = ",\"isNew\":true}";

/// Encode `segments` into the wire format.
pub fn serialize(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::PlainText { value } => out.push_str(value),
            Segment::Mention {
                user_id,
                display_name,
            } => push_mention_token(&mut out, *user_id, display_name),
        }
    }
    out
}

/// Decode a wire string into segments.
///
/// The result is in normal form: adjacent text is merged into one
/// `PlainText`, and the only empty `PlainText` is the anchor placed between
/// two consecutive mentions.
pub fn deserialize(wire: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = wire;

    while let Some(at) = rest.find('@') {
        let (before, candidate) = rest.split_at(at);
        text.push_str(before);
        match parse_mention_token(candidate) {
            Some(token) => {
                if !text.is_empty() || matches!(segments.last(), Some(Segment::Mention { .. })) {
                    segments.push(Segment::PlainText {
                        value: std::mem::take(&mut text),
                    });
                }
                segments.push(Segment::Mention {
                    user_id: token.user_id,
                    display_name: token.display_name,
                });
                rest = &candidate[token.len..];
            }
            None => {
                text.push('@');
                rest = &candidate['@'.len_utf8()..];
            }
        }
    }

    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::PlainText { value: text });
    }
    segments
}

fn push_mention_token(out: &mut String, user_id: UserId, display_name: &str) {
    out.push_str(TOKEN_OPEN);
    out.push_str(&user_id.to_string());
    if display_name.contains('"') {
        // `Value`'s `Display` writes a compact JSON string literal and cannot fail.
        out.push_str(",\"name\":");
        out.push_str(&serde_json::Value::from(display_name).to_string());
    } else {
        out.push_str(NAME_KEY);
        out.push_str(display_name);
        out.push('"');
    }
    out.push_str(TOKEN_TAIL);
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedToken {
    user_id: UserId,
    display_name: String,
    /// Bytes of input covered by the token, including the leading `@`.
    len: usize,
}

/// Parse a mention token at the very start of `input`.
///
/// Accepted shape: `@{"id":<digits>,"name":"<name>"` followed by zero or more
/// `,"key":<scalar>` pairs and a closing `}`.
fn parse_mention_token(input: &str) -> Option<ParsedToken> {
    let after_open = input.strip_prefix(TOKEN_OPEN)?;

    let digits_len = after_open
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    let id: u64 = after_open[..digits_len].parse().ok()?;

    let after_id = after_open[digits_len..].strip_prefix(NAME_KEY)?;
    let (display_name, rest_len) = match (unescaped_name(after_id), escaped_name(after_id)) {
        (Some(unescaped), Some(escaped)) if escaped.1 > unescaped.1 => escaped,
        (Some(unescaped), _) => unescaped,
        (None, escaped) => escaped?,
    };
    if display_name.is_empty() {
        return None;
    }

    Some(ParsedToken {
        user_id: UserId(id),
        display_name,
        len: input.len() - after_id.len() + rest_len,
    })
}

/// Name read as `<non-quote chars>"`. Returns the name and the bytes consumed
/// through the token's closing `}`.
fn unescaped_name(input: &str) -> Option<(String, usize)> {
    let end = input.find('"')?;
    let after_name = end + '"'.len_utf8();
    let tail = tail_len(&input[after_name..])?;
    Some((input[..end].to_string(), after_name + tail))
}

/// Name read as the body of a JSON string literal.
fn escaped_name(input: &str) -> Option<(String, usize)> {
    let end = quoted_body_len(input)?;
    let name = serde_json::from_str::<String>(&format!("\"{}\"", &input[..end])).ok()?;
    let after_name = end + '"'.len_utf8();
    let tail = tail_len(&input[after_name..])?;
    Some((name, after_name + tail))
}

/// Byte length of a string body up to, not including, its closing unescaped quote.
fn quoted_body_len(input: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in input.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Length of `(,"key":<scalar>)* }` at the start of `input`.
fn tail_len(input: &str) -> Option<usize> {
    let mut rest = input;
    loop {
        if let Some(after) = rest.strip_prefix('}') {
            return Some(input.len() - after.len());
        }
        let after_quote = rest.strip_prefix(",\"")?;
        let key_len = after_quote.find('"')?;
        let key = &after_quote[..key_len];
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        let value = after_quote[key_len + '"'.len_utf8()..].strip_prefix(':')?;
        rest = &value[scalar_len(value)?..];
    }
}

/// Length of a `true`/`false`/`null`, number or simple string at the start of `input`.
fn scalar_len(input: &str) -> Option<usize> {
    if let Some(literal) = ["true", "false", "null"]
        .into_iter()
        .find(|literal| input.starts_with(literal))
    {
        return Some(literal.len());
    }
    if let Some(body) = input.strip_prefix('"') {
        let end = body.find(['"', '\\', '@', '{', '}'])?;
        return body[end..]
            .starts_with('"')
            .then_some(end + 2);
    }
    let unsigned = input.strip_prefix('-').unwrap_or(input);
    let number_len = unsigned
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    (number_len > 0).then_some(input.len() - unsigned.len() + number_len)
}
