//! Escaping and key/value serialization shared by all formatters
//!
//! Text output (plain and structured) escapes exactly four bytes inside
//! quoted values: `"`, tab, CR and LF. Everything else, including invalid
//! UTF-8, passes through untouched. JSON output uses the stricter
//! [`escape_json`] instead.

use super::buffer_pool::{BufferPool, ScratchBuffer};
use super::value::{Attr, Value};

/// Escape `bytes` for a double-quoted text field.
pub fn escape_text(buf: &mut ScratchBuffer, bytes: &[u8]) {
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escaped: &[u8] = match b {
            b'"' => b"\\\"",
            b'\t' => b"\\t",
            b'\r' => b"\\r",
            b'\n' => b"\\n",
            _ => continue,
        };
        buf.extend_from_slice(&bytes[start..i]);
        buf.extend_from_slice(escaped);
        start = i + 1;
    }
    buf.extend_from_slice(&bytes[start..]);
}

/// Write a text-format key, replacing spaces with underscores.
pub fn write_key(buf: &mut ScratchBuffer, key: &str) {
    for &b in key.as_bytes() {
        buf.push(if b == b' ' { b'_' } else { b });
    }
}

/// Write one `key="escaped value"` pair.
pub fn write_kv(buf: &mut ScratchBuffer, key: &str, value: &Value<'_>) {
    write_key(buf, key);
    buf.push_str("=\"");
    match value {
        Value::Str(s) => escape_text(buf, s.as_bytes()),
        Value::Bytes(b) => escape_text(buf, b),
        v if v.is_escape_free() => v.write_text(buf),
        v => {
            let mut scratch = BufferPool::global().get();
            v.write_text(&mut scratch);
            escape_text(buf, scratch.as_bytes());
        }
    }
    buf.push(b'"');
}

/// Write pairs separated by single spaces, no trailing separator.
pub fn write_pairs<'a, 'v: 'a, I>(buf: &mut ScratchBuffer, pairs: I)
where
    I: IntoIterator<Item = (&'a str, &'a Value<'v>)>,
{
    for (i, (key, value)) in pairs.into_iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_kv(buf, key, value);
    }
}

/// Write attributes in the order given.
pub fn write_attrs<'a, 'v: 'a, I>(buf: &mut ScratchBuffer, attrs: I)
where
    I: IntoIterator<Item = &'a Attr<'v>>,
{
    write_pairs(buf, attrs.into_iter().map(|a| (a.key.as_ref(), &a.value)));
}

/// Strip trailing newlines from a message.
#[inline]
pub fn trim_message(message: &str) -> &str {
    message.trim_end_matches('\n')
}

/// Escape `bytes` for the inside of a JSON string.
///
/// Control characters, `"` and `\` are escaped as JSON requires. `<`, `>`
/// and `&` become `\u003c`, `\u003e` and `\u0026`, and U+2028/U+2029 are
/// escaped, so the output can be embedded in HTML and JavaScript. Each
/// invalid UTF-8 byte becomes `\ufffd`.
pub fn escape_json(buf: &mut ScratchBuffer, bytes: &[u8]) {
    for chunk in bytes.utf8_chunks() {
        escape_json_str(buf, chunk.valid());
        for _ in chunk.invalid() {
            buf.push_str("\\ufffd");
        }
    }
}

fn escape_json_str(buf: &mut ScratchBuffer, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' | '\\' | '\n' | '\r' | '\t' | '\u{08}' | '\u{0c}' | '<' | '>' | '&' => {}
            '\u{2028}' | '\u{2029}' => {}
            c if (c as u32) < 0x20 => {}
            _ => continue,
        }
        buf.extend_from_slice(&bytes[start..i]);
        start = i + c.len_utf8();
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            '\u{08}' => buf.push_str("\\b"),
            '\u{0c}' => buf.push_str("\\f"),
            '\u{2028}' => buf.push_str("\\u2028"),
            '\u{2029}' => buf.push_str("\\u2029"),
            c => {
                let b = c as u32 as u8;
                buf.push_str("\\u00");
                buf.push(HEX[(b >> 4) as usize]);
                buf.push(HEX[(b & 0xf) as usize]);
            }
        }
    }
    buf.extend_from_slice(&bytes[start..]);
}

/// Write a quoted JSON string.
pub fn write_json_string(buf: &mut ScratchBuffer, bytes: &[u8]) {
    buf.push(b'"');
    escape_json(buf, bytes);
    buf.push(b'"');
}

/// Write a value as a JSON scalar. Numbers and booleans stay unquoted;
/// non-finite floats and opaque values become strings.
pub fn write_json_value(buf: &mut ScratchBuffer, value: &Value<'_>) {
    match value {
        Value::Str(s) => write_json_string(buf, s.as_bytes()),
        Value::Bytes(b) => write_json_string(buf, b),
        Value::Int(_) | Value::Uint(_) | Value::Bool(_) => value.write_text(buf),
        Value::Float(f) if f.is_finite() => value.write_text(buf),
        Value::Nil => buf.push_str("null"),
        v => {
            let mut scratch = BufferPool::global().get();
            v.write_text(&mut scratch);
            write_json_string(buf, scratch.as_bytes());
        }
    }
}

/// Write `"key":value`.
pub fn write_json_member(buf: &mut ScratchBuffer, key: &str, value: &Value<'_>) {
    write_json_string(buf, key.as_bytes());
    buf.push(b':');
    write_json_value(buf, value);
}
