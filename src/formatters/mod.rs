//! Built-in output formats
//!
//! - `PlainFormatter`: `key="value"` text with cached calendar timestamps
//! - `JsonFormatter`: one JSON object per line
//! - `StructuredFormatter`: `key="value"` text with per-call timestamps,
//!   including the TAI64N form

pub mod json;
pub mod plain;
pub mod structured;

pub use json::JsonFormatter;
pub use plain::PlainFormatter;
pub use structured::StructuredFormatter;

use crate::core::buffer_pool::ScratchBuffer;
use crate::core::encoder;
use crate::core::flags::FlagSet;
use crate::core::format_writer::Record;

/// Write everything after the optional `time="…" ` prefix of a text line:
/// level, caller, message, attributes and the terminating newline.
///
/// With no flags at all the message is written bare, without the
/// `msg="…"` wrapper or any escaping.
pub(crate) fn write_text_tail(buf: &mut ScratchBuffer, flags: FlagSet, record: &Record<'_>) {
    let message = encoder::trim_message(record.message);

    if flags.is_empty() {
        buf.push_str(message);
    } else {
        if flags.has(FlagSet::LEVEL) {
            buf.push_str("level=\"");
            buf.push_str(record.level.tag());
            buf.push_str("\" ");
        }
        if has_caller(flags) {
            buf.push_str("caller=\"");
            record.caller_or_unknown().write(buf, flags);
            buf.push_str("\" ");
        }
        buf.push_str("msg=\"");
        encoder::escape_text(buf, message.as_bytes());
        buf.push(b'"');
    }

    if !record.fields.is_empty() {
        buf.push(b' ');
        record.fields.write_text(buf, flags.has(FlagSet::SORT));
    }
    buf.push(b'\n');
}

#[inline]
pub(crate) fn has_caller(flags: FlagSet) -> bool {
    flags.has(FlagSet::LONGFILE) || flags.has(FlagSet::SHORTFILE)
}
