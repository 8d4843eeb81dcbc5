//! JSON lines format

use crate::core::{
    buffer_pool::{BufferPool, ScratchBuffer},
    clock_cache::{Clock, SystemClock},
    encoder,
    flags::FlagSet,
    format_writer::{FormatWriter, Record},
    logger::Logger,
    time_format,
    value::Value,
};
use std::sync::Arc;

/// One compact JSON object per line.
///
/// Members are written in a fixed order: `time`, `level`, `caller`, `msg`,
/// then the attributes. `msg` is always present; the others follow the
/// same flags as the text formats. Maps are sorted when `SORT` is set,
/// attribute lists keep their order, and duplicate names are written as
/// given.
///
/// ```
/// use rust_kvline::{attr, FlagSet, JsonFormatter, Logger, SharedBuffer};
///
/// let out = SharedBuffer::new();
/// let logger = Logger::with_formatter(out.clone(), FlagSet::LEVEL, JsonFormatter::new());
/// logger.infox("ready", &[attr("port", 8080)]);
///
/// assert_eq!(out.to_string_lossy(), "{\"level\":\"I\",\"msg\":\"ready\",\"port\":8080}\n");
/// ```
#[derive(Clone)]
pub struct JsonFormatter {
    clock: Arc<dyn Clock>,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JsonFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFormatter").finish_non_exhaustive()
    }
}

struct Members<'b> {
    buf: &'b mut ScratchBuffer,
    first: bool,
}

impl<'b> Members<'b> {
    fn open(buf: &'b mut ScratchBuffer) -> Self {
        buf.push(b'{');
        Self { buf, first: true }
    }

    fn separate(&mut self) {
        if !self.first {
            self.buf.push(b',');
        }
        self.first = false;
    }

    fn key(&mut self, key: &str) -> &mut ScratchBuffer {
        self.separate();
        encoder::write_json_string(self.buf, key.as_bytes());
        self.buf.push(b':');
        &mut *self.buf
    }

    fn value(&mut self, key: &str, value: &Value<'_>) {
        self.separate();
        encoder::write_json_member(self.buf, key, value);
    }

    fn close(self) {
        self.buf.push_str("}\n");
    }
}

impl FormatWriter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn emit(&self, logger: &Logger, record: &Record<'_>) {
        let flags = logger.flags();
        let mut buf = BufferPool::global().get();
        let mut members = Members::open(&mut buf);

        if flags.has(FlagSet::TIMESTAMP) || flags.has(FlagSet::TAI64N) {
            let out = members.key("time");
            out.push(b'"');
            time_format::write_time(out, &self.clock.now(), flags);
            out.push(b'"');
        }
        if flags.has(FlagSet::LEVEL) {
            let out = members.key("level");
            encoder::write_json_string(out, record.level.tag().as_bytes());
        }
        if super::has_caller(flags) {
            let out = members.key("caller");
            let mut location = BufferPool::global().get();
            record.caller_or_unknown().write(&mut location, flags);
            encoder::write_json_string(out, location.as_bytes());
        }

        let message = encoder::trim_message(record.message);
        encoder::write_json_string(members.key("msg"), message.as_bytes());

        record
            .fields
            .for_each(flags.has(FlagSet::SORT), |key, value| members.value(key, value));
        members.close();

        logger.write_line(buf.as_bytes());
    }
}
