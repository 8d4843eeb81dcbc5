//! Structured text format with per-call timestamps

use super::write_text_tail;
use crate::core::{
    buffer_pool::BufferPool,
    clock_cache::{Clock, SystemClock},
    flags::FlagSet,
    format_writer::{FormatWriter, Record},
    logger::Logger,
    time_format,
};
use std::fmt;
use std::sync::Arc;

/// Same line grammar as [`PlainFormatter`](super::PlainFormatter), but the
/// clock is read on every call and `TAI64N` selects the external-clock
/// form (`time="@4000000056939c7e0000000f"`). Either `TIMESTAMP` or
/// `TAI64N` turns the time field on.
#[derive(Clone)]
pub struct StructuredFormatter {
    clock: Arc<dyn Clock>,
}

impl StructuredFormatter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for StructuredFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StructuredFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredFormatter").finish_non_exhaustive()
    }
}

impl FormatWriter for StructuredFormatter {
    fn name(&self) -> &str {
        "structured"
    }

    fn emit(&self, logger: &Logger, record: &Record<'_>) {
        let flags = logger.flags();
        let mut buf = BufferPool::global().get();

        if flags.has(FlagSet::TIMESTAMP) || flags.has(FlagSet::TAI64N) {
            buf.push_str("time=\"");
            time_format::write_time(&mut buf, &self.clock.now(), flags);
            buf.push_str("\" ");
        }

        write_text_tail(&mut buf, flags, record);
        logger.write_line(buf.as_bytes());
    }
}
