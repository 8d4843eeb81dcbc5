//! Plain `key="value"` text format

use super::write_text_tail;
use crate::core::{
    buffer_pool::BufferPool,
    clock_cache::ClockCache,
    flags::FlagSet,
    format_writer::{FormatWriter, Record},
    logger::Logger,
    time_format,
};
use std::sync::Arc;

/// Text lines with calendar timestamps.
///
/// Whole-second timestamps come from a [`ClockCache`] and may be up to one
/// refresh interval stale. With `MICROSECONDS` or `NANOSECONDS` set the
/// time is read from the cache's clock on every call instead. `TAI64N` is
/// ignored; use [`StructuredFormatter`](super::StructuredFormatter) for it.
#[derive(Debug, Clone)]
pub struct PlainFormatter {
    cache: Arc<ClockCache>,
}

impl PlainFormatter {
    /// Use the process-wide clock cache.
    pub fn new() -> Self {
        Self::with_cache(Arc::clone(ClockCache::global()))
    }

    pub fn with_cache(cache: Arc<ClockCache>) -> Self {
        Self { cache }
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatWriter for PlainFormatter {
    fn name(&self) -> &str {
        "plain"
    }

    fn emit(&self, logger: &Logger, record: &Record<'_>) {
        let flags = logger.flags();
        let mut buf = BufferPool::global().get();

        if flags.has(FlagSet::TIMESTAMP) {
            buf.push_str("time=\"");
            if flags.has(FlagSet::MICROSECONDS) || flags.has(FlagSet::NANOSECONDS) {
                time_format::write_calendar(&mut buf, &self.cache.clock().now(), flags);
            } else {
                buf.push_str(&self.cache.get());
            }
            buf.push_str("\" ");
        }

        write_text_tail(&mut buf, flags, record);
        logger.write_line(buf.as_bytes());
    }
}
