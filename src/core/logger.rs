//! Main logger implementation
//!
//! A [`Logger`] owns one sink, one atomically stored [`FlagSet`] and one
//! [`FormatWriter`]. Three independent synchronization points are used:
//!
//! - flags: an `AtomicU64`, read on every call without any lock
//! - formatter: an `RwLock` around an `Arc`, held only to clone the pointer
//! - sink: a `Mutex` held for the single `write_all` of a finished line
//!
//! Formatting happens outside every lock, in pooled buffers, so concurrent
//! callers only serialize on the final write.

use super::{
    buffer_pool::BufferPool,
    caller::Caller,
    config::{FormatKind, LoggerConfig},
    error::Result,
    flags::FlagSet,
    format_writer::{FormatWriter, Record},
    log_level::Level,
    metrics::LoggerMetrics,
    value::{Fields, Map},
};
use crate::formatters::PlainFormatter;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Write failures are reported on the first occurrence and then once per
/// this many failures.
const WRITE_FAILURE_REPORT_INTERVAL: u64 = 1000;

pub struct Logger {
    flags: AtomicU64,
    out: Mutex<Box<dyn Write + Send>>,
    formatter: RwLock<Arc<dyn FormatWriter>>,
    /// Metrics for observability (lines written, write failures, etc.)
    metrics: LoggerMetrics,
}

impl Logger {
    /// Create a logger writing plain lines to `out`.
    pub fn new<W: Write + Send + 'static>(out: W, flags: FlagSet) -> Self {
        Self::with_formatter(out, flags, PlainFormatter::new())
    }

    pub fn with_formatter<W, F>(out: W, flags: FlagSet, formatter: F) -> Self
    where
        W: Write + Send + 'static,
        F: FormatWriter + 'static,
    {
        Self::from_parts(Box::new(out), flags, Arc::new(formatter))
    }

    fn from_parts(
        out: Box<dyn Write + Send>,
        flags: FlagSet,
        formatter: Arc<dyn FormatWriter>,
    ) -> Self {
        Self {
            flags: AtomicU64::new(flags.bits()),
            out: Mutex::new(out),
            formatter: RwLock::new(formatter),
            metrics: LoggerMetrics::new(),
        }
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[inline]
    pub fn flags(&self) -> FlagSet {
        FlagSet::from_bits(self.flags.load(Ordering::Acquire))
    }

    pub fn set_flags(&self, flags: FlagSet) {
        self.flags.store(flags.bits(), Ordering::Release);
    }

    #[inline]
    pub fn has_debug(&self) -> bool {
        self.flags().has(FlagSet::DEBUG)
    }

    /// Replace the sink. Lines already being written finish on the old one.
    pub fn set_output<W: Write + Send + 'static>(&self, out: W) {
        *self.out.lock() = Box::new(out);
    }

    pub fn set_formatter<F: FormatWriter + 'static>(&self, formatter: F) {
        self.set_formatter_arc(Arc::new(formatter));
    }

    pub fn set_formatter_arc(&self, formatter: Arc<dyn FormatWriter>) {
        *self.formatter.write() = formatter;
    }

    pub fn formatter(&self) -> Arc<dyn FormatWriter> {
        Arc::clone(&*self.formatter.read())
    }

    /// Get the logger metrics
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Write one finished line to the sink under the output lock.
    ///
    /// Failures are counted and reported on stderr, never returned.
    pub fn write_line(&self, line: &[u8]) {
        let result = {
            let mut out = self.out.lock();
            out.write_all(line)
        };

        match result {
            Ok(()) => self.metrics.record_written(line.len()),
            Err(e) => self.report_write_failure(&e),
        }
    }

    fn report_write_failure(&self, err: &io::Error) {
        let failures = self.metrics.record_write_failure() + 1;
        if failures == 1 || failures % WRITE_FAILURE_REPORT_INTERVAL == 0 {
            eprintln!(
                "[LOGGER ERROR] Failed to write log line ({} failures so far): {}",
                failures, err
            );
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }

    /// Render and write one line through the active formatter.
    pub fn emit(&self, level: Level, message: &str, fields: Fields<'_>, caller: Option<Caller>) {
        let formatter = self.formatter();
        let record = Record {
            level,
            message,
            fields,
            caller,
        };
        formatter.emit(self, &record);
    }

    fn emit_fmt(&self, level: Level, args: fmt::Arguments<'_>, caller: Caller) -> Option<String> {
        if let Some(message) = args.as_str() {
            self.emit(level, message, Fields::Empty, Some(caller));
            return (level == Level::Fatal).then(|| message.to_string());
        }

        let mut buf = BufferPool::global().get();
        let _ = fmt::Write::write_fmt(&mut *buf, args);
        let message = String::from_utf8_lossy(buf.as_bytes());
        self.emit(level, &message, Fields::Empty, Some(caller));
        (level == Level::Fatal).then(|| message.into_owned())
    }

    /// Log `message` at debug level. Nothing is written unless the
    /// `DEBUG` flag is set.
    #[track_caller]
    pub fn debug(&self, message: &str) {
        if self.has_debug() {
            self.emit(Level::Debug, message, Fields::Empty, Some(Caller::here()));
        }
    }

    /// Formatted variant of [`Logger::debug`]; arguments are only
    /// formatted when debug output is enabled.
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        if self.has_debug() {
            self.emit_fmt(Level::Debug, args, Caller::here());
        }
    }

    #[track_caller]
    pub fn debugm(&self, message: &str, map: &Map) {
        if self.has_debug() {
            self.emit(Level::Debug, message, Fields::Map(map), Some(Caller::here()));
        }
    }

    #[track_caller]
    pub fn debugx<'a>(&self, message: &str, attrs: impl Into<Fields<'a>>) {
        if self.has_debug() {
            self.emit(Level::Debug, message, attrs.into(), Some(Caller::here()));
        }
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message, Fields::Empty, Some(Caller::here()));
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit_fmt(Level::Info, args, Caller::here());
    }

    #[track_caller]
    pub fn infom(&self, message: &str, map: &Map) {
        self.emit(Level::Info, message, Fields::Map(map), Some(Caller::here()));
    }

    #[track_caller]
    pub fn infox<'a>(&self, message: &str, attrs: impl Into<Fields<'a>>) {
        self.emit(Level::Info, message, attrs.into(), Some(Caller::here()));
    }

    /// Same as [`Logger::info`].
    #[track_caller]
    pub fn print(&self, message: &str) {
        self.emit(Level::Info, message, Fields::Empty, Some(Caller::here()));
    }

    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.emit_fmt(Level::Info, args, Caller::here());
    }

    #[track_caller]
    pub fn printm(&self, message: &str, map: &Map) {
        self.emit(Level::Info, message, Fields::Map(map), Some(Caller::here()));
    }

    #[track_caller]
    pub fn printx<'a>(&self, message: &str, attrs: impl Into<Fields<'a>>) {
        self.emit(Level::Info, message, attrs.into(), Some(Caller::here()));
    }

    /// Log at fatal level, flush, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: &str) -> ! {
        self.emit(Level::Fatal, message, Fields::Empty, Some(Caller::here()));
        self.exit()
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.emit_fmt(Level::Fatal, args, Caller::here());
        self.exit()
    }

    #[track_caller]
    pub fn fatalm(&self, message: &str, map: &Map) -> ! {
        self.emit(Level::Fatal, message, Fields::Map(map), Some(Caller::here()));
        self.exit()
    }

    #[track_caller]
    pub fn fatalx<'a>(&self, message: &str, attrs: impl Into<Fields<'a>>) -> ! {
        self.emit(Level::Fatal, message, attrs.into(), Some(Caller::here()));
        self.exit()
    }

    /// Log at fatal level, then panic with the rendered message.
    #[track_caller]
    pub fn panic(&self, message: &str) -> ! {
        self.emit(Level::Fatal, message, Fields::Empty, Some(Caller::here()));
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = self
            .emit_fmt(Level::Fatal, args, Caller::here())
            .unwrap_or_default();
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicm(&self, message: &str, map: &Map) -> ! {
        self.emit(Level::Fatal, message, Fields::Map(map), Some(Caller::here()));
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicx<'a>(&self, message: &str, attrs: impl Into<Fields<'a>>) -> ! {
        self.emit(Level::Fatal, message, attrs.into(), Some(Caller::here()));
        panic!("{}", message)
    }

    fn exit(&self) -> ! {
        let _ = self.flush();
        std::process::exit(1)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("flags", &self.flags())
            .field("formatter", &self.formatter().name())
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Process-wide logger writing plain lines to stderr with
/// [`FlagSet::STD`].
pub fn default_logger() -> &'static Logger {
    static DEFAULT: OnceLock<Logger> = OnceLock::new();
    DEFAULT.get_or_init(|| Logger::new(io::stderr(), FlagSet::STD))
}

/// Builder for creating a Logger with custom configuration
///
/// # Example
///
/// ```
/// use rust_kvline::{FlagSet, FormatKind, Logger};
///
/// let logger = Logger::builder()
///     .flags(FlagSet::LEVEL | FlagSet::SORT)
///     .format(FormatKind::Json)
///     .output(std::io::sink())
///     .build();
///
/// assert_eq!(logger.formatter().name(), "json");
/// ```
pub struct LoggerBuilder {
    flags: FlagSet,
    output: Option<Box<dyn Write + Send>>,
    formatter: Option<Arc<dyn FormatWriter>>,
}

impl LoggerBuilder {
    /// Create a new builder: stderr, plain format, `FlagSet::STD`
    pub fn new() -> Self {
        Self {
            flags: FlagSet::STD,
            output: None,
            formatter: None,
        }
    }

    /// Start from a deserialized configuration, opening its output.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        Ok(Self {
            flags: config.flags,
            output: Some(config.output.open()?),
            formatter: Some(config.format.formatter()),
        })
    }

    #[must_use]
    pub fn flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn output<W: Write + Send + 'static>(mut self, out: W) -> Self {
        self.output = Some(Box::new(out));
        self
    }

    #[must_use]
    pub fn formatter<F: FormatWriter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Select one of the built-in formatters
    #[must_use]
    pub fn format(mut self, kind: FormatKind) -> Self {
        self.formatter = Some(kind.formatter());
        self
    }

    pub fn build(self) -> Logger {
        let output = self
            .output
            .unwrap_or_else(|| Box::new(io::stderr()) as Box<dyn Write + Send>);
        let formatter = self
            .formatter
            .unwrap_or_else(|| FormatKind::Plain.formatter());
        Logger::from_parts(output, self.flags, formatter)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
