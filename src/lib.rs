//! # rust_kvline
//!
//! A low-allocation structured line logger.
//!
//! Each call renders one complete line (level, optional timestamp, optional
//! caller location, message and key/value attributes) into a pooled buffer
//! and writes it to the sink in a single locked write, so lines from
//! concurrent threads never interleave.
//!
//! ## Features
//!
//! - **Three formats**: plain `key="value"` text, JSON lines, and a
//!   structured text variant supporting TAI64N timestamps
//! - **Cheap timestamps**: whole-second times come from a cache refreshed
//!   once per second in the background
//! - **Runtime flags**: a [`FlagSet`] can be swapped atomically while other
//!   threads are logging
//! - **Pooled buffers**: formatting reuses scratch buffers instead of
//!   allocating per line
//!
//! ## Example
//!
//! ```
//! use rust_kvline::{attr, FlagSet, Logger, Map, SharedBuffer};
//!
//! let out = SharedBuffer::new();
//! let logger = Logger::new(out.clone(), FlagSet::LEVEL | FlagSet::SORT);
//!
//! logger.infom("user login", &Map::new().with("user", "alice").with("id", 42));
//! logger.infox("cache miss", &[attr("key", "k1"), attr("attempt", 2)]);
//!
//! assert_eq!(
//!     out.lines(),
//!     vec![
//!         "level=\"I\" msg=\"user login\" id=\"42\" user=\"alice\"",
//!         "level=\"I\" msg=\"cache miss\" key=\"k1\" attempt=\"2\"",
//!     ]
//! );
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        attr, default_logger, Attr, Caller, Clock, ClockCache, Fields, FlagSet, FormatKind,
        FormatWriter, Level, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Map,
        OutputTarget, Record, Result, Value,
    };
    pub use crate::formatters::{JsonFormatter, PlainFormatter, StructuredFormatter};
    pub use crate::sinks::{SharedBuffer, TestWriter};
}

pub use core::{
    attr, default_logger, Attr, BufferPool, Caller, Clock, ClockCache, Fields, FlagSet,
    FormatKind, FormatWriter, Level, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, ManualClock, Map, OutputTarget, PooledBuffer, Record, Result, ScratchBuffer,
    SystemClock, Value,
};
pub use formatters::{JsonFormatter, PlainFormatter, StructuredFormatter};
pub use sinks::{open_file, SharedBuffer, TestWriter};
