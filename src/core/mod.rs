//! Core logger types and traits

pub mod buffer_pool;
pub mod caller;
pub mod clock_cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod flags;
pub mod format_writer;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod time_format;
pub mod value;

pub use buffer_pool::{BufferPool, PooledBuffer, ScratchBuffer};
pub use caller::Caller;
pub use clock_cache::{Clock, ClockCache, ManualClock, SystemClock};
pub use config::{FormatKind, LoggerConfig, OutputTarget};
pub use error::{LoggerError, Result};
pub use flags::FlagSet;
pub use format_writer::{FormatWriter, Record};
pub use log_level::Level;
pub use logger::{default_logger, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use value::{attr, Attr, Fields, Map, Value};
