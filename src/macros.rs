//! Formatting macros for the `*f` logger methods.
//!
//! Each macro forwards to the matching method with `format_args!`, so
//! nothing is allocated when the call is gated off and the caller location
//! is still the macro call site.
//!
//! # Examples
//!
//! ```
//! use rust_kvline::{infof, FlagSet, Logger, SharedBuffer};
//!
//! let out = SharedBuffer::new();
//! let logger = Logger::new(out.clone(), FlagSet::LEVEL);
//!
//! let port = 8080;
//! infof!(logger, "listening on port {}", port);
//!
//! assert_eq!(out.to_string_lossy(), "level=\"I\" msg=\"listening on port 8080\"\n");
//! ```

/// Log a formatted debug-level message. Arguments are not formatted
/// unless the logger has the `DEBUG` flag.
///
/// ```
/// # use rust_kvline::{FlagSet, Logger, SharedBuffer};
/// use rust_kvline::debugf;
/// # let out = SharedBuffer::new();
/// let logger = Logger::new(out.clone(), FlagSet::LEVEL);
/// debugf!(logger, "cache size: {}", 42);
/// # assert!(out.is_empty());
/// ```
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log a formatted info-level message.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a formatted message at info level; same as [`infof!`].
#[macro_export]
macro_rules! printf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.printf(format_args!($($arg)+))
    };
}

/// Log a formatted fatal-level message and exit the process with status 1.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

/// Log a formatted fatal-level message, then panic with it.
///
/// ```should_panic
/// # use rust_kvline::{FlagSet, Logger};
/// use rust_kvline::panicf;
/// let logger = Logger::new(std::io::sink(), FlagSet::LEVEL);
/// panicf!(logger, "unexpected state: {}", "x < 0");
/// ```
#[macro_export]
macro_rules! panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(format_args!($($arg)+))
    };
}
