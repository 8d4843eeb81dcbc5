//! Caller source locations
//!
//! Logger entry points are `#[track_caller]`, so the location handed to a
//! formatter is the line that called the logger, not a frame inside it.

use super::buffer_pool::ScratchBuffer;
use super::flags::FlagSet;
use std::panic::Location;

/// Placeholder file name used when no location is available
pub const UNKNOWN_FILE: &str = "???";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    file: &'static str,
    line: u32,
}

impl Caller {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// `???:0`
    pub const fn unknown() -> Self {
        Self::new(UNKNOWN_FILE, 0)
    }

    /// Location of whoever called the enclosing `#[track_caller]` function.
    #[track_caller]
    #[inline]
    pub fn here() -> Self {
        Self::from(Location::caller())
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Final path segment of `file`.
    pub fn short_file(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }

    /// Write `file:line`, shortening the path when `SHORTFILE` is set.
    /// Callers decide whether the caller field is enabled at all.
    pub fn write(&self, buf: &mut ScratchBuffer, flags: FlagSet) {
        if flags.has(FlagSet::SHORTFILE) {
            buf.push_str(self.short_file());
        } else {
            buf.push_str(self.file);
        }
        buf.push(b':');
        buf.append_int_width(u64::from(self.line), 1);
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl Default for Caller {
    fn default() -> Self {
        Self::unknown()
    }
}
