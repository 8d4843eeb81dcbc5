//! Output format strategy trait

use super::caller::Caller;
use super::log_level::Level;
use super::logger::Logger;
use super::value::Fields;

/// Everything a formatter needs to render one line.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: Level,
    pub message: &'a str,
    pub fields: Fields<'a>,
    /// `None` renders as `???:0` when caller output is enabled
    pub caller: Option<Caller>,
}

impl<'a> Record<'a> {
    pub fn new(level: Level, message: &'a str) -> Self {
        Self {
            level,
            message,
            fields: Fields::Empty,
            caller: None,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields<'a>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn caller_or_unknown(&self) -> Caller {
        self.caller.unwrap_or_default()
    }
}

/// Renders a [`Record`] into one complete line and hands it to
/// [`Logger::write_line`]. Implementations read the current flags from the
/// logger on every call and never fail; rendering is best effort.
pub trait FormatWriter: Send + Sync {
    fn emit(&self, logger: &Logger, record: &Record<'_>);

    fn name(&self) -> &str;
}
