//! Serializable logger configuration
//!
//! ```
//! use rust_kvline::{FlagSet, FormatKind, LoggerConfig, OutputTarget};
//!
//! let config = LoggerConfig::from_json(
//!     r#"{"flags": "timestamp|level|tai64n", "format": "structured", "output": "stdout"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.flags, FlagSet::TIMESTAMP | FlagSet::LEVEL | FlagSet::TAI64N);
//! assert_eq!(config.format, FormatKind::Structured);
//! assert_eq!(config.output, OutputTarget::Stdout);
//! ```

use super::error::{LoggerError, Result};
use super::flags::FlagSet;
use super::format_writer::FormatWriter;
use crate::formatters::{JsonFormatter, PlainFormatter, StructuredFormatter};
use crate::sinks;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Built-in formatter selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    #[default]
    Plain,
    Json,
    Structured,
}

impl FormatKind {
    pub fn to_str(self) -> &'static str {
        match self {
            FormatKind::Plain => "plain",
            FormatKind::Json => "json",
            FormatKind::Structured => "structured",
        }
    }

    /// Fresh formatter of this kind using the system clock.
    pub fn formatter(self) -> Arc<dyn FormatWriter> {
        match self {
            FormatKind::Plain => Arc::new(PlainFormatter::new()),
            FormatKind::Json => Arc::new(JsonFormatter::new()),
            FormatKind::Structured => Arc::new(StructuredFormatter::new()),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for FormatKind {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(FormatKind::Plain),
            "json" => Ok(FormatKind::Json),
            "structured" => Ok(FormatKind::Structured),
            other => Err(LoggerError::config(
                "format",
                format!("expected plain, json or structured, got '{}'", other),
            )),
        }
    }
}

/// Where lines go
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stderr,
    Stdout,
    /// Appended to, created if missing
    File(PathBuf),
}

impl OutputTarget {
    pub fn open(&self) -> Result<Box<dyn Write + Send>> {
        match self {
            OutputTarget::Stderr => Ok(Box::new(io::stderr())),
            OutputTarget::Stdout => Ok(Box::new(io::stdout())),
            OutputTarget::File(path) if path.as_os_str().is_empty() => {
                Err(LoggerError::config("output", "file path is empty"))
            }
            OutputTarget::File(path) => Ok(Box::new(sinks::open_file(path)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub flags: FlagSet,
    pub format: FormatKind,
    pub output: OutputTarget,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            flags: FlagSet::STD,
            format: FormatKind::default(),
            output: OutputTarget::default(),
        }
    }
}

impl LoggerConfig {
    /// Parse a JSON document. Missing members take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
