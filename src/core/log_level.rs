//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Level {
    Debug = 0,
    #[default]
    Info = 1,
    Fatal = 2,
}

impl Level {
    /// Short tag written in the `level` field.
    #[inline]
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Debug => "D",
            Level::Info => "I",
            Level::Fatal => "F",
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" | "D" => Ok(Level::Debug),
            "INFO" | "PRINT" | "I" => Ok(Level::Info),
            "FATAL" | "PANIC" | "F" => Ok(Level::Fatal),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}
