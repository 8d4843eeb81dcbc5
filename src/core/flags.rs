//! Rendering flags
//!
//! A [`FlagSet`] is a bitmask describing which optional fields are written
//! on each line and which format-affecting behaviours are enabled. Bits are
//! independent except where one documents that it overrides another.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Sub};
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagSet(u64);

/// Name table, kept in ascending name order so rendering is stable.
const FLAG_NAMES: [(FlagSet, &str); 9] = [
    (FlagSet::DEBUG, "debug"),
    (FlagSet::LEVEL, "level"),
    (FlagSet::LONGFILE, "longfile"),
    (FlagSet::MICROSECONDS, "microseconds"),
    (FlagSet::NANOSECONDS, "nanoseconds"),
    (FlagSet::SHORTFILE, "shortfile"),
    (FlagSet::SORT, "sort"),
    (FlagSet::TAI64N, "tai64n"),
    (FlagSet::TIMESTAMP, "timestamp"),
];

impl FlagSet {
    /// Log the date and time
    pub const TIMESTAMP: FlagSet = FlagSet(1 << 0);
    /// Six fractional digits on timestamps
    pub const MICROSECONDS: FlagSet = FlagSet(1 << 1);
    /// Nine fractional digits on timestamps, overrides `MICROSECONDS`
    pub const NANOSECONDS: FlagSet = FlagSet(1 << 2);
    /// Log the level tag
    pub const LEVEL: FlagSet = FlagSet(1 << 3);
    /// Full source path and line: `/a/b/c/d.rs:23`
    pub const LONGFILE: FlagSet = FlagSet(1 << 4);
    /// Final path segment and line: `d.rs:23`, overrides `LONGFILE`
    pub const SHORTFILE: FlagSet = FlagSet(1 << 5);
    /// Sort map keys in output
    pub const SORT: FlagSet = FlagSet(1 << 6);
    /// Enable debug level lines
    pub const DEBUG: FlagSet = FlagSet(1 << 7);
    /// Render timestamps in TAI64N external-clock form
    pub const TAI64N: FlagSet = FlagSet(1 << 8);

    pub const STD: FlagSet = FlagSet(Self::TIMESTAMP.0 | Self::LEVEL.0 | Self::SORT.0);

    #[must_use]
    pub const fn empty() -> Self {
        FlagSet(0)
    }

    /// Build a set from raw bits. Undefined bits are kept but never
    /// interpreted.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        FlagSet(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True when any bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn has(self, other: FlagSet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: FlagSet) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: FlagSet) {
        self.0 &= !other.0;
    }

    /// All 64 bits, most significant first.
    #[must_use]
    pub fn to_bit_string(self) -> String {
        format!("{:064b}", self.0)
    }

    fn write_names(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in FLAG_NAMES {
            if self.has(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }

    fn names(self) -> String {
        struct Names(FlagSet);
        impl fmt::Display for Names {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.write_names(f)
            }
        }
        Names(self).to_string()
    }
}

impl BitOr for FlagSet {
    type Output = FlagSet;

    fn bitor(self, rhs: FlagSet) -> FlagSet {
        FlagSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for FlagSet {
    fn bitor_assign(&mut self, rhs: FlagSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FlagSet {
    type Output = FlagSet;

    fn bitand(self, rhs: FlagSet) -> FlagSet {
        FlagSet(self.0 & rhs.0)
    }
}

impl Sub for FlagSet {
    type Output = FlagSet;

    fn sub(self, rhs: FlagSet) -> FlagSet {
        FlagSet(self.0 & !rhs.0)
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FlagSet(")?;
        self.write_names(f)?;
        f.write_str(")")
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for FlagSet {
    type Err = LoggerError;

    /// Parse a `|`-separated list of flag names, e.g. `"timestamp|level"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut flags = FlagSet::empty();
        for part in s.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            let lower = part.to_ascii_lowercase();
            if lower == "std" {
                flags |= FlagSet::STD;
                continue;
            }
            match FLAG_NAMES.iter().find(|(_, name)| *name == lower) {
                Some((flag, _)) => flags |= *flag,
                None => return Err(LoggerError::unknown_flag(part)),
            }
        }
        Ok(flags)
    }
}

impl Serialize for FlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.names())
    }
}

impl<'de> Deserialize<'de> for FlagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bits(u64),
            Names(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bits(bits) => Ok(FlagSet::from_bits(bits)),
            Repr::Names(names) => names.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has() {
        let flags = FlagSet::TIMESTAMP | FlagSet::DEBUG;
        assert!(flags.has(FlagSet::TIMESTAMP));
        assert!(flags.has(FlagSet::DEBUG));
        assert!(!flags.has(FlagSet::LEVEL));
        assert!(flags.has(FlagSet::LEVEL | FlagSet::DEBUG));
    }

    #[test]
    fn test_display_sorted_names() {
        let flags = FlagSet::TIMESTAMP | FlagSet::DEBUG | FlagSet::LEVEL;
        assert_eq!(flags.to_string(), "FlagSet(debug|level|timestamp)");
        assert_eq!(FlagSet::empty().to_string(), "FlagSet()");
    }

    #[test]
    fn test_undefined_bits_ignored() {
        let flags = FlagSet::from_bits(1 << 40) | FlagSet::SORT;
        assert_eq!(flags.to_string(), "FlagSet(sort)");
        assert!(flags.has(FlagSet::SORT));
    }

    #[test]
    fn test_bit_string() {
        let bits = (FlagSet::TIMESTAMP | FlagSet::LEVEL).to_bit_string();
        assert_eq!(bits.len(), 64);
        assert!(bits.ends_with("1001"));
    }

    #[test]
    fn test_insert_remove() {
        let mut flags = FlagSet::STD;
        flags.remove(FlagSet::SORT);
        assert!(!flags.has(FlagSet::SORT));
        flags.insert(FlagSet::DEBUG);
        assert_eq!(flags, FlagSet::TIMESTAMP | FlagSet::LEVEL | FlagSet::DEBUG);
        assert_eq!(flags - FlagSet::DEBUG, FlagSet::TIMESTAMP | FlagSet::LEVEL);
    }

    #[test]
    fn test_parse() {
        let flags: FlagSet = "timestamp | Level|sort".parse().unwrap();
        assert_eq!(flags, FlagSet::STD);

        let flags: FlagSet = "std|debug".parse().unwrap();
        assert_eq!(flags, FlagSet::STD | FlagSet::DEBUG);

        assert_eq!("".parse::<FlagSet>().unwrap(), FlagSet::empty());
        assert!(matches!(
            "level|colour".parse::<FlagSet>(),
            Err(LoggerError::UnknownFlag { .. })
        ));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&(FlagSet::LEVEL | FlagSet::SORT)).unwrap();
        assert_eq!(json, "\"level|sort\"");

        let flags: FlagSet = serde_json::from_str("\"level|sort\"").unwrap();
        assert_eq!(flags, FlagSet::LEVEL | FlagSet::SORT);

        let flags: FlagSet = serde_json::from_str("8").unwrap();
        assert_eq!(flags, FlagSet::LEVEL);
    }
}
