//! Timestamp rendering
//!
//! Two forms are supported:
//!
//! - calendar: `2016-01-11T12:13:14.000015Z`, with optional 6 or 9
//!   fractional digits and a `Z` or `±HH:MM` suffix
//! - TAI64N: `@4` followed by 15 hex digits of TAI seconds and 8 hex
//!   digits of nanoseconds
//!
//! Both write straight into a [`ScratchBuffer`] without intermediate
//! strings. Sub-second values are truncated, never rounded.

use super::buffer_pool::ScratchBuffer;
use super::flags::FlagSet;
use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike};

/// One row of the TAI - UTC table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapSecond {
    /// Unix seconds (UTC) from which `offset` applies
    pub since: i64,
    /// Cumulative TAI - UTC difference in seconds
    pub offset: i64,
}

/// TAI - UTC offsets, ascending by date. Append-only: new leap seconds add
/// rows at the end, existing rows never change.
pub const LEAP_SECONDS: &[LeapSecond] = &[
    LeapSecond { since: 63_072_000, offset: 10 },    // 1972-01-01
    LeapSecond { since: 78_796_800, offset: 11 },    // 1972-07-01
    LeapSecond { since: 94_694_400, offset: 12 },    // 1973-01-01
    LeapSecond { since: 126_230_400, offset: 13 },   // 1974-01-01
    LeapSecond { since: 157_766_400, offset: 14 },   // 1975-01-01
    LeapSecond { since: 189_302_400, offset: 15 },   // 1976-01-01
    LeapSecond { since: 220_924_800, offset: 16 },   // 1977-01-01
    LeapSecond { since: 252_460_800, offset: 17 },   // 1978-01-01
    LeapSecond { since: 283_996_800, offset: 18 },   // 1979-01-01
    LeapSecond { since: 315_532_800, offset: 19 },   // 1980-01-01
    LeapSecond { since: 362_793_600, offset: 20 },   // 1981-07-01
    LeapSecond { since: 394_329_600, offset: 21 },   // 1982-07-01
    LeapSecond { since: 425_865_600, offset: 22 },   // 1983-07-01
    LeapSecond { since: 489_024_000, offset: 23 },   // 1985-07-01
    LeapSecond { since: 567_993_600, offset: 24 },   // 1988-01-01
    LeapSecond { since: 631_152_000, offset: 25 },   // 1990-01-01
    LeapSecond { since: 662_688_000, offset: 26 },   // 1991-01-01
    LeapSecond { since: 709_948_800, offset: 27 },   // 1992-07-01
    LeapSecond { since: 741_484_800, offset: 28 },   // 1993-07-01
    LeapSecond { since: 773_020_800, offset: 29 },   // 1994-07-01
    LeapSecond { since: 820_454_400, offset: 30 },   // 1996-01-01
    LeapSecond { since: 867_715_200, offset: 31 },   // 1997-07-01
    LeapSecond { since: 915_148_800, offset: 32 },   // 1999-01-01
    LeapSecond { since: 1_136_073_600, offset: 33 }, // 2006-01-01
    LeapSecond { since: 1_230_768_000, offset: 34 }, // 2009-01-01
    LeapSecond { since: 1_341_100_800, offset: 35 }, // 2012-07-01
    LeapSecond { since: 1_435_708_800, offset: 36 }, // 2015-07-01
    LeapSecond { since: 1_483_228_800, offset: 37 }, // 2017-01-01
];

const MAX_NANOS: u32 = 999_999_999;

/// TAI - UTC offset in effect at `unix_seconds`; zero before the table.
#[must_use]
pub fn leap_offset(unix_seconds: i64) -> i64 {
    LEAP_SECONDS
        .iter()
        .rev()
        .find(|entry| entry.since <= unix_seconds)
        .map_or(0, |entry| entry.offset)
}

/// Write the calendar form. `NANOSECONDS` wins over `MICROSECONDS`.
pub fn write_calendar<Tz: TimeZone>(buf: &mut ScratchBuffer, t: &DateTime<Tz>, flags: FlagSet) {
    let year = t.year();
    if year < 0 {
        buf.push(b'-');
    }
    buf.append_int_width(u64::from(year.unsigned_abs()), 4);
    buf.push(b'-');
    buf.append_int_width(u64::from(t.month()), 2);
    buf.push(b'-');
    buf.append_int_width(u64::from(t.day()), 2);
    buf.push(b'T');
    buf.append_int_width(u64::from(t.hour()), 2);
    buf.push(b':');
    buf.append_int_width(u64::from(t.minute()), 2);
    buf.push(b':');
    buf.append_int_width(u64::from(t.second()), 2);

    // chrono reports leap seconds as nanos >= 1e9
    let nanos = t.nanosecond().min(MAX_NANOS);
    if flags.has(FlagSet::NANOSECONDS) {
        buf.push(b'.');
        buf.append_int_width(u64::from(nanos), 9);
    } else if flags.has(FlagSet::MICROSECONDS) {
        buf.push(b'.');
        buf.append_int_width(u64::from(nanos / 1_000), 6);
    }

    let offset = t.offset().fix().local_minus_utc();
    if offset == 0 {
        buf.push(b'Z');
    } else {
        buf.push(if offset < 0 { b'-' } else { b'+' });
        let offset = u64::from(offset.unsigned_abs());
        buf.append_int_width(offset / 3600, 2);
        buf.push(b':');
        buf.append_int_width((offset % 3600) / 60, 2);
    }
}

/// Write the TAI64N form. Instants before the Unix epoch clamp to zero
/// seconds.
pub fn write_tai64n<Tz: TimeZone>(buf: &mut ScratchBuffer, t: &DateTime<Tz>) {
    let seconds = t.timestamp();
    let tai = seconds.saturating_add(leap_offset(seconds)).max(0);
    let nanos = t.timestamp_subsec_nanos().min(MAX_NANOS);

    buf.push_str("@4");
    buf.append_hex_width(tai as u64, 15);
    buf.append_hex_width(u64::from(nanos), 8);
}

/// Write whichever form `flags` selects.
pub fn write_time<Tz: TimeZone>(buf: &mut ScratchBuffer, t: &DateTime<Tz>, flags: FlagSet) {
    if flags.has(FlagSet::TAI64N) {
        write_tai64n(buf, t);
    } else {
        write_calendar(buf, t, flags);
    }
}

/// Calendar form as an owned string.
#[must_use]
pub fn format_calendar<Tz: TimeZone>(t: &DateTime<Tz>, flags: FlagSet) -> String {
    let mut buf = ScratchBuffer::with_capacity(40);
    write_calendar(&mut buf, t, flags);
    buf.to_string_lossy()
}
