//! Property-based tests for rust_kvline using proptest

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_kvline::core::encoder;
use rust_kvline::core::time_format;
use rust_kvline::prelude::*;
use rust_kvline::ScratchBuffer;

/// Undo the four-character text escaping.
fn unescape_text(escaped: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(escaped.len());
    let mut iter = escaped.iter().copied();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match iter.next() {
            Some(b'"') => out.push(b'"'),
            Some(b't') => out.push(b'\t'),
            Some(b'r') => out.push(b'\r'),
            Some(b'n') => out.push(b'\n'),
            Some(other) => {
                out.push(b'\\');
                out.push(other);
            }
            None => out.push(b'\\'),
        }
    }
    out
}

fn level_strategy() -> impl Strategy<Value = Level> {
    prop_oneof![Just(Level::Debug), Just(Level::Info), Just(Level::Fatal)]
}

// ============================================================================
// Encoder Tests
// ============================================================================

proptest! {
    /// Values made of the four special characters and safe filler
    /// round-trip through escaping
    #[test]
    fn test_text_escape_round_trip(s in "[\"\t\r\na-z ]{0,64}") {
        let mut buf = ScratchBuffer::default();
        encoder::escape_text(&mut buf, s.as_bytes());
        prop_assert_eq!(unescape_text(buf.as_bytes()), s.as_bytes().to_vec());
        prop_assert!(!buf.as_bytes().contains(&b'\n'));
    }

    /// Bytes outside the four-character set are never altered
    #[test]
    fn test_text_escape_leaves_other_bytes(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        let filtered: Vec<u8> = bytes
            .into_iter()
            .filter(|b| !matches!(b, b'"' | b'\t' | b'\r' | b'\n'))
            .collect();
        let mut buf = ScratchBuffer::default();
        encoder::escape_text(&mut buf, &filtered);
        prop_assert_eq!(buf.as_bytes(), &filtered[..]);
    }

    /// JSON escaping always yields a string serde_json can read back
    #[test]
    fn test_json_escape_parses(s in any::<String>()) {
        let mut buf = ScratchBuffer::default();
        encoder::write_json_string(&mut buf, s.as_bytes());
        let parsed: String = serde_json::from_str(&buf.to_string_lossy()).unwrap();
        prop_assert_eq!(parsed, s);
    }

    /// Invalid UTF-8 never breaks JSON output; each bad byte becomes U+FFFD
    #[test]
    fn test_json_escape_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut buf = ScratchBuffer::default();
        encoder::write_json_string(&mut buf, &bytes);
        let text = std::str::from_utf8(buf.as_bytes()).unwrap();
        let parsed: String = serde_json::from_str(text).unwrap();
        let mut expected = String::new();
        for chunk in bytes.utf8_chunks() {
            expected.push_str(chunk.valid());
            expected.extend(chunk.invalid().iter().map(|_| char::REPLACEMENT_CHARACTER));
        }
        prop_assert_eq!(parsed, expected);
    }
}

// ============================================================================
// Ordering Tests
// ============================================================================

proptest! {
    /// Sorted map output lists keys in ascending byte order, each once
    #[test]
    fn test_sorted_keys_non_decreasing(
        entries in prop::collection::hash_map("[a-z]{1,8}", 0i64..1000, 0..20)
    ) {
        let map: Map = entries.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let out = SharedBuffer::new();
        let logger = Logger::new(out.clone(), FlagSet::SORT);
        logger.infom("m", &map);

        let line = out.to_string_lossy();
        let keys: Vec<&str> = line
            .trim_end()
            .split(' ')
            .skip(1)
            .filter_map(|pair| pair.split('=').next())
            .collect();

        let mut expected: Vec<&str> = entries.keys().map(String::as_str).collect();
        expected.sort_unstable();
        prop_assert_eq!(keys, expected);
    }

    /// Without sorting every key still appears exactly once
    #[test]
    fn test_unsorted_renders_every_key(
        entries in prop::collection::hash_map("[a-z]{1,8}", any::<bool>(), 0..20)
    ) {
        let map: Map = entries.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let out = SharedBuffer::new();
        let logger = Logger::new(out.clone(), FlagSet::LEVEL);
        logger.infom("m", &map);

        let line = out.to_string_lossy();
        let mut keys: Vec<&str> = line
            .trim_end()
            .split(' ')
            .skip(2)
            .filter_map(|pair| pair.split('=').next())
            .collect();
        keys.sort_unstable();

        let mut expected: Vec<&str> = entries.keys().map(String::as_str).collect();
        expected.sort_unstable();
        prop_assert_eq!(keys, expected);
    }

    /// JSON members keep the fixed prefix order for any flag combination
    #[test]
    fn test_json_member_order(bits in 0u64..512, level in level_strategy()) {
        let flags = FlagSet::from_bits(bits) - FlagSet::DEBUG;
        let out = SharedBuffer::new();
        let logger = Logger::with_formatter(out.clone(), flags, JsonFormatter::new());
        logger.emit(level, "m", Fields::Empty, Some(Caller::new("a.rs", 1)));

        let line = out.to_string_lossy();
        let position = |name: &str| line.find(&format!("\"{}\":", name));
        let order: Vec<usize> = ["time", "level", "caller", "msg"]
            .iter()
            .filter_map(|name| position(name))
            .collect();
        prop_assert!(order.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(position("msg").is_some());
    }
}

// ============================================================================
// Time Format Tests
// ============================================================================

proptest! {
    /// Fraction digits follow the precision flags
    #[test]
    fn test_fraction_digits(secs in 0i64..4_000_000_000, nanos in 0u32..1_000_000_000) {
        let t = Utc.timestamp_opt(secs, nanos).unwrap();
        let fraction = |flags: FlagSet| {
            let s = time_format::format_calendar(&t, flags);
            s.split_once('.').map_or(0, |(_, rest)| rest.trim_end_matches('Z').len())
        };

        prop_assert_eq!(fraction(FlagSet::empty()), 0);
        prop_assert_eq!(fraction(FlagSet::MICROSECONDS), 6);
        prop_assert_eq!(fraction(FlagSet::NANOSECONDS), 9);
        prop_assert_eq!(fraction(FlagSet::MICROSECONDS | FlagSet::NANOSECONDS), 9);
    }

    /// TAI64N labels are fixed width and ordered like the instants
    #[test]
    fn test_tai64n_monotonic(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000, n in 0u32..1_000_000_000) {
        let render = |secs: i64| {
            let mut buf = ScratchBuffer::default();
            time_format::write_tai64n(&mut buf, &Utc.timestamp_opt(secs, n).unwrap());
            buf.to_string_lossy()
        };
        let (ra, rb) = (render(a), render(b));
        prop_assert_eq!(ra.len(), 25);
        prop_assert!(ra.starts_with("@4"));
        prop_assert_eq!(a.cmp(&b), ra.cmp(&rb));
    }

    /// Calendar output parses back to the same instant at microsecond precision
    #[test]
    fn test_calendar_parses(secs in 0i64..4_000_000_000, micros in 0u32..1_000_000) {
        let t = Utc.timestamp_opt(secs, micros * 1_000).unwrap();
        let s = time_format::format_calendar(&t, FlagSet::MICROSECONDS);
        let parsed = chrono::DateTime::parse_from_rfc3339(&s).unwrap();
        prop_assert_eq!(parsed.with_timezone(&Utc), t);
    }
}

// ============================================================================
// Flags and Level Tests
// ============================================================================

proptest! {
    /// Debug output is empty whenever the debug bit is unset
    #[test]
    fn test_debug_gated(bits in 0u64..512, msg in ".{0,32}") {
        let flags = FlagSet::from_bits(bits) - FlagSet::DEBUG;
        let out = SharedBuffer::new();
        let logger = Logger::new(out.clone(), flags);
        logger.debug(&msg);
        logger.debugx(&msg, &[attr("k", "v")]);
        prop_assert!(out.is_empty());
    }

    /// Flag names round-trip through Display-style name lists
    #[test]
    fn test_flag_names_round_trip(bits in 0u64..512) {
        let flags = FlagSet::from_bits(bits);
        let json = serde_json::to_string(&flags).unwrap();
        let parsed: FlagSet = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, flags);
    }

    /// Level names and tags both parse back
    #[test]
    fn test_level_round_trip(level in level_strategy(), lower in any::<bool>()) {
        let name = if lower { level.to_str().to_string() } else { level.to_str().to_uppercase() };
        prop_assert_eq!(name.parse::<Level>().unwrap(), level);
        prop_assert_eq!(level.tag().parse::<Level>().unwrap(), level);
    }

    /// Every emitted text line is exactly one line
    #[test]
    fn test_single_line(msg in ".{0,64}", value in ".{0,64}", bits in 0u64..512) {
        let out = SharedBuffer::new();
        let logger = Logger::with_formatter(
            out.clone(),
            FlagSet::from_bits(bits) | FlagSet::LEVEL,
            StructuredFormatter::new(),
        );
        logger.infox(&msg, &[attr("v", value)]);
        let text = out.to_string_lossy();
        prop_assert!(text.ends_with('\n'));
        prop_assert_eq!(text.matches('\n').count(), 1);
    }
}
