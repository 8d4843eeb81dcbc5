//! Integration tests for rust_kvline
//!
//! These tests verify:
//! - Log injection prevention in text formats
//! - File output through configuration
//! - Runtime flag and formatter swaps
//! - Timestamp cache and TAI64N output
//! - Caller location capture

use chrono::{Duration, TimeZone, Utc};
use rust_kvline::prelude::*;
use rust_kvline::{infof, ManualClock};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2016, 1, 11, 12, 13, 14).unwrap(),
    ))
}

#[test]
fn test_log_injection_prevention() {
    let out = SharedBuffer::new();
    let logger = Logger::new(out.clone(), FlagSet::LEVEL);

    let malicious = "User login\nlevel=\"F\" msg=\"Fake error injected\"\nContinuation";
    logger.infox(malicious, &[attr("user", "bob\nlevel=\"F\"")]);

    let lines = out.lines();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(lines[0].starts_with("level=\"I\" msg=\"User login\\nlevel=\\\"F\\\""));
    assert!(lines[0].ends_with("user=\"bob\\nlevel=\\\"F\\\"\""));
}

#[test]
fn test_json_injection_prevention() {
    let out = SharedBuffer::new();
    let logger = Logger::with_formatter(out.clone(), FlagSet::LEVEL, JsonFormatter::new());

    logger.infox("a\"}\n{\"msg\":\"b", &[attr("html", "<script>&</script>")]);

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed["msg"], "a\"}\n{\"msg\":\"b");
    assert_eq!(parsed["html"], "<script>&</script>");
    assert!(!lines[0].contains('<'));
}

#[test]
fn test_file_logging_from_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let json = format!(
        r#"{{"flags": "level|sort", "format": "plain", "output": {{"file": {}}}}}"#,
        serde_json::to_string(&log_file).unwrap()
    );
    let config = LoggerConfig::from_json(&json).expect("Failed to parse config");
    let logger = LoggerBuilder::from_config(&config)
        .expect("Failed to open log file")
        .build();

    for i in 0..10 {
        infof!(logger, "Message {}", i);
    }
    logger.infom("done", &Map::from([("count", 10)]));
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "level=\"I\" msg=\"Message 0\"");
    assert_eq!(lines[10], "level=\"I\" msg=\"done\" count=\"10\"");
    assert_eq!(logger.metrics().lines_written(), 11);
    assert_eq!(logger.metrics().bytes_written(), content.len() as u64);
}

#[test]
fn test_file_logging_appends_across_loggers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("append.log");

    for run in 0..2 {
        let logger = Logger::new(
            rust_kvline::open_file(&log_file).expect("Failed to open"),
            FlagSet::LEVEL,
        );
        logger.infox("run", &[attr("n", run)]);
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(
        content,
        "level=\"I\" msg=\"run\" n=\"0\"\nlevel=\"I\" msg=\"run\" n=\"1\"\n"
    );
}

#[test]
fn test_debug_toggled_at_runtime() {
    let out = SharedBuffer::new();
    let logger = Logger::new(out.clone(), FlagSet::LEVEL);

    logger.debug("hidden");
    let mut flags = logger.flags();
    flags.insert(FlagSet::DEBUG);
    logger.set_flags(flags);
    logger.debug("visible");
    flags.remove(FlagSet::DEBUG);
    logger.set_flags(flags);
    logger.debug("hidden again");

    assert_eq!(out.lines(), vec!["level=\"D\" msg=\"visible\""]);
    assert_eq!(logger.metrics().lines_written(), 1);
}

#[test]
fn test_formatter_swap_between_all_kinds() {
    let clock = fixed_clock();
    let out = SharedBuffer::new();
    let logger = Logger::with_formatter(
        out.clone(),
        FlagSet::TIMESTAMP | FlagSet::LEVEL,
        PlainFormatter::with_cache(ClockCache::manual(clock.clone())),
    );

    logger.info("plain");
    logger.set_formatter(JsonFormatter::with_clock(clock.clone()));
    logger.info("json");
    logger.set_formatter(StructuredFormatter::with_clock(clock.clone()));
    logger.set_flags(FlagSet::TAI64N | FlagSet::LEVEL);
    logger.info("structured");

    assert_eq!(
        out.lines(),
        vec![
            "time=\"2016-01-11T12:13:14Z\" level=\"I\" msg=\"plain\"",
            "{\"time\":\"2016-01-11T12:13:14Z\",\"level\":\"I\",\"msg\":\"json\"}",
            "time=\"@4000000056939c7e00000000\" level=\"I\" msg=\"structured\"",
        ]
    );
}

#[test]
fn test_clock_cache_refresh_is_observed() {
    let clock = fixed_clock();
    let cache = ClockCache::manual(clock.clone());
    let out = SharedBuffer::new();
    let logger = Logger::with_formatter(
        out.clone(),
        FlagSet::TIMESTAMP,
        PlainFormatter::with_cache(cache.clone()),
    );

    logger.info("before");
    clock.advance(Duration::seconds(2));
    logger.info("stale");
    cache.refresh();
    logger.info("after");

    assert_eq!(
        out.lines(),
        vec![
            "time=\"2016-01-11T12:13:14Z\" msg=\"before\"",
            "time=\"2016-01-11T12:13:14Z\" msg=\"stale\"",
            "time=\"2016-01-11T12:13:16Z\" msg=\"after\"",
        ]
    );
}

#[test]
fn test_system_clock_timestamps_parse() {
    let out = SharedBuffer::new();
    let logger = Logger::with_formatter(
        out.clone(),
        FlagSet::TIMESTAMP | FlagSet::NANOSECONDS,
        StructuredFormatter::new(),
    );
    logger.info("now");

    let line = out.lines().remove(0);
    let time = line
        .strip_prefix("time=\"")
        .and_then(|rest| rest.split('"').next())
        .expect("time field");
    let parsed = chrono::DateTime::parse_from_rfc3339(time).expect("valid RFC 3339");
    assert!((Utc::now() - parsed.with_timezone(&Utc)).num_seconds().abs() < 60);
}

#[test]
fn test_caller_long_and_short() {
    let out = SharedBuffer::new();
    let logger = Logger::new(out.clone(), FlagSet::LONGFILE);

    let line = line!() + 1;
    logger.print("long");
    logger.set_flags(FlagSet::SHORTFILE);
    let short_line = line!() + 1;
    logger.print("short");

    let lines = out.lines();
    assert_eq!(
        lines[0],
        format!("caller=\"{}:{}\" msg=\"long\"", file!(), line)
    );
    assert_eq!(
        lines[1],
        format!("caller=\"integration_tests.rs:{}\" msg=\"short\"", short_line)
    );
}

#[test]
fn test_default_logger_settings() {
    let logger = default_logger();
    assert_eq!(logger.formatter().name(), "plain");
    assert!(logger.flags().has(FlagSet::TIMESTAMP));
}

#[test]
fn test_test_writer_sink() {
    let logger = Logger::new(TestWriter, FlagSet::LEVEL);
    logger.info("visible only when this test fails");
    assert_eq!(logger.metrics().write_failures(), 0);
    assert_eq!(logger.metrics().lines_written(), 1);
}

#[test]
fn test_builder_with_custom_formatter() {
    struct Upper;

    impl FormatWriter for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn emit(&self, logger: &Logger, record: &Record<'_>) {
            let line = format!("{} {}\n", record.level.tag(), record.message.to_uppercase());
            logger.write_line(line.as_bytes());
        }
    }

    let out = SharedBuffer::new();
    let logger = Logger::builder()
        .flags(FlagSet::empty())
        .output(out.clone())
        .formatter(Upper)
        .build();
    logger.info("shout");

    assert_eq!(logger.formatter().name(), "upper");
    assert_eq!(out.to_string_lossy(), "I SHOUT\n");
}
