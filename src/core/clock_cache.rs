//! Cached "current time" string
//!
//! [`ClockCache`] keeps the current UTC time formatted to the second and
//! refreshes it from a single background thread, so callers that accept
//! up to a second of staleness pay for formatting at most once per second.
//! The first read computes the value and starts the refresher. Readers
//! load the stored string through an `ArcSwapOption` and never wait on
//! the refresher. Time comes from a [`Clock`], which tests replace with a
//! [`ManualClock`].

use super::flags::FlagSet;
use super::time_format;
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread;
use std::time::Duration;

/// Default refresh period of the background thread
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

pub struct ClockCache {
    clock: Arc<dyn Clock>,
    value: ArcSwapOption<String>,
    started: AtomicBool,
    /// Start the refresher from the first `get`
    auto_start: bool,
    interval: Duration,
}

impl ClockCache {
    /// Create a cache over `clock`. Nothing is computed and no thread is
    /// started until the first [`get`](Self::get), which does both.
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Self::with_interval(clock, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_interval(clock: Arc<dyn Clock>, interval: Duration) -> Arc<Self> {
        Self::build(clock, interval, true)
    }

    /// Cache that only changes on [`refresh`](Self::refresh) or after an
    /// explicit [`start`](Self::start). Reads never spawn a thread.
    pub fn manual(clock: Arc<dyn Clock>) -> Arc<Self> {
        Self::build(clock, DEFAULT_REFRESH_INTERVAL, false)
    }

    fn build(clock: Arc<dyn Clock>, interval: Duration, auto_start: bool) -> Arc<Self> {
        Arc::new(Self {
            clock,
            value: ArcSwapOption::empty(),
            started: AtomicBool::new(false),
            auto_start,
            interval,
        })
    }

    /// Process-wide cache over the system clock, refresher already running.
    pub fn global() -> &'static Arc<ClockCache> {
        static GLOBAL: OnceLock<Arc<ClockCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let cache = ClockCache::new(Arc::new(SystemClock));
            cache.refresh();
            cache.start();
            cache
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Last stored value. If nothing was stored yet, compute and store it
    /// synchronously, then start the refresher.
    pub fn get(self: &Arc<Self>) -> Arc<String> {
        if let Some(value) = self.value.load_full() {
            return value;
        }
        let value = self.refresh();
        if self.auto_start {
            self.start();
        }
        value
    }

    /// Recompute from the clock and swap the new string in.
    pub fn refresh(&self) -> Arc<String> {
        let formatted = Arc::new(time_format::format_calendar(
            &self.clock.now(),
            FlagSet::empty(),
        ));
        self.value.store(Some(Arc::clone(&formatted)));
        formatted
    }

    /// Spawn the refresher thread. Returns `true` only for the call that
    /// actually spawned it. The thread exits once the cache is dropped.
    pub fn start(self: &Arc<Self>) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let weak: Weak<ClockCache> = Arc::downgrade(self);
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("clock-cache".to_string())
            .spawn(move || loop {
                thread::sleep(interval);
                match weak.upgrade() {
                    Some(cache) => {
                        cache.refresh();
                    }
                    None => break,
                }
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                eprintln!("[LOGGER WARNING] Failed to start clock refresher: {}", e);
                self.started.store(false, Ordering::Release);
                false
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ClockCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockCache")
            .field("value", &self.value.load_full())
            .field("started", &self.is_started())
            .field("interval", &self.interval)
            .finish()
    }
}
