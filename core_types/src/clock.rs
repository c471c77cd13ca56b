//! Clock abstraction
//!
//! Every component reads time through a [`Clock`] so tests can drive
//! expiry windows and dedup windows without sleeping.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock and monotonic time source
pub trait Clock: Send + Sync + Debug {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic time since an arbitrary fixed origin
    fn monotonic(&self) -> Duration;

    /// Current wall-clock time as milliseconds since the Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Real system clock
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for tests.
///
/// Wall-clock and monotonic readings move together.
#[derive(Debug)]
pub struct ManualClock {
    wall_millis: AtomicI64,
    mono_millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock starting at the given wall-clock time
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            wall_millis: AtomicI64::new(start.timestamp_millis()),
            mono_millis: AtomicI64::new(0),
        }
    }

    /// Create a clock starting at a fixed, arbitrary date
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }

    pub fn advance(&self, by: Duration) {
        let millis = by.as_millis() as i64;
        self.wall_millis.fetch_add(millis, Ordering::SeqCst);
        self.mono_millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Jump the wall clock without touching the monotonic reading
    pub fn set_wall(&self, at: DateTime<Utc>) {
        self.wall_millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.wall_millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }

    fn monotonic(&self) -> Duration {
        Duration::from_millis(self.mono_millis.load(Ordering::SeqCst).max(0) as u64)
    }

    fn now_millis(&self) -> i64 {
        self.wall_millis.load(Ordering::SeqCst)
    }
}
