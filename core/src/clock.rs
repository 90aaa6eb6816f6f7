use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, Utc};

/// Source of the current calendar day and timestamp.
///
/// The service never reads the wall clock directly, so day bucketing and
/// `created_at` ordering can be pinned in tests.
pub trait Clock: Send + Sync {
    /// Local calendar date used for day buckets.
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock: local date, UTC timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    state: Mutex<(NaiveDate, DateTime<Utc>)>,
}

impl FixedClock {
    #[must_use]
    pub fn new(today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new((today, now)),
        }
    }

    /// Clock whose timestamp is midday UTC of `today`.
    #[must_use]
    pub fn at_day(today: NaiveDate) -> Self {
        let noon = today
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc();
        Self::new(today, noon)
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.with_state(|state| state.0 = today);
    }

    /// Move the timestamp forward. The calendar day is left alone.
    pub fn advance(&self, by: Duration) {
        self.with_state(|state| state.1 += by);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut (NaiveDate, DateTime<Utc>)) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.with_state(|state| state.0)
    }

    fn now(&self) -> DateTime<Utc> {
        self.with_state(|state| state.1)
    }
}

/// Timestamp text stored in `created_at`, e.g. `2024-01-10T08:15:00.000Z`.
///
/// Fixed width and always UTC, so lexical order matches time order.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
