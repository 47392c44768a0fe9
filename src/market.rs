//! Market session clock.
//!
//! Classifies wall-clock time into the trading-session windows the agent
//! schedules around. Classification is a pure function of the clock; the
//! `MarketClock` wrapper only injects where "now" comes from, so the
//! scheduler and tests can share one code path.

use chrono::{DateTime, Timelike, Utc};
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::types::MarketStatus;

// ---------------------------------------------------------------------------
// Session windows
// ---------------------------------------------------------------------------

// Windows are expressed as hour*100 + minute in UTC, both bounds inclusive.
const EU_WINDOW: RangeInclusive<u32> = 800..=1730;
const US_WINDOW: RangeInclusive<u32> = 1630..=2100;
const UK_WINDOW: RangeInclusive<u32> = 800..=1630;

/// Classify an `hour*100 + minute` encoded time of day.
///
/// Checked in priority order, first match wins. The UK window lies entirely
/// inside the EU window, so with the current bounds the UK arm never fires;
/// the ordering is load-bearing and must not be rearranged, and the UK arm
/// stays so that narrowing the EU window does not silently drop UK coverage.
pub fn session_at(hhmm: u32) -> MarketStatus {
    if EU_WINDOW.contains(&hhmm) {
        MarketStatus::EuOpen
    } else if US_WINDOW.contains(&hhmm) {
        MarketStatus::UsOpen
    } else if UK_WINDOW.contains(&hhmm) {
        MarketStatus::UkOpen
    } else {
        MarketStatus::Closed
    }
}

/// Classify a full timestamp by its UTC time of day.
pub fn session_of(instant: DateTime<Utc>) -> MarketStatus {
    session_at(instant.hour() * 100 + instant.minute())
}

// ---------------------------------------------------------------------------
// Time sources
// ---------------------------------------------------------------------------

/// Where the clock reads "now" from.
///
/// Production uses [`SystemClock`]; tests inject a [`FrozenClock`] so loop
/// behaviour can be driven deterministically without real wall-clock time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A time source pinned to a fixed instant. Deterministic, for tests
/// and replays.
pub struct FrozenClock(pub DateTime<Utc>);

impl TimeSource for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Market clock
// ---------------------------------------------------------------------------

/// Session-aware clock handed to the runner and scheduler.
#[derive(Clone)]
pub struct MarketClock {
    source: Arc<dyn TimeSource>,
}

impl MarketClock {
    /// Clock backed by the real system time.
    pub fn system() -> Self {
        Self::with_source(Arc::new(SystemClock))
    }

    pub fn with_source(source: Arc<dyn TimeSource>) -> Self {
        Self { source }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.source.now()
    }

    /// The session window "now" falls into.
    pub fn status(&self) -> MarketStatus {
        session_of(self.now())
    }

    /// The focus description for the current session.
    pub fn focus(&self) -> &'static str {
        self.status().focus()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
