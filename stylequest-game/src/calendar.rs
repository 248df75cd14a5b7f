//! Calendar days and the clock that produces them.
//!
//! Every "is this the same day?" decision in the crate goes through
//! [`CalendarDay`], derived from a single injected [`Clock`].
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

const DAY_FORMAT: &str = "%Y-%m-%d";
/// `Date.toDateString()` form written by the web client, e.g. `Thu Oct 15 2026`.
const LEGACY_DAY_FORMAT: &str = "%a %b %d %Y";

/// A local calendar date, stored as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    /// The day before, or `None` at the start of the supported range.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    #[must_use]
    pub fn plus_days(self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }

    /// True when `self` is exactly one day after `earlier`.
    #[must_use]
    pub fn follows(self, earlier: Self) -> bool {
        earlier.next() == Some(self)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = chrono::ParseError;

    /// Accepts ISO days and falls back to the legacy web-client form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .or_else(|err| NaiveDate::parse_from_str(s, LEGACY_DAY_FORMAT).map_err(|_| err))
            .map(Self)
    }
}

/// Source of "now" for rotation and streak decisions.
pub trait Clock {
    /// The user's current calendar day.
    fn today(&self) -> CalendarDay;

    /// Current instant, used for completion timestamps.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock; the calendar day follows the machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDay {
        CalendarDay(Local::now().date_naive())
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a chosen day. Interior mutability lets callers move time
/// forward while an engine owns the clock.
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: Cell<CalendarDay>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(day: CalendarDay) -> Self {
        Self {
            day: Cell::new(day),
        }
    }

    pub fn set_day(&self, day: CalendarDay) {
        self.day.set(day);
    }

    /// Move the clock forward by `days` calendar days.
    pub fn advance_days(&self, days: u64) {
        if let Some(next) = self.day.get().plus_days(days) {
            self.day.set(next);
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> CalendarDay {
        self.day.get()
    }

    fn now(&self) -> DateTime<Utc> {
        self.day.get().0.and_time(NaiveTime::MIN).and_utc()
    }
}
