use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Rebuttal term in business days when a selected law carries the short
/// statute, and otherwise.
pub const SHORT_TERM_DAYS: u8 = 5;
pub const STANDARD_TERM_DAYS: u8 = 10;

// Bounds the calendar walk; generous for a 10-business-day term even across
// year-end holiday clusters.
const MAX_WALK_DAYS: u32 = 60;

/// Argentine national holidays, 2024 and 2025.
const NATIONAL_HOLIDAYS: [(i32, u32, u32); 34] = [
    (2024, 1, 1),
    (2024, 2, 12),
    (2024, 2, 13),
    (2024, 3, 24),
    (2024, 3, 29),
    (2024, 4, 1),
    (2024, 4, 2),
    (2024, 5, 1),
    (2024, 5, 25),
    (2024, 6, 17),
    (2024, 6, 20),
    (2024, 6, 21),
    (2024, 7, 9),
    (2024, 8, 17),
    (2024, 10, 11),
    (2024, 10, 12),
    (2024, 11, 18),
    (2024, 12, 8),
    (2024, 12, 25),
    (2025, 1, 1),
    (2025, 3, 3),
    (2025, 3, 4),
    (2025, 3, 24),
    (2025, 4, 2),
    (2025, 4, 18),
    (2025, 5, 1),
    (2025, 5, 25),
    (2025, 6, 20),
    (2025, 7, 9),
    (2025, 8, 17),
    (2025, 10, 12),
    (2025, 11, 20),
    (2025, 12, 8),
    (2025, 12, 25),
];

/// Set of non-working dates injected into the deadline calculation.
///
/// Outside the covered years the computation degrades to weekend-only
/// skipping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Calendar preloaded with the Argentine 2024–2025 national holidays.
    pub fn argentine() -> Self {
        let dates = NATIONAL_HOLIDAYS
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .collect();
        Self { dates }
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// A business day is neither a weekend day nor a calendar holiday.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.contains(date)
    }
}

/// Computed legal response window for an infraction act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuttalTerm {
    pub business_days: u8,
    pub due_date: NaiveDate,
}

/// True when any selected law label denotes the 5-day statute.
pub fn uses_short_term(laws: &[String]) -> bool {
    laws.iter()
        .any(|law| law.contains("ART. 5") || law.contains("ART. N° 5"))
}

/// Walk forward from `start` one calendar day at a time, counting only
/// business days, until the term is exhausted. The stopping date is the due
/// date; it is always a business day itself.
pub fn rebuttal_term(start: NaiveDate, short: bool, calendar: &HolidayCalendar) -> RebuttalTerm {
    let business_days = if short {
        SHORT_TERM_DAYS
    } else {
        STANDARD_TERM_DAYS
    };

    let mut cursor = start;
    let mut counted = 0u8;
    let mut walked = 0u32;
    while counted < business_days && walked < MAX_WALK_DAYS {
        walked += 1;
        cursor += Duration::days(1);
        if calendar.is_business_day(cursor) {
            counted += 1;
        }
    }

    RebuttalTerm {
        business_days,
        due_date: cursor,
    }
}

/// Signed whole-day difference between two local calendar dates: 0 for the
/// same day, positive for future targets, negative for past ones.
pub fn days_until(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}
