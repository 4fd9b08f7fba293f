//! Monthly calendar for the history simulation
//!
//! The simulation advances one month per turn. Dates are (year, month)
//! pairs with a total order, so war durations and snapshot keys can be
//! computed by simple ordinal arithmetic.

use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u8 = 12;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// A simulated calendar month. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthDate {
    pub year: i32,
    pub month: u8,
}

impl MonthDate {
    pub fn new(year: i32, month: u8) -> Self {
        debug_assert!((1..=MONTHS_PER_YEAR).contains(&month));
        Self { year, month }
    }

    /// Months since year 0, January
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * MONTHS_PER_YEAR as i64 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        let year = ordinal.div_euclid(MONTHS_PER_YEAR as i64) as i32;
        let month = ordinal.rem_euclid(MONTHS_PER_YEAR as i64) as u8 + 1;
        Self { year, month }
    }

    pub fn next(&self) -> Self {
        Self::from_ordinal(self.ordinal() + 1)
    }

    pub fn previous(&self) -> Self {
        Self::from_ordinal(self.ordinal() - 1)
    }

    /// Whole months elapsed from `earlier` to `self` (negative if `earlier` is later)
    pub fn months_since(&self, earlier: MonthDate) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month.clamp(1, MONTHS_PER_YEAR) - 1) as usize]
    }

    /// Stable key used for per-month artifact file names
    pub fn file_key(&self) -> String {
        format!("{:05}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for MonthDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of year {}", self.month_name(), self.year)
    }
}

/// Calendar tracks the current simulated month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    start: MonthDate,
    elapsed_months: u32,
}

impl Calendar {
    pub fn new(start: MonthDate) -> Self {
        Self {
            start,
            elapsed_months: 0,
        }
    }

    pub fn advance(&mut self) {
        self.elapsed_months += 1;
    }

    pub fn start(&self) -> MonthDate {
        self.start
    }

    pub fn current(&self) -> MonthDate {
        MonthDate::from_ordinal(self.start.ordinal() + self.elapsed_months as i64)
    }

    pub fn elapsed_months(&self) -> u32 {
        self.elapsed_months
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(MonthDate::new(1000, 1))
    }
}
