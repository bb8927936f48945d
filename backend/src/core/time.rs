//! Calendar for the monthly simulation clock
//!
//! The economy advances in whole months. Month 0 is the initial state before
//! the first step; the first simulated month is month 1.

use serde::{Deserialize, Serialize};

/// Months in one simulated year
pub const MONTHS_PER_YEAR: u32 = 12;

/// Monthly simulation clock
///
/// # Example
/// ```
/// use econosim_core_rs::Calendar;
///
/// let mut calendar = Calendar::new();
/// assert_eq!(calendar.current_month(), 0);
///
/// calendar.advance_month();
/// assert_eq!(calendar.current_month(), 1);
/// assert_eq!(calendar.year(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Months elapsed since the simulation start
    current_month: u32,
}

impl Calendar {
    /// Create a calendar positioned at month 0
    pub fn new() -> Self {
        Self { current_month: 0 }
    }

    /// Resume a calendar at a given month (checkpoint restore)
    pub fn at_month(month: u32) -> Self {
        Self {
            current_month: month,
        }
    }

    /// Advance by one month and return the new month number
    pub fn advance_month(&mut self) -> u32 {
        self.current_month += 1;
        self.current_month
    }

    /// Months elapsed since start
    pub fn current_month(&self) -> u32 {
        self.current_month
    }

    /// Completed simulated years
    ///
    /// # Example
    /// ```
    /// use econosim_core_rs::Calendar;
    ///
    /// let calendar = Calendar::at_month(25);
    /// assert_eq!(calendar.year(), 2);
    /// assert_eq!(calendar.month_of_year(), 1);
    /// ```
    pub fn year(&self) -> u32 {
        self.current_month / MONTHS_PER_YEAR
    }

    /// Position within the current year (0-indexed)
    pub fn month_of_year(&self) -> u32 {
        self.current_month % MONTHS_PER_YEAR
    }

    /// True on the month a new year begins (agents age on this month)
    pub fn is_year_boundary(&self) -> bool {
        self.current_month > 0 && self.month_of_year() == 0
    }
}
