//! Selectability rules: the valid date window, explicitly disabled dates and
//! disabled weekdays.
use chrono::{Datelike, NaiveDate, Weekday};
use derive_setters::Setters;
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::{date::WeekStart, error::CalendarError};

/// An inclusive window of selectable days plus explicit exclusions.
///
/// A missing bound leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidRange {
    /// First selectable day.
    #[setters(strip_option)]
    pub start_date: Option<NaiveDate>,
    /// Last selectable day.
    #[setters(strip_option)]
    pub end_date: Option<NaiveDate>,
    /// Days that are never selectable.
    pub disabled_dates: Vec<NaiveDate>,
}

impl ValidRange {
    /// Reports a window whose end precedes its start.
    ///
    /// Such a window is still accepted by [`RangeChecker`], which then treats
    /// every day as outside the window.
    pub fn validate(&self) -> Result<(), CalendarError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => {
                Err(CalendarError::InvalidValidRange { start, end })
            }
            _ => Ok(()),
        }
    }
}

/// A set of weekdays, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisabledWeekdays(u8);

impl DisabledWeekdays {
    /// No disabled weekdays.
    pub const NONE: Self = Self(0);

    /// Returns a set containing `weekdays`.
    pub fn new(weekdays: &[Weekday]) -> Self {
        weekdays.iter().copied().collect()
    }

    /// Adds `weekday` to the set.
    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_monday();
    }

    /// Returns true when `weekday` is in the set.
    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    /// Returns true when no weekday is disabled.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Weekday> for DisabledWeekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::NONE;
        for weekday in iter {
            set.insert(weekday);
        }
        set
    }
}

/// Classifies days as disabled or inside the valid window.
///
/// Build one per `(disabled weekdays, valid range)` pair and reuse it for every
/// grid.
#[derive(Debug, Clone, Default)]
pub struct RangeChecker {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    disabled_dates: FxHashSet<NaiveDate>,
    disabled_weekdays: DisabledWeekdays,
    empty_window: bool,
}

impl RangeChecker {
    /// Creates a checker for the given rules.
    pub fn new(disabled_weekdays: DisabledWeekdays, valid_range: Option<&ValidRange>) -> Self {
        let Some(range) = valid_range else {
            return Self {
                disabled_weekdays,
                ..Self::default()
            };
        };

        let empty_window = match range.validate() {
            Ok(()) => false,
            Err(err) => {
                warn!(%err, "no day is selectable");
                true
            }
        };

        Self {
            start_date: range.start_date,
            end_date: range.end_date,
            disabled_dates: range.disabled_dates.iter().copied().collect(),
            disabled_weekdays,
            empty_window,
        }
    }

    /// Returns true when the day falls on a disabled weekday or is explicitly
    /// disabled.
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        self.disabled_weekdays.contains(date.weekday()) || self.disabled_dates.contains(&date)
    }

    /// Returns true when the day lies inside the inclusive valid window.
    pub fn is_within_valid_range(&self, date: NaiveDate) -> bool {
        if self.empty_window {
            return false;
        }
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    /// Returns true when the day can be pressed.
    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.is_within_valid_range(date) && !self.is_disabled(date)
    }

    /// Returns true when the weekday column at `day_index` should be shown.
    ///
    /// Renderers hide the columns of disabled weekdays.
    pub fn shows_column(&self, day_index: u32, week_start: WeekStart) -> bool {
        !self
            .disabled_weekdays
            .contains(week_start.weekday_at(day_index))
    }

    /// Returns the disabled weekdays.
    pub fn disabled_weekdays(&self) -> DisabledWeekdays {
        self.disabled_weekdays
    }
}
