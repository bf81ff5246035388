//! Gregorian month arithmetic used by the grid generator and the offset
//! translator.
//!
//! Days are `chrono::NaiveDate` and instants are `chrono::NaiveDateTime`; all
//! values are local wall-clock time.
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Number of day columns in a week row.
pub const DAYS_PER_WEEK: u32 = 7;

/// Months in one full Gregorian cycle. Weekdays repeat every 400 years.
pub const MONTHS_PER_CYCLE: i64 = 400 * 12;

const CYCLE_YEARS: i32 = 400;
const CYCLE_BASE_YEAR: i32 = 2000;

/// First column of a week row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeekStart {
    /// Weeks run Sunday to Saturday.
    #[default]
    Sunday,
    /// Weeks run Monday to Sunday.
    Monday,
}

impl WeekStart {
    /// Returns the column (0-6) of `weekday` under this convention.
    pub fn day_index(self, weekday: Weekday) -> u32 {
        match self {
            WeekStart::Sunday => weekday.num_days_from_sunday(),
            WeekStart::Monday => weekday.num_days_from_monday(),
        }
    }

    /// Returns the weekday shown in column `day_index`. Values wrap modulo 7.
    pub fn weekday_at(self, day_index: u32) -> Weekday {
        let first = match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        };
        (0..day_index % DAYS_PER_WEEK).fold(first, |day, _| day.succ())
    }

    /// Returns the seven weekdays in column order.
    pub fn weekdays(self) -> [Weekday; DAYS_PER_WEEK as usize] {
        let mut days = [Weekday::Mon; DAYS_PER_WEEK as usize];
        for (idx, slot) in days.iter_mut().enumerate() {
            *slot = self.weekday_at(idx as u32);
        }
        days
    }
}

/// A year and month pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year/month pair if the month is within 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Returns the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Adds or subtracts months, adjusting the year as needed. The year
    /// saturates at the bounds of `i32`.
    pub fn add_months(&self, delta: i64) -> Self {
        let total = self.ordinal().saturating_add(delta);
        let year = total
            .div_euclid(12)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let month = (total.rem_euclid(12) + 1) as u32;
        Self { year, month }
    }

    /// Returns how many months lie between `self` and `other`. Positive when
    /// `other` is later.
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// Returns the first day of the month, or `None` when the year is outside
    /// the range `chrono` can represent.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Returns the given day of this month, if it exists.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Returns the last day of the month, if representable.
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.day(self.days_in_month())
    }

    /// Returns the number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            _ => 28,
        }
    }

    /// Returns the weekday of the first day of the month.
    ///
    /// Defined for every year: the year is folded into one 400-year cycle
    /// before asking `chrono`.
    pub fn first_weekday(&self) -> Weekday {
        let folded = CYCLE_BASE_YEAR + self.year.rem_euclid(CYCLE_YEARS);
        NaiveDate::from_ymd_opt(folded, self.month, 1)
            .map(|date| date.weekday())
            .unwrap_or(Weekday::Mon)
    }

    /// Returns how many padding cells precede day 1 in the first week row.
    pub fn leading_padding(&self, week_start: WeekStart) -> u32 {
        week_start.day_index(self.first_weekday())
    }

    /// Returns the number of week rows (4, 5 or 6) needed to lay out the
    /// month.
    pub fn week_rows(&self, week_start: WeekStart) -> u32 {
        (self.leading_padding(week_start) + self.days_in_month()).div_ceil(DAYS_PER_WEEK)
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        YearMonth::of(date)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Returns true for Gregorian leap years.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Returns 23:59:59.999 on `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| start_of_day(date))
}

/// Returns true when both instants fall on the same calendar day.
pub fn same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());
    }

    #[test]
    fn test_add_months_crosses_years() {
        assert_eq!(ym(2024, 11).add_months(3), ym(2025, 2));
        assert_eq!(ym(2024, 1).add_months(-1), ym(2023, 12));
        assert_eq!(ym(2024, 1).add_months(-25), ym(2021, 12));
        assert_eq!(ym(2024, 6).add_months(0), ym(2024, 6));
        assert_eq!(ym(2024, 6).months_until(ym(2026, 1)), 19);
        assert_eq!(ym(2026, 1).months_until(ym(2024, 6)), -19);
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(1900, 2, 28)]
    #[case(2000, 2, 29)]
    #[case(2024, 4, 30)]
    #[case(2024, 12, 31)]
    fn test_days_in_month(#[case] year: i32, #[case] month: u32, #[case] days: u32) {
        assert_eq!(ym(year, month).days_in_month(), days);
    }

    #[rstest]
    // February 2015 starts on a Sunday and has 28 days.
    #[case(2015, 2, WeekStart::Sunday, 4)]
    #[case(2015, 2, WeekStart::Monday, 5)]
    // March 2024 starts on a Friday.
    #[case(2024, 3, WeekStart::Sunday, 6)]
    #[case(2024, 3, WeekStart::Monday, 5)]
    // June 2024 starts on a Saturday.
    #[case(2024, 6, WeekStart::Sunday, 6)]
    #[case(2024, 6, WeekStart::Monday, 5)]
    fn test_week_rows(
        #[case] year: i32,
        #[case] month: u32,
        #[case] week_start: WeekStart,
        #[case] rows: u32,
    ) {
        assert_eq!(ym(year, month).week_rows(week_start), rows);
    }

    #[test]
    fn test_first_weekday_is_periodic_outside_chrono_range() {
        let near = ym(2024, 3);
        let far = ym(2024 + 400 * 2000, 3);
        assert!(far.first_day().is_none());
        assert_eq!(near.first_weekday(), Weekday::Fri);
        assert_eq!(far.first_weekday(), Weekday::Fri);
    }

    #[test]
    fn test_week_start_columns() {
        assert_eq!(WeekStart::Sunday.day_index(Weekday::Sun), 0);
        assert_eq!(WeekStart::Monday.day_index(Weekday::Sun), 6);
        assert_eq!(WeekStart::Monday.weekday_at(0), Weekday::Mon);
        assert_eq!(WeekStart::Sunday.weekday_at(6), Weekday::Sat);
        assert_eq!(
            WeekStart::Monday.weekdays(),
            [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun
            ]
        );
    }

    #[test]
    fn test_day_boundaries() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(start_of_day(date).to_string(), "2024-06-05 00:00:00");
        assert_eq!(end_of_day(date).to_string(), "2024-06-05 23:59:59.999");
        assert!(same_day(start_of_day(date), end_of_day(date)));
    }
}
