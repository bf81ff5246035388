//! Month index space.
//!
//! Index `0` is the month containing the anchor's reference date; positive
//! indices are later months and negative indices earlier ones. The mapping is
//! `reference_month + index`, a total, order-preserving bijection.
use chrono::NaiveDate;

use crate::date::YearMonth;

/// Signed month offset from the reference month.
pub type MonthIndex = i32;

/// Fixes the origin of the month index space.
///
/// The reference date is supplied once, at construction, so every index and
/// offset computation is a pure function of its inputs. It also serves as
/// "today" when marking grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarAnchor {
    reference: NaiveDate,
    month: YearMonth,
}

impl CalendarAnchor {
    /// Creates an anchor whose index `0` is the month containing `reference`.
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            reference,
            month: YearMonth::of(reference),
        }
    }

    /// Creates an anchor from the local wall clock.
    ///
    /// Call this once when the calendar is created, never inside render paths.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Returns the reference date.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference
    }

    /// Returns the month at index `0`.
    pub fn reference_month(&self) -> YearMonth {
        self.month
    }

    /// Returns the calendar month shown at `index`.
    pub fn month_at(&self, index: MonthIndex) -> YearMonth {
        self.month.add_months(i64::from(index))
    }

    /// Returns the index of `month`, saturating at the bounds of
    /// [`MonthIndex`].
    pub fn index_of_month(&self, month: YearMonth) -> MonthIndex {
        let delta = self.month.months_until(month);
        delta.clamp(i64::from(MonthIndex::MIN), i64::from(MonthIndex::MAX)) as MonthIndex
    }

    /// Returns the index of the month containing `date`.
    pub fn index_of(&self, date: NaiveDate) -> MonthIndex {
        self.index_of_month(YearMonth::of(date))
    }

    /// Returns true when `date` is the reference date.
    pub fn is_today(&self, date: NaiveDate) -> bool {
        date == self.reference
    }
}
