//! Time-of-day state for date-time selection.
//!
//! [`TimeOfDay`] stores a 24-hour clock value and exposes the 12-hour view a
//! time picker shows. [`DateTimeSelection`] pairs a start with an optional
//! end and keeps each time-of-day when the day changes. [`DayTimeSelection`]
//! holds a weekday and a time for weekly schedules.
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};
use tracing::{trace, warn};

use crate::{date::DAYS_PER_WEEK, error::CalendarError, range_checker::DisabledWeekdays};

/// Indicates whether a time is before or after noon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    /// Ante meridiem (before noon).
    Am,
    /// Post meridiem (after noon).
    Pm,
}

/// An hour and minute on a 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Midnight.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Creates a time, clamping the hour to 0-23 and the minute to 0-59.
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    /// Creates a time, rejecting values outside the clock.
    pub fn try_new(hour: u32, minute: u32) -> Result<Self, CalendarError> {
        if hour > 23 || minute > 59 {
            return Err(CalendarError::InvalidTime { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Returns the time-of-day of `value`, dropping seconds.
    pub fn of(value: NaiveDateTime) -> Self {
        Self {
            hour: value.hour() as u8,
            minute: value.minute() as u8,
        }
    }

    /// Returns the hour in 24-hour form (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns the period of the hour.
    pub fn period(&self) -> DayPeriod {
        if self.hour >= 12 {
            DayPeriod::Pm
        } else {
            DayPeriod::Am
        }
    }

    /// Returns the hour to show: 0-23 on a 24-hour clock, otherwise 1-12.
    pub fn hour_for_display(&self, is_24_hour: bool) -> u8 {
        if is_24_hour {
            return self.hour;
        }
        match self.hour % 12 {
            0 => 12,
            hour => hour,
        }
    }

    /// Moves the time into `period`, keeping the 12-hour reading.
    pub fn set_period(&mut self, period: DayPeriod) {
        match (period, self.period()) {
            (DayPeriod::Am, DayPeriod::Pm) => self.hour -= 12,
            (DayPeriod::Pm, DayPeriod::Am) => self.hour += 12,
            _ => {}
        }
    }

    /// Sets the hour from a 12-hour reading (1-12) in the current period.
    pub fn set_display_hour(&mut self, hour: u8) {
        let base = hour.clamp(1, 12) % 12;
        self.hour = match self.period() {
            DayPeriod::Am => base,
            DayPeriod::Pm => base + 12,
        };
    }

    /// Sets the hour, clamped to 0-23.
    pub fn set_hour(&mut self, hour: u8) {
        self.hour = hour.min(23);
    }

    /// Sets the minute, clamped to 0-59.
    pub fn set_minute(&mut self, minute: u8) {
        self.minute = minute.min(59);
    }

    /// Advances the hour by `step`, wrapping past midnight.
    pub fn increment_hour(&mut self, step: u8) {
        self.hour = wrap(self.hour, i16::from(normalize_step(step, 23)), 24);
    }

    /// Moves the hour back by `step`, wrapping past midnight.
    pub fn decrement_hour(&mut self, step: u8) {
        self.hour = wrap(self.hour, -i16::from(normalize_step(step, 23)), 24);
    }

    /// Advances the minute by `step`, wrapping within the hour.
    pub fn increment_minute(&mut self, step: u8) {
        self.minute = wrap(self.minute, i16::from(normalize_step(step, 59)), 60);
    }

    /// Moves the minute back by `step`, wrapping within the hour.
    pub fn decrement_minute(&mut self, step: u8) {
        self.minute = wrap(self.minute, -i16::from(normalize_step(step, 59)), 60);
    }

    /// Returns the time as a `chrono` value.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Returns `date` at this time.
    pub fn apply_to(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn normalize_step(step: u8, max: u8) -> u8 {
    if step == 0 { 1 } else { step.min(max) }
}

fn wrap(value: u8, delta: i16, modulus: i16) -> u8 {
    (i16::from(value) + delta).rem_euclid(modulus) as u8
}

/// A start date-time with an optional end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeSelection {
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
}

impl DateTimeSelection {
    /// Creates a selection without an end.
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start, end: None }
    }

    /// Creates a selection spanning `start` to `end`.
    pub fn with_end(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Returns the start.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Returns the end, if set.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    /// Moves the start to `date`, keeping its time-of-day.
    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.start = date.and_time(self.start.time());
    }

    /// Moves the end to `date`, keeping its time-of-day.
    ///
    /// Without an end, the start's time-of-day is used.
    pub fn set_end_date(&mut self, date: NaiveDate) {
        let time = self.end.unwrap_or(self.start).time();
        self.end = Some(date.and_time(time));
    }

    /// Sets the start's time-of-day.
    pub fn set_start_time(&mut self, time: TimeOfDay) {
        self.start = time.apply_to(self.start.date());
    }

    /// Sets the end's time-of-day. Without an end, the end is placed on the
    /// start's day.
    pub fn set_end_time(&mut self, time: TimeOfDay) {
        let day = self.end.unwrap_or(self.start).date();
        self.end = Some(time.apply_to(day));
    }

    /// Places the end `minutes` after the start.
    ///
    /// A duration that leaves the representable date range keeps the current
    /// end.
    pub fn set_duration_minutes(&mut self, minutes: i64) {
        let end = TimeDelta::try_minutes(minutes)
            .and_then(|delta| self.start.checked_add_signed(delta));
        match end {
            Some(end) => self.end = Some(end),
            None => warn!(minutes, "duration leaves the representable date range"),
        }
    }

    /// Removes the end.
    pub fn clear_end(&mut self) {
        self.end = None;
    }

    /// Returns the whole minutes from start to end, negative when the end
    /// comes first.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_minutes())
    }

    /// Returns true when the end precedes the start.
    pub fn end_before_start(&self) -> bool {
        self.end.is_some_and(|end| end < self.start)
    }
}

/// A weekday at a time-of-day, repeating every week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayTime {
    /// Day of the week.
    pub weekday: Weekday,
    /// Time on that day.
    pub time: TimeOfDay,
}

impl DayTime {
    /// Creates a value.
    pub fn new(weekday: Weekday, time: TimeOfDay) -> Self {
        Self { weekday, time }
    }

    /// Creates a value from a day index counted from Sunday (0-6).
    ///
    /// Indices outside the week fall back to Sunday.
    pub fn from_day_index(day_index: i64, time: TimeOfDay) -> Self {
        let day_index = u32::try_from(day_index)
            .ok()
            .filter(|index| *index < DAYS_PER_WEEK)
            .unwrap_or(0);
        Self {
            weekday: shift_weekday(Weekday::Sun, i64::from(day_index)),
            time,
        }
    }

    /// Returns the day index counted from Sunday (0-6).
    pub fn day_index(&self) -> u32 {
        self.weekday.num_days_from_sunday()
    }

    /// Returns the value `minutes` later, moving to the next weekday past
    /// midnight.
    pub fn after_minutes(&self, minutes: i64) -> Self {
        let Some(delta) = TimeDelta::try_minutes(minutes) else {
            warn!(minutes, "duration out of range, keeping the start");
            return *self;
        };
        let (time, overflow) = self.time.to_naive_time().overflowing_add_signed(delta);
        let days = overflow.div_euclid(86_400);
        Self {
            weekday: shift_weekday(self.weekday, days),
            time: TimeOfDay::new(time.hour() as u8, time.minute() as u8),
        }
    }
}

impl fmt::Display for DayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.weekday, self.time)
    }
}

fn shift_weekday(weekday: Weekday, days: i64) -> Weekday {
    (0..days.rem_euclid(i64::from(DAYS_PER_WEEK))).fold(weekday, |day, _| day.succ())
}

/// Draft state of a weekday and time picker.
///
/// Presses on disabled weekdays are ignored. The host calls [`sync`] when its
/// value changes from outside and [`confirm`] when the dialog is saved.
///
/// [`sync`]: DayTimeSelection::sync
/// [`confirm`]: DayTimeSelection::confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTimeSelection {
    value: DayTime,
    disabled: DisabledWeekdays,
}

impl DayTimeSelection {
    /// Creates a draft starting at `value`.
    pub fn new(value: DayTime, disabled: DisabledWeekdays) -> Self {
        Self { value, disabled }
    }

    /// Returns the draft value.
    pub fn value(&self) -> DayTime {
        self.value
    }

    /// Returns the drafted weekday.
    pub fn weekday(&self) -> Weekday {
        self.value.weekday
    }

    /// Returns the drafted time.
    pub fn time(&self) -> TimeOfDay {
        self.value.time
    }

    /// Returns the time for in-place edits such as stepping the hour.
    pub fn time_mut(&mut self) -> &mut TimeOfDay {
        &mut self.value.time
    }

    /// Returns true when `weekday` can be chosen.
    pub fn is_selectable(&self, weekday: Weekday) -> bool {
        !self.disabled.contains(weekday)
    }

    /// Returns true when `weekday` is the drafted day.
    pub fn is_selected(&self, weekday: Weekday) -> bool {
        self.value.weekday == weekday
    }

    /// Selects `weekday`, keeping the time.
    ///
    /// Returns the new value for change callbacks, or `None` when the weekday
    /// is disabled.
    pub fn press_day(&mut self, weekday: Weekday) -> Option<DayTime> {
        if !self.is_selectable(weekday) {
            trace!(%weekday, "ignoring press on disabled weekday");
            return None;
        }
        self.value.weekday = weekday;
        Some(self.value)
    }

    /// Sets the drafted time, keeping the weekday.
    pub fn set_time(&mut self, time: TimeOfDay) {
        self.value.time = time;
    }

    /// Replaces the draft with a value supplied from outside.
    pub fn sync(&mut self, value: DayTime) {
        self.value = value;
    }

    /// Replaces the set of disabled weekdays.
    pub fn set_disabled(&mut self, disabled: DisabledWeekdays) {
        self.disabled = disabled;
    }

    /// Returns the value to commit, or `None` when the drafted weekday is
    /// disabled.
    pub fn confirm(&self) -> Option<DayTime> {
        if self.is_selectable(self.value.weekday) {
            Some(self.value)
        } else {
            warn!(weekday = %self.value.weekday, "cannot confirm a disabled weekday");
            None
        }
    }

    /// Returns the header text, such as `Mon 09:30` or `Mon 09:30 - 10:30`
    /// when a duration is known.
    pub fn label(&self, duration_minutes: Option<i64>) -> String {
        match duration_minutes {
            Some(minutes) => format!(
                "{} - {}",
                self.value,
                self.value.after_minutes(minutes).time
            ),
            None => self.value.to_string(),
        }
    }
}
