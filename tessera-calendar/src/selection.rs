//! Selection values and the reducer that applies a day press to them.
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::date::{end_of_day, start_of_day};

/// How days are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// One day.
    #[default]
    Single,
    /// A start and an end day.
    Range,
    /// Any set of days.
    Multiple,
}

/// Which side of a day a single selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateModeHint {
    /// Keep the pressed day at midnight.
    Start,
    /// Move the pressed day to 23:59:59.999.
    End,
}

/// A possibly incomplete date range.
///
/// While the user is choosing, only `start_date` is set. Once both are set,
/// `end_date >= start_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateRange {
    /// Inclusive start.
    pub start_date: Option<NaiveDateTime>,
    /// Inclusive end, usually at the end of its day.
    pub end_date: Option<NaiveDateTime>,
}

impl DateRange {
    /// Creates a range from its bounds.
    pub fn new(start_date: Option<NaiveDateTime>, end_date: Option<NaiveDateTime>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Returns true when both bounds are set.
    pub fn is_complete(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    /// Returns the start day, if any.
    pub fn start_day(&self) -> Option<NaiveDate> {
        self.start_date.map(|d| d.date())
    }

    /// Returns the end day, if any.
    pub fn end_day(&self) -> Option<NaiveDate> {
        self.end_date.map(|d| d.date())
    }
}

/// Whether a press added or removed a day in multiple mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MultiChange {
    /// The day was not selected before the press.
    Added,
    /// The day was selected before the press.
    Removed,
}

/// Selected days in ascending order, at most one instant per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiSelection {
    dates: Vec<NaiveDateTime>,
}

impl MultiSelection {
    /// Returns an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected instants in ascending order.
    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    /// Returns the number of selected days.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true when no day is selected.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Returns the earliest selected instant.
    pub fn first(&self) -> Option<NaiveDateTime> {
        self.dates.first().copied()
    }

    /// Returns true when `day` is selected, ignoring time of day.
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.position(day).is_ok()
    }

    /// Iterates over the selected days.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().map(|d| d.date())
    }

    /// Adds `day` at midnight when absent, removes it otherwise.
    pub fn toggle(&mut self, day: NaiveDate) -> MultiChange {
        match self.position(day) {
            Ok(pos) => {
                self.dates.remove(pos);
                MultiChange::Removed
            }
            Err(pos) => {
                self.dates.insert(pos, start_of_day(day));
                MultiChange::Added
            }
        }
    }

    fn position(&self, day: NaiveDate) -> Result<usize, usize> {
        self.dates.binary_search_by(|probe| probe.date().cmp(&day))
    }
}

impl FromIterator<NaiveDateTime> for MultiSelection {
    fn from_iter<I: IntoIterator<Item = NaiveDateTime>>(iter: I) -> Self {
        let mut dates: Vec<NaiveDateTime> = iter.into_iter().collect();
        dates.sort();
        dates.dedup_by(|later, earlier| later.date() == earlier.date());
        Self { dates }
    }
}

/// The caller-owned selection, one variant per [`SelectionMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionValue {
    /// Single mode.
    Single(Option<NaiveDateTime>),
    /// Range mode.
    Range(DateRange),
    /// Multiple mode.
    Multiple(MultiSelection),
}

impl SelectionValue {
    /// Returns an empty value for `mode`.
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => SelectionValue::Single(None),
            SelectionMode::Range => SelectionValue::Range(DateRange::default()),
            SelectionMode::Multiple => SelectionValue::Multiple(MultiSelection::new()),
        }
    }

    /// Returns the mode this value belongs to.
    pub fn mode(&self) -> SelectionMode {
        match self {
            SelectionValue::Single(_) => SelectionMode::Single,
            SelectionValue::Range(_) => SelectionMode::Range,
            SelectionValue::Multiple(_) => SelectionMode::Multiple,
        }
    }

    /// Returns the day the calendar should open on: the range start, the
    /// single date or the earliest of several dates.
    pub fn first_day(&self) -> Option<NaiveDate> {
        match self {
            SelectionValue::Single(date) => date.map(|d| d.date()),
            SelectionValue::Range(range) => range.start_day(),
            SelectionValue::Multiple(dates) => dates.first().map(|d| d.date()),
        }
    }

    /// Returns this value when it matches `mode`, otherwise an empty value for
    /// `mode`.
    pub fn coerce(self, mode: SelectionMode) -> Self {
        if self.mode() == mode {
            self
        } else {
            debug!(expected = ?mode, found = ?self.mode(), "discarding mismatched selection");
            SelectionValue::empty(mode)
        }
    }
}

/// Returns the selection after `pressed` is tapped.
///
/// A `current` value of another mode is discarded and the press is applied
/// to an empty value of `mode`.
pub fn reduce_on_press(
    mode: SelectionMode,
    current: &SelectionValue,
    pressed: NaiveDate,
    hint: Option<DateModeHint>,
) -> SelectionValue {
    let mut next = current.clone().coerce(mode);
    apply_press(&mut next, pressed, hint);
    next
}

fn apply_press(
    value: &mut SelectionValue,
    pressed: NaiveDate,
    hint: Option<DateModeHint>,
) -> Option<MultiChange> {
    match value {
        SelectionValue::Single(date) => {
            *date = Some(match hint {
                Some(DateModeHint::End) => end_of_day(pressed),
                _ => start_of_day(pressed),
            });
            None
        }
        SelectionValue::Range(range) => {
            let pressed_at = start_of_day(pressed);
            *range = match (range.start_date, range.end_date) {
                (Some(start), None) if pressed_at >= start => {
                    DateRange::new(Some(start), Some(end_of_day(pressed)))
                }
                _ => DateRange::new(Some(pressed_at), None),
            };
            None
        }
        SelectionValue::Multiple(dates) => Some(dates.toggle(pressed)),
    }
}

/// Local selection state edited by presses and handed out on confirm.
///
/// Mirrors a modal picker: presses only change the draft until the caller
/// confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDraft {
    mode: SelectionMode,
    hint: Option<DateModeHint>,
    value: SelectionValue,
}

impl SelectionDraft {
    /// Creates a draft seeded with `initial`.
    pub fn new(mode: SelectionMode, initial: SelectionValue, hint: Option<DateModeHint>) -> Self {
        Self {
            mode,
            hint,
            value: initial.coerce(mode),
        }
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns the current draft value.
    pub fn value(&self) -> &SelectionValue {
        &self.value
    }

    /// Applies a press. In multiple mode, reports whether the day was added or
    /// removed.
    pub fn press(&mut self, pressed: NaiveDate) -> Option<MultiChange> {
        apply_press(&mut self.value, pressed, self.hint)
    }

    /// Replaces the draft with a value changed from outside.
    pub fn reset(&mut self, value: SelectionValue) {
        self.value = value.coerce(self.mode);
    }

    /// Consumes the draft and returns the confirmed value.
    pub fn confirm(self) -> SelectionValue {
        self.value
    }
}
