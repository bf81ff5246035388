//! Month grids with per-day selection flags.
//!
//! A grid has one row per calendar week touched by the month (4 to 6) and
//! seven cells per row. Cells before day 1 and after the last day are padding
//! and carry no date.
//!
//! Selection flags come from a small decision table per selection mode:
//!
//! | mode     | `selected`              | `in_range`                        | crops                                  |
//! |----------|-------------------------|-----------------------------------|----------------------------------------|
//! | single   | same day as the date    | never                             | never                                  |
//! | range    | start or end day        | strictly between start and end    | endpoints, month edges, isolated cells |
//! | multiple | day in the set, unless  | day in the set with a selected    | first/last day of a run, month edges   |
//! |          | inside a run            | neighbour day                     |                                        |
//!
//! Endpoints of a range are drawn as solid circles and never carry the band,
//! so a range ending on the first day of a month (or starting on the last)
//! never leaks a band out of the month.
use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{
    date::{DAYS_PER_WEEK, WeekStart, YearMonth},
    error::CalendarError,
    index::{CalendarAnchor, MonthIndex},
    range_checker::RangeChecker,
    selection::SelectionValue,
};

/// One cell of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    /// Row of the cell within the month.
    pub week_index: u32,
    /// Column of the cell (0-6), relative to the week start.
    pub day_index: u32,
    /// The day shown, or `None` for padding.
    pub date: Option<NaiveDate>,
    /// The day is the anchor's reference date.
    pub is_today: bool,
    /// Drawn as a filled circle.
    pub selected: bool,
    /// Drawn on the range band.
    pub in_range: bool,
    /// The band is rounded on the left side of this cell.
    pub left_crop: bool,
    /// The band is rounded on the right side of this cell.
    pub right_crop: bool,
    /// The day cannot be pressed.
    pub disabled: bool,
}

impl GridCell {
    /// Returns true for cells that belong to an adjacent month.
    pub fn is_padding(&self) -> bool {
        self.date.is_none()
    }

    /// Returns true when the cell shows a day that can be pressed.
    pub fn is_pressable(&self) -> bool {
        self.date.is_some() && !self.disabled
    }

    fn padding(week_index: u32, day_index: u32) -> Self {
        Self {
            week_index,
            day_index,
            ..Self::default()
        }
    }
}

/// One row of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week {
    /// Row index within the month.
    pub week_index: u32,
    /// Cells in column order.
    pub cells: [GridCell; DAYS_PER_WEEK as usize],
}

impl Week {
    /// Iterates over the cells whose weekday column is shown.
    pub fn visible_cells<'a>(
        &'a self,
        checker: &'a RangeChecker,
        week_start: WeekStart,
    ) -> impl Iterator<Item = &'a GridCell> + 'a {
        self.cells
            .iter()
            .filter(move |cell| checker.shows_column(cell.day_index, week_start))
    }
}

/// The laid-out grid of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    index: MonthIndex,
    month: YearMonth,
    week_start: WeekStart,
    weeks: SmallVec<[Week; 6]>,
}

impl MonthGrid {
    /// Returns the month index.
    pub fn index(&self) -> MonthIndex {
        self.index
    }

    /// Returns the calendar month.
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Returns the week-start convention.
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Returns the week rows.
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// Iterates over every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.weeks.iter().flat_map(|week| week.cells.iter())
    }

    /// Returns the cell showing `date`, if it belongs to this month.
    pub fn cell_for(&self, date: NaiveDate) -> Option<&GridCell> {
        self.cells().find(|cell| cell.date == Some(date))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DayFlags {
    selected: bool,
    in_range: bool,
    left_crop: bool,
    right_crop: bool,
}

#[derive(Debug, Clone, Copy)]
struct DayPosition {
    day_index: u32,
    first_of_month: bool,
    last_of_month: bool,
}

impl DayPosition {
    fn row_start(&self) -> bool {
        self.day_index == 0
    }

    fn row_end(&self) -> bool {
        self.day_index == DAYS_PER_WEEK - 1
    }
}

enum DayRule {
    Single(Option<NaiveDate>),
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Multiple(FxHashSet<NaiveDate>),
}

impl DayRule {
    fn new(selection: &SelectionValue) -> Self {
        match selection {
            SelectionValue::Single(date) => DayRule::Single(date.map(|d| d.date())),
            SelectionValue::Range(range) => DayRule::Range {
                start: range.start_day(),
                end: range.end_day(),
            },
            SelectionValue::Multiple(dates) => DayRule::Multiple(dates.days().collect()),
        }
    }

    fn flags(&self, day: NaiveDate, pos: DayPosition) -> DayFlags {
        match self {
            DayRule::Single(date) => DayFlags {
                selected: *date == Some(day),
                ..DayFlags::default()
            },
            DayRule::Range { start, end } => range_flags(day, pos, *start, *end),
            DayRule::Multiple(days) => multiple_flags(day, pos, days),
        }
    }

    fn crops_isolated_cells(&self) -> bool {
        matches!(self, DayRule::Range { .. })
    }
}

fn range_flags(
    day: NaiveDate,
    pos: DayPosition,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> DayFlags {
    let is_start = start == Some(day);
    let is_end = end == Some(day);
    let selected = is_start || is_end;
    let in_range = matches!((start, end), (Some(s), Some(e)) if s < day && day < e);
    if !selected && !in_range {
        return DayFlags::default();
    }

    let left_crop = is_start || (pos.first_of_month && !pos.row_start());
    let right_crop = is_end || (pos.last_of_month && !pos.row_end());
    DayFlags {
        selected,
        in_range,
        left_crop,
        right_crop,
    }
}

fn multiple_flags(day: NaiveDate, pos: DayPosition, days: &FxHashSet<NaiveDate>) -> DayFlags {
    if !days.contains(&day) {
        return DayFlags::default();
    }
    let yesterday = day.pred_opt().is_some_and(|d| days.contains(&d));
    let tomorrow = day.succ_opt().is_some_and(|d| days.contains(&d));

    let mut in_range = yesterday || tomorrow;
    // Runs are not joined across months.
    if (pos.first_of_month && !tomorrow) || (pos.last_of_month && !yesterday) {
        in_range = false;
    }
    if !in_range {
        return DayFlags {
            selected: true,
            ..DayFlags::default()
        };
    }

    let left_crop = pos.first_of_month || !yesterday;
    let right_crop = pos.last_of_month || !tomorrow;
    DayFlags {
        selected: left_crop || right_crop,
        in_range,
        left_crop,
        right_crop,
    }
}

/// Builds the grid of the month at `index`.
///
/// The result depends only on the arguments. Fails only when the month lies
/// outside the dates `chrono` can represent.
pub fn generate_grid(
    anchor: &CalendarAnchor,
    index: MonthIndex,
    week_start: WeekStart,
    selection: &SelectionValue,
    checker: &RangeChecker,
) -> Result<MonthGrid, CalendarError> {
    let month = anchor.month_at(index);
    let first_day = month
        .first_day()
        .ok_or(CalendarError::UnrepresentableMonth { index })?;
    month
        .last_day()
        .ok_or(CalendarError::UnrepresentableMonth { index })?;

    let days_in_month = month.days_in_month();
    let padding = month.leading_padding(week_start);
    let rule = DayRule::new(selection);

    let weeks = (0..month.week_rows(week_start))
        .map(|week_index| {
            let mut cells = [GridCell::default(); DAYS_PER_WEEK as usize];
            for (slot, day_index) in cells.iter_mut().zip(0..DAYS_PER_WEEK) {
                let ordinal = (week_index * DAYS_PER_WEEK + day_index) as i64 - i64::from(padding);
                let day_of_month = ordinal + 1;
                *slot = if (1..=i64::from(days_in_month)).contains(&day_of_month) {
                    let date = first_day
                        .checked_add_days(chrono::Days::new(ordinal as u64))
                        .unwrap_or(first_day);
                    let pos = DayPosition {
                        day_index,
                        first_of_month: day_of_month == 1,
                        last_of_month: day_of_month == i64::from(days_in_month),
                    };
                    day_cell(anchor, checker, &rule, date, week_index, pos)
                } else {
                    GridCell::padding(week_index, day_index)
                };
            }
            if rule.crops_isolated_cells() {
                crop_isolated_cells(&mut cells);
            }
            Week { week_index, cells }
        })
        .collect();

    Ok(MonthGrid {
        index,
        month,
        week_start,
        weeks,
    })
}

fn day_cell(
    anchor: &CalendarAnchor,
    checker: &RangeChecker,
    rule: &DayRule,
    date: NaiveDate,
    week_index: u32,
    pos: DayPosition,
) -> GridCell {
    let flags = rule.flags(date, pos);
    GridCell {
        week_index,
        day_index: pos.day_index,
        date: Some(date),
        is_today: anchor.is_today(date),
        selected: flags.selected,
        in_range: flags.in_range,
        left_crop: flags.left_crop,
        right_crop: flags.right_crop,
        disabled: checker.is_disabled(date) || !checker.is_within_valid_range(date),
    }
}

/// A band cell whose row neighbours are neither banded nor selected is
/// rounded on both sides. A selected endpoint next to it continues the band.
fn crop_isolated_cells(cells: &mut [GridCell; DAYS_PER_WEEK as usize]) {
    let banded: [bool; DAYS_PER_WEEK as usize] =
        std::array::from_fn(|i| cells[i].in_range || cells[i].selected);
    for (i, cell) in cells.iter_mut().enumerate() {
        if !cell.in_range {
            continue;
        }
        let left = i > 0 && banded[i - 1];
        let right = i + 1 < banded.len() && banded[i + 1];
        if !left && !right {
            cell.left_crop = true;
            cell.right_crop = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDateTime, Weekday};
    use rstest::rstest;

    use super::*;
    use crate::{
        date::{end_of_day, start_of_day},
        range_checker::{DisabledWeekdays, ValidRange},
        selection::{DateRange, MultiSelection},
    };

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn anchor() -> CalendarAnchor {
        CalendarAnchor::new(day(2024, 3, 14))
    }

    fn range(start: NaiveDate, end: NaiveDate) -> SelectionValue {
        SelectionValue::Range(DateRange::new(
            Some(start_of_day(start)),
            Some(end_of_day(end)),
        ))
    }

    fn multiple(days: &[NaiveDate]) -> SelectionValue {
        SelectionValue::Multiple(
            days.iter()
                .map(|d| start_of_day(*d))
                .collect::<MultiSelection>(),
        )
    }

    fn grid_for(index: MonthIndex, selection: &SelectionValue) -> MonthGrid {
        generate_grid(
            &anchor(),
            index,
            WeekStart::Sunday,
            selection,
            &RangeChecker::default(),
        )
        .unwrap()
    }

    fn cell(grid: &MonthGrid, date: NaiveDate) -> GridCell {
        *grid.cell_for(date).unwrap()
    }

    #[rstest]
    #[case(WeekStart::Sunday)]
    #[case(WeekStart::Monday)]
    fn test_grid_is_complete(#[case] week_start: WeekStart) {
        let anchor = anchor();
        let selection = SelectionValue::Single(None);
        let checker = RangeChecker::default();
        for index in -60..=60 {
            let grid = generate_grid(&anchor, index, week_start, &selection, &checker).unwrap();
            assert!((4..=6).contains(&grid.weeks().len()));

            let month = anchor.month_at(index);
            let dates: Vec<NaiveDate> = grid.cells().filter_map(|c| c.date).collect();
            let expected: Vec<NaiveDate> = (1..=month.days_in_month())
                .map(|d| month.day(d).unwrap())
                .collect();
            assert_eq!(dates, expected);

            for (row, week) in grid.weeks().iter().enumerate() {
                assert_eq!(week.week_index as usize, row);
                for (col, cell) in week.cells.iter().enumerate() {
                    assert_eq!(cell.day_index as usize, col);
                    if let Some(date) = cell.date {
                        assert_eq!(week_start.day_index(date.weekday()), cell.day_index);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_selection() {
        let selection = SelectionValue::Single(Some(
            day(2024, 3, 9).and_hms_opt(15, 30, 0).unwrap(),
        ));
        let grid = grid_for(0, &selection);
        for c in grid.cells() {
            assert_eq!(c.selected, c.date == Some(day(2024, 3, 9)));
            assert!(!c.in_range);
        }
        assert!(cell(&grid, day(2024, 3, 14)).is_today);
        assert!(!cell(&grid, day(2024, 3, 9)).is_today);
    }

    #[test]
    fn test_range_symmetry() {
        let grid = grid_for(0, &range(day(2024, 3, 10), day(2024, 3, 15)));
        for c in grid.cells() {
            let Some(date) = c.date else {
                assert!(!c.selected && !c.in_range);
                continue;
            };
            match date.day() {
                10 | 15 => assert!(c.selected && !c.in_range, "{date}"),
                11..=14 => assert!(c.in_range && !c.selected, "{date}"),
                _ => assert!(!c.selected && !c.in_range, "{date}"),
            }
        }
        assert!(cell(&grid, day(2024, 3, 10)).left_crop);
        assert!(cell(&grid, day(2024, 3, 15)).right_crop);
        let inner = cell(&grid, day(2024, 3, 12));
        assert!(!inner.left_crop && !inner.right_crop);
    }

    #[test]
    fn test_open_range_marks_only_start() {
        let selection = SelectionValue::Range(DateRange::new(
            Some(start_of_day(day(2024, 3, 10))),
            None,
        ));
        let grid = grid_for(0, &selection);
        let selected: Vec<NaiveDate> = grid
            .cells()
            .filter(|c| c.selected)
            .filter_map(|c| c.date)
            .collect();
        assert_eq!(selected, vec![day(2024, 3, 10)]);
        assert!(grid.cells().all(|c| !c.in_range));
    }

    #[test]
    fn test_range_crops_at_month_and_row_edges() {
        // March 2024 starts on a Friday; the 3rd is a Sunday.
        let grid = grid_for(0, &range(day(2024, 2, 20), day(2024, 3, 20)));
        let first = cell(&grid, day(2024, 3, 1));
        assert!(first.in_range && first.left_crop && !first.right_crop);

        let sunday = cell(&grid, day(2024, 3, 3));
        assert!(sunday.in_range && !sunday.left_crop && !sunday.right_crop);

        let saturday = cell(&grid, day(2024, 3, 9));
        assert!(saturday.in_range && !saturday.right_crop);

        let previous = grid_for(-1, &range(day(2024, 2, 20), day(2024, 3, 20)));
        let last = cell(&previous, day(2024, 2, 29));
        assert!(last.in_range && last.right_crop);
    }

    #[test]
    fn test_range_band_joins_endpoint_neighbours() {
        // Friday the 8th to Sunday the 10th: Saturday ends its row next to the start.
        let grid = grid_for(0, &range(day(2024, 3, 8), day(2024, 3, 10)));
        let saturday = cell(&grid, day(2024, 3, 9));
        assert!(saturday.in_range && !saturday.left_crop && !saturday.right_crop);

        // Saturday the 9th to Monday the 11th: Sunday opens its row before the end.
        let grid = grid_for(0, &range(day(2024, 3, 9), day(2024, 3, 11)));
        let sunday = cell(&grid, day(2024, 3, 10));
        assert!(sunday.in_range && !sunday.left_crop && !sunday.right_crop);
        assert!(cell(&grid, day(2024, 3, 9)).left_crop);
        assert!(cell(&grid, day(2024, 3, 11)).right_crop);
    }

    #[test]
    fn test_range_isolated_cell_is_cropped_both_sides() {
        // Sunday the 31st is the only day in the last row of March.
        let grid = grid_for(0, &range(day(2024, 2, 20), day(2024, 4, 10)));
        let last = cell(&grid, day(2024, 3, 31));
        assert!(last.in_range && last.left_crop && last.right_crop);
    }

    #[test]
    fn test_range_ending_on_first_day_has_no_band() {
        let grid = grid_for(0, &range(day(2024, 2, 25), day(2024, 3, 1)));
        let first = cell(&grid, day(2024, 3, 1));
        assert!(first.selected && !first.in_range && first.right_crop);
        assert!(grid.cells().all(|c| !c.in_range));
    }

    #[test]
    fn test_multiple_runs_render_as_bands() {
        let selection = multiple(&[
            day(2024, 3, 5),
            day(2024, 3, 6),
            day(2024, 3, 7),
            day(2024, 3, 12),
        ]);
        let grid = grid_for(0, &selection);

        let head = cell(&grid, day(2024, 3, 5));
        assert!(head.selected && head.in_range && head.left_crop && !head.right_crop);
        let middle = cell(&grid, day(2024, 3, 6));
        assert!(!middle.selected && middle.in_range && !middle.left_crop && !middle.right_crop);
        let tail = cell(&grid, day(2024, 3, 7));
        assert!(tail.selected && tail.in_range && !tail.left_crop && tail.right_crop);
        let lone = cell(&grid, day(2024, 3, 12));
        assert!(lone.selected && !lone.in_range);
        assert!(!cell(&grid, day(2024, 3, 8)).selected);
    }

    #[test]
    fn test_multiple_run_is_not_joined_across_months() {
        let selection = multiple(&[day(2024, 2, 29), day(2024, 3, 1)]);

        let march = grid_for(0, &selection);
        let first = cell(&march, day(2024, 3, 1));
        assert!(first.selected && !first.in_range);

        let february = grid_for(-1, &selection);
        let last = cell(&february, day(2024, 2, 29));
        assert!(last.selected && !last.in_range);
    }

    #[test]
    fn test_multiple_run_through_month_start_is_rounded() {
        let selection = multiple(&[day(2024, 2, 29), day(2024, 3, 1), day(2024, 3, 2)]);
        let grid = grid_for(0, &selection);
        let first = cell(&grid, day(2024, 3, 1));
        assert!(first.selected && first.in_range && first.left_crop && !first.right_crop);
    }

    #[test]
    fn test_disabled_takes_precedence_over_selection() {
        let valid = ValidRange::default()
            .start_date(day(2024, 3, 1))
            .end_date(day(2024, 3, 12))
            .disabled_dates(vec![day(2024, 3, 11)]);
        let checker = RangeChecker::new(DisabledWeekdays::new(&[Weekday::Wed]), Some(&valid));
        let selection = range(day(2024, 3, 10), day(2024, 3, 15));
        let grid = generate_grid(&anchor(), 0, WeekStart::Sunday, &selection, &checker).unwrap();

        let explicit = cell(&grid, day(2024, 3, 11));
        assert!(explicit.disabled && explicit.in_range);
        // 2024-03-06 is a Wednesday.
        assert!(cell(&grid, day(2024, 3, 6)).disabled);
        let outside = cell(&grid, day(2024, 3, 14));
        assert!(outside.disabled && outside.in_range && !outside.is_pressable());
        let endpoint = cell(&grid, day(2024, 3, 15));
        assert!(endpoint.disabled && endpoint.selected);
        assert!(cell(&grid, day(2024, 3, 10)).is_pressable());
    }

    #[test]
    fn test_generation_is_pure() {
        let selection = multiple(&[day(2024, 3, 5), day(2024, 3, 6)]);
        assert_eq!(grid_for(0, &selection), grid_for(0, &selection));
        assert_eq!(grid_for(25, &selection), grid_for(25, &selection));
    }

    #[test]
    fn test_unrepresentable_month_is_reported() {
        let err = generate_grid(
            &anchor(),
            MonthIndex::MAX,
            WeekStart::Sunday,
            &SelectionValue::Single(None),
            &RangeChecker::default(),
        )
        .unwrap_err();
        assert_eq!(err, CalendarError::UnrepresentableMonth { index: MonthIndex::MAX });
    }

    #[test]
    fn test_hidden_weekday_columns() {
        let checker = RangeChecker::new(DisabledWeekdays::new(&[Weekday::Sat, Weekday::Sun]), None);
        let grid = grid_for(0, &SelectionValue::Single(None::<NaiveDateTime>));
        for week in grid.weeks() {
            assert_eq!(week.visible_cells(&checker, WeekStart::Sunday).count(), 5);
        }
    }
}
