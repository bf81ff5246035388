//! The calendar engine a date picker drives.
//!
//! [`Calendar`] owns everything a picker needs between events: the month
//! index anchor, the selectability rules, the virtualization window, the
//! year picker and the selection draft. The host feeds it scroll and press
//! events and reads grids and header text back.
use chrono::NaiveDate;
use derive_setters::Setters;
use tracing::{debug, trace};

use crate::{
    error::CalendarError,
    grid::{MonthGrid, generate_grid},
    header::{DateFormatter, HeaderLabels, Translator, selection_label, selection_summary},
    index::{CalendarAnchor, MonthIndex},
    px::Px,
    range_checker::{DisabledWeekdays, RangeChecker, ValidRange},
    selection::{DateModeHint, MultiChange, SelectionDraft, SelectionMode, SelectionValue},
    window::{
        MountDiff, ScrollMode, ScrollRequest, ViewportWindow, VirtualWindow, WindowArgs,
        WindowPhase, YearPickerState,
    },
};

/// Arguments for [`Calendar::new`].
///
/// [`Default`] reads the local wall clock once, through
/// [`CalendarAnchor::today`], to fill `reference_date`. Set the date
/// explicitly when index math must not depend on the clock, as in tests.
#[derive(Debug, Clone, Setters)]
pub struct CalendarArgs {
    /// Day whose month is index `0`, also marked as today. Defaults to the
    /// local date at the time `CalendarArgs::default()` runs.
    pub reference_date: NaiveDate,
    /// How presses change the selection.
    pub mode: SelectionMode,
    /// Time-of-day applied to single selections.
    #[setters(strip_option)]
    pub date_mode_hint: Option<DateModeHint>,
    /// Weekdays that can never be pressed.
    pub disabled_weekdays: DisabledWeekdays,
    /// Window of selectable days.
    #[setters(strip_option)]
    pub valid_range: Option<ValidRange>,
    /// Scroll axis. Derived from `mode` when unset.
    #[setters(strip_option)]
    pub scroll_mode: Option<ScrollMode>,
    /// Window configuration. Its scroll mode is replaced by the resolved one.
    pub window: WindowArgs,
}

impl Default for CalendarArgs {
    fn default() -> Self {
        Self {
            reference_date: CalendarAnchor::today().reference_date(),
            mode: SelectionMode::Single,
            date_mode_hint: None,
            disabled_weekdays: DisabledWeekdays::NONE,
            valid_range: None,
            scroll_mode: None,
            window: WindowArgs::default(),
        }
    }
}

/// Result of a press that changed the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressOutcome {
    /// The selection after the press.
    pub value: SelectionValue,
    /// In multiple mode, whether the day was added or removed.
    pub change: Option<MultiChange>,
}

/// Headless state of one calendar surface.
#[derive(Debug, Clone)]
pub struct Calendar {
    anchor: CalendarAnchor,
    checker: RangeChecker,
    window: VirtualWindow,
    year_picker: YearPickerState,
    draft: SelectionDraft,
}

impl Calendar {
    /// Creates a calendar showing `initial`.
    ///
    /// A selection of another mode than `args.mode` is discarded.
    pub fn new(args: CalendarArgs, initial: SelectionValue) -> Self {
        let anchor = CalendarAnchor::new(args.reference_date);
        let scroll_mode = args
            .scroll_mode
            .unwrap_or_else(|| ScrollMode::for_selection(args.mode));
        let window_args = args.window.scroll_mode(scroll_mode);
        let year_picker = YearPickerState::new(window_args.year_range.clone());
        let checker = RangeChecker::new(args.disabled_weekdays, args.valid_range.as_ref());
        debug!(mode = ?args.mode, ?scroll_mode, reference = %args.reference_date, "calendar created");
        Self {
            anchor,
            checker,
            window: VirtualWindow::new(anchor, window_args),
            year_picker,
            draft: SelectionDraft::new(args.mode, initial, args.date_mode_hint),
        }
    }

    /// Returns the index anchor.
    pub fn anchor(&self) -> CalendarAnchor {
        self.anchor
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.draft.mode()
    }

    /// Returns the scroll axis.
    pub fn scroll_mode(&self) -> ScrollMode {
        self.window.scroll_mode()
    }

    /// Returns the selectability rules.
    pub fn checker(&self) -> &RangeChecker {
        &self.checker
    }

    /// Returns the virtualization window.
    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    /// Returns the window lifecycle phase.
    pub fn phase(&self) -> WindowPhase {
        self.window.phase()
    }

    /// Returns the year picker state.
    pub fn year_picker(&self) -> &YearPickerState {
        &self.year_picker
    }

    /// Shows or hides the year picker.
    pub fn toggle_year_picker(&mut self) {
        self.year_picker.toggle();
    }

    /// Returns the current selection.
    pub fn selection(&self) -> &SelectionValue {
        self.draft.value()
    }

    /// Replaces the selection with a value changed by the host.
    pub fn set_selection(&mut self, value: SelectionValue) {
        self.draft.reset(value);
    }

    /// Returns the selection to hand back on confirm.
    pub fn confirm(&self) -> SelectionValue {
        self.draft.value().clone()
    }

    /// Returns the month the calendar opens on: the month of the first
    /// selected day, otherwise the reference month.
    pub fn initial_index(&self) -> MonthIndex {
        self.selection()
            .first_day()
            .map_or(0, |day| self.anchor.index_of(day))
    }

    /// Handles a scroll event.
    pub fn on_scroll(&mut self, offset: Px, viewport_size: Px) -> MountDiff {
        self.window.on_scroll(ViewportWindow {
            scroll_mode: self.window.scroll_mode(),
            current_offset: offset,
            viewport_size,
        })
    }

    /// Reports that a programmatic scroll finished.
    pub fn on_scroll_settled(&mut self) -> WindowPhase {
        self.window.on_scroll_settled()
    }

    /// Returns the offset at which the month at `index` begins.
    pub fn offset_for_index(&mut self, index: MonthIndex) -> Result<Px, CalendarError> {
        self.window.offset_for_index(index)
    }

    /// Starts a scroll to the month at `index`.
    pub fn jump_to_index(
        &mut self,
        index: MonthIndex,
        animated: bool,
    ) -> Result<ScrollRequest, CalendarError> {
        self.window.jump_to_index(index, animated)
    }

    /// Starts a scroll to the initial month.
    pub fn jump_to_initial(&mut self) -> Result<ScrollRequest, CalendarError> {
        let index = self.initial_index();
        self.window.jump_to_index(index, false)
    }

    /// Picks `year` in the year picker and scrolls to it.
    pub fn jump_to_year(&mut self, year: i32, animated: bool) -> Result<ScrollRequest, CalendarError> {
        let year = self.year_picker.select(year);
        self.window.jump_to_year(year, animated)
    }

    /// Builds the grid of the month at `index` for the current selection.
    pub fn grid(&self, index: MonthIndex) -> Result<MonthGrid, CalendarError> {
        generate_grid(
            &self.anchor,
            index,
            self.window.translator().week_start(),
            self.draft.value(),
            &self.checker,
        )
    }

    /// Builds the grids of every mounted month, in index order.
    pub fn mounted_grids(&self) -> Result<Vec<MonthGrid>, CalendarError> {
        self.window
            .mounted()
            .map_or_else(|| Ok(Vec::new()), |range| range.map(|index| self.grid(index)).collect())
    }

    /// Applies a press on `date`.
    ///
    /// Presses on days that are disabled or outside the valid window are
    /// ignored and return `None`.
    pub fn press(&mut self, date: NaiveDate) -> Option<PressOutcome> {
        if !self.checker.is_selectable(date) {
            trace!(%date, "ignored press on unselectable day");
            return None;
        }
        let change = self.draft.press(date);
        Some(PressOutcome {
            value: self.draft.value().clone(),
            change,
        })
    }

    /// Returns the header label for the selection mode.
    pub fn label(
        &self,
        configured: Option<&str>,
        translator: &dyn Translator,
        locale: Option<&str>,
    ) -> String {
        selection_label(self.mode(), configured, translator, locale)
    }

    /// Returns the header text describing the selection.
    pub fn summary(&self, labels: &HeaderLabels, formatter: &dyn DateFormatter) -> String {
        selection_summary(self.draft.value(), labels, formatter)
    }

    /// Discards the window state, as on unmount. The selection is kept.
    pub fn reset(&mut self) {
        self.window.reset();
    }
}
