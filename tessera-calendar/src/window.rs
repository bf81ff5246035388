//! Virtualization window: which months are mounted at a scroll position.
//!
//! The window keeps the mounted months as one inclusive index interval and
//! reports, on every scroll event, which indices to mount and which to drop.
//! Programmatic jumps go through [`VirtualWindow::jump_to_index`], which
//! returns the offset the host should scroll to.
use std::ops::RangeInclusive;

use derive_setters::Setters;
use tracing::{debug, trace, warn};

use crate::{
    date::{WeekStart, YearMonth},
    error::CalendarError,
    index::{CalendarAnchor, MonthIndex},
    offset::{
        MonthExtentCache, MonthMetrics, VerticalTranslator, index_from_horizontal_offset,
        offset_from_horizontal_index,
    },
    px::Px,
    selection::SelectionMode,
};

/// Scroll axis of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollMode {
    /// One month per page, paged left and right.
    #[default]
    Horizontal,
    /// Months stacked in a continuous column.
    Vertical,
}

impl ScrollMode {
    /// Returns the scroll axis used for `mode`.
    ///
    /// Single dates page horizontally; ranges and multiple dates scroll
    /// vertically so a selection can span several visible months.
    pub fn for_selection(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => ScrollMode::Horizontal,
            SelectionMode::Range | SelectionMode::Multiple => ScrollMode::Vertical,
        }
    }
}

/// Configuration of a [`VirtualWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
pub struct WindowArgs {
    /// Scroll axis.
    pub scroll_mode: ScrollMode,
    /// Months mounted beyond each edge of the viewport.
    pub overscan: u32,
    /// First column of each week row.
    pub week_start: WeekStart,
    /// Vertical month sizes.
    pub metrics: MonthMetrics,
    /// Years reachable through [`VirtualWindow::jump_to_year`].
    pub year_range: RangeInclusive<i32>,
    /// Maximum number of month extents kept by the vertical translator.
    pub cache_capacity: usize,
}

impl Default for WindowArgs {
    fn default() -> Self {
        Self {
            scroll_mode: ScrollMode::Horizontal,
            overscan: 1,
            week_start: WeekStart::Sunday,
            metrics: MonthMetrics::default(),
            year_range: 1800..=2200,
            cache_capacity: 240,
        }
    }
}

/// A scroll position reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportWindow {
    /// Scroll axis the offset is measured on.
    pub scroll_mode: ScrollMode,
    /// Offset of the viewport's leading edge.
    pub current_offset: Px,
    /// Extent of the viewport along the scroll axis.
    pub viewport_size: Px,
}

/// Scroll lifecycle of a [`VirtualWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPhase {
    /// No scroll event has been seen yet.
    #[default]
    Idle,
    /// Following scroll events.
    Tracking,
    /// A programmatic scroll is in flight.
    Jumping {
        /// Month the jump lands on.
        target_index: MonthIndex,
        /// Offset the host was asked to scroll to.
        target_offset: Px,
        /// Whether the host animates the scroll.
        animated: bool,
    },
}

/// Changes to the mounted interval after a scroll event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountDiff {
    /// The interval mounted after the event.
    pub mounted: RangeInclusive<MonthIndex>,
    /// Indices that became mounted, ascending.
    pub mount: Vec<MonthIndex>,
    /// Indices that were dropped, ascending.
    pub unmount: Vec<MonthIndex>,
}

impl MountDiff {
    /// Returns true when nothing was mounted or dropped.
    pub fn is_unchanged(&self) -> bool {
        self.mount.is_empty() && self.unmount.is_empty()
    }
}

/// A scroll the host should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Month the scroll lands on.
    pub target_index: MonthIndex,
    /// Offset to scroll to.
    pub offset: Px,
    /// Whether to animate the scroll.
    pub animated: bool,
}

/// Tracks the mounted month interval of a scrolling calendar.
#[derive(Debug, Clone)]
pub struct VirtualWindow {
    scroll_mode: ScrollMode,
    overscan: u32,
    year_range: RangeInclusive<i32>,
    translator: VerticalTranslator,
    phase: WindowPhase,
    mounted: Option<RangeInclusive<MonthIndex>>,
    offset: Px,
    viewport_size: Px,
}

impl VirtualWindow {
    /// Creates an idle window for months counted from `anchor`.
    pub fn new(anchor: CalendarAnchor, args: WindowArgs) -> Self {
        let year_range = if args.year_range.is_empty() {
            warn!(
                start = args.year_range.start(),
                end = args.year_range.end(),
                "empty year range, using the reference year only"
            );
            let year = anchor.reference_month().year();
            year..=year
        } else {
            args.year_range
        };
        let translator = VerticalTranslator::new(
            anchor,
            args.week_start,
            args.metrics,
            MonthExtentCache::new(args.cache_capacity),
        );
        Self {
            scroll_mode: args.scroll_mode,
            overscan: args.overscan,
            year_range,
            translator,
            phase: WindowPhase::Idle,
            mounted: None,
            offset: Px::ZERO,
            viewport_size: Px::ZERO,
        }
    }

    /// Returns the scroll axis.
    pub fn scroll_mode(&self) -> ScrollMode {
        self.scroll_mode
    }

    /// Returns the index anchor.
    pub fn anchor(&self) -> CalendarAnchor {
        self.translator.anchor()
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> WindowPhase {
        self.phase
    }

    /// Returns the mounted interval, or `None` before the first scroll event.
    pub fn mounted(&self) -> Option<RangeInclusive<MonthIndex>> {
        self.mounted.clone()
    }

    /// Returns the years reachable through [`Self::jump_to_year`].
    pub fn year_range(&self) -> RangeInclusive<i32> {
        self.year_range.clone()
    }

    /// Returns the vertical translator.
    pub fn translator(&self) -> &VerticalTranslator {
        &self.translator
    }

    /// Returns the offset at which the month at `index` begins.
    ///
    /// Horizontal mode needs a known viewport width.
    pub fn offset_for_index(&mut self, index: MonthIndex) -> Result<Px, CalendarError> {
        match self.scroll_mode {
            ScrollMode::Horizontal => {
                if self.viewport_size <= Px::ZERO {
                    return Err(CalendarError::NonPositivePageSize);
                }
                Ok(offset_from_horizontal_index(index, self.viewport_size))
            }
            ScrollMode::Vertical => Ok(self.translator.offset_from_vertical_index(index)),
        }
    }

    /// Returns the month shown at `offset`.
    pub fn index_for_offset(&mut self, offset: Px) -> MonthIndex {
        match self.scroll_mode {
            ScrollMode::Horizontal => index_from_horizontal_offset(offset, self.viewport_size),
            ScrollMode::Vertical => self.translator.index_from_vertical_offset(offset),
        }
    }

    /// Returns the months whose extent intersects the viewport, widened by the
    /// overscan on both sides.
    pub fn visible_range(&mut self, offset: Px, viewport_size: Px) -> RangeInclusive<MonthIndex> {
        let viewport_size = viewport_size.ensure_positive();
        let trailing = offset.saturating_add(viewport_size - Px(1));
        let (first, last) = match self.scroll_mode {
            ScrollMode::Horizontal => (
                index_from_horizontal_offset(offset, viewport_size),
                index_from_horizontal_offset(trailing, viewport_size),
            ),
            ScrollMode::Vertical => (
                self.translator.index_from_vertical_offset(offset),
                self.translator.index_from_vertical_offset(trailing),
            ),
        };
        let overscan = self.overscan.min(i32::MAX as u32) as MonthIndex;
        first.saturating_sub(overscan)..=last.saturating_add(overscan)
    }

    /// Handles a scroll event and returns the mount changes.
    ///
    /// A non-positive viewport is treated as one pixel so rendering always has
    /// at least one mounted month.
    pub fn on_scroll(&mut self, viewport: ViewportWindow) -> MountDiff {
        if viewport.scroll_mode != self.scroll_mode {
            warn!(
                reported = ?viewport.scroll_mode,
                configured = ?self.scroll_mode,
                "scroll event on a different axis, using the configured one"
            );
        }
        if viewport.viewport_size <= Px::ZERO {
            warn!(
                size = viewport.viewport_size.raw(),
                "non-positive viewport size"
            );
        }
        self.offset = viewport.current_offset;
        self.viewport_size = viewport.viewport_size.ensure_positive();

        if self.phase == WindowPhase::Idle {
            debug!("calendar window tracking");
            self.phase = WindowPhase::Tracking;
        }

        let next = self.visible_range(self.offset, self.viewport_size);
        self.translator.set_focus(*next.start());
        let diff = diff_intervals(self.mounted.as_ref(), &next);
        if !diff.is_unchanged() {
            trace!(
                first = next.start(),
                last = next.end(),
                mounted = diff.mount.len(),
                unmounted = diff.unmount.len(),
                "window moved"
            );
        }
        self.mounted = Some(next);
        diff
    }

    /// Returns the month at the centre of the viewport.
    pub fn centered_index(&mut self) -> MonthIndex {
        let half = Px(self.viewport_size.raw() / 2);
        self.index_for_offset(self.offset.saturating_add(half))
    }

    /// Starts a programmatic scroll to the month at `index`.
    ///
    /// A jump issued while another is in flight replaces it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn jump_to_index(
        &mut self,
        index: MonthIndex,
        animated: bool,
    ) -> Result<ScrollRequest, CalendarError> {
        let offset = self.offset_for_index(index)?;
        if let WindowPhase::Jumping { target_index, .. } = self.phase {
            debug!(superseded = target_index, "replacing in-flight jump");
        }
        self.translator.set_focus(index);
        self.phase = WindowPhase::Jumping {
            target_index: index,
            target_offset: offset,
            animated,
        };
        debug!(offset = offset.raw(), "calendar window jumping");
        Ok(ScrollRequest {
            target_index: index,
            offset,
            animated,
        })
    }

    /// Jumps to `year`, keeping the month of the year currently centred.
    ///
    /// The year is clamped to the configured year range.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn jump_to_year(&mut self, year: i32, animated: bool) -> Result<ScrollRequest, CalendarError> {
        let year = year.clamp(*self.year_range.start(), *self.year_range.end());
        let anchor = self.anchor();
        let current = anchor.month_at(self.centered_index());
        let target = YearMonth::new(year, current.month())
            .unwrap_or_else(|| anchor.reference_month());
        self.jump_to_index(anchor.index_of_month(target), animated)
    }

    /// Reports that the host finished a programmatic scroll.
    pub fn on_scroll_settled(&mut self) -> WindowPhase {
        if let WindowPhase::Jumping { target_index, .. } = self.phase {
            debug!(target_index, "jump settled");
            self.phase = WindowPhase::Tracking;
        }
        self.phase
    }

    /// Discards all window state, as on unmount.
    pub fn reset(&mut self) {
        debug!("calendar window reset");
        self.phase = WindowPhase::Idle;
        self.mounted = None;
        self.offset = Px::ZERO;
        self.viewport_size = Px::ZERO;
        self.translator.clear_cache();
    }
}

fn diff_intervals(
    previous: Option<&RangeInclusive<MonthIndex>>,
    next: &RangeInclusive<MonthIndex>,
) -> MountDiff {
    let Some(previous) = previous else {
        return MountDiff {
            mounted: next.clone(),
            mount: next.clone().collect(),
            unmount: Vec::new(),
        };
    };
    MountDiff {
        mounted: next.clone(),
        mount: next.clone().filter(|i| !previous.contains(i)).collect(),
        unmount: previous.clone().filter(|i| !next.contains(i)).collect(),
    }
}

/// Open/closed state of the year picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPickerState {
    years: RangeInclusive<i32>,
    open: bool,
    selected_year: Option<i32>,
}

impl Default for YearPickerState {
    fn default() -> Self {
        Self::new(WindowArgs::default().year_range)
    }
}

impl YearPickerState {
    /// Creates a closed picker listing `years`.
    pub fn new(years: RangeInclusive<i32>) -> Self {
        Self {
            years,
            open: false,
            selected_year: None,
        }
    }

    /// Returns true when the picker is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Shows or hides the picker.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Returns the last picked year.
    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    /// Iterates over the listed years, ascending.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.years.clone()
    }

    /// Records a picked year, clamped to the list, and closes the picker.
    pub fn select(&mut self, year: i32) -> i32 {
        let year = if self.years.is_empty() {
            year
        } else {
            year.clamp(*self.years.start(), *self.years.end())
        };
        self.selected_year = Some(year);
        self.open = false;
        year
    }
}
