//! Translation between month indices and scroll offsets.
//!
//! Horizontal mode pages one month per viewport width, so both directions are
//! exact integer arithmetic. Vertical mode stacks months of 4 to 6 week rows
//! under a fixed header, so the offset of an index is a running sum of month
//! heights and its inverse has no closed form.
//!
//! [`VerticalTranslator`] keeps the running sums in a [`MonthExtentCache`]
//! bounded by distance from the viewport. A lookup walks from the nearest
//! cached month; when none is close it falls back to the 400-year Gregorian
//! cycle, which caps the walk at half a cycle from index `0`.
use std::collections::BTreeMap;

use derive_setters::Setters;
use tracing::{trace, warn};

use crate::{
    date::{MONTHS_PER_CYCLE, WeekStart},
    index::{CalendarAnchor, MonthIndex},
    px::Px,
};

const HALF_CYCLE: i64 = MONTHS_PER_CYCLE / 2;

/// Returns the horizontal offset of `index` when every month is one page wide.
pub fn offset_from_horizontal_index(index: MonthIndex, page_width: Px) -> Px {
    page_width * i64::from(index)
}

/// Returns the month index shown at `offset` when every month is one page
/// wide. Offsets inside a page floor to that page; a non-positive width is
/// treated as one pixel.
pub fn index_from_horizontal_offset(offset: Px, page_width: Px) -> MonthIndex {
    clamp_index(offset.div_floor(page_width.ensure_positive()))
}

/// Fixed sizes used to stack months vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Setters)]
pub struct MonthMetrics {
    /// Height of one week row, including its bottom margin.
    pub row_height: Px,
    /// Height of the month header plus the weekday names row.
    pub header_height: Px,
    /// Offset at which month index `0` begins.
    pub origin: Px,
}

impl Default for MonthMetrics {
    fn default() -> Self {
        Self {
            row_height: Px(52),
            header_height: Px(100),
            origin: Px::ZERO,
        }
    }
}

impl MonthMetrics {
    /// Returns the height of a month with `rows` week rows.
    pub fn month_height(&self, rows: u32) -> Px {
        self.header_height + self.row_height * i64::from(rows)
    }

    /// Returns these metrics with both heights raised to at least one pixel.
    ///
    /// Months must have a positive height for offsets to increase with the
    /// index.
    pub fn sanitized(self) -> Self {
        if self.row_height >= Px(1) && self.header_height >= Px(1) {
            return self;
        }
        warn!(
            row_height = self.row_height.raw(),
            header_height = self.header_height.raw(),
            "non-positive month metrics, clamping to one pixel"
        );
        Self {
            row_height: self.row_height.max(Px(1)),
            header_height: self.header_height.max(Px(1)),
            origin: self.origin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonthExtent {
    rows: u32,
    offset: Px,
}

/// Memoized week-row counts and start offsets keyed by month index.
///
/// The cache holds at most `capacity` months. When it grows past that, the
/// months farthest from the focus index (normally the first visible month) are
/// dropped first.
#[derive(Debug, Clone)]
pub struct MonthExtentCache {
    entries: BTreeMap<MonthIndex, MonthExtent>,
    capacity: usize,
    focus: MonthIndex,
}

impl MonthExtentCache {
    /// Creates an empty cache holding at most `capacity` months.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
            focus: 0,
        }
    }

    /// Returns the number of cached months.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of cached months.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true when `index` is cached.
    pub fn contains(&self, index: MonthIndex) -> bool {
        self.entries.contains_key(&index)
    }

    /// Returns the index eviction distances are measured from.
    pub fn focus(&self) -> MonthIndex {
        self.focus
    }

    /// Moves the eviction focus and drops entries that no longer fit.
    pub fn set_focus(&mut self, focus: MonthIndex) {
        self.focus = focus;
        self.evict();
    }

    /// Drops every cached month.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn get(&self, index: MonthIndex) -> Option<MonthExtent> {
        self.entries.get(&index).copied()
    }

    fn nearest(&self, index: MonthIndex) -> Option<(MonthIndex, MonthExtent)> {
        let below = self.entries.range(..=index).next_back();
        let above = self.entries.range(index..).next();
        match (below, above) {
            (Some(b), Some(a)) => {
                let below_distance = i64::from(index) - i64::from(*b.0);
                let above_distance = i64::from(*a.0) - i64::from(index);
                if below_distance <= above_distance {
                    Some((*b.0, *b.1))
                } else {
                    Some((*a.0, *a.1))
                }
            }
            (Some((i, e)), None) | (None, Some((i, e))) => Some((*i, *e)),
            (None, None) => None,
        }
    }

    fn insert(&mut self, index: MonthIndex, extent: MonthExtent) {
        if self.capacity == 0 {
            return;
        }
        self.entries.insert(index, extent);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let first = self.entries.first_key_value().map(|(k, _)| *k);
            let last = self.entries.last_key_value().map(|(k, _)| *k);
            let (Some(first), Some(last)) = (first, last) else {
                break;
            };
            let focus = i64::from(self.focus);
            let victim = if focus - i64::from(first) >= i64::from(last) - focus {
                first
            } else {
                last
            };
            trace!(index = victim, focus = self.focus, "evicting cached month extent");
            self.entries.remove(&victim);
        }
    }
}

impl Default for MonthExtentCache {
    fn default() -> Self {
        Self::new(240)
    }
}

/// Maps month indices to vertical offsets and back.
#[derive(Debug, Clone)]
pub struct VerticalTranslator {
    anchor: CalendarAnchor,
    week_start: WeekStart,
    metrics: MonthMetrics,
    cache: MonthExtentCache,
    cycle_rows: i64,
}

impl VerticalTranslator {
    /// Creates a translator for months counted from `anchor`.
    ///
    /// Heights below one pixel are clamped, see [`MonthMetrics::sanitized`].
    pub fn new(
        anchor: CalendarAnchor,
        week_start: WeekStart,
        metrics: MonthMetrics,
        cache: MonthExtentCache,
    ) -> Self {
        let reference = anchor.reference_month();
        let cycle_rows = (0..MONTHS_PER_CYCLE)
            .map(|delta| i64::from(reference.add_months(delta).week_rows(week_start)))
            .sum();
        Self {
            anchor,
            week_start,
            metrics: metrics.sanitized(),
            cache,
            cycle_rows,
        }
    }

    /// Returns the anchor of the index space.
    pub fn anchor(&self) -> CalendarAnchor {
        self.anchor
    }

    /// Returns the week-start convention used to count rows.
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Returns the month metrics.
    pub fn metrics(&self) -> MonthMetrics {
        self.metrics
    }

    /// Returns the extent cache.
    pub fn cache(&self) -> &MonthExtentCache {
        &self.cache
    }

    /// Moves the cache eviction focus, normally to the first visible month.
    pub fn set_focus(&mut self, focus: MonthIndex) {
        self.cache.set_focus(focus);
    }

    /// Drops every cached extent.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Returns the week-row count of the month at `index`.
    pub fn week_rows(&self, index: MonthIndex) -> u32 {
        match self.cache.get(index) {
            Some(extent) => extent.rows,
            None => self.compute_rows(i64::from(index)),
        }
    }

    /// Returns the height of the month at `index`.
    pub fn month_height(&self, index: MonthIndex) -> Px {
        self.metrics.month_height(self.week_rows(index))
    }

    /// Returns the mean month height over a full Gregorian cycle.
    pub fn average_month_height(&self) -> f64 {
        self.metrics.header_height.to_f64()
            + self.metrics.row_height.to_f64() * self.cycle_rows as f64 / MONTHS_PER_CYCLE as f64
    }

    /// Returns the offset at which the month at `index` begins.
    pub fn offset_from_vertical_index(&mut self, index: MonthIndex) -> Px {
        if let Some(extent) = self.cache.get(index) {
            return extent.offset;
        }

        let offset = match self.cache.nearest(index) {
            Some((from, extent))
                if (i64::from(index) - i64::from(from)).abs() < HALF_CYCLE =>
            {
                self.walk(i64::from(from), extent.offset, i64::from(index))
            }
            _ => self.offset_from_origin(i64::from(index)),
        };
        let rows = self.compute_rows(i64::from(index));
        self.cache.insert(index, MonthExtent { rows, offset });
        offset
    }

    /// Returns the month index whose vertical extent contains `offset`.
    ///
    /// An offset exactly on a month boundary belongs to the month that begins
    /// there.
    pub fn index_from_vertical_offset(&mut self, offset: Px) -> MonthIndex {
        let average = self.average_month_height().max(1.0);
        let relative = (offset - self.metrics.origin).to_f64();
        let estimate = (relative / average).floor();
        let mut index = if estimate.is_finite() {
            clamp_index(estimate as i64)
        } else {
            0
        };

        let mut start = self.offset_from_vertical_index(index);
        let mut steps = 0usize;
        while start > offset && index > MonthIndex::MIN {
            index -= 1;
            start -= self.month_height(index);
            steps += 1;
        }
        while index < MonthIndex::MAX {
            let next = start + self.month_height(index);
            if next > offset {
                break;
            }
            index += 1;
            start = next;
            steps += 1;
        }
        trace!(offset = offset.raw(), index, steps, "resolved vertical offset");
        index
    }

    fn compute_rows(&self, index: i64) -> u32 {
        self.anchor
            .reference_month()
            .add_months(index)
            .week_rows(self.week_start)
    }

    fn walk(&self, from: i64, from_offset: Px, to: i64) -> Px {
        let mut offset = from_offset;
        if to >= from {
            for index in from..to {
                offset += self.metrics.month_height(self.compute_rows(index));
            }
        } else {
            for index in to..from {
                offset -= self.metrics.month_height(self.compute_rows(index));
            }
        }
        offset
    }

    /// Sums month heights from index `0` using whole cycles plus a remainder
    /// of at most half a cycle.
    fn offset_from_origin(&self, index: i64) -> Px {
        let cycles = index.div_euclid(MONTHS_PER_CYCLE);
        let remainder = index.rem_euclid(MONTHS_PER_CYCLE);
        let partial_rows = if remainder <= HALF_CYCLE {
            (0..remainder)
                .map(|i| i64::from(self.compute_rows(i)))
                .sum::<i64>()
        } else {
            self.cycle_rows
                - (remainder - MONTHS_PER_CYCLE..0)
                    .map(|i| i64::from(self.compute_rows(i)))
                    .sum::<i64>()
        };
        let rows = cycles
            .saturating_mul(self.cycle_rows)
            .saturating_add(partial_rows);
        self.metrics.origin + self.metrics.header_height * index + self.metrics.row_height * rows
    }
}

fn clamp_index(value: i64) -> MonthIndex {
    value.clamp(i64::from(MonthIndex::MIN), i64::from(MonthIndex::MAX)) as MonthIndex
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn translator(capacity: usize) -> VerticalTranslator {
        let anchor = CalendarAnchor::new(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        VerticalTranslator::new(
            anchor,
            WeekStart::Sunday,
            MonthMetrics::default(),
            MonthExtentCache::new(capacity),
        )
    }

    #[rstest]
    #[case(Px(360))]
    #[case(Px(1))]
    #[case(Px(1024))]
    fn test_horizontal_round_trip(#[case] width: Px) {
        for index in -5_000..=5_000 {
            let offset = offset_from_horizontal_index(index, width);
            assert_eq!(index_from_horizontal_offset(offset, width), index);
        }
    }

    #[test]
    fn test_horizontal_offset_floors_within_page() {
        let width = Px(100);
        assert_eq!(index_from_horizontal_offset(Px(99), width), 0);
        assert_eq!(index_from_horizontal_offset(Px(-1), width), -1);
        assert_eq!(index_from_horizontal_offset(Px(250), width), 2);
        assert_eq!(index_from_horizontal_offset(Px(250), Px::ZERO), 250);
    }

    #[test]
    fn test_vertical_offsets_accumulate_month_heights() {
        let mut translator = translator(64);
        // March 2024 has 6 rows with Sunday starts, April 2024 has 5.
        assert_eq!(translator.offset_from_vertical_index(0), Px(0));
        assert_eq!(translator.offset_from_vertical_index(1), Px(100 + 6 * 52));
        assert_eq!(
            translator.offset_from_vertical_index(2),
            Px(100 + 6 * 52 + 100 + 5 * 52)
        );
        // February 2024 has 5 rows.
        assert_eq!(translator.offset_from_vertical_index(-1), Px(-(100 + 5 * 52)));
    }

    #[test]
    fn test_vertical_offsets_are_strictly_increasing() {
        let mut translator = translator(64);
        let mut previous = translator.offset_from_vertical_index(-600);
        for index in -599..=600 {
            let current = translator.offset_from_vertical_index(index);
            assert!(current > previous, "offset of {index} did not increase");
            previous = current;
        }
    }

    #[test]
    fn test_cached_and_uncached_offsets_agree() {
        let mut cached = translator(512);
        let mut uncached = translator(0);
        for index in [-12_000, -4_801, -2_401, -1, 0, 7, 2_399, 2_401, 4_800, 9_999] {
            assert_eq!(
                cached.offset_from_vertical_index(index),
                uncached.offset_from_vertical_index(index),
                "index {index}"
            );
        }
        for index in (-200..200).rev() {
            assert_eq!(
                cached.offset_from_vertical_index(index),
                uncached.offset_from_vertical_index(index)
            );
        }
    }

    #[test]
    fn test_vertical_inverse_converges() {
        let mut translator = translator(128);
        for index in (-3_000..=3_000).step_by(7) {
            let offset = translator.offset_from_vertical_index(index);
            assert_eq!(translator.index_from_vertical_offset(offset), index);
            let height = translator.month_height(index);
            let inside = offset + height - Px(1);
            assert_eq!(translator.index_from_vertical_offset(inside), index);
        }
    }

    #[test]
    fn test_vertical_inverse_far_jump() {
        let mut translator = translator(32);
        // Year 2200 from March 2024.
        let index = 176 * 12 + 9;
        let offset = translator.offset_from_vertical_index(index);
        assert_eq!(translator.index_from_vertical_offset(offset + Px(10)), index);
    }

    #[test]
    fn test_cache_stays_bounded_and_keeps_focus() {
        let mut translator = translator(16);
        translator.set_focus(100);
        for index in 0..200 {
            translator.offset_from_vertical_index(index);
        }
        assert_eq!(translator.cache().len(), 16);
        assert!(translator.cache().contains(100));
        assert!(!translator.cache().contains(0));
        assert!(!translator.cache().contains(199));
    }

    #[test]
    fn test_origin_shifts_all_offsets() {
        let anchor = CalendarAnchor::new(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        let mut shifted = VerticalTranslator::new(
            anchor,
            WeekStart::Sunday,
            MonthMetrics::default().origin(Px(1_000)),
            MonthExtentCache::default(),
        );
        let mut plain = translator(64);
        for index in [-50, 0, 50] {
            assert_eq!(
                shifted.offset_from_vertical_index(index),
                plain.offset_from_vertical_index(index) + Px(1_000)
            );
        }
        assert_eq!(shifted.index_from_vertical_offset(Px(999)), -1);
        assert_eq!(shifted.index_from_vertical_offset(Px(1_000)), 0);
    }

    #[rstest]
    #[case(Px(0), Px(0))]
    #[case(Px(-40), Px(0))]
    #[case(Px(0), Px(-7))]
    #[case(Px(-1), Px(-1))]
    fn test_degenerate_metrics_are_clamped(#[case] row_height: Px, #[case] header_height: Px) {
        let anchor = CalendarAnchor::new(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        let metrics = MonthMetrics::default()
            .row_height(row_height)
            .header_height(header_height);
        let mut translator = VerticalTranslator::new(
            anchor,
            WeekStart::Sunday,
            metrics,
            MonthExtentCache::default(),
        );
        assert!(translator.metrics().row_height >= Px(1));
        assert!(translator.metrics().header_height >= Px(1));

        assert_eq!(translator.index_from_vertical_offset(Px(0)), 0);
        let mut previous = translator.offset_from_vertical_index(-50);
        for index in -49..=50 {
            let current = translator.offset_from_vertical_index(index);
            assert!(current > previous, "offset of {index} did not increase");
            assert_eq!(translator.index_from_vertical_offset(current), index);
            previous = current;
        }
    }

    #[test]
    fn test_positive_metrics_are_kept() {
        let metrics = MonthMetrics::default().row_height(Px(1)).header_height(Px(3));
        assert_eq!(metrics.sanitized(), metrics);
    }
}
