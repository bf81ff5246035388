//! Physical pixel offsets along the calendar scroll axis.
//!
//! Calendar offsets are measured from the top (vertical mode) or the left edge
//! (horizontal mode) of the month at [`MonthIndex`](crate::index::MonthIndex)
//! zero. Offsets before that month are negative.
//!
//! Unlike the layout pixels of `tessera-ui`, [`Px`] here is backed by an `i64`:
//! the month index domain is unbounded in both directions and summing month
//! heights over thousands of years must not wrap.
//!
//! # Example
//!
//! ```
//! use tessera_calendar::px::Px;
//!
//! let page = Px::new(360);
//! let offset = page * 3 + Px::new(12);
//! assert_eq!(offset.raw(), 1092);
//! assert_eq!(offset.div_floor(page), 3);
//! ```

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A signed pixel offset or extent.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Px(pub i64);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// The largest representable offset.
    pub const MAX: Self = Self(i64::MAX);

    /// The smallest representable offset.
    pub const MIN: Self = Self(i64::MIN);

    /// Creates a new `Px` from a raw value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Converts a floating point offset, saturating at the numeric bounds and
    /// truncating toward zero.
    pub fn saturating_from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else if value >= i64::MAX as f64 {
            Self::MAX
        } else if value <= i64::MIN as f64 {
            Self::MIN
        } else {
            Self(value as i64)
        }
    }

    /// Returns the value as `f64`.
    pub fn to_f64(self) -> f64 {
        self.0 as f64
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Saturating multiplication by a count.
    pub fn saturating_mul(self, times: i64) -> Self {
        Self(self.0.saturating_mul(times))
    }

    /// Floor division by a positive extent, e.g. an offset divided by a page
    /// width. Returns `0` when `extent` is not positive.
    pub fn div_floor(self, extent: Self) -> i64 {
        if extent.0 <= 0 {
            return 0;
        }
        self.0.div_euclid(extent.0)
    }

    /// Returns `self` when positive, otherwise `Px(1)`.
    pub fn ensure_positive(self) -> Self {
        if self.0 <= 0 { Self(1) } else { self }
    }
}

impl Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<i64> for Px {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        self.saturating_mul(rhs)
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl From<i64> for Px {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}
