//! Error types shared by the calendar engine.
use chrono::NaiveDate;
use thiserror::Error;

use crate::index::MonthIndex;

/// Errors reported by calendar constructors and validators.
///
/// Rendering paths never fail on bad configuration; they fall back to a
/// well-defined result (for example a fully disabled month). These errors are
/// returned where a caller asks for validation or for a value that cannot be
/// represented.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// The month index maps to a year outside the supported date range.
    #[error("month index {index} cannot be represented as a calendar date")]
    UnrepresentableMonth {
        /// The offending month index.
        index: MonthIndex,
    },
    /// The valid range ends before it starts.
    #[error("valid range ends ({end}) before it starts ({start})")]
    InvalidValidRange {
        /// Inclusive start of the window.
        start: NaiveDate,
        /// Inclusive end of the window.
        end: NaiveDate,
    },
    /// An hour or minute outside the clock range.
    #[error("{hour:02}:{minute:02} is not a valid time of day")]
    InvalidTime {
        /// Requested hour.
        hour: u32,
        /// Requested minute.
        minute: u32,
    },
    /// A page or viewport extent that is zero or negative.
    #[error("page size must be positive")]
    NonPositivePageSize,
}
