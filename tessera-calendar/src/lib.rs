//! Headless calendar engine for Tessera date pickers.
//!
//! The crate turns an unbounded month index into scroll offsets and back,
//! lays out month grids with selection flags, decides which months are
//! mounted while scrolling, and applies day presses to single, range and
//! multiple selections. It draws nothing; a renderer feeds it scroll and
//! press events and paints the grids it returns.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use tessera_calendar::{
//!     calendar::{Calendar, CalendarArgs},
//!     px::Px,
//!     selection::{SelectionMode, SelectionValue},
//! };
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
//! let mut calendar = Calendar::new(
//!     CalendarArgs::default()
//!         .reference_date(today)
//!         .mode(SelectionMode::Range),
//!     SelectionValue::empty(SelectionMode::Range),
//! );
//!
//! // Mount the months around the top of a 800px tall viewport.
//! let diff = calendar.on_scroll(Px::ZERO, Px::new(800));
//! assert!(diff.mounted.contains(&0));
//!
//! calendar.press(today);
//! calendar.press(today.succ_opt().expect("valid date"));
//! let grid = calendar.grid(0).expect("representable month");
//! assert!(grid.cell_for(today).is_some_and(|cell| cell.selected));
//! ```
//!
//! # Modules
//!
//! - [`index`] and [`offset`]: month index space and index/offset translation.
//! - [`grid`]: month grids with per-day flags.
//! - [`range_checker`]: valid window and disabled days.
//! - [`window`]: virtualization window and year picker.
//! - [`selection`]: selection values and the press reducer.
//! - [`time`] and [`header`]: time-of-day and weekday/time drafts, header text.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod calendar;
pub mod date;
pub mod error;
pub mod grid;
pub mod header;
pub mod index;
pub mod offset;
pub mod px;
pub mod range_checker;
pub mod selection;
pub mod time;
pub mod window;

pub use calendar::{Calendar, CalendarArgs};
pub use error::CalendarError;
pub use index::{CalendarAnchor, MonthIndex};
pub use px::Px;
pub use selection::{SelectionMode, SelectionValue, reduce_on_press};
