//! # calpoint
//!
//! A locale-aware calendar exposed as a graph of navigable points.
//!
//! Years, months, weeks and days are created through a [`Calendar`] and
//! linked to each other: a day knows its month and its week, a month
//! lists its days and weeks, a week knows its week year and its seven
//! days. Week numbering follows the locale (first weekday and minimal
//! days in the first week), including weeks that straddle a year
//! boundary and belong to the neighboring year.
//!
//! Out-of-range input rolls over instead of failing, and every normalized
//! point is built once per calendar, so attaching a property to a point
//! makes it visible through every later handle to the same point.
//!
//! ## Modules
//!
//! - [`calendar`]: the [`Calendar`] entry point and clock-relative helpers
//! - [`options`]: [`CalendarOptions`] configuration
//! - [`factory`]: normalization and caching of points
//! - [`point`]: the [`Point`] trait shared by all point types
//! - [`year`], [`month`], [`week`], [`day`]: the point types and their traversals
//! - [`engine`]: field arithmetic behind the traversals
//! - [`locale`]: locale tags and week rules
//! - [`format`]: localized rendering
//! - [`property_bag`]: per-point key/value attachments
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```
//! use calpoint::{Calendar, Point};
//!
//! let calendar = Calendar::new("de-DE", "Europe/Berlin").unwrap();
//!
//! let day = calendar.day(31, 12, 2019);
//! let week = day.week();
//! assert_eq!((week.number(), week.year().number()), (1, 2020));
//! assert_eq!(week.first_day().date_iso().unwrap(), "2019-12-30");
//!
//! day.properties().set("note", "Silvester");
//! assert!(calendar.day(31, 12, 2019).properties().has("note"));
//! ```

pub mod calendar;
pub mod day;
pub mod engine;
pub mod error;
pub mod factory;
pub mod format;
pub mod locale;
pub mod month;
pub mod options;
pub mod point;
pub mod property_bag;
pub mod week;
pub mod year;

pub use calendar::Calendar;
pub use day::Day;
pub use engine::{CalendarEngine, Field, GregorianEngine, MAX_YEAR, MIN_YEAR};
pub use error::{CalendarError, Result};
pub use factory::PointFactory;
pub use format::DateFormatter;
pub use locale::{LocaleTag, WeekRules};
pub use month::Month;
pub use options::CalendarOptions;
pub use point::Point;
pub use property_bag::PropertyBag;
pub use week::Week;
pub use year::Year;
