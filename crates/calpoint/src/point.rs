//! The behavior shared by years, months, weeks and days.

use std::cell::{RefCell, RefMut};

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;

use crate::engine::CalendarEngine;
use crate::error::{CalendarError, Result};
use crate::factory::PointFactory;
use crate::property_bag::PropertyBag;

pub(crate) mod private {
    use super::*;

    /// Rendering styles behind the `date_*` and `name_*` accessors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Style {
        DateShort,
        DateMedium,
        DateLong,
        DateIso,
        NameShort,
        NameMedium,
        NameLong,
    }

    pub trait Sealed {
        fn factory(&self) -> &PointFactory;

        /// Stage the factory's scratch engine at this point's first moment.
        fn prepare_calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>>;

        fn properties_cell(&self) -> &RefCell<Option<PropertyBag>>;

        fn render(&self, style: Style) -> Result<String>;

        /// Fails for points the engine cannot stage exactly.
        fn check_range(&self) -> Result<()> {
            Ok(())
        }
    }
}

use private::Style;

/// A navigable unit of the calendar: a [`Year`](crate::Year),
/// [`Month`](crate::Month), [`Week`](crate::Week) or [`Day`](crate::Day).
///
/// Points are created by a [`PointFactory`] and cached for its lifetime,
/// so two handles to the same point share one property bag.
///
/// # Panics
///
/// The scratch engine and the property bags live in `RefCell`s. Holding
/// the guard returned by [`calendar`](Point::calendar) or
/// [`properties`](Point::properties) while calling another method that
/// needs the same cell panics.
pub trait Point: private::Sealed {
    /// The normalized number of this point: the year, the 1-based month,
    /// the week of the week year or the day of the month.
    fn number(&self) -> i64;

    /// The point's property bag, created on first access.
    ///
    /// Prefer [`with_properties`](Point::with_properties) when another
    /// handle to the same point may be borrowing the bag.
    fn properties(&self) -> RefMut<'_, PropertyBag> {
        RefMut::map(self.properties_cell().borrow_mut(), |cell| {
            cell.get_or_insert_with(PropertyBag::new)
        })
    }

    /// Run `f` on the property bag, releasing the borrow before returning.
    fn with_properties<R>(&self, f: impl FnOnce(&mut PropertyBag) -> R) -> R
    where
        Self: Sized,
    {
        f(&mut self.properties())
    }

    /// A copy of the property stored under `key`.
    fn property(&self, key: &str) -> Option<Value>
    where
        Self: Sized,
    {
        self.with_properties(|bag| bag.get(key).cloned())
    }

    /// The factory's scratch engine, staged at the point's first moment.
    fn calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>> {
        self.prepare_calendar()
    }

    /// The point's first moment as an instant in the calendar's timezone.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] for a year outside
    /// [`MIN_YEAR`](crate::engine::MIN_YEAR)..=[`MAX_YEAR`](crate::engine::MAX_YEAR)
    /// or an instant the timezone cannot represent.
    fn date_time(&self) -> Result<DateTime<Tz>> {
        self.check_range()?;
        let local = self.prepare_calendar().local_date_time();
        self.factory().formatter().localize(local).ok_or_else(|| {
            CalendarError::OutOfRange(format!("{} cannot be represented", self.number()))
        })
    }

    /// Render the point's first moment with a strftime `pattern`.
    fn format(&self, pattern: &str) -> Result<String> {
        let instant = self.date_time()?;
        self.factory().formatter().format(&instant, pattern)
    }

    fn date_short(&self) -> Result<String> {
        self.render(Style::DateShort)
    }

    fn date_medium(&self) -> Result<String> {
        self.render(Style::DateMedium)
    }

    fn date_long(&self) -> Result<String> {
        self.render(Style::DateLong)
    }

    fn date_iso(&self) -> Result<String> {
        self.render(Style::DateIso)
    }

    fn name_short(&self) -> Result<String> {
        self.render(Style::NameShort)
    }

    fn name_medium(&self) -> Result<String> {
        self.render(Style::NameMedium)
    }

    fn name_long(&self) -> Result<String> {
        self.render(Style::NameLong)
    }
}

/// The first character of `name`.
pub(crate) fn initial(name: String) -> String {
    name.chars().next().map(String::from).unwrap_or_default()
}
