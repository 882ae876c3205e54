use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::engine::{CalendarEngine, Field};
use crate::error::Result;
use crate::factory::{DayNode, PointFactory};
use crate::month::Month;
use crate::point::private::{Sealed, Style};
use crate::point::{initial, Point};
use crate::property_bag::PropertyBag;
use crate::week::Week;
use crate::year::Year;

/// A day of a month. [`number`](Point::number) is the day of the month.
#[derive(Clone)]
pub struct Day {
    node: Rc<DayNode>,
    factory: PointFactory,
}

impl Day {
    pub(crate) fn new(node: Rc<DayNode>, factory: PointFactory) -> Self {
        Self { node, factory }
    }

    pub fn month(&self) -> Month {
        Month::new(Rc::clone(&self.node.month), self.factory.clone())
    }

    pub fn year(&self) -> Year {
        Year::new(Rc::clone(&self.node.month.year), self.factory.clone())
    }

    /// The week containing this day, attributed to its week year.
    ///
    /// # Examples
    ///
    /// ```
    /// use calpoint::{Calendar, Point};
    ///
    /// let calendar = Calendar::new("de-DE", "Europe/Berlin").unwrap();
    /// let week = calendar.day(31, 12, 2019).week();
    /// assert_eq!((week.number(), week.year().number()), (1, 2020));
    ///
    /// let week = calendar.day(1, 1, 2021).week();
    /// assert_eq!((week.number(), week.year().number()), (53, 2020));
    /// ```
    pub fn week(&self) -> Week {
        let index = self.node.month.index;
        let year = self.node.month.year.number;

        let (previous, last_week_of_month, current) = {
            let mut engine = self.factory.calendar();
            engine.set_date(year, index, self.node.number - 7);
            let previous = engine.get(Field::WeekOfYear);

            engine.set_date(year, index, self.node.number);
            (
                previous,
                engine.actual_maximum(Field::WeekOfMonth),
                engine.get(Field::WeekOfYear),
            )
        };

        let mut week_year = year;
        if index == 0 && current > last_week_of_month {
            // Leading days of January still numbered by the previous year
            week_year -= 1;
        } else if index != 0 && previous > current {
            // Trailing days of December already numbered by the next year
            week_year += 1;
        }

        self.factory.week(current, week_year)
    }

    pub fn next_day(&self) -> Day {
        self.shifted(1)
    }

    pub fn previous_day(&self) -> Day {
        self.shifted(-1)
    }

    /// Returns true unless the locale counts this day as weekend.
    pub fn is_weekday(&self) -> bool {
        !self.is_weekend()
    }

    pub fn is_weekend(&self) -> bool {
        self.prepare_calendar().is_weekend()
    }

    pub fn is_same_day(&self, other: &Day) -> bool {
        self.node.number == other.node.number && self.is_same_month(&other.month())
    }

    pub fn is_same_month(&self, month: &Month) -> bool {
        self.month().is_same_month(month)
    }

    pub fn is_same_year(&self, year: &Year) -> bool {
        self.node.month.year.number == year.number()
    }

    fn shifted(&self, days: i64) -> Day {
        let (day, index, year) = {
            let mut engine = self.prepare_calendar();
            engine.add(Field::DayOfMonth, days);
            (
                engine.get(Field::DayOfMonth),
                engine.get(Field::Month),
                engine.get(Field::Year),
            )
        };
        self.factory.day(day, index, year)
    }
}

impl Sealed for Day {
    fn factory(&self) -> &PointFactory {
        &self.factory
    }

    fn prepare_calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>> {
        let mut engine = self.factory.calendar();
        engine.set_date(
            self.node.month.year.number,
            self.node.month.index,
            self.node.number,
        );
        engine
    }

    fn properties_cell(&self) -> &RefCell<Option<PropertyBag>> {
        &self.node.properties
    }

    fn render(&self, style: Style) -> Result<String> {
        match style {
            Style::DateShort => self.format("%-d"),
            Style::DateMedium => self.format("%d"),
            Style::DateLong => self.format("%x"),
            Style::DateIso => self.format("%Y-%m-%d"),
            Style::NameShort => self.format("%A").map(initial),
            Style::NameMedium => self.format("%a"),
            Style::NameLong => self.format("%A"),
        }
    }
}

impl Point for Day {
    fn number(&self) -> i64 {
        self.node.number
    }
}

impl PartialEq for Day {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.factory.same_factory(&other.factory)
    }
}

impl Eq for Day {}

impl fmt::Debug for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Day")
            .field("day", &self.node.number)
            .field("month", &(self.node.month.index + 1))
            .field("year", &self.node.month.year.number)
            .finish()
    }
}
