use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::day::Day;
use crate::engine::{CalendarEngine, Field};
use crate::error::Result;
use crate::factory::{PointFactory, WeekNode};
use crate::point::private::{Sealed, Style};
use crate::point::Point;
use crate::property_bag::PropertyBag;
use crate::year::Year;

/// A week of a week year, starting on the locale's first weekday.
///
/// The week year is the year the week is numbered in, which is not
/// always the calendar year of its days: week 1 of 2020 under ISO rules
/// runs from December 30, 2019 to January 5, 2020.
#[derive(Clone)]
pub struct Week {
    node: Rc<WeekNode>,
    factory: PointFactory,
}

impl Week {
    pub(crate) fn new(node: Rc<WeekNode>, factory: PointFactory) -> Self {
        Self { node, factory }
    }

    /// The week year.
    pub fn year(&self) -> Year {
        Year::new(Rc::clone(&self.node.year), self.factory.clone())
    }

    pub fn first_day(&self) -> Day {
        let (day, index, year) = {
            let engine = self.prepare_calendar();
            staged_date(&**engine)
        };
        self.factory.day(day, index, year)
    }

    pub fn last_day(&self) -> Day {
        let (day, index, year) = {
            let mut engine = self.prepare_calendar();
            while engine.get(Field::LocalDayOfWeek) != 7 && advance(&mut **engine) {}
            staged_date(&**engine)
        };
        self.factory.day(day, index, year)
    }

    /// The seven days of the week in order.
    pub fn days(&self) -> Vec<Day> {
        let mut found = Vec::with_capacity(7);
        {
            let mut engine = self.prepare_calendar();
            loop {
                found.push(staged_date(&**engine));
                if engine.get(Field::LocalDayOfWeek) == 7 || !advance(&mut **engine) {
                    break;
                }
            }
        }

        found
            .into_iter()
            .map(|(day, index, year)| self.factory.day(day, index, year))
            .collect()
    }

    pub fn next_week(&self) -> Week {
        let next = self.shifted(1);
        if next < self.node.number {
            self.factory.week(next, self.node.year.number.saturating_add(1))
        } else {
            self.factory.week(next, self.node.year.number)
        }
    }

    pub fn previous_week(&self) -> Week {
        let previous = self.shifted(-1);
        if previous > self.node.number {
            self.factory.week(previous, self.node.year.number.saturating_sub(1))
        } else {
            self.factory.week(previous, self.node.year.number)
        }
    }

    /// Returns true if `day` falls into this week.
    pub fn contains(&self, day: &Day) -> bool {
        day.week() == *self
    }

    /// Week number `weeks` away from this one, as numbered by the engine.
    fn shifted(&self, weeks: i64) -> i64 {
        let mut engine = self.prepare_calendar();
        engine.add(Field::WeekOfYear, weeks);
        engine.get(Field::WeekOfYear)
    }
}

/// Step the engine one day forward. Returns false at the end of the
/// supported range, where the staged date no longer moves.
pub(crate) fn advance(engine: &mut dyn CalendarEngine) -> bool {
    let before = engine.get(Field::DayOfYear);
    engine.add(Field::DayOfMonth, 1);
    engine.get(Field::DayOfYear) != before
}

/// `(day, 0-based month, year)` of the engine's staged date.
fn staged_date(engine: &dyn CalendarEngine) -> (i64, i64, i64) {
    (
        engine.get(Field::DayOfMonth),
        engine.get(Field::Month),
        engine.get(Field::Year),
    )
}

impl Sealed for Week {
    fn factory(&self) -> &PointFactory {
        &self.factory
    }

    fn prepare_calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>> {
        let mut engine = self.factory.calendar();
        engine.set_date(self.node.year.number, 0, 1);
        engine.set(Field::WeekOfYear, self.node.number);
        engine.set(Field::LocalDayOfWeek, 1);
        engine
    }

    fn properties_cell(&self) -> &RefCell<Option<PropertyBag>> {
        &self.node.properties
    }

    fn render(&self, style: Style) -> Result<String> {
        let number = self.node.number;
        let rendered = match style {
            Style::DateShort | Style::NameShort => number.to_string(),
            Style::DateMedium | Style::NameMedium | Style::NameLong => format!("{number:02}"),
            Style::DateLong => format!("{number:02} {}", self.node.year.number),
            Style::DateIso => format!("{:04}-W{number:02}", self.node.year.number),
        };
        Ok(rendered)
    }
}

impl Point for Week {
    fn number(&self) -> i64 {
        self.node.number
    }
}

impl PartialEq for Week {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.factory.same_factory(&other.factory)
    }
}

impl Eq for Week {}

impl fmt::Debug for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Week")
            .field("week", &self.node.number)
            .field("year", &self.node.year.number)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Calendar, Point};

    fn calendar() -> Calendar {
        Calendar::new("de-DE", "Europe/Berlin").unwrap()
    }

    #[test]
    fn test_first_week_starts_in_previous_year() {
        let week = calendar().week(1, 2019);
        assert_eq!(week.first_day().date_iso().unwrap(), "2018-12-31");
        assert_eq!(week.last_day().date_iso().unwrap(), "2019-01-06");
    }

    #[test]
    fn test_last_day_of_week_52() {
        let week = calendar().week(52, 2019);
        assert_eq!(week.last_day().date_iso().unwrap(), "2019-12-29");
    }

    #[test]
    fn test_days_straddle_year_end() {
        let week = calendar().week(1, 2020);
        assert_eq!(week.last_day().date_iso().unwrap(), "2020-01-05");

        let days: Vec<String> = week
            .days()
            .iter()
            .map(|d| d.date_iso().unwrap())
            .collect();
        assert_eq!(
            days,
            vec![
                "2019-12-30",
                "2019-12-31",
                "2020-01-01",
                "2020-01-02",
                "2020-01-03",
                "2020-01-04",
                "2020-01-05"
            ]
        );
    }

    #[test]
    fn test_neighbors_wrap_week_years() {
        let calendar = calendar();
        let week = calendar.week(52, 2019);
        let next = week.next_week();
        assert_eq!((next.number(), next.year().number()), (1, 2020));

        let previous = calendar.week(1, 2020).previous_week();
        assert_eq!((previous.number(), previous.year().number()), (52, 2019));
        assert_eq!(previous, week);

        let next = calendar.week(53, 2020).next_week();
        assert_eq!((next.number(), next.year().number()), (1, 2021));
        assert_eq!(next.previous_week().number(), 53);
    }

    #[test]
    fn test_contains_day() {
        let calendar = calendar();
        let week = calendar.week(1, 2020);
        assert!(week.contains(&calendar.day(30, 12, 2019)));
        assert!(week.contains(&calendar.day(5, 1, 2020)));
        assert!(!week.contains(&calendar.day(6, 1, 2020)));
    }

    #[test]
    fn test_formats() {
        let week = calendar().week(3, 2020);
        assert_eq!(week.date_short().unwrap(), "3");
        assert_eq!(week.date_medium().unwrap(), "03");
        assert_eq!(week.date_long().unwrap(), "03 2020");
        assert_eq!(week.date_iso().unwrap(), "2020-W03");
        assert_eq!(week.name_short().unwrap(), "3");
        assert_eq!(week.name_long().unwrap(), "03");
    }
}
