use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::day::Day;
use crate::engine::{CalendarEngine, Field};
use crate::error::Result;
use crate::factory::{MonthNode, PointFactory};
use crate::point::private::{Sealed, Style};
use crate::point::{initial, Point};
use crate::property_bag::PropertyBag;
use crate::week::{advance, Week};
use crate::year::Year;

/// A month of a year. [`number`](Point::number) is 1-based.
#[derive(Clone)]
pub struct Month {
    node: Rc<MonthNode>,
    factory: PointFactory,
}

impl Month {
    pub(crate) fn new(node: Rc<MonthNode>, factory: PointFactory) -> Self {
        Self { node, factory }
    }

    pub fn year(&self) -> Year {
        Year::new(Rc::clone(&self.node.year), self.factory.clone())
    }

    pub fn next_month(&self) -> Month {
        self.shifted(1)
    }

    pub fn previous_month(&self) -> Month {
        self.shifted(-1)
    }

    pub fn first_day(&self) -> Day {
        let first = self.prepare_calendar().actual_minimum(Field::DayOfMonth);
        self.factory.day(first, self.node.index, self.node.year.number)
    }

    pub fn last_day(&self) -> Day {
        let last = self.prepare_calendar().actual_maximum(Field::DayOfMonth);
        self.factory.day(last, self.node.index, self.node.year.number)
    }

    /// All days of the month in order.
    pub fn days(&self) -> Vec<Day> {
        let (first, last) = {
            let engine = self.prepare_calendar();
            (
                engine.actual_minimum(Field::DayOfMonth),
                engine.actual_maximum(Field::DayOfMonth),
            )
        };

        (first..=last)
            .map(|day| self.factory.day(day, self.node.index, self.node.year.number))
            .collect()
    }

    /// All weeks overlapping the month, in order.
    ///
    /// The first and last week may belong to a neighboring week year:
    /// December 2019 ends with week 1 of 2020 and January 2021 starts
    /// with week 53 of 2020 under ISO rules.
    pub fn weeks(&self) -> Vec<Week> {
        let index = self.node.index;
        let mut year = self.node.year.number;
        let mut found = Vec::new();

        {
            let mut engine = self.prepare_calendar();
            let last_day = engine.actual_maximum(Field::DayOfMonth);
            let last_week = engine.actual_maximum(Field::WeekOfMonth);

            let position = engine.get(Field::LocalDayOfWeek);
            engine.add(Field::DayOfMonth, 1 - position);

            let mut previous = None;
            loop {
                if engine.get(Field::LocalDayOfWeek) == 7 {
                    let current = engine.get(Field::WeekOfYear);
                    if index == 0 && current > last_week {
                        // Leading week of January numbered by the previous year
                        year -= 1;
                    }
                    if previous.is_some_and(|previous| previous > current) {
                        year += 1;
                    }
                    previous = Some(current);
                    found.push((current, year));

                    if engine.get(Field::Month) != index
                        || engine.get(Field::DayOfMonth) == last_day
                    {
                        break;
                    }
                }
                if !advance(&mut **engine) {
                    break;
                }
            }
        }

        found
            .into_iter()
            .map(|(week, year)| self.factory.week(week, year))
            .collect()
    }

    /// Returns true if `other` is the same month of the same year.
    pub fn is_same_month(&self, other: &Month) -> bool {
        self.node.index == other.node.index && self.node.year.number == other.node.year.number
    }

    /// Returns true if `day` falls into this month.
    pub fn contains(&self, day: &Day) -> bool {
        self.is_same_month(&day.month())
    }

    fn shifted(&self, months: i64) -> Month {
        let (index, year) = {
            let mut engine = self.prepare_calendar();
            engine.add(Field::Month, months);
            (engine.get(Field::Month), engine.get(Field::Year))
        };
        self.factory.month(index, year)
    }
}

impl Sealed for Month {
    fn factory(&self) -> &PointFactory {
        &self.factory
    }

    fn prepare_calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>> {
        let mut engine = self.factory.calendar();
        engine.set_date(self.node.year.number, self.node.index, 1);
        engine
    }

    fn properties_cell(&self) -> &RefCell<Option<PropertyBag>> {
        &self.node.properties
    }

    fn render(&self, style: Style) -> Result<String> {
        match style {
            Style::DateShort => self.format("%-m"),
            Style::DateMedium => self.format("%m"),
            Style::DateLong => self.format("%m %Y"),
            Style::DateIso => self.format("%Y-%m"),
            Style::NameShort => self.format("%B").map(initial),
            Style::NameMedium => self.format("%b"),
            Style::NameLong => self.format("%B"),
        }
    }
}

impl Point for Month {
    fn number(&self) -> i64 {
        self.node.index + 1
    }
}

impl PartialEq for Month {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.factory.same_factory(&other.factory)
    }
}

impl Eq for Month {}

impl fmt::Debug for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Month")
            .field("month", &(self.node.index + 1))
            .field("year", &self.node.year.number)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Calendar, Point, Week};

    fn calendar() -> Calendar {
        Calendar::new("de-DE", "Europe/Berlin").unwrap()
    }

    fn numbered(weeks: &[Week]) -> Vec<(i64, i64)> {
        weeks.iter().map(|w| (w.number(), w.year().number())).collect()
    }

    #[test]
    fn test_first_and_last_day() {
        let month = calendar().month(2, 2020);
        assert_eq!(month.first_day().number(), 1);
        assert_eq!(month.last_day().number(), 29);
        assert_eq!(month.days().len(), 29);
        assert_eq!(month.number(), 2);
        assert_eq!(month.year().number(), 2020);
    }

    #[test]
    fn test_weeks_of_march_2020() {
        let weeks = calendar().month(3, 2020).weeks();
        assert_eq!(
            numbered(&weeks),
            vec![(9, 2020), (10, 2020), (11, 2020), (12, 2020), (13, 2020), (14, 2020)]
        );
    }

    #[test]
    fn test_weeks_of_december_end_in_next_week_year() {
        let weeks = calendar().month(12, 2019).weeks();
        assert_eq!(weeks.len(), 6);
        assert_eq!(numbered(&weeks[..1]), vec![(48, 2019)]);
        assert_eq!(numbered(&weeks[5..]), vec![(1, 2020)]);
    }

    #[test]
    fn test_weeks_of_january_start_in_previous_week_year() {
        let weeks = calendar().month(1, 2021).weeks();
        assert_eq!(
            numbered(&weeks),
            vec![(53, 2020), (1, 2021), (2, 2021), (3, 2021), (4, 2021)]
        );
    }

    #[test]
    fn test_weeks_under_sunday_first_rules() {
        let calendar = Calendar::new("en-US", "America/New_York").unwrap();
        let weeks = calendar.month(1, 2022).weeks();
        assert_eq!(weeks.len(), 6);
        assert_eq!(numbered(&weeks[..1]), vec![(1, 2022)]);
        assert_eq!(numbered(&weeks[5..]), vec![(6, 2022)]);
        assert_eq!(weeks[0].first_day().date_iso().unwrap(), "2021-12-26");
    }

    #[test]
    fn test_neighbors_cross_years() {
        let calendar = calendar();
        let december = calendar.month(12, 2019);
        assert_eq!(december.next_month(), calendar.month(1, 2020));
        assert_eq!(calendar.month(1, 2020).previous_month(), december);
        assert_eq!(december.next_month().previous_month(), december);
    }

    #[test]
    fn test_contains_day() {
        let calendar = calendar();
        let month = calendar.month(2, 2019);
        assert!(month.contains(&calendar.day(28, 2, 2019)));
        assert!(!month.contains(&calendar.day(29, 2, 2019)));
        assert!(month.is_same_month(&calendar.month(14, 2018)));
    }

    #[test]
    fn test_formats() {
        let month = calendar().month(1, 2019);
        assert_eq!(month.date_short().unwrap(), "1");
        assert_eq!(month.date_medium().unwrap(), "01");
        assert_eq!(month.date_long().unwrap(), "01 2019");
        assert_eq!(month.date_iso().unwrap(), "2019-01");
        assert_eq!(month.name_short().unwrap(), "J");
        assert_eq!(month.name_medium().unwrap(), "Jan");
        assert_eq!(month.name_long().unwrap(), "Januar");
    }
}
