use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::day::Day;
use crate::engine::{CalendarEngine, Field, MAX_YEAR, MIN_YEAR};
use crate::error::{CalendarError, Result};
use crate::factory::{PointFactory, YearNode};
use crate::month::Month;
use crate::point::private::{Sealed, Style};
use crate::point::Point;
use crate::property_bag::PropertyBag;
use crate::week::Week;

/// A calendar year. Any signed year number is valid.
///
/// Traversals of years outside [`MIN_YEAR`]..=[`MAX_YEAR`] run on the
/// nearest supported year, and formatting them fails.
#[derive(Clone)]
pub struct Year {
    node: Rc<YearNode>,
    factory: PointFactory,
}

impl Year {
    pub(crate) fn new(node: Rc<YearNode>, factory: PointFactory) -> Self {
        Self { node, factory }
    }

    /// All months of the year in order.
    pub fn months(&self) -> Vec<Month> {
        let (first, last) = self.bounds(Field::Month);
        (first..=last)
            .map(|index| self.factory.month(index, self.node.number))
            .collect()
    }

    /// All weeks whose week year is this year.
    pub fn weeks(&self) -> Vec<Week> {
        let (first, last) = self.bounds(Field::WeekOfYear);
        (first..=last)
            .map(|week| self.factory.week(week, self.node.number))
            .collect()
    }

    /// All days of the year in order, month by month.
    pub fn days(&self) -> Vec<Day> {
        self.months().iter().flat_map(Month::days).collect()
    }

    pub fn first_month(&self) -> Month {
        let (first, _) = self.bounds(Field::Month);
        self.factory.month(first, self.node.number)
    }

    pub fn last_month(&self) -> Month {
        let (_, last) = self.bounds(Field::Month);
        self.factory.month(last, self.node.number)
    }

    pub fn first_week(&self) -> Week {
        let (first, _) = self.bounds(Field::WeekOfYear);
        self.factory.week(first, self.node.number)
    }

    pub fn last_week(&self) -> Week {
        let (_, last) = self.bounds(Field::WeekOfYear);
        self.factory.week(last, self.node.number)
    }

    pub fn first_day(&self) -> Day {
        self.first_month().first_day()
    }

    pub fn last_day(&self) -> Day {
        self.last_month().last_day()
    }

    pub fn next_year(&self) -> Year {
        self.factory.year(self.node.number.saturating_add(1))
    }

    pub fn previous_year(&self) -> Year {
        self.factory.year(self.node.number.saturating_sub(1))
    }

    /// Actual minimum and maximum of `field` within this year.
    fn bounds(&self, field: Field) -> (i64, i64) {
        let engine = self.prepare_calendar();
        (engine.actual_minimum(field), engine.actual_maximum(field))
    }
}

impl Sealed for Year {
    fn factory(&self) -> &PointFactory {
        &self.factory
    }

    fn prepare_calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>> {
        let mut engine = self.factory.calendar();
        engine.set_date(self.node.number, 0, 1);
        engine
    }

    fn properties_cell(&self) -> &RefCell<Option<PropertyBag>> {
        &self.node.properties
    }

    fn render(&self, style: Style) -> Result<String> {
        match style {
            Style::DateShort | Style::NameShort => self.format("%y"),
            _ => self.format("%Y"),
        }
    }

    fn check_range(&self) -> Result<()> {
        if (MIN_YEAR..=MAX_YEAR).contains(&self.node.number) {
            Ok(())
        } else {
            Err(CalendarError::OutOfRange(format!(
                "year {} is outside {MIN_YEAR}..={MAX_YEAR}",
                self.node.number
            )))
        }
    }
}

impl Point for Year {
    fn number(&self) -> i64 {
        self.node.number
    }
}

impl PartialEq for Year {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.factory.same_factory(&other.factory)
    }
}

impl Eq for Year {}

impl fmt::Debug for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Year").field(&self.node.number).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{MAX_YEAR, MIN_YEAR};
    use crate::{Calendar, CalendarError, Point};

    fn calendar() -> Calendar {
        Calendar::new("de-DE", "Europe/Berlin").unwrap()
    }

    #[test]
    fn test_year_2019() {
        let year = calendar().year(2019);
        assert_eq!(year.number(), 2019);
        assert_eq!(year.first_day().date_iso().unwrap(), "2019-01-01");
        assert_eq!(year.last_day().date_iso().unwrap(), "2019-12-31");
        assert_eq!(year.days().len(), 365);
        assert_eq!(year.months().len(), 12);
        assert_eq!(year.first_week().number(), 1);
        assert_eq!(year.last_week().number(), 52);
        assert_eq!(year.weeks().len(), 52);
    }

    #[test]
    fn test_leap_year_and_long_week_year() {
        let year = calendar().year(2020);
        assert_eq!(year.days().len(), 366);
        assert_eq!(year.weeks().len(), 53);
        assert_eq!(year.last_week().last_day().date_iso().unwrap(), "2021-01-03");
    }

    #[test]
    fn test_months_are_in_order() {
        let year = calendar().year(2019);
        let numbers: Vec<i64> = year.months().iter().map(|m| m.number()).collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<_>>());
        assert_eq!(year.first_month().number(), 1);
        assert_eq!(year.last_month().number(), 12);
        assert_eq!(year.last_month().year(), year);
    }

    #[test]
    fn test_neighbors() {
        let year = calendar().year(2019);
        assert_eq!(year.next_year().number(), 2020);
        assert_eq!(year.previous_year().number(), 2018);
        assert_eq!(year.next_year().previous_year(), year);
    }

    #[test]
    fn test_formats() {
        let year = calendar().year(2019);
        assert_eq!(year.date_short().unwrap(), "19");
        assert_eq!(year.date_medium().unwrap(), "2019");
        assert_eq!(year.date_long().unwrap(), "2019");
        assert_eq!(year.date_iso().unwrap(), "2019");
        assert_eq!(year.name_short().unwrap(), "19");
        assert_eq!(year.name_long().unwrap(), "2019");
    }

    #[test]
    fn test_days_follow_months() {
        let year = calendar().year(2019);
        let days = year.days();
        assert_eq!(days.first(), Some(&year.first_day()));
        assert_eq!(days.last(), Some(&year.last_day()));
        assert_eq!(year.first_day(), year.first_month().first_day());
        assert_eq!(days[59].date_iso().unwrap(), "2019-03-01");
    }

    #[test]
    fn test_far_years_saturate_and_do_not_format() {
        let year = calendar().year(1_002_019);
        assert_eq!(year.number(), 1_002_019);
        let months = year.months();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].year().number(), MAX_YEAR);
        assert_eq!(months[11].number(), 12);
        assert!(matches!(year.date_iso(), Err(CalendarError::OutOfRange(_))));

        let last = calendar().year(i64::MAX);
        assert_eq!(last.next_year(), last);
        let first = calendar().year(i64::MIN);
        assert_eq!(first.previous_year().number(), i64::MIN);
    }

    #[test]
    fn test_edge_years_format() {
        let year = calendar().year(MAX_YEAR);
        assert_eq!(year.last_day().number(), 31);
        assert!(year.date_iso().is_ok());
        assert!(calendar().year(MIN_YEAR).first_week().number() >= 1);
    }
}
