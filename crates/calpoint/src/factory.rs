//! Construction, normalization and caching of calendar points.
//!
//! Every request is normalized by staging the raw numbers on a private
//! engine and reading the resolved fields back, so `month(12, 2019)` and
//! `month(0, 2020)` name the same point. Each normalized point is built
//! once per factory and shared by every handle that asks for it.
//!
//! The cached nodes only point downward (day → month → year, week → year);
//! handles pair a node with a clone of the factory. Dropping the last
//! handle therefore frees the whole graph.

use std::cell::{RefCell, RefMut};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::day::Day;
use crate::engine::{CalendarEngine, Field};
use crate::format::DateFormatter;
use crate::month::Month;
use crate::property_bag::PropertyBag;
use crate::week::Week;
use crate::year::Year;

// ── Cached nodes ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct YearNode {
    pub(crate) number: i64,
    pub(crate) properties: RefCell<Option<PropertyBag>>,
}

#[derive(Debug)]
pub(crate) struct MonthNode {
    /// 0-based month of the year.
    pub(crate) index: i64,
    pub(crate) year: Rc<YearNode>,
    pub(crate) properties: RefCell<Option<PropertyBag>>,
}

#[derive(Debug)]
pub(crate) struct WeekNode {
    pub(crate) number: i64,
    /// The week year, which may differ from the calendar year of some days.
    pub(crate) year: Rc<YearNode>,
    pub(crate) properties: RefCell<Option<PropertyBag>>,
}

#[derive(Debug)]
pub(crate) struct DayNode {
    pub(crate) number: i64,
    pub(crate) month: Rc<MonthNode>,
    pub(crate) properties: RefCell<Option<PropertyBag>>,
}

// ── Factory ─────────────────────────────────────────────────────────────────

struct FactoryInner {
    formatter: DateFormatter,
    /// Handed to points for traversal and formatting.
    scratch: RefCell<Box<dyn CalendarEngine>>,
    /// Used only while normalizing requests, never lent out.
    normalizer: RefCell<Box<dyn CalendarEngine>>,
    years: RefCell<HashMap<i64, Rc<YearNode>>>,
    months: RefCell<HashMap<(i64, i64), Rc<MonthNode>>>,
    weeks: RefCell<HashMap<(i64, i64), Rc<WeekNode>>>,
    days: RefCell<HashMap<(i64, i64, i64), Rc<DayNode>>>,
}

/// Builds, normalizes and caches [`Year`], [`Month`], [`Week`] and [`Day`]
/// points.
///
/// The factory is a cheap handle; clones share the engines and caches.
/// It is single-threaded (`!Send`).
#[derive(Clone)]
pub struct PointFactory {
    inner: Rc<FactoryInner>,
}

impl PointFactory {
    /// Create a factory around `engine`.
    ///
    /// The engine becomes the scratch engine returned by
    /// [`calendar`](Self::calendar); normalization runs on a fork of it.
    pub fn new(engine: Box<dyn CalendarEngine>, formatter: DateFormatter) -> Self {
        let normalizer = engine.fork();
        Self {
            inner: Rc::new(FactoryInner {
                formatter,
                scratch: RefCell::new(engine),
                normalizer: RefCell::new(normalizer),
                years: RefCell::new(HashMap::new()),
                months: RefCell::new(HashMap::new()),
                weeks: RefCell::new(HashMap::new()),
                days: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Returns the year `number`. Years are never normalized.
    pub fn year(&self, number: i64) -> Year {
        Year::new(self.year_node(number), self.clone())
    }

    /// Returns the month with 0-based `index` in `year`.
    ///
    /// Out-of-range indexes roll into neighboring years: index 12 of 2019
    /// is January 2020, index -1 is December 2018.
    pub fn month(&self, index: i64, year: i64) -> Month {
        Month::new(self.month_node(index, year), self.clone())
    }

    /// Returns week `week` of week year `year`.
    ///
    /// Week numbers beyond the year's last week continue into the next
    /// year; week 0 and negative weeks count back into the previous one.
    ///
    /// The week year is corrected by at most one year, so requests that
    /// land more than a year away keep the wrong week year:
    /// `week(106, 2019)` resolves to week 1 of 2020 rather than week 1 of
    /// 2021.
    pub fn week(&self, week: i64, year: i64) -> Week {
        Week::new(self.week_node(week, year), self.clone())
    }

    /// Returns day `day` of the month with 0-based `index` in `year`,
    /// rolling over out-of-range days and months.
    pub fn day(&self, day: i64, index: i64, year: i64) -> Day {
        Day::new(self.day_node(day, index, year), self.clone())
    }

    /// The scratch engine. Every point method that stages it resets it.
    ///
    /// # Panics
    ///
    /// Panics if the engine is already borrowed, e.g. by a guard returned
    /// from an earlier call that is still alive.
    pub fn calendar(&self) -> RefMut<'_, Box<dyn CalendarEngine>> {
        self.inner.scratch.borrow_mut()
    }

    pub fn formatter(&self) -> &DateFormatter {
        &self.inner.formatter
    }

    /// Number of cached points of all kinds.
    pub fn cached_points(&self) -> usize {
        self.inner.years.borrow().len()
            + self.inner.months.borrow().len()
            + self.inner.weeks.borrow().len()
            + self.inner.days.borrow().len()
    }

    pub(crate) fn same_factory(&self, other: &PointFactory) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn year_node(&self, number: i64) -> Rc<YearNode> {
        let mut years = self.inner.years.borrow_mut();
        let node = years.entry(number).or_insert_with(|| {
            trace!(year = number, "caching year");
            Rc::new(YearNode {
                number,
                properties: RefCell::new(None),
            })
        });
        Rc::clone(node)
    }

    fn month_node(&self, index: i64, year: i64) -> Rc<MonthNode> {
        let (resolved_year, resolved_index) = {
            let mut engine = self.inner.normalizer.borrow_mut();
            engine.set_date(year, index, 1);
            (engine.get(Field::Year), engine.get(Field::Month))
        };
        if (resolved_year, resolved_index) != (year, index) {
            debug!(
                year,
                month = index,
                resolved_year,
                resolved_month = resolved_index,
                "month rolled over"
            );
        }

        let key = (resolved_year, resolved_index);
        if let Some(node) = self.inner.months.borrow().get(&key) {
            return Rc::clone(node);
        }

        trace!(year = resolved_year, month = resolved_index, "caching month");
        let node = Rc::new(MonthNode {
            index: resolved_index,
            year: self.year_node(resolved_year),
            properties: RefCell::new(None),
        });
        self.inner.months.borrow_mut().insert(key, Rc::clone(&node));
        node
    }

    fn week_node(&self, week: i64, year: i64) -> Rc<WeekNode> {
        let resolved_week = {
            let mut engine = self.inner.normalizer.borrow_mut();
            engine.set_date(year, 0, 1);
            engine.set(Field::WeekOfYear, week);
            engine.set(Field::LocalDayOfWeek, 1);
            engine.get(Field::WeekOfYear)
        };

        let resolved_year = match resolved_week.cmp(&week) {
            Ordering::Less => year.saturating_add(1),
            Ordering::Greater => year.saturating_sub(1),
            Ordering::Equal => year,
        };
        if resolved_year != year {
            debug!(week, year, resolved_week, resolved_year, "week rolled over");
        }

        let key = (resolved_year, resolved_week);
        if let Some(node) = self.inner.weeks.borrow().get(&key) {
            return Rc::clone(node);
        }

        trace!(year = resolved_year, week = resolved_week, "caching week");
        let node = Rc::new(WeekNode {
            number: resolved_week,
            year: self.year_node(resolved_year),
            properties: RefCell::new(None),
        });
        self.inner.weeks.borrow_mut().insert(key, Rc::clone(&node));
        node
    }

    fn day_node(&self, day: i64, index: i64, year: i64) -> Rc<DayNode> {
        let key = {
            let mut engine = self.inner.normalizer.borrow_mut();
            engine.set_date(year, index, day);
            (
                engine.get(Field::Year),
                engine.get(Field::Month),
                engine.get(Field::DayOfMonth),
            )
        };
        if key != (year, index, day) {
            trace!(day, month = index, year, resolved = ?key, "day rolled over");
        }

        if let Some(node) = self.inner.days.borrow().get(&key) {
            return Rc::clone(node);
        }

        let (resolved_year, resolved_index, resolved_day) = key;
        let node = Rc::new(DayNode {
            number: resolved_day,
            month: self.month_node(resolved_index, resolved_year),
            properties: RefCell::new(None),
        });
        self.inner.days.borrow_mut().insert(key, Rc::clone(&node));
        node
    }
}

impl std::fmt::Debug for PointFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointFactory")
            .field("locale", &self.inner.formatter.locale().to_string())
            .field("timezone", &self.inner.formatter.timezone())
            .field("cached_points", &self.cached_points())
            .finish()
    }
}
