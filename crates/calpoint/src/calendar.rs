//! The entry point: a locale- and timezone-bound calendar.
//!
//! [`Calendar`] builds the engine, formatter and [`PointFactory`] for one
//! configuration and exposes 1-based lookups plus clock-relative helpers.
//! The clock-relative helpers come in pairs: `today()` reads the system
//! clock, `today_at(now)` takes the anchor from the caller so results are
//! reproducible.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::day::Day;
use crate::engine::GregorianEngine;
use crate::error::{CalendarError, Result};
use crate::factory::PointFactory;
use crate::format::DateFormatter;
use crate::locale::LocaleTag;
use crate::month::Month;
use crate::options::CalendarOptions;
use crate::week::Week;
use crate::year::Year;

/// A calendar for one locale and timezone.
///
/// # Examples
///
/// ```
/// use calpoint::{Calendar, Point};
///
/// let calendar = Calendar::new("de-DE", "Europe/Berlin").unwrap();
/// let month = calendar.month(12, 2019);
/// let weeks: Vec<(i64, i64)> = month
///     .weeks()
///     .iter()
///     .map(|week| (week.number(), week.year().number()))
///     .collect();
/// assert_eq!(weeks.first(), Some(&(48, 2019)));
/// assert_eq!(weeks.last(), Some(&(1, 2020)));
/// ```
#[derive(Debug, Clone)]
pub struct Calendar {
    factory: PointFactory,
    locale: LocaleTag,
    timezone: Tz,
}

impl Calendar {
    /// Create a calendar with the locale's own week rules.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidLocale`] for an unparseable tag or
    /// one without localized date names, and
    /// [`CalendarError::InvalidTimezone`] for an unknown IANA name.
    pub fn new(locale: &str, timezone: &str) -> Result<Self> {
        Self::with_options(
            &CalendarOptions::default()
                .with_locale(locale)
                .with_timezone(timezone),
        )
    }

    /// Create a calendar from explicit options.
    pub fn with_options(options: &CalendarOptions) -> Result<Self> {
        let locale = LocaleTag::parse(&options.locale)?;
        let timezone = parse_timezone(&options.timezone)?;
        let rules = options.week_rules(&locale);

        let formatter = DateFormatter::new(&locale, timezone)?;
        let engine = GregorianEngine::with_rules(locale.clone(), timezone, rules);
        debug!(
            %locale,
            %timezone,
            first_weekday = %rules.first_weekday,
            min_days = rules.min_days_in_first_week,
            "calendar created"
        );

        Ok(Self {
            factory: PointFactory::new(Box::new(engine), formatter),
            locale,
            timezone,
        })
    }

    /// Create a calendar configured from the environment.
    ///
    /// See [`CalendarOptions::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::with_options(&CalendarOptions::from_env())
    }

    pub fn year(&self, year: i64) -> Year {
        self.factory.year(year)
    }

    /// Returns `month` (1-based) of `year`; out-of-range months roll over.
    pub fn month(&self, month: i64, year: i64) -> Month {
        self.factory.month(month.saturating_sub(1), year)
    }

    pub fn week(&self, week: i64, year: i64) -> Week {
        self.factory.week(week, year)
    }

    /// Returns `day` of `month` (1-based) of `year`, rolling over as needed.
    pub fn day(&self, day: i64, month: i64, year: i64) -> Day {
        self.factory.day(day, month.saturating_sub(1), year)
    }

    /// The day carrying the civil date of `date`.
    pub fn from_date(&self, date: &impl Datelike) -> Day {
        self.day(
            i64::from(date.day()),
            i64::from(date.month()),
            i64::from(date.year()),
        )
    }

    pub fn today(&self) -> Day {
        self.today_at(Utc::now())
    }

    /// The day `now` falls on in this calendar's timezone.
    pub fn today_at(&self, now: DateTime<Utc>) -> Day {
        self.from_date(&now.with_timezone(&self.timezone))
    }

    pub fn yesterday(&self) -> Day {
        self.yesterday_at(Utc::now())
    }

    pub fn yesterday_at(&self, now: DateTime<Utc>) -> Day {
        self.today_at(now).previous_day()
    }

    pub fn tomorrow(&self) -> Day {
        self.tomorrow_at(Utc::now())
    }

    pub fn tomorrow_at(&self, now: DateTime<Utc>) -> Day {
        self.today_at(now).next_day()
    }

    pub fn this_week(&self) -> Week {
        self.this_week_at(Utc::now())
    }

    pub fn this_week_at(&self, now: DateTime<Utc>) -> Week {
        self.today_at(now).week()
    }

    pub fn last_week(&self) -> Week {
        self.last_week_at(Utc::now())
    }

    pub fn last_week_at(&self, now: DateTime<Utc>) -> Week {
        self.this_week_at(now).previous_week()
    }

    pub fn next_week(&self) -> Week {
        self.next_week_at(Utc::now())
    }

    pub fn next_week_at(&self, now: DateTime<Utc>) -> Week {
        self.this_week_at(now).next_week()
    }

    /// Localized full weekday names, Monday first.
    pub fn day_of_week_names(&self) -> Vec<String> {
        self.factory.formatter().weekday_names()
    }

    pub fn factory(&self) -> &PointFactory {
        &self.factory
    }

    pub fn locale(&self) -> &LocaleTag {
        &self.locale
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| CalendarError::InvalidTimezone(format!("'{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use chrono::{NaiveDate, Weekday};

    fn calendar() -> Calendar {
        Calendar::new("de-DE", "Europe/Berlin").unwrap()
    }

    fn anchor(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let err = Calendar::new("de-DE", "Mars/Olympus").unwrap_err();
        assert!(matches!(err, CalendarError::InvalidTimezone(_)));

        let err = Calendar::new("??", "UTC").unwrap_err();
        assert!(matches!(err, CalendarError::InvalidLocale(_)));
    }

    #[test]
    fn test_years() {
        let calendar = calendar();
        for number in [2019, -2019, 1_002_019] {
            assert_eq!(calendar.year(number).number(), number);
        }
    }

    #[test]
    fn test_months_and_weeks() {
        let calendar = calendar();
        for month in 1..=12 {
            let m = calendar.month(month, 2019);
            assert_eq!(m.number(), month);
            assert_eq!(m.year().number(), 2019);
        }
        for week in 1..=52 {
            let w = calendar.week(week, 2019);
            assert_eq!(w.number(), week);
            assert_eq!(w.year().number(), 2019);
        }
    }

    #[test]
    fn test_from_date() {
        let calendar = calendar();
        let date = NaiveDate::from_ymd_opt(2019, 9, 8).unwrap();
        let day = calendar.from_date(&date);
        assert_eq!(day.number(), 8);
        assert_eq!(day.month().number(), 9);
        assert_eq!(day.year().number(), 2019);
        assert_eq!(day, calendar.day(8, 9, 2019));
    }

    #[test]
    fn test_properties_are_shared_between_handles() {
        let calendar = calendar();
        calendar.day(1, 1, 2019).properties().set("holiday", "Neujahr");

        let same = calendar.from_date(&NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert_eq!(
            same.properties().get_or("holiday", ""),
            serde_json::json!("Neujahr")
        );
        assert!(!calendar.day(2, 1, 2019).properties().has("holiday"));
    }

    #[test]
    fn test_with_properties_releases_the_bag() {
        let calendar = calendar();
        let first = calendar.week(1, 2020);
        let second = calendar.day(1, 1, 2020).week();

        first.with_properties(|bag| bag.set("sprint", 7));
        let sprint = second.with_properties(|bag| {
            bag.set("goal", "release");
            bag.get_or("sprint", 0)
        });
        assert_eq!(sprint, serde_json::json!(7));
        assert_eq!(first.property("goal"), Some(serde_json::json!("release")));
        assert_eq!(second.property("missing"), None);
    }

    #[test]
    fn test_relative_days_use_calendar_timezone() {
        let calendar = calendar();
        // 23:30 UTC is already the next day in Berlin
        let now = anchor("2019-12-31T23:30:00Z");
        assert_eq!(calendar.today_at(now), calendar.day(1, 1, 2020));
        assert_eq!(calendar.yesterday_at(now), calendar.day(31, 12, 2019));
        assert_eq!(calendar.tomorrow_at(now), calendar.day(2, 1, 2020));
    }

    #[test]
    fn test_relative_weeks() {
        let calendar = calendar();
        let now = anchor("2020-01-02T12:00:00Z");
        assert_eq!(calendar.this_week_at(now), calendar.week(1, 2020));
        assert_eq!(calendar.last_week_at(now), calendar.week(52, 2019));
        assert_eq!(calendar.next_week_at(now), calendar.week(2, 2020));
    }

    #[test]
    fn test_clock_helpers_agree() {
        let calendar = Calendar::new("en-US", "UTC").unwrap();
        let yesterday = calendar.yesterday();
        let today = calendar.today();
        let tomorrow = calendar.tomorrow();
        let later = calendar.today_at(Utc::now());

        // The clock may cross midnight between reads
        assert!(later == today || later == today.next_day());
        assert!(yesterday.next_day() == today || yesterday.next_day().next_day() == today);
        assert!(tomorrow.previous_day() == today || tomorrow.previous_day() == today.next_day());
        let week = calendar.this_week();
        assert!(week.contains(&today) || week.contains(&today.next_day()));
    }

    #[test]
    fn test_day_of_week_names() {
        assert_eq!(
            Calendar::new("en-US", "UTC").unwrap().day_of_week_names(),
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
        assert_eq!(
            calendar().day_of_week_names(),
            vec!["Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag"]
        );
    }

    #[test]
    fn test_options_override_week_rules() {
        let options = CalendarOptions::default()
            .with_locale("en-US")
            .with_first_weekday(Weekday::Mon)
            .with_min_days_in_first_week(4);
        let calendar = Calendar::with_options(&options).unwrap();

        let week = calendar.day(31, 12, 2019).week();
        assert_eq!((week.number(), week.year().number()), (1, 2020));
        assert_eq!(
            calendar.week(1, 2020).first_day().date_iso().unwrap(),
            "2019-12-30"
        );
    }

    #[test]
    fn test_accessors() {
        let calendar = calendar();
        assert_eq!(calendar.locale().to_string(), "de-DE");
        assert_eq!(calendar.timezone(), chrono_tz::Europe::Berlin);
        assert_eq!(calendar.factory().formatter().locale().language(), "de");
    }
}
