//! Field-based calendar arithmetic.
//!
//! A [`CalendarEngine`] is a stateful scratch register holding one local
//! date and time. Callers stage it with absolute fields, read resolved
//! fields back, add signed deltas, and ask for the actual bounds of a
//! field in the current context. Setting a field never fails: values
//! outside the legal range roll over into the neighboring period, so
//! `set_date(2019, 12, 1)` lands on January 1, 2020 and `set_date(2019, 0, 0)`
//! on December 31, 2018.
//!
//! [`GregorianEngine`] is the shipped implementation: proleptic Gregorian,
//! with locale week rules from [`WeekRules`].
//!
//! # Field conventions
//!
//! - [`Field::Month`] is 0-based (0 = January).
//! - [`Field::DayOfWeek`] is 1 = Sunday through 7 = Saturday.
//! - [`Field::LocalDayOfWeek`] is 1 = the locale's first weekday through 7.
//! - [`Field::WeekOfYear`] and [`Field::WeekOfMonth`] follow the locale's
//!   first weekday and minimal days in the first week. A week of year may
//!   belong to the neighboring year's numbering (December 30, 2019 is in
//!   week 1 under ISO rules); week of month may be 0 for a short leading
//!   week.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::locale::{LocaleTag, WeekRules};

/// A calendar field addressed by [`CalendarEngine`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    /// 0-based month of the year.
    Month,
    DayOfMonth,
    DayOfYear,
    /// 1 = Sunday, 7 = Saturday.
    DayOfWeek,
    /// 1 = the locale's first weekday, 7 = the last.
    LocalDayOfWeek,
    WeekOfYear,
    WeekOfMonth,
    Hour,
    Minute,
    Second,
}

/// A locale- and timezone-scoped calendar used as a mutable scratch register.
pub trait CalendarEngine {
    /// Stage absolute date and time fields. Out-of-range values roll over.
    fn set_date_time(&mut self, year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64);

    /// Stage a date at midnight.
    fn set_date(&mut self, year: i64, month: i64, day: i64) {
        self.set_date_time(year, month, day, 0, 0, 0);
    }

    /// Set a single field, keeping the others, and resolve immediately.
    fn set(&mut self, field: Field, value: i64);

    /// Read a resolved field.
    fn get(&self, field: Field) -> i64;

    /// Add a signed delta to a field, rolling over into larger fields.
    fn add(&mut self, field: Field, amount: i64);

    /// The smallest value `field` takes in the current context.
    fn actual_minimum(&self, field: Field) -> i64;

    /// The largest value `field` takes in the current context.
    fn actual_maximum(&self, field: Field) -> i64;

    /// Returns true if the staged date is a weekend day in this locale.
    fn is_weekend(&self) -> bool;

    fn week_rules(&self) -> WeekRules;

    fn first_day_of_week(&self) -> Weekday {
        self.week_rules().first_weekday
    }

    fn locale(&self) -> &LocaleTag;

    fn timezone(&self) -> Tz;

    /// The staged local date and time.
    fn local_date_time(&self) -> NaiveDateTime;

    /// A fresh engine with the same locale, timezone and week rules.
    fn fork(&self) -> Box<dyn CalendarEngine>;
}

const SECONDS_PER_DAY: i64 = 86_400;

/// First year the engine stages. One year inside chrono's range, so the
/// week math of the first and last supported years can reach January 1 of
/// their neighbors.
pub const MIN_YEAR: i64 = -262_142;

/// Last year the engine stages.
pub const MAX_YEAR: i64 = 262_141;

/// Weekdays indexed by days from Monday.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Proleptic Gregorian [`CalendarEngine`] over a chrono [`NaiveDate`] cursor.
///
/// Staged values saturate: years before [`MIN_YEAR`] or after
/// [`MAX_YEAR`] are clamped to those years, and deltas that would leave
/// the range stop at its first or last day. A new engine is staged at
/// 1970-01-01 00:00:00.
#[derive(Debug, Clone)]
pub struct GregorianEngine {
    locale: LocaleTag,
    timezone: Tz,
    rules: WeekRules,
    date: NaiveDate,
    /// Seconds into `date`, always in `0..SECONDS_PER_DAY`.
    seconds: i64,
}

impl GregorianEngine {
    /// Create an engine using the week rules of `locale`.
    pub fn new(locale: LocaleTag, timezone: Tz) -> Self {
        let rules = WeekRules::for_locale(&locale);
        Self::with_rules(locale, timezone, rules)
    }

    /// Create an engine with explicit week rules.
    pub fn with_rules(locale: LocaleTag, timezone: Tz, rules: WeekRules) -> Self {
        Self {
            locale,
            timezone,
            rules,
            date: NaiveDate::default(),
            seconds: 0,
        }
    }

    fn year(&self) -> i64 {
        i64::from(self.date.year())
    }

    /// 0-based offset of `date` from the start of its locale week.
    fn local_offset(&self, date: NaiveDate) -> i64 {
        i64::from(self.rules.local_position(date.weekday())) - 1
    }

    /// The first day of week 1 of `year`.
    fn first_week_start(&self, year: i64) -> NaiveDate {
        let jan1 = ymd(year, 1, 1).unwrap_or(if year < 0 { NaiveDate::MIN } else { NaiveDate::MAX });
        self.period_week_start(jan1)
    }

    /// The first day of the first full-enough week of a period starting at `first`.
    fn period_week_start(&self, first: NaiveDate) -> NaiveDate {
        let offset = self.local_offset(first);
        if 7 - offset >= i64::from(self.rules.min_days_in_first_week) {
            shift(first, -offset)
        } else {
            shift(first, 7 - offset)
        }
    }

    fn week_of_year_at(&self, date: NaiveDate) -> i64 {
        let year = i64::from(date.year());
        if date >= self.first_week_start(year + 1) {
            return 1;
        }
        let start = self.first_week_start(year);
        if date < start {
            // Last week of the previous year's numbering
            return days_between(date, self.first_week_start(year - 1)).div_euclid(7) + 1;
        }
        days_between(date, start).div_euclid(7) + 1
    }

    fn weeks_in_year(&self, year: i64) -> i64 {
        days_between(self.first_week_start(year + 1), self.first_week_start(year)) / 7
    }

    /// Week of month; 0 for a leading week too short to count.
    fn week_of_month_at(&self, date: NaiveDate) -> i64 {
        let start = self.period_week_start(first_of_month(date));
        days_between(date, start).div_euclid(7) + 1
    }

    fn move_to(&mut self, date: NaiveDate) {
        self.date = date.clamp(lower_bound(), upper_bound());
    }

    fn move_days(&mut self, days: i64) {
        self.move_to(shift(self.date, days));
    }

    fn set_seconds_of_day(&mut self, seconds: i64) {
        self.move_days(seconds.div_euclid(SECONDS_PER_DAY));
        self.seconds = seconds.rem_euclid(SECONDS_PER_DAY);
    }

    /// Move to `day` of the month `month` (0-based, lenient) of `year`.
    fn set_lenient(&mut self, year: i64, month: i64, day: i64) {
        let year = year
            .saturating_add(month.div_euclid(12))
            .clamp(MIN_YEAR, MAX_YEAR);
        let month = month.rem_euclid(12) as u32 + 1;
        let first = ymd(year, month, 1).unwrap_or_else(lower_bound);
        self.move_to(shift(first, day.saturating_sub(1)));
    }

    /// Move by whole months, pinning the day to the target month's length.
    fn add_months(&mut self, months: i64) {
        let step = Months::new(u32::try_from(months.unsigned_abs()).unwrap_or(u32::MAX));
        let moved = if months >= 0 {
            self.date.checked_add_months(step).unwrap_or(NaiveDate::MAX)
        } else {
            self.date.checked_sub_months(step).unwrap_or(NaiveDate::MIN)
        };
        self.move_to(moved);
    }

    /// Move to `position` (1-based, lenient) within the local week starting
    /// `weeks` weeks after `week_start`.
    fn set_in_week(&mut self, week_start: NaiveDate, weeks: i64, position: i64) {
        let days = weeks
            .saturating_mul(7)
            .saturating_add(position.saturating_sub(1));
        self.move_to(shift(week_start, days));
    }
}

impl CalendarEngine for GregorianEngine {
    fn set_date_time(&mut self, year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64) {
        self.set_lenient(year, month, day);
        self.seconds = 0;
        self.set_seconds_of_day(
            hour.saturating_mul(3600)
                .saturating_add(minute.saturating_mul(60))
                .saturating_add(second),
        );
    }

    fn set(&mut self, field: Field, value: i64) {
        let (year, month, day) = (
            self.year(),
            i64::from(self.date.month0()),
            i64::from(self.date.day()),
        );
        let position = self.local_offset(self.date) + 1;
        match field {
            Field::Year => self.set_lenient(value, month, day),
            Field::Month => self.set_lenient(year, value, day),
            Field::DayOfMonth => self.set_lenient(year, month, value),
            Field::DayOfYear => self.set_lenient(year, 0, value),
            Field::DayOfWeek => {
                // 1 = Sunday
                let weekday = WEEKDAYS[((value.rem_euclid(7) + 5) % 7) as usize];
                let target = i64::from(self.rules.local_position(weekday));
                self.set_in_week(shift(self.date, 1 - position), 0, target);
            }
            Field::LocalDayOfWeek => {
                self.set_in_week(shift(self.date, 1 - position), 0, value);
            }
            Field::WeekOfYear => {
                let start = self.first_week_start(year);
                self.set_in_week(start, value.saturating_sub(1), position);
            }
            Field::WeekOfMonth => {
                let start = self.period_week_start(first_of_month(self.date));
                self.set_in_week(start, value.saturating_sub(1), position);
            }
            Field::Hour => {
                let rest = self.seconds % 3600;
                self.set_seconds_of_day(value.saturating_mul(3600).saturating_add(rest));
            }
            Field::Minute => {
                let hours = self.seconds / 3600;
                let secs = self.seconds % 60;
                self.set_seconds_of_day(
                    value
                        .saturating_mul(60)
                        .saturating_add(hours * 3600 + secs),
                );
            }
            Field::Second => {
                let minutes = self.seconds / 60;
                self.set_seconds_of_day(value.saturating_add(minutes * 60));
            }
        }
    }

    fn get(&self, field: Field) -> i64 {
        match field {
            Field::Year => self.year(),
            Field::Month => i64::from(self.date.month0()),
            Field::DayOfMonth => i64::from(self.date.day()),
            Field::DayOfYear => i64::from(self.date.ordinal()),
            Field::DayOfWeek => i64::from(self.date.weekday().number_from_sunday()),
            Field::LocalDayOfWeek => self.local_offset(self.date) + 1,
            Field::WeekOfYear => self.week_of_year_at(self.date),
            Field::WeekOfMonth => self.week_of_month_at(self.date),
            Field::Hour => self.seconds / 3600,
            Field::Minute => self.seconds % 3600 / 60,
            Field::Second => self.seconds % 60,
        }
    }

    fn add(&mut self, field: Field, amount: i64) {
        match field {
            Field::Year => self.add_months(amount.saturating_mul(12)),
            Field::Month => self.add_months(amount),
            Field::DayOfMonth | Field::DayOfYear | Field::DayOfWeek | Field::LocalDayOfWeek => {
                self.move_days(amount);
            }
            Field::WeekOfYear | Field::WeekOfMonth => self.move_days(amount.saturating_mul(7)),
            Field::Hour => {
                self.set_seconds_of_day(self.seconds.saturating_add(amount.saturating_mul(3600)));
            }
            Field::Minute => {
                self.set_seconds_of_day(self.seconds.saturating_add(amount.saturating_mul(60)));
            }
            Field::Second => self.set_seconds_of_day(self.seconds.saturating_add(amount)),
        }
    }

    fn actual_minimum(&self, field: Field) -> i64 {
        match field {
            Field::Year => MIN_YEAR,
            Field::Month | Field::Hour | Field::Minute | Field::Second => 0,
            Field::DayOfMonth | Field::DayOfYear | Field::WeekOfYear => 1,
            Field::DayOfWeek | Field::LocalDayOfWeek => 1,
            Field::WeekOfMonth => self.week_of_month_at(first_of_month(self.date)),
        }
    }

    fn actual_maximum(&self, field: Field) -> i64 {
        match field {
            Field::Year => MAX_YEAR,
            Field::Month => 11,
            Field::DayOfMonth => i64::from(last_of_month(self.date).day()),
            Field::DayOfYear => {
                if self.date.with_ordinal(366).is_some() {
                    366
                } else {
                    365
                }
            }
            Field::DayOfWeek | Field::LocalDayOfWeek => 7,
            Field::WeekOfYear => self.weeks_in_year(self.year()),
            Field::WeekOfMonth => self.week_of_month_at(last_of_month(self.date)),
            Field::Hour => 23,
            Field::Minute | Field::Second => 59,
        }
    }

    fn is_weekend(&self) -> bool {
        self.rules.is_weekend(self.date.weekday())
    }

    fn week_rules(&self) -> WeekRules {
        self.rules
    }

    fn locale(&self) -> &LocaleTag {
        &self.locale
    }

    fn timezone(&self) -> Tz {
        self.timezone
    }

    fn local_date_time(&self) -> NaiveDateTime {
        let time = u32::try_from(self.seconds)
            .ok()
            .and_then(|seconds| NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0))
            .unwrap_or(NaiveTime::MIN);
        self.date.and_time(time)
    }

    fn fork(&self) -> Box<dyn CalendarEngine> {
        Box::new(Self::with_rules(self.locale.clone(), self.timezone, self.rules))
    }
}

fn ymd(year: i64, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn lower_bound() -> NaiveDate {
    ymd(MIN_YEAR, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn upper_bound() -> NaiveDate {
    ymd(MAX_YEAR, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// `date` moved by `days`, stopping at the edge of chrono's range.
fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    let step = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(step).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(step).unwrap_or(NaiveDate::MIN)
    }
}

fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}
