//! Locale-aware rendering of staged points.
//!
//! A thin layer over chrono's localized strftime support: the formatter
//! owns the locale data handle and the timezone, turns the engine's local
//! wall-clock reading into an instant, and renders it with a pattern.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CalendarError, Result};
use crate::locale::LocaleTag;

/// Formats dates in one locale and timezone.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    locale: LocaleTag,
    data: chrono::Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Create a formatter for `locale` in `timezone`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidLocale`] if no localized date
    /// names exist for the tag.
    pub fn new(locale: &LocaleTag, timezone: Tz) -> Result<Self> {
        let data = chrono::Locale::try_from(locale.posix().as_str())
            .or_else(|_| chrono::Locale::try_from(locale.language()))
            .map_err(|_| CalendarError::InvalidLocale(format!("'{}' has no date names", locale)))?;

        Ok(Self {
            locale: locale.clone(),
            data,
            timezone,
        })
    }

    pub fn locale(&self) -> &LocaleTag {
        &self.locale
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve a local wall-clock reading to an instant in this timezone.
    ///
    /// Ambiguous readings (DST fall-back) take the earlier instant; readings
    /// inside a DST gap move forward by an hour. Returns `None` if chrono
    /// cannot represent the result.
    pub fn localize(&self, local: NaiveDateTime) -> Option<DateTime<Tz>> {
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                let shifted = local.checked_add_signed(TimeDelta::hours(1))?;
                self.timezone.from_local_datetime(&shifted).earliest()
            })
    }

    /// Render `instant` with a strftime `pattern` in this formatter's locale.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidPattern`] if `pattern` contains an
    /// unknown or incomplete specifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use calpoint::{DateFormatter, LocaleTag};
    /// use chrono::TimeZone;
    ///
    /// let formatter = DateFormatter::new(&LocaleTag::parse("de-DE").unwrap(), chrono_tz::Europe::Berlin).unwrap();
    /// let instant = chrono_tz::Europe::Berlin.with_ymd_and_hms(2019, 2, 1, 0, 0, 0).unwrap();
    /// assert_eq!(formatter.format(&instant, "%A, %x").unwrap(), "Freitag, 01.02.2019");
    /// ```
    pub fn format(&self, instant: &DateTime<Tz>, pattern: &str) -> Result<String> {
        if StrftimeItems::new(pattern).any(|item| item == Item::Error) {
            return Err(CalendarError::InvalidPattern(format!("'{}'", pattern)));
        }

        let mut rendered = String::new();
        write!(rendered, "{}", instant.format_localized(pattern, self.data))
            .map_err(|_| CalendarError::InvalidPattern(format!("'{}'", pattern)))?;
        Ok(rendered)
    }

    /// Localized full weekday names, Monday first.
    pub fn weekday_names(&self) -> Vec<String> {
        // 2024-01-01 was a Monday
        let Some(monday) = NaiveDate::from_ymd_opt(2024, 1, 1) else {
            return Vec::new();
        };

        (0..7)
            .filter_map(|offset| monday.checked_add_days(Days::new(offset)))
            .map(|date| {
                Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
                    .format_localized("%A", self.data)
                    .to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(locale: &str, timezone: Tz) -> DateFormatter {
        DateFormatter::new(&LocaleTag::parse(locale).unwrap(), timezone).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_format_german_names() {
        let f = formatter("de-DE", chrono_tz::Europe::Berlin);
        let instant = f.localize(local(2019, 2, 1, 0)).unwrap();
        assert_eq!(f.format(&instant, "%A").unwrap(), "Freitag");
        assert_eq!(f.format(&instant, "%a").unwrap(), "Fr");
        assert_eq!(f.format(&instant, "%B").unwrap(), "Februar");
        assert_eq!(f.format(&instant, "%x").unwrap(), "01.02.2019");
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let f = formatter("en-US", chrono_tz::UTC);
        let instant = f.localize(local(2019, 2, 1, 0)).unwrap();
        let err = f.format(&instant, "%Q").unwrap_err();
        assert!(matches!(err, CalendarError::InvalidPattern(_)));
    }

    #[test]
    fn test_unknown_locale_data() {
        let err = DateFormatter::new(&LocaleTag::parse("tlh").unwrap(), chrono_tz::UTC).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidLocale(_)));
    }

    #[test]
    fn test_localize_dst_gap_moves_forward() {
        let f = formatter("en-US", chrono_tz::America::New_York);
        // 2:00 does not exist on 2019-03-10 in New York
        let instant = f.localize(local(2019, 3, 10, 2)).unwrap();
        assert_eq!(instant.to_rfc3339(), "2019-03-10T03:00:00-04:00");
    }

    #[test]
    fn test_localize_ambiguous_takes_earliest() {
        let f = formatter("en-US", chrono_tz::America::New_York);
        let instant = f.localize(local(2019, 11, 3, 1)).unwrap();
        assert_eq!(instant.to_rfc3339(), "2019-11-03T01:00:00-04:00");
    }

    #[test]
    fn test_weekday_names() {
        let names = formatter("en-US", chrono_tz::UTC).weekday_names();
        assert_eq!(
            names,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );

        let names = formatter("de-DE", chrono_tz::UTC).weekday_names();
        assert_eq!(names[0], "Montag");
        assert_eq!(names[6], "Sonntag");
    }
}
