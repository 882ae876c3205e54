//! Calendar configuration.

use std::env;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locale::{LocaleTag, WeekRules};

const DEFAULT_LOCALE: &str = "en-US";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Options for building a [`Calendar`](crate::Calendar).
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use calpoint::CalendarOptions;
///
/// let options: CalendarOptions =
///     serde_json::from_str(r#"{"locale": "en-GB", "first_weekday": "Sun"}"#).unwrap();
/// assert_eq!(options.locale, "en-GB");
/// assert_eq!(options.timezone, "UTC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    /// BCP 47 or POSIX locale tag.
    pub locale: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Overrides the locale's first weekday.
    pub first_weekday: Option<Weekday>,
    /// Overrides the locale's minimal days in the first week (clamped to 1..=7).
    pub min_days_in_first_week: Option<u8>,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            first_weekday: None,
            min_days_in_first_week: None,
        }
    }
}

impl CalendarOptions {
    /// Read options from the process environment.
    ///
    /// The locale comes from `CALPOINT_LOCALE`, `LC_ALL` or `LANG`, the
    /// timezone from `CALPOINT_TIMEZONE` or the system zone. Unset or
    /// empty variables fall through to the next source, then to the
    /// defaults.
    pub fn from_env() -> Self {
        let locale = ["CALPOINT_LOCALE", "LC_ALL", "LANG"]
            .iter()
            .find_map(|name| non_empty_var(name))
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let timezone = non_empty_var("CALPOINT_TIMEZONE")
            .or_else(|| iana_time_zone::get_timezone().ok())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        debug!(%locale, %timezone, "options from environment");

        Self {
            locale,
            timezone,
            ..Self::default()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_first_weekday(mut self, weekday: Weekday) -> Self {
        self.first_weekday = Some(weekday);
        self
    }

    pub fn with_min_days_in_first_week(mut self, days: u8) -> Self {
        self.min_days_in_first_week = Some(days);
        self
    }

    /// The week rules of `locale` with this configuration's overrides applied.
    pub fn week_rules(&self, locale: &LocaleTag) -> WeekRules {
        let mut rules = WeekRules::for_locale(locale);
        if let Some(weekday) = self.first_weekday {
            rules.first_weekday = weekday;
        }
        if let Some(days) = self.min_days_in_first_week {
            rules.min_days_in_first_week = days.clamp(1, 7);
        }
        rules
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CalendarOptions::default();
        assert_eq!(options.locale, "en-US");
        assert_eq!(options.timezone, "UTC");
        assert!(options.first_weekday.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: CalendarOptions =
            serde_json::from_str(r#"{"timezone": "Europe/Berlin", "min_days_in_first_week": 4}"#)
                .unwrap();
        assert_eq!(options.locale, "en-US");
        assert_eq!(options.timezone, "Europe/Berlin");
        assert_eq!(options.min_days_in_first_week, Some(4));
    }

    #[test]
    fn test_week_rule_overrides() {
        let locale = LocaleTag::parse("en-US").unwrap();
        let options = CalendarOptions::default()
            .with_first_weekday(Weekday::Mon)
            .with_min_days_in_first_week(12);
        let rules = options.week_rules(&locale);
        assert_eq!(rules.first_weekday, Weekday::Mon);
        assert_eq!(rules.min_days_in_first_week, 7);
        assert_eq!(rules.weekend_start, Weekday::Sat);
    }

    #[test]
    fn test_builders() {
        let options = CalendarOptions::default()
            .with_locale("de-DE")
            .with_timezone("Europe/Berlin");
        assert_eq!(options.locale, "de-DE");
        assert_eq!(options.timezone, "Europe/Berlin");
    }
}
