//! Locale tags and the week data derived from them.
//!
//! The engine only needs three facts from a locale: which weekday starts a
//! week, how many days of a year's first week must fall inside that year
//! for it to count as week 1, and which days form the weekend. Tags are
//! parsed and expanded to their likely region with ICU4X, and the first
//! weekday and weekend come from its CLDR week data. ICU4X keeps the
//! minimal-days rule internal, so that one is read from the CLDR region
//! table below.

use std::fmt;

use chrono::Weekday;
use icu_calendar::types::Weekday as IcuWeekday;
use icu_calendar::week::WeekInformation;
use icu_locale::LocaleExpander;
use icu_locale_core::Locale;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CalendarError, Result};

/// A parsed locale tag, expanded with its likely script and region.
///
/// Accepts BCP 47 (`de-DE`, `de-DE-u-fw-sun`) and POSIX (`de_DE.UTF-8@euro`)
/// spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag {
    locale: Locale,
}

impl LocaleTag {
    /// Parse a locale tag.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidLocale`] if the tag is not a
    /// well-formed locale identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use calpoint::LocaleTag;
    ///
    /// let tag = LocaleTag::parse("de_DE.UTF-8").unwrap();
    /// assert_eq!(tag.to_string(), "de-DE");
    ///
    /// let tag = LocaleTag::parse("fr").unwrap();
    /// assert_eq!(tag.region(), Some("FR"));
    /// ```
    pub fn parse(tag: &str) -> Result<Self> {
        // POSIX suffixes: codeset and modifier
        let base = tag.trim().split(['.', '@']).next().unwrap_or_default();
        let base = if base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
            "en-US".to_string()
        } else {
            base.replace('_', "-")
        };

        let mut locale = Locale::try_from_str(&base)
            .map_err(|e| CalendarError::InvalidLocale(format!("'{}': {}", tag, e)))?;
        if locale.id.language.is_unknown() {
            return Err(CalendarError::InvalidLocale(format!("'{}' names no language", tag)));
        }

        LocaleExpander::new_extended().maximize(&mut locale.id);
        Ok(Self { locale })
    }

    /// The expanded ICU locale.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The lowercase language subtag.
    pub fn language(&self) -> &str {
        self.locale.id.language.as_str()
    }

    /// The uppercase region subtag, given or implied by the language.
    pub fn region(&self) -> Option<&str> {
        self.locale.id.region.as_ref().map(|region| region.as_str())
    }

    /// The POSIX spelling (`de_DE`) used by the locale formatting data.
    pub fn posix(&self) -> String {
        match self.region() {
            Some(region) => format!("{}_{}", self.language(), region),
            None => self.language().to_string(),
        }
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region() {
            Some(region) => write!(f, "{}-{}", self.language(), region),
            None => f.write_str(self.language()),
        }
    }
}

/// Week conventions of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRules {
    /// The weekday at local day-of-week position 1.
    #[serde(with = "weekday_name")]
    pub first_weekday: Weekday,
    /// Minimal number of days of week 1 that must fall into the new year
    /// (1..=7). ISO 8601 uses 4.
    pub min_days_in_first_week: u8,
    /// First day of the weekend.
    #[serde(with = "weekday_name")]
    pub weekend_start: Weekday,
    /// Last day of the weekend (equal to `weekend_start` for one-day weekends).
    #[serde(with = "weekday_name")]
    pub weekend_end: Weekday,
}

impl WeekRules {
    /// ISO 8601 week rules: Monday first, 4-day first week, Saturday/Sunday weekend.
    pub const ISO: WeekRules = WeekRules {
        first_weekday: Weekday::Mon,
        min_days_in_first_week: 4,
        weekend_start: Weekday::Sat,
        weekend_end: Weekday::Sun,
    };

    /// Resolve the week rules of a locale from CLDR week data.
    ///
    /// A `-u-fw-` extension on the tag overrides the first weekday.
    pub fn for_locale(locale: &LocaleTag) -> Self {
        let min_days_in_first_week = match locale.region() {
            Some(region) if FOUR_DAY_FIRST_WEEK.contains(&region) => 4,
            _ => 1,
        };

        let info = match WeekInformation::try_new(locale.locale().into()) {
            Ok(info) => info,
            Err(e) => {
                warn!(locale = %locale, error = %e, "no week data, using world defaults");
                return Self {
                    min_days_in_first_week,
                    ..Self::ISO
                };
            }
        };

        let weekend: Vec<Weekday> = WEEKDAYS
            .into_iter()
            .filter(|day| info.weekend.contains(to_icu(*day)))
            .collect();
        // CLDR weekends are one contiguous run of days
        let weekend_start = weekend
            .iter()
            .copied()
            .find(|day| !weekend.contains(&day.pred()))
            .unwrap_or(Weekday::Sat);
        let mut weekend_end = weekend_start;
        while weekend.contains(&weekend_end.succ()) && weekend_end.succ() != weekend_start {
            weekend_end = weekend_end.succ();
        }

        Self {
            first_weekday: from_icu(info.first_weekday),
            min_days_in_first_week,
            weekend_start,
            weekend_end: if weekend.is_empty() { Weekday::Sun } else { weekend_end },
        }
    }

    /// The 1-based local position of `weekday` (1 = `first_weekday`).
    pub fn local_position(&self, weekday: Weekday) -> u32 {
        (weekday.num_days_from_monday() + 7 - self.first_weekday.num_days_from_monday()) % 7 + 1
    }

    /// Returns true if `weekday` falls into the weekend.
    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        let start = self.weekend_start.num_days_from_monday();
        let span = (self.weekend_end.num_days_from_monday() + 7 - start) % 7;
        let offset = (weekday.num_days_from_monday() + 7 - start) % 7;
        offset <= span
    }
}

impl Default for WeekRules {
    fn default() -> Self {
        Self::ISO
    }
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Regions whose first week needs four days (CLDR supplemental weekData
/// `minDays count="4"`). Every other region counts a one-day first week.
const FOUR_DAY_FIRST_WEEK: &[&str] = &[
    "AD", "AN", "AT", "AX", "BE", "BG", "CH", "CZ", "DE", "DK", "EE", "ES", "FI", "FJ", "FO", "FR",
    "GB", "GF", "GG", "GI", "GP", "GR", "HU", "IE", "IM", "IS", "IT", "JE", "LI", "LT", "LU", "MC",
    "MQ", "NL", "NO", "PL", "PT", "RE", "RU", "SE", "SJ", "SK", "SM", "VA",
];

fn to_icu(weekday: Weekday) -> IcuWeekday {
    match weekday {
        Weekday::Mon => IcuWeekday::Monday,
        Weekday::Tue => IcuWeekday::Tuesday,
        Weekday::Wed => IcuWeekday::Wednesday,
        Weekday::Thu => IcuWeekday::Thursday,
        Weekday::Fri => IcuWeekday::Friday,
        Weekday::Sat => IcuWeekday::Saturday,
        Weekday::Sun => IcuWeekday::Sunday,
    }
}

fn from_icu(weekday: IcuWeekday) -> Weekday {
    match weekday {
        IcuWeekday::Monday => Weekday::Mon,
        IcuWeekday::Tuesday => Weekday::Tue,
        IcuWeekday::Wednesday => Weekday::Wed,
        IcuWeekday::Thursday => Weekday::Thu,
        IcuWeekday::Friday => Weekday::Fri,
        IcuWeekday::Saturday => Weekday::Sat,
        IcuWeekday::Sunday => Weekday::Sun,
    }
}

/// Weekdays as chrono spells them ("Mon"); full names parse as well.
mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&weekday.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse::<Weekday>()
            .map_err(|_| serde::de::Error::custom(format!("unknown weekday '{name}'")))
    }
}
