//! Serializable snapshots of calendar points and their text rendering.

use std::fmt;

use anyhow::Result;
use calpoint::{Day, Month, Point, Week, Year};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: String,
    pub day: i64,
    pub weekday: String,
    pub weekday_short: String,
    pub weekend: bool,
    pub week: i64,
    pub week_year: i64,
}

impl DayView {
    pub fn new(day: &Day) -> Result<Self> {
        let week = day.week();
        Ok(Self {
            date: day.date_iso()?,
            day: day.number(),
            weekday: day.name_long()?,
            weekday_short: day.name_medium()?,
            weekend: day.is_weekend(),
            week: week.number(),
            week_year: week.year().number(),
        })
    }
}

impl fmt::Display for DayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.date, self.weekday)?;
        writeln!(f, "week {} of {}", self.week, self.week_year)?;
        write!(f, "{}", if self.weekend { "weekend" } else { "weekday" })
    }
}

#[derive(Debug, Serialize)]
pub struct WeekView {
    pub week: i64,
    pub year: i64,
    pub days: Vec<DayView>,
}

impl WeekView {
    pub fn new(week: &Week) -> Result<Self> {
        let days = week
            .days()
            .iter()
            .map(DayView::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            week: week.number(),
            year: week.year().number(),
            days,
        })
    }

    fn label(&self) -> String {
        format!("W{:02}", self.week)
    }
}

impl fmt::Display for WeekView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Week {}/{}", self.week, self.year)?;
        for day in &self.days {
            write!(f, "\n{} {}", day.date, day.weekday)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MonthView {
    pub month: i64,
    pub year: i64,
    pub name: String,
    pub days: usize,
    pub weeks: Vec<WeekView>,
}

impl MonthView {
    pub fn new(month: &Month) -> Result<Self> {
        let weeks = month
            .weeks()
            .iter()
            .map(WeekView::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            month: month.number(),
            year: month.year().number(),
            name: month.name_long()?,
            days: month.days().len(),
            weeks,
        })
    }
}

impl fmt::Display for MonthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.year)?;

        if let Some(first) = self.weeks.first() {
            write!(f, "\n{:<5}", "")?;
            for day in &first.days {
                write!(f, "{:>4}", day.weekday_short)?;
            }
        }

        for week in &self.weeks {
            write!(f, "\n{:<5}", week.label())?;
            for day in &week.days {
                write!(f, "{:>4}", day.day)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MonthSummary {
    pub month: i64,
    pub name: String,
    pub days: usize,
}

#[derive(Debug, Serialize)]
pub struct YearView {
    pub year: i64,
    pub days: usize,
    pub weeks: usize,
    pub months: Vec<MonthSummary>,
}

impl YearView {
    pub fn new(year: &Year) -> Result<Self> {
        let months = year
            .months()
            .iter()
            .map(|month| {
                Ok(MonthSummary {
                    month: month.number(),
                    name: month.name_long()?,
                    days: month.days().len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            year: year.number(),
            days: year.days().len(),
            weeks: year.weeks().len(),
            months,
        })
    }
}

impl fmt::Display for YearView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} days, {} weeks", self.year, self.days, self.weeks)?;
        for month in &self.months {
            write!(f, "\n{:>2} {:<12}{:>3}", month.month, month.name, month.days)?;
        }
        Ok(())
    }
}

/// Localized weekday names.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct WeekdaysView(pub Vec<String>);

impl fmt::Display for WeekdaysView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}
