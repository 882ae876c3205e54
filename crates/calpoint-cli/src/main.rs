mod cli;
mod logging;
mod view;

use std::fmt::Display;
use std::process;

use anyhow::{Context, Result};
use calpoint::{Calendar, CalendarOptions};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::view::{DayView, MonthView, WeekView, WeekdaysView, YearView};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let calendar = build_calendar(cli.locale.as_deref(), cli.timezone.as_deref())?;
    let json = cli.json;

    match cli.command {
        Command::Month(args) => emit(&MonthView::new(&calendar.month(args.month, args.year))?, json),
        Command::Week(args) => emit(&WeekView::new(&calendar.week(args.week, args.year))?, json),
        Command::Day(args) => emit(
            &DayView::new(&calendar.day(args.day, args.month, args.year))?,
            json,
        ),
        Command::Year(args) => emit(&YearView::new(&calendar.year(args.year))?, json),
        Command::Today => emit(&DayView::new(&calendar.today())?, json),
        Command::Weekdays => emit(&WeekdaysView(calendar.day_of_week_names()), json),
    }
}

fn build_calendar(locale: Option<&str>, timezone: Option<&str>) -> Result<Calendar> {
    let mut options = CalendarOptions::from_env();
    if let Some(locale) = locale {
        options.locale = locale.to_string();
    }
    if let Some(timezone) = timezone {
        options.timezone = timezone.to_string();
    }

    info!(locale = %options.locale, timezone = %options.timezone, "building calendar");
    Calendar::with_options(&options).with_context(|| {
        format!(
            "cannot build a calendar for locale '{}' in timezone '{}'",
            options.locale, options.timezone
        )
    })
}

fn emit<T: Serialize + Display>(view: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("{view}");
    }
    Ok(())
}
