use clap::{Parser, Subcommand};

/// Browse a locale-aware calendar by year, month, week and day.
#[derive(Parser)]
#[command(
    name = "calpoint",
    version,
    about = "Browse a locale-aware calendar by year, month, week and day"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Locale tag such as de-DE or en_US.UTF-8 [default: from LC_ALL/LANG].
    #[arg(short, long, global = true, env = "CALPOINT_LOCALE")]
    pub locale: Option<String>,

    /// IANA timezone name [default: the system timezone].
    #[arg(short, long, global = true, env = "CALPOINT_TIMEZONE")]
    pub timezone: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Show the weeks of a month with their days.
    Month(MonthArgs),
    /// Show the days of a week.
    Week(WeekArgs),
    /// Show a day with its week and weekend status.
    Day(DayArgs),
    /// Show the months and week count of a year.
    Year(YearArgs),
    /// Show today.
    Today,
    /// List the localized weekday names, Monday first.
    Weekdays,
}

/// Arguments for the `month` subcommand.
#[derive(clap::Args)]
pub struct MonthArgs {
    /// Month number, 1-based; other values roll into adjacent years.
    #[arg(allow_negative_numbers = true)]
    pub month: i64,

    #[arg(allow_negative_numbers = true)]
    pub year: i64,
}

/// Arguments for the `week` subcommand.
#[derive(clap::Args)]
pub struct WeekArgs {
    /// Week of the week year.
    #[arg(allow_negative_numbers = true)]
    pub week: i64,

    #[arg(allow_negative_numbers = true)]
    pub year: i64,
}

/// Arguments for the `day` subcommand.
#[derive(clap::Args)]
pub struct DayArgs {
    #[arg(allow_negative_numbers = true)]
    pub day: i64,

    /// Month number, 1-based.
    #[arg(allow_negative_numbers = true)]
    pub month: i64,

    #[arg(allow_negative_numbers = true)]
    pub year: i64,
}

/// Arguments for the `year` subcommand.
#[derive(clap::Args)]
pub struct YearArgs {
    #[arg(allow_negative_numbers = true)]
    pub year: i64,
}
