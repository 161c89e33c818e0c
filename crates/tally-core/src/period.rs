//! Calendar period boundaries for reports
//!
//! Every function here is a pure function of an explicit `today` date.
//! [`resolve`] and [`today`] are the only places that read the clock, and
//! they read it on every call so a window always reflects the current date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// A request for a calendar window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSpec {
    Today,
    SpecificDay(NaiveDate),
    /// Monday through Sunday of the current ISO week
    CurrentWeek,
    /// First of the current month through today
    MonthToDate,
    /// First through last day of the current month
    CurrentMonth,
    SpecificMonth { month: u32, year: i32 },
    /// January 1st through December 31st of the current year
    CurrentYear,
}

/// Closed date interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Current date in UTC, matching SQLite's `CURRENT_DATE`
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Resolve a period against the current date
pub fn resolve(spec: PeriodSpec) -> Result<DateWindow> {
    resolve_at(spec, today())
}

/// Resolve a period against an explicit date
pub fn resolve_at(spec: PeriodSpec, today: NaiveDate) -> Result<DateWindow> {
    let window = match spec {
        PeriodSpec::Today => DateWindow::single_day(today),
        PeriodSpec::SpecificDay(day) => DateWindow::single_day(day),
        PeriodSpec::CurrentWeek => DateWindow {
            start: first_weekday(today),
            end: last_weekday(today),
        },
        PeriodSpec::MonthToDate => DateWindow {
            start: first_month_day(today),
            end: today,
        },
        PeriodSpec::CurrentMonth => DateWindow {
            start: first_month_day(today),
            end: last_month_day(today),
        },
        PeriodSpec::SpecificMonth { month, year } => {
            let end = last_day_of_month(month, year)?;
            DateWindow {
                start: end - Duration::days(i64::from(end.day0())),
                end,
            }
        }
        PeriodSpec::CurrentYear => {
            let start = today - Duration::days(i64::from(today.ordinal0()));
            let length = if is_leap_year(today.year()) { 366 } else { 365 };
            DateWindow {
                start,
                end: start + Duration::days(length - 1),
            }
        }
    };
    Ok(window)
}

/// Monday of the ISO week containing `today`
pub fn first_weekday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// Sunday of the ISO week containing `today`
pub fn last_weekday(today: NaiveDate) -> NaiveDate {
    first_weekday(today) + Duration::days(6)
}

pub fn first_month_day(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.day0()))
}

pub fn last_month_day(today: NaiveDate) -> NaiveDate {
    let length = days_in_month(today.year(), today.month());
    first_month_day(today) + Duration::days(i64::from(length) - 1)
}

/// Last calendar date of an arbitrary month
pub fn last_day_of_month(month: u32, year: i32) -> Result<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidPeriod(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
        .ok_or_else(|| Error::InvalidPeriod(format!("year {} is out of range", year)))
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// (english, russian) month names, indexed by month - 1
const MONTH_NAMES: [(&str, &str); 12] = [
    ("january", "январь"),
    ("february", "февраль"),
    ("march", "март"),
    ("april", "апрель"),
    ("may", "май"),
    ("june", "июнь"),
    ("july", "июль"),
    ("august", "август"),
    ("september", "сентябрь"),
    ("october", "октябрь"),
    ("november", "ноябрь"),
    ("december", "декабрь"),
];

/// Month number for an English or Russian month name
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|(en, ru)| *en == name || *ru == name)
        .map(|idx| idx as u32 + 1)
}

impl PeriodSpec {
    /// Parse a period, resolving a bare month name against `today`'s year.
    ///
    /// Accepts `today`, `week`, `month`, `month-to-date`, `year`, `YYYY-MM-DD`,
    /// `YYYY-MM`, and month names (`october`, `october 2022`, `октябрь`).
    pub fn parse_at(input: &str, today: NaiveDate) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        let spec = match normalized.as_str() {
            "today" | "day" => PeriodSpec::Today,
            "week" | "this-week" | "current-week" => PeriodSpec::CurrentWeek,
            "month-to-date" | "mtd" => PeriodSpec::MonthToDate,
            "month" | "this-month" | "current-month" => PeriodSpec::CurrentMonth,
            "year" | "this-year" | "current-year" => PeriodSpec::CurrentYear,
            other => return Self::parse_dated(other, today),
        };
        Ok(spec)
    }

    fn parse_dated(input: &str, today: NaiveDate) -> Result<Self> {
        if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Ok(PeriodSpec::SpecificDay(day));
        }

        if let Some((year, month)) = input.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                return Self::specific_month(month, year);
            }
        }

        let mut words = input.split_whitespace();
        if let Some(month) = words.next().and_then(month_from_name) {
            let year = match words.next() {
                Some(y) => y
                    .parse::<i32>()
                    .map_err(|_| Error::InvalidPeriod(format!("invalid year '{}'", y)))?,
                None => today.year(),
            };
            if words.next().is_none() {
                return Self::specific_month(month, year);
            }
        }

        Err(Error::InvalidPeriod(format!(
            "unknown period '{}'. Available: today, week, month-to-date, month, year, \
             YYYY-MM-DD, YYYY-MM, or a month name",
            input
        )))
    }

    /// Validated constructor for [`PeriodSpec::SpecificMonth`]
    pub fn specific_month(month: u32, year: i32) -> Result<Self> {
        last_day_of_month(month, year)?;
        Ok(PeriodSpec::SpecificMonth { month, year })
    }
}

impl FromStr for PeriodSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_at(s, today())
    }
}

impl fmt::Display for PeriodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSpec::Today => write!(f, "today"),
            PeriodSpec::SpecificDay(day) => write!(f, "{}", day),
            PeriodSpec::CurrentWeek => write!(f, "week"),
            PeriodSpec::MonthToDate => write!(f, "month-to-date"),
            PeriodSpec::CurrentMonth => write!(f, "month"),
            PeriodSpec::SpecificMonth { month, year } => write!(f, "{:04}-{:02}", year, month),
            PeriodSpec::CurrentYear => write!(f, "year"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_week_is_monday_to_sunday_and_contains_day() {
        // Walk across two years, including year and leap-day boundaries
        let mut day = date(2023, 12, 1);
        while day < date(2025, 3, 1) {
            let window = resolve_at(PeriodSpec::CurrentWeek, day).unwrap();
            assert_eq!(window.start.weekday(), Weekday::Mon, "start for {}", day);
            assert_eq!(window.end.weekday(), Weekday::Sun, "end for {}", day);
            assert_eq!(window.days(), 7);
            assert!(window.contains(day), "{} not in {}", day, window);
            day += Duration::days(1);
        }
    }

    #[test]
    fn test_week_crossing_year_boundary() {
        // 2025-01-01 is a Wednesday
        let window = resolve_at(PeriodSpec::CurrentWeek, date(2025, 1, 1)).unwrap();
        assert_eq!(window.start, date(2024, 12, 30));
        assert_eq!(window.end, date(2025, 1, 5));
    }

    #[test]
    fn test_specific_month_end_is_true_last_day() {
        let cases = [
            ((2, 2024), date(2024, 2, 29)),
            ((2, 2023), date(2023, 2, 28)),
            ((2, 2000), date(2000, 2, 29)),
            ((2, 1900), date(1900, 2, 28)),
            ((4, 2022), date(2022, 4, 30)),
            ((10, 2022), date(2022, 10, 31)),
            ((12, 2022), date(2022, 12, 31)),
        ];
        for ((month, year), expected) in cases {
            let window = resolve_at(PeriodSpec::SpecificMonth { month, year }, date(2030, 1, 1))
                .unwrap();
            assert_eq!(window.start, date(year, month, 1));
            assert_eq!(window.end, expected, "month {} of {}", month, year);
            assert_eq!(last_day_of_month(month, year).unwrap(), expected);
        }
    }

    #[test]
    fn test_invalid_month_rejected() {
        for month in [0, 13, 99] {
            let err = resolve_at(PeriodSpec::SpecificMonth { month, year: 2022 }, date(2022, 1, 1))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidPeriod(_)));
        }
    }

    #[test]
    fn test_current_month_handles_leap_years() {
        let window = resolve_at(PeriodSpec::CurrentMonth, date(2024, 2, 10)).unwrap();
        assert_eq!(window, DateWindow { start: date(2024, 2, 1), end: date(2024, 2, 29) });

        let window = resolve_at(PeriodSpec::CurrentMonth, date(2023, 2, 28)).unwrap();
        assert_eq!(window.end, date(2023, 2, 28));
    }

    #[test]
    fn test_month_to_date_and_year() {
        let today = date(2022, 10, 19);
        let mtd = resolve_at(PeriodSpec::MonthToDate, today).unwrap();
        assert_eq!(mtd, DateWindow { start: date(2022, 10, 1), end: today });

        let year = resolve_at(PeriodSpec::CurrentYear, today).unwrap();
        assert_eq!(year, DateWindow { start: date(2022, 1, 1), end: date(2022, 12, 31) });

        let leap = resolve_at(PeriodSpec::CurrentYear, date(2024, 7, 4)).unwrap();
        assert_eq!(leap.days(), 366);
    }

    #[test]
    fn test_today_and_specific_day_are_single_day() {
        let today = date(2022, 10, 10);
        assert_eq!(resolve_at(PeriodSpec::Today, today).unwrap(), DateWindow::single_day(today));
        let other = date(2021, 3, 3);
        assert_eq!(
            resolve_at(PeriodSpec::SpecificDay(other), today).unwrap(),
            DateWindow::single_day(other)
        );
    }

    #[test]
    fn test_parse_keywords_and_dates() {
        let today = date(2022, 10, 19);
        assert_eq!(PeriodSpec::parse_at("Today", today).unwrap(), PeriodSpec::Today);
        assert_eq!(PeriodSpec::parse_at("week", today).unwrap(), PeriodSpec::CurrentWeek);
        assert_eq!(PeriodSpec::parse_at("mtd", today).unwrap(), PeriodSpec::MonthToDate);
        assert_eq!(PeriodSpec::parse_at("month", today).unwrap(), PeriodSpec::CurrentMonth);
        assert_eq!(PeriodSpec::parse_at("year", today).unwrap(), PeriodSpec::CurrentYear);
        assert_eq!(
            PeriodSpec::parse_at("2022-10-10", today).unwrap(),
            PeriodSpec::SpecificDay(date(2022, 10, 10))
        );
        assert_eq!(
            PeriodSpec::parse_at("2022-10", today).unwrap(),
            PeriodSpec::SpecificMonth { month: 10, year: 2022 }
        );
        assert!(PeriodSpec::parse_at("2022-13", today).is_err());
        assert!(PeriodSpec::parse_at("fortnight", today).is_err());
    }

    #[test]
    fn test_parse_month_names() {
        let today = date(2023, 5, 1);
        assert_eq!(
            PeriodSpec::parse_at("October", today).unwrap(),
            PeriodSpec::SpecificMonth { month: 10, year: 2023 }
        );
        assert_eq!(
            PeriodSpec::parse_at("october 2022", today).unwrap(),
            PeriodSpec::SpecificMonth { month: 10, year: 2022 }
        );
        assert_eq!(
            PeriodSpec::parse_at("Октябрь", today).unwrap(),
            PeriodSpec::SpecificMonth { month: 10, year: 2023 }
        );
        assert!(PeriodSpec::parse_at("october twenty", today).is_err());
        assert!(PeriodSpec::parse_at("october 2022 extra", today).is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let today = date(2022, 10, 19);
        let specs = [
            PeriodSpec::Today,
            PeriodSpec::SpecificDay(date(2022, 1, 9)),
            PeriodSpec::CurrentWeek,
            PeriodSpec::MonthToDate,
            PeriodSpec::CurrentMonth,
            PeriodSpec::SpecificMonth { month: 2, year: 2024 },
            PeriodSpec::CurrentYear,
        ];
        for spec in specs {
            assert_eq!(PeriodSpec::parse_at(&spec.to_string(), today).unwrap(), spec);
        }
    }
}
