use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let end = self.end;
        (0..=(end - start).num_days()).map(move |i| start + chrono::Duration::days(i))
    }
}

/// Chart window: the three segments of the trend view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPeriod {
    OneMonth,
    OneYear,
    AllTime,
}

impl ChartPeriod {
    /// Earliest day still inside the window, or `None` for the unbounded
    /// all-time view.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::OneMonth => today.checked_sub_months(Months::new(1)),
            Self::OneYear => today.checked_sub_months(Months::new(12)),
            Self::AllTime => None,
        }
    }

    /// X-axis span for the chart. All-time stretches back to the earliest
    /// recorded day and falls back to a year when nothing is recorded.
    pub fn axis_range(&self, today: NaiveDate, earliest: Option<NaiveDate>) -> DateRange {
        let start = match self.cutoff(today) {
            Some(cutoff) => cutoff,
            None => earliest
                .unwrap_or_else(|| today.checked_sub_months(Months::new(12)).unwrap_or(today)),
        };
        DateRange::new(start.min(today), today)
    }

    /// Axis tick label, coarser as the window widens.
    pub fn axis_label(&self, date: NaiveDate) -> String {
        match self {
            Self::OneMonth => date.format("%-m/%-d").to_string(),
            Self::OneYear => date.format("%b").to_string(),
            Self::AllTime => date.format("'%y").to_string(),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::OneMonth => Self::OneYear,
            Self::OneYear => Self::AllTime,
            Self::AllTime => Self::OneMonth,
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OneMonth => "1 month",
            Self::OneYear => "1 year",
            Self::AllTime => "all time",
        };
        write!(f, "{label}")
    }
}

impl FromStr for ChartPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" | "month" => Ok(Self::OneMonth),
            "1y" | "year" => Ok(Self::OneYear),
            "all" => Ok(Self::AllTime),
            other => Err(format!("unknown period '{other}' (expected 1m, 1y or all)")),
        }
    }
}
