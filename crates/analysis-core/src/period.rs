//! Filing-quarter resolution for institutional (13F-style) holdings data.
//!
//! Filings are due 45 days after quarter end. The resolver picks a quarter old enough
//! that major filers have certainly reported. The current time is always passed in.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::FiscalQuarter;

/// One row of the filing schedule: months `first_month..=last_month` resolve to
/// `quarter` of the current year shifted by `year_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilingWindow {
    pub first_month: u32,
    pub last_month: u32,
    pub year_offset: i32,
    pub quarter: u8,
}

const fn window(first_month: u32, last_month: u32, year_offset: i32, quarter: u8) -> FilingWindow {
    FilingWindow { first_month, last_month, year_offset, quarter }
}

/// Default schedule. Every month 1-12 must be covered exactly once.
pub const DEFAULT_FILING_SCHEDULE: [FilingWindow; 5] = [
    window(1, 2, -1, 3),
    window(3, 5, -1, 4),
    window(6, 8, 0, 1),
    window(9, 11, 0, 2),
    window(12, 12, 0, 3),
];

#[derive(Debug, Clone)]
pub struct PeriodResolver {
    schedule: Vec<FilingWindow>,
}

impl PeriodResolver {
    pub fn new() -> Self {
        Self {
            schedule: DEFAULT_FILING_SCHEDULE.to_vec(),
        }
    }

    /// Custom schedule; rejected unless it covers each month exactly once with quarters 1-4.
    pub fn with_schedule(schedule: Vec<FilingWindow>) -> Result<Self, crate::AnalysisError> {
        for month in 1..=12u32 {
            let hits = schedule
                .iter()
                .filter(|w| (w.first_month..=w.last_month).contains(&month))
                .count();
            if hits != 1 {
                return Err(crate::AnalysisError::Configuration(format!(
                    "filing schedule covers month {} {} times",
                    month, hits
                )));
            }
        }
        if let Some(bad) = schedule.iter().find(|w| !(1..=4).contains(&w.quarter)) {
            return Err(crate::AnalysisError::Configuration(format!(
                "filing schedule names quarter {}",
                bad.quarter
            )));
        }
        Ok(Self { schedule })
    }

    /// Most recent quarter whose institutional filings are assumed complete at `now`.
    pub fn most_recent_filing_quarter(&self, now: DateTime<Utc>) -> FiscalQuarter {
        let month = now.month();
        let window = self
            .schedule
            .iter()
            .find(|w| (w.first_month..=w.last_month).contains(&month))
            .copied()
            // Schedules are validated on construction; fall back to the strictest row.
            .unwrap_or(DEFAULT_FILING_SCHEDULE[0]);
        FiscalQuarter::new(now.year() + window.year_offset, window.quarter)
    }
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new()
    }
}

pub fn previous_quarter(year: i32, quarter: u8) -> FiscalQuarter {
    if quarter <= 1 {
        FiscalQuarter::new(year - 1, 4)
    } else {
        FiscalQuarter::new(year, quarter - 1)
    }
}

pub fn next_quarter(year: i32, quarter: u8) -> FiscalQuarter {
    if quarter >= 4 {
        FiscalQuarter::new(year + 1, 1)
    } else {
        FiscalQuarter::new(year, quarter + 1)
    }
}

/// Last calendar day of the quarter. Quarters outside 1-3 are treated as Q4.
pub fn quarter_end_date(year: i32, quarter: u8) -> NaiveDate {
    let (month, day) = match quarter {
        1 => (3, 31),
        2 => (6, 30),
        3 => (9, 30),
        _ => (12, 31),
    };
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

/// First calendar day of the quarter. Quarters outside 1-3 are treated as Q4.
pub fn quarter_start_date(year: i32, quarter: u8) -> NaiveDate {
    let month = match quarter {
        1 => 1,
        2 => 4,
        3 => 7,
        _ => 10,
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Quarter containing `date`.
pub fn quarter_of(date: NaiveDate) -> FiscalQuarter {
    FiscalQuarter::new(date.year(), ((date.month() - 1) / 3 + 1) as u8)
}
