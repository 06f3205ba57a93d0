//! Invocation-time clock and the report window derived from it.

use crate::errors::AppError;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;

/// Source of "now" for a pipeline run.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Inclusive calendar-date range requested from the survey API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Window ending "today" in `tz` and starting `lookback_days` earlier.
    pub fn ending_at(now: DateTime<Utc>, tz: Tz, lookback_days: i64) -> Result<Self, AppError> {
        let today = now.with_timezone(&tz);
        let start = TimeDelta::try_days(lookback_days)
            .and_then(|lookback| today.checked_sub_signed(lookback))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Lookback of {} days from {} is out of range",
                    lookback_days, today
                ))
            })?;

        Ok(Self {
            start: start.date_naive(),
            end: today.date_naive(),
        })
    }
}
