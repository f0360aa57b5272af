// ABOUTME: Day-bucket arithmetic for the daily analysis quota
// ABOUTME: Maps an instant to the start of its quota day in a fixed UTC offset

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, TimeDelta, Utc};
use thiserror::Error;

use crate::constants::DEFAULT_QUOTA_UTC_OFFSET_HOURS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaClockError {
    #[error("UTC offset out of range: {0} hours")]
    OffsetOutOfRange(i32),
}

/// Decides which calendar day a usage event counts against.
///
/// Counters reset at local midnight of the configured offset, so the
/// bucket for an instant is `[start_of_day, reset_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaClock {
    offset: FixedOffset,
}

impl QuotaClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn from_utc_offset_hours(hours: i32) -> Result<Self, QuotaClockError> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or(QuotaClockError::OffsetOutOfRange(hours))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// First instant of the quota day containing `now`
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_midnight = now
            .with_timezone(&self.offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::<Utc>::from_naive_utc_and_offset(utc_midnight, Utc)
    }

    /// Instant at which the counters for `now` reset
    pub fn reset_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_day(now) + TimeDelta::days(1)
    }
}

impl Default for QuotaClock {
    fn default() -> Self {
        Self::from_utc_offset_hours(DEFAULT_QUOTA_UTC_OFFSET_HOURS)
            .unwrap_or_else(|_| Self::new(Utc.fix()))
    }
}
