//! # Daily Scheduler
//!
//! Fires one reconciliation pass per day at a fixed UTC time, expressed as a
//! five-field cron expression restricted to `"M H * * *"`. Shutdown is
//! honoured between passes; a running pass is never cancelled.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use sanctions_geocoder::ReverseGeocoder;
use serde::{Deserialize, Serialize};

use crate::reconcile::Reconciler;
use crate::store::{RegionCatalog, SellerStore};

const SECS_PER_DAY: i64 = 86_400;

/// A daily UTC firing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DailySchedule {
    hour: u32,
    minute: u32,
}

impl DailySchedule {
    /// 22:00 UTC.
    pub const DEFAULT: DailySchedule = DailySchedule {
        hour: 22,
        minute: 0,
    };

    /// Build a schedule firing at `hour:minute` UTC.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 {
            return Err(ScheduleError::OutOfRange {
                field: "hour",
                value: hour,
            });
        }
        if minute > 59 {
            return Err(ScheduleError::OutOfRange {
                field: "minute",
                value: minute,
            });
        }
        Ok(Self { hour, minute })
    }

    /// Hour of day (UTC).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Minute of hour.
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The first firing time strictly after `now`.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let target = i64::from(self.hour * 3600 + self.minute * 60);
        let elapsed = i64::from(now.num_seconds_from_midnight());
        let mut delta = target - elapsed;
        if delta <= 0 {
            delta += SECS_PER_DAY;
        }
        now - Duration::nanoseconds(i64::from(now.nanosecond())) + Duration::seconds(delta)
    }
}

impl std::fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} * * *", self.minute, self.hour)
    }
}

impl std::str::FromStr for DailySchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ScheduleError::FieldCount(fields.len()));
        }
        if fields[2..].iter().any(|f| *f != "*") {
            return Err(ScheduleError::NotDaily(s.to_string()));
        }
        let parse = |field: &'static str, raw: &str| {
            raw.parse::<u32>().map_err(|_| ScheduleError::NotANumber {
                field,
                value: raw.to_string(),
            })
        };
        Self::new(parse("hour", fields[1])?, parse("minute", fields[0])?)
    }
}

impl TryFrom<String> for DailySchedule {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DailySchedule> for String {
    fn from(s: DailySchedule) -> Self {
        s.to_string()
    }
}

/// Schedule expression errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("expected 5 cron fields, got {0}")]
    FieldCount(usize),
    #[error("only daily schedules (\"M H * * *\") are supported, got {0:?}")]
    NotDaily(String),
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u32 },
}

/// Run one pass per day until `shutdown` resolves.
pub async fn run_daily<S, G, F>(reconciler: Arc<Reconciler<S, G>>, schedule: DailySchedule, shutdown: F)
where
    S: RegionCatalog + SellerStore,
    G: ReverseGeocoder,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let now = Utc::now();
        let next = schedule.next_fire_after(now);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::info!(%schedule, next_run = %next, "next reconciliation pass scheduled");

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("reconciliation scheduler stopping");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        if let Err(e) = reconciler.run_pass().await {
            tracing::error!(error = %e, "scheduled reconciliation pass did not complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn parses_daily_expression() {
        let s: DailySchedule = "30 4 * * *".parse().unwrap();
        assert_eq!((s.hour(), s.minute()), (4, 30));
        assert_eq!(s.to_string(), "30 4 * * *");
    }

    #[test]
    fn default_matches_expression() {
        assert_eq!("0 22 * * *".parse::<DailySchedule>().unwrap(), DailySchedule::DEFAULT);
    }

    #[test]
    fn rejects_non_daily_and_malformed() {
        assert_eq!(
            "0 22 * *".parse::<DailySchedule>().unwrap_err(),
            ScheduleError::FieldCount(4)
        );
        assert!(matches!(
            "0 22 1 * *".parse::<DailySchedule>(),
            Err(ScheduleError::NotDaily(_))
        ));
        assert!(matches!(
            "x 22 * * *".parse::<DailySchedule>(),
            Err(ScheduleError::NotANumber { field: "minute", .. })
        ));
        assert!(matches!(
            "0 24 * * *".parse::<DailySchedule>(),
            Err(ScheduleError::OutOfRange { field: "hour", .. })
        ));
    }

    #[test]
    fn next_fire_later_today() {
        assert_eq!(DailySchedule::DEFAULT.next_fire_after(at(10, 15, 30)), at(22, 0, 0));
    }

    #[test]
    fn next_fire_tomorrow_when_past() {
        let next = DailySchedule::DEFAULT.next_fire_after(at(23, 0, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 15, 22, 0, 0).unwrap());
    }

    #[test]
    fn next_fire_is_strictly_after_now() {
        let next = DailySchedule::DEFAULT.next_fire_after(at(22, 0, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 15, 22, 0, 0).unwrap());
    }

    #[test]
    fn next_fire_drops_subsecond_part() {
        let now = at(21, 59, 59) + Duration::milliseconds(250);
        assert_eq!(DailySchedule::DEFAULT.next_fire_after(now), at(22, 0, 0));
    }

    #[test]
    fn serde_uses_expression() {
        let v = serde_json::to_value(DailySchedule::DEFAULT).unwrap();
        assert_eq!(v, "0 22 * * *");
        assert!(serde_json::from_str::<DailySchedule>("\"61 1 * * *\"").is_err());
    }
}
