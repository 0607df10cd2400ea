//! Candidate start times to test for bookability.
//!
//! By default: every 15 minutes from now (rounded up to the next quarter
//! hour) through the end of the local day one year ahead.

use chrono::{DateTime, Days, Duration, Months, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{resolve_local, DstPolicy, Edge};

/// How far ahead to generate candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Days(u32),
    Years(u32),
}

/// Spacing and reach of generated candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateWindow {
    pub step_minutes: u32,
    pub horizon: Horizon,
}

impl Default for CandidateWindow {
    fn default() -> Self {
        Self {
            step_minutes: 15,
            horizon: Horizon::Years(1),
        }
    }
}

impl CandidateWindow {
    /// Generate candidates starting at `now`, with day boundaries taken in `tz`.
    ///
    /// The first candidate is `now` rounded up to a multiple of the step; the
    /// last is at or before 23:59:59.999 local time on the horizon date.
    /// A zero step yields no candidates.
    pub fn generate(&self, now: DateTime<Utc>, tz: Tz) -> Vec<DateTime<Utc>> {
        let Some(first) = ceil_to_step(now, self.step_minutes) else {
            return Vec::new();
        };
        let Some(last) = self.end_of_horizon(first, tz) else {
            return Vec::new();
        };

        let step = Duration::minutes(i64::from(self.step_minutes));
        let mut candidates = Vec::new();
        let mut cursor = first;
        while cursor <= last {
            candidates.push(cursor);
            cursor += step;
        }
        candidates
    }

    fn end_of_horizon(&self, start: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
        let start_date = start.with_timezone(&tz).date_naive();
        let horizon_date = match self.horizon {
            Horizon::Days(days) => start_date.checked_add_days(Days::new(u64::from(days)))?,
            Horizon::Years(years) => {
                start_date.checked_add_months(Months::new(years.checked_mul(12)?))?
            }
        };
        let next_midnight = horizon_date.succ_opt()?.and_time(NaiveTime::MIN);
        let next_day_start =
            resolve_local(next_midnight, tz, Edge::Start, DstPolicy::ShiftForward)?;
        Some(next_day_start - Duration::milliseconds(1))
    }
}

/// Round `instant` up to the next multiple of `step_minutes` since the epoch.
///
/// An instant already on a step boundary is returned unchanged. Returns `None`
/// for a zero step.
pub fn ceil_to_step(instant: DateTime<Utc>, step_minutes: u32) -> Option<DateTime<Utc>> {
    if step_minutes == 0 {
        return None;
    }
    let step_ms = i64::from(step_minutes) * 60_000;
    let ms = instant.timestamp_millis();
    // Millisecond truncation floors, so `floor <= instant` with equality only
    // when no sub-step part (down to the nanosecond) remains.
    let floor = DateTime::from_timestamp_millis(ms - ms.rem_euclid(step_ms))?;
    if floor == instant {
        return Some(instant);
    }
    floor.checked_add_signed(Duration::milliseconds(step_ms))
}
