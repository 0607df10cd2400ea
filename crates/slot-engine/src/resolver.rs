//! Availability resolution: which candidate start times are bookable.
//!
//! A candidate is bookable when the meeting starting at it fits entirely
//! inside one of the schedule's blocks for that local date, and does not
//! overlap any busy interval. Containment is closed (a meeting may start at
//! the block start and end at the block end); overlap is open (a meeting may
//! end exactly when busy time starts). The asymmetry is deliberate.
//!
//! The resolver is pure: no I/O, no retained state. Weekday and date are
//! always taken in the schedule's timezone, so the same instant can be Monday
//! for one user and Tuesday for another.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::busy::BusyInterval;
use crate::dst::{resolve_local, DstPolicy, Edge};
use crate::schedule::{AvailabilityBlock, DayOfWeek, Schedule};

/// Filter `candidates` down to the bookable ones, preserving order.
///
/// Returns an empty list when there are no candidates, no schedule, or a zero
/// duration. Uses [`DstPolicy::default`] for blocks on transition days.
pub fn resolve(
    candidates: &[DateTime<Utc>],
    duration_minutes: u32,
    schedule: Option<&Schedule>,
    busy: &[BusyInterval],
) -> Vec<DateTime<Utc>> {
    resolve_with_policy(
        candidates,
        duration_minutes,
        schedule,
        busy,
        DstPolicy::default(),
    )
}

/// [`resolve`] with an explicit DST policy for block boundaries.
pub fn resolve_with_policy(
    candidates: &[DateTime<Utc>],
    duration_minutes: u32,
    schedule: Option<&Schedule>,
    busy: &[BusyInterval],
    policy: DstPolicy,
) -> Vec<DateTime<Utc>> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let Some(schedule) = schedule else {
        debug!("no schedule, nothing is bookable");
        return Vec::new();
    };
    if duration_minutes == 0 {
        debug!("zero-length meeting, nothing is bookable");
        return Vec::new();
    }

    // Bucket once per call; every candidate reuses it.
    let by_day = schedule.blocks_by_day();
    let duration = Duration::minutes(i64::from(duration_minutes));
    let tz = schedule.timezone;
    let check = |c: &DateTime<Utc>| is_bookable(*c, duration, tz, &by_day, busy, policy);

    #[cfg(feature = "parallel")]
    let bookable: Vec<DateTime<Utc>> = {
        use rayon::prelude::*;
        candidates.par_iter().copied().filter(check).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let bookable: Vec<DateTime<Utc>> = candidates.iter().copied().filter(check).collect();

    debug!(
        candidates = candidates.len(),
        bookable = bookable.len(),
        timezone = tz.name(),
        duration_minutes,
        "resolved availability"
    );
    bookable
}

/// The absolute interval a block covers on a given local date, or `None` if
/// the DST policy drops it for that date.
pub fn block_interval(
    block: &AvailabilityBlock,
    date: NaiveDate,
    tz: Tz,
    policy: DstPolicy,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = resolve_local(date.and_time(block.start_time), tz, Edge::Start, policy)?;
    let end = resolve_local(date.and_time(block.end_time), tz, Edge::End, policy)?;
    (start < end).then_some((start, end))
}

fn is_bookable(
    candidate: DateTime<Utc>,
    duration: Duration,
    tz: Tz,
    by_day: &HashMap<DayOfWeek, Vec<&AvailabilityBlock>>,
    busy: &[BusyInterval],
    policy: DstPolicy,
) -> bool {
    let local = candidate.with_timezone(&tz);
    let Some(blocks) = by_day.get(&DayOfWeek::from(local.weekday())) else {
        return false;
    };
    let Some(meeting_end) = candidate.checked_add_signed(duration) else {
        return false;
    };

    let date = local.date_naive();
    let contained = blocks
        .iter()
        .filter_map(|block| block_interval(block, date, tz, policy))
        .any(|(start, end)| start <= candidate && meeting_end <= end);

    contained && !busy.iter().any(|b| b.overlaps(candidate, meeting_end))
}
