//! Busy time pulled from an external calendar.
//!
//! Provider events arrive either timed (`dateTime`) or all-day (`date`). Both
//! are reduced to absolute [`BusyInterval`]s before they reach the resolver.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dst::{resolve_local, DstPolicy, Edge};

/// An absolute `[start, end)` range during which the user is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `[start, end)` shares any time with this interval.
    ///
    /// Two ranges overlap iff `a.start < b.end && b.start < a.end`, so a
    /// meeting ending exactly when this interval starts does not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }

    /// Reduce a provider event to a busy interval.
    ///
    /// All-day events cover local midnight of the start date up to local
    /// midnight of the (exclusive) end date in `tz`. Events with missing or
    /// mixed bounds, or that end before they start, yield `None`.
    pub fn from_calendar_event(event: &CalendarEvent, tz: Tz) -> Option<Self> {
        let (start, end) = match (&event.start, &event.end) {
            (Some(s), Some(e)) => (s, e),
            _ => return None,
        };

        let (start, end) = match (start.date, end.date, start.date_time, end.date_time) {
            (Some(start_date), Some(end_date), _, _) => {
                (local_midnight(start_date, tz)?, local_midnight(end_date, tz)?)
            }
            (_, _, Some(start_dt), Some(end_dt)) => {
                (start_dt.with_timezone(&Utc), end_dt.with_timezone(&Utc))
            }
            _ => return None,
        };

        if end <= start {
            return None;
        }
        Some(Self { start, end })
    }
}

/// Start or end of a provider event: a date for all-day events, an instant
/// otherwise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
}

/// A calendar entry as listed by the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

/// Reduce provider events to busy intervals, dropping unusable ones.
pub fn from_calendar_events(events: &[CalendarEvent], tz: Tz) -> Vec<BusyInterval> {
    events
        .iter()
        .filter_map(|event| {
            let interval = BusyInterval::from_calendar_event(event, tz);
            if interval.is_none() {
                warn!(?event, "dropping calendar event without usable bounds");
            }
            interval
        })
        .collect()
}

/// Merge overlapping or adjacent busy intervals.
///
/// Returns a sorted, non-overlapping list. Resolution against the merged list
/// gives the same answer as against the original one.
pub fn merge_busy(intervals: &[BusyInterval]) -> Vec<BusyInterval> {
    let mut sorted: Vec<BusyInterval> = intervals
        .iter()
        .filter(|i| i.start < i.end)
        .copied()
        .collect();
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<BusyInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    resolve_local(
        date.and_time(NaiveTime::MIN),
        tz,
        Edge::Start,
        DstPolicy::ShiftForward,
    )
}
