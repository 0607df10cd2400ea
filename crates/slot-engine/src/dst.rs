//! DST transition policies for mapping wall-clock times to instants.
//!
//! A weekly block such as "Sunday 02:00-04:00" names local readings, and on
//! transition days some readings do not exist (spring forward) or occur twice
//! (fall back). This module decides which instants such readings denote.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for local times that fall in a DST gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop the block for that date when either boundary lies in the gap.
    Skip,
    /// Read the time with the offset in force before the gap, landing as far
    /// past the gap as the time was into it (02:30 becomes 03:30).
    #[default]
    ShiftForward,
}

/// Which side of a window a local time bounds.
///
/// Repeated readings resolve outward: a start takes the earliest instant and
/// an end the latest, so the window covers both passes through the fold.
///
/// As a consequence an end inside the fold admits instants whose first-pass
/// reading is past it: a block ending 01:30 on a New York fall-back day runs
/// until 01:30 EST, so a meeting at 01:45 EDT still fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Resolve a local reading in `tz` to an instant, or `None` if the policy
/// drops it.
pub fn resolve_local(
    naive: NaiveDateTime,
    tz: Tz,
    edge: Edge,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, latest) => {
            let dt = match edge {
                Edge::Start => earliest,
                Edge::End => latest,
            };
            Some(dt.with_timezone(&Utc))
        }
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => Some(shift_past_gap(naive, tz)),
        },
    }
}

/// Convert a guest's wall-clock reading in `tz` to UTC.
///
/// Repeated readings take the earliest instant; skipped readings shift forward.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => shift_past_gap(naive, tz),
    }
}

fn shift_past_gap(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    // A day back is safely before the transition; no zone has two within a day.
    let before = naive - Duration::days(1);
    let offset = tz.offset_from_utc_datetime(&before).fix();
    Utc.from_utc_datetime(&(naive - Duration::seconds(offset.local_minus_utc() as i64)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    const NY: Tz = chrono_tz::America::New_York;

    #[test]
    fn ordinary_time_is_unambiguous() {
        let got = resolve_local(local(2024, 3, 4, 9, 0), NY, Edge::Start, DstPolicy::Skip);
        assert_eq!(got, Some(utc(2024, 3, 4, 14, 0)));
    }

    #[test]
    fn gap_shifts_forward_by_default() {
        // 2024-03-10 02:30 does not exist in New York; read it as EST.
        let got = resolve_local(
            local(2024, 3, 10, 2, 30),
            NY,
            Edge::Start,
            DstPolicy::default(),
        );
        assert_eq!(got, Some(utc(2024, 3, 10, 7, 30)));
    }

    #[test]
    fn gap_skipped_under_skip_policy() {
        let got = resolve_local(local(2024, 3, 10, 2, 30), NY, Edge::End, DstPolicy::Skip);
        assert_eq!(got, None);
    }

    #[test]
    fn fold_resolves_outward() {
        // 2024-11-03 01:30 happens twice in New York: 05:30Z (EDT) and 06:30Z (EST).
        let naive = local(2024, 11, 3, 1, 30);
        assert_eq!(
            resolve_local(naive, NY, Edge::Start, DstPolicy::Skip),
            Some(utc(2024, 11, 3, 5, 30))
        );
        assert_eq!(
            resolve_local(naive, NY, Edge::End, DstPolicy::Skip),
            Some(utc(2024, 11, 3, 6, 30))
        );
    }

    #[test]
    fn fold_end_runs_to_second_pass() {
        // 01:45 EDT (05:45Z) reads past 01:30 but precedes 01:30 EST (06:30Z).
        let end = resolve_local(local(2024, 11, 3, 1, 30), NY, Edge::End, DstPolicy::default());
        assert_eq!(end, Some(utc(2024, 11, 3, 6, 30)));
        assert!(utc(2024, 11, 3, 5, 45) < utc(2024, 11, 3, 6, 30));
    }

    #[test]
    fn local_to_utc_handles_all_cases() {
        assert_eq!(local_to_utc(local(2024, 7, 1, 12, 0), NY), utc(2024, 7, 1, 16, 0));
        assert_eq!(local_to_utc(local(2024, 11, 3, 1, 30), NY), utc(2024, 11, 3, 5, 30));
        assert_eq!(local_to_utc(local(2024, 3, 10, 2, 30), NY), utc(2024, 3, 10, 7, 30));
    }
}
