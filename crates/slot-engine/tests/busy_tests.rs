//! Tests for busy intervals: overlap semantics, provider events, merging.

use chrono::{DateTime, NaiveDate, Utc};
use slot_engine::busy::{from_calendar_events, merge_busy, BusyInterval, CalendarEvent, EventTime};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn busy(start: &str, end: &str) -> BusyInterval {
    BusyInterval::new(at(start), at(end))
}

fn timed(start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        start: Some(EventTime {
            date_time: Some(start.parse().unwrap()),
            ..EventTime::default()
        }),
        end: Some(EventTime {
            date_time: Some(end.parse().unwrap()),
            ..EventTime::default()
        }),
    }
}

fn all_day(start: (i32, u32, u32), end: (i32, u32, u32)) -> CalendarEvent {
    CalendarEvent {
        start: Some(EventTime {
            date: NaiveDate::from_ymd_opt(start.0, start.1, start.2),
            ..EventTime::default()
        }),
        end: Some(EventTime {
            date: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
            ..EventTime::default()
        }),
    }
}

// ── Overlap ─────────────────────────────────────────────────────────────────

#[test]
fn overlap_is_open_interval() {
    let b = busy("2026-03-16T10:00:00Z", "2026-03-16T11:00:00Z");

    assert!(b.overlaps(at("2026-03-16T09:30:00Z"), at("2026-03-16T10:30:00Z")));
    assert!(b.overlaps(at("2026-03-16T10:15:00Z"), at("2026-03-16T10:45:00Z")));
    assert!(b.overlaps(at("2026-03-16T09:00:00Z"), at("2026-03-16T12:00:00Z")));

    // Touching on either side is not overlap.
    assert!(!b.overlaps(at("2026-03-16T09:00:00Z"), at("2026-03-16T10:00:00Z")));
    assert!(!b.overlaps(at("2026-03-16T11:00:00Z"), at("2026-03-16T12:00:00Z")));
}

// ── Provider events ─────────────────────────────────────────────────────────

#[test]
fn timed_event_keeps_its_instants() {
    let event = timed("2026-03-16T09:00:00-04:00", "2026-03-16T10:00:00-04:00");
    let got = BusyInterval::from_calendar_event(&event, chrono_tz::UTC);
    assert_eq!(
        got,
        Some(busy("2026-03-16T13:00:00Z", "2026-03-16T14:00:00Z"))
    );
}

#[test]
fn all_day_event_spans_local_days() {
    // A one-day event on 2026-03-16 in New York (EDT, UTC-4).
    let event = all_day((2026, 3, 16), (2026, 3, 17));
    let got = BusyInterval::from_calendar_event(&event, chrono_tz::America::New_York);
    assert_eq!(
        got,
        Some(busy("2026-03-16T04:00:00Z", "2026-03-17T04:00:00Z"))
    );
}

#[test]
fn all_day_event_across_dst_change() {
    // 2026-03-08 is spring-forward day in New York: the local day is 23 hours.
    let event = all_day((2026, 3, 8), (2026, 3, 9));
    let got = BusyInterval::from_calendar_event(&event, chrono_tz::America::New_York);
    assert_eq!(
        got,
        Some(busy("2026-03-08T05:00:00Z", "2026-03-09T04:00:00Z"))
    );
}

#[test]
fn unusable_events_dropped() {
    let missing_end = CalendarEvent {
        start: Some(EventTime {
            date_time: Some("2026-03-16T09:00:00Z".parse().unwrap()),
            ..EventTime::default()
        }),
        end: None,
    };
    let mixed = CalendarEvent {
        start: Some(EventTime {
            date_time: Some("2026-03-16T09:00:00Z".parse().unwrap()),
            ..EventTime::default()
        }),
        end: Some(EventTime {
            date: NaiveDate::from_ymd_opt(2026, 3, 17),
            ..EventTime::default()
        }),
    };
    let backwards = timed("2026-03-16T10:00:00Z", "2026-03-16T09:00:00Z");
    let good = timed("2026-03-16T11:00:00Z", "2026-03-16T12:00:00Z");

    let got = from_calendar_events(&[missing_end, mixed, backwards, good], chrono_tz::UTC);
    assert_eq!(got, vec![busy("2026-03-16T11:00:00Z", "2026-03-16T12:00:00Z")]);
}

#[test]
fn provider_json_deserializes() {
    let json = r#"[
        {"start": {"dateTime": "2026-03-16T09:00:00+01:00"}, "end": {"dateTime": "2026-03-16T09:30:00+01:00"}},
        {"start": {"date": "2026-03-18"}, "end": {"date": "2026-03-19"}}
    ]"#;
    let events: Vec<CalendarEvent> = serde_json::from_str(json).unwrap();
    let got = from_calendar_events(&events, chrono_tz::Europe::Paris);
    assert_eq!(
        got,
        vec![
            busy("2026-03-16T08:00:00Z", "2026-03-16T08:30:00Z"),
            busy("2026-03-17T23:00:00Z", "2026-03-18T23:00:00Z"),
        ]
    );
}

// ── Merging ─────────────────────────────────────────────────────────────────

#[test]
fn merge_overlapping_and_adjacent() {
    let merged = merge_busy(&[
        busy("2026-03-16T13:00:00Z", "2026-03-16T14:00:00Z"),
        busy("2026-03-16T09:00:00Z", "2026-03-16T10:00:00Z"),
        busy("2026-03-16T09:30:00Z", "2026-03-16T10:30:00Z"),
        busy("2026-03-16T10:30:00Z", "2026-03-16T11:00:00Z"),
    ]);
    assert_eq!(
        merged,
        vec![
            busy("2026-03-16T09:00:00Z", "2026-03-16T11:00:00Z"),
            busy("2026-03-16T13:00:00Z", "2026-03-16T14:00:00Z"),
        ]
    );
}

#[test]
fn merge_drops_empty_intervals() {
    let merged = merge_busy(&[
        busy("2026-03-16T09:00:00Z", "2026-03-16T09:00:00Z"),
        busy("2026-03-16T12:00:00Z", "2026-03-16T11:00:00Z"),
    ]);
    assert!(merged.is_empty());
}

#[test]
fn merge_contained_interval() {
    let merged = merge_busy(&[
        busy("2026-03-16T09:00:00Z", "2026-03-16T17:00:00Z"),
        busy("2026-03-16T10:00:00Z", "2026-03-16T11:00:00Z"),
    ]);
    assert_eq!(merged, vec![busy("2026-03-16T09:00:00Z", "2026-03-16T17:00:00Z")]);
}
