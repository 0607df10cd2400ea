//! Composing the resolver with its data sources.
//!
//! Schedules, busy time and event types live elsewhere (a database, a calendar
//! provider). They are reached through the source traits below and handed to
//! a [`Booker`] explicitly; nothing here holds global state.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::busy::BusyInterval;
use crate::candidates::CandidateWindow;
use crate::dst::{local_to_utc, DstPolicy};
use crate::error::{Result, SlotError};
use crate::resolver::resolve_with_policy;
use crate::schedule::Schedule;

/// Looks up a user's weekly schedule.
pub trait ScheduleSource {
    /// `Ok(None)` when the user has not set up a schedule.
    fn schedule_for(&self, user_id: &str) -> Result<Option<Schedule>>;
}

/// Lists a user's busy time, e.g. from their external calendar.
pub trait BusySource {
    fn busy_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>>;
}

/// Looks up bookable event types.
pub trait EventTypeSource {
    /// The user's event with this id, if it exists.
    fn event_type(&self, user_id: &str, event_id: &str) -> Result<Option<EventType>>;
}

impl<T: ScheduleSource + ?Sized> ScheduleSource for &T {
    fn schedule_for(&self, user_id: &str) -> Result<Option<Schedule>> {
        (**self).schedule_for(user_id)
    }
}

impl<T: BusySource + ?Sized> BusySource for &T {
    fn busy_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>> {
        (**self).busy_between(user_id, start, end)
    }
}

impl<T: EventTypeSource + ?Sized> EventTypeSource for &T {
    fn event_type(&self, user_id: &str, event_id: &str) -> Result<Option<EventType>> {
        (**self).event_type(user_id, event_id)
    }
}

/// A kind of meeting a user offers, e.g. "30 minute intro call".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub is_active: bool,
}

impl EventType {
    /// Reject event types that can never be booked.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SlotError::InvalidBooking("event name is required".to_string()));
        }
        if self.duration_minutes == 0 {
            return Err(SlotError::InvalidDuration(self.duration_minutes));
        }
        Ok(())
    }
}

/// The calendar owner, as shown on the created event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    pub email: String,
}

/// A guest's request to book a slot, in the guest's own wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: String,
    pub event_id: String,
    pub guest_name: String,
    pub guest_email: String,
    #[serde(default)]
    pub guest_notes: Option<String>,
    pub start_time: NaiveDateTime,
    /// IANA timezone `start_time` is expressed in.
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

/// Body of the calendar entry to create for a confirmed booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
}

/// Resolves open slots and validates bookings against live data sources.
pub struct Booker<S, B, E> {
    schedules: S,
    busy: B,
    events: E,
    policy: DstPolicy,
}

impl<S, B, E> Booker<S, B, E>
where
    S: ScheduleSource,
    B: BusySource,
    E: EventTypeSource,
{
    pub fn new(schedules: S, busy: B, events: E) -> Self {
        Self {
            schedules,
            busy,
            events,
            policy: DstPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DstPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The subset of `candidates` at which `event` can be booked.
    ///
    /// Busy time is fetched once, covering the earliest candidate through the
    /// end of a meeting at the latest one.
    pub fn available_slots(
        &self,
        user_id: &str,
        event: &EventType,
        candidates: &[DateTime<Utc>],
    ) -> Result<Vec<DateTime<Utc>>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let Some(schedule) = self.schedules.schedule_for(user_id)? else {
            debug!(user_id, "user has no schedule");
            return Ok(Vec::new());
        };
        self.resolve_against(user_id, event, &schedule, candidates)
    }

    /// All open slots for an active event type, starting at `now`.
    ///
    /// Candidates are generated in the schedule's timezone.
    pub fn open_slots(
        &self,
        user_id: &str,
        event_id: &str,
        now: DateTime<Utc>,
        window: &CandidateWindow,
    ) -> Result<Vec<DateTime<Utc>>> {
        let event = self.active_event(user_id, event_id)?;
        let Some(schedule) = self.schedules.schedule_for(user_id)? else {
            debug!(user_id, "user has no schedule");
            return Ok(Vec::new());
        };
        let candidates = window.generate(now, schedule.timezone);
        self.resolve_against(user_id, &event, &schedule, &candidates)
    }

    /// Check a guest's requested slot and build the calendar entry for it.
    ///
    /// # Errors
    /// - `InvalidBooking` for a blank guest name or malformed email.
    /// - `InvalidTimezone` if the request's timezone is unknown.
    /// - `EventNotFound` if the event type is missing or inactive.
    /// - `InvalidDuration` or `InvalidBooking` if the stored event type fails
    ///   [`EventType::validate`].
    /// - `SlotUnavailable` if the slot is not bookable.
    pub fn book(&self, request: &BookingRequest, host: &Host) -> Result<NewCalendarEvent> {
        validate_guest(request)?;
        let tz: Tz = request
            .timezone
            .parse()
            .map_err(|_| SlotError::InvalidTimezone(request.timezone.clone()))?;
        let event = self.active_event(&request.user_id, &request.event_id)?;

        let start = local_to_utc(request.start_time, tz);
        let valid = self.available_slots(&request.user_id, &event, &[start])?;
        if valid.is_empty() {
            return Err(SlotError::SlotUnavailable(start.to_rfc3339()));
        }

        let booked = calendar_event_for(request, &event, host, start);
        info!(
            user_id = %request.user_id,
            event_id = %request.event_id,
            start = %booked.start,
            "booking accepted"
        );
        Ok(booked)
    }

    fn active_event(&self, user_id: &str, event_id: &str) -> Result<EventType> {
        let event = self
            .events
            .event_type(user_id, event_id)?
            .filter(|e| e.is_active)
            .ok_or_else(|| SlotError::EventNotFound(event_id.to_string()))?;
        event.validate()?;
        Ok(event)
    }

    fn resolve_against(
        &self,
        user_id: &str,
        event: &EventType,
        schedule: &Schedule,
        candidates: &[DateTime<Utc>],
    ) -> Result<Vec<DateTime<Utc>>> {
        let (Some(first), Some(last)) = (candidates.iter().min(), candidates.iter().max()) else {
            return Ok(Vec::new());
        };
        // Saturate so an extreme candidate is rejected by the resolver, not here.
        let until = last
            .checked_add_signed(Duration::minutes(i64::from(event.duration_minutes)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let busy = self.busy.busy_between(user_id, *first, until)?;

        Ok(resolve_with_policy(
            candidates,
            event.duration_minutes,
            Some(schedule),
            &busy,
            self.policy,
        ))
    }
}

fn validate_guest(request: &BookingRequest) -> Result<()> {
    if request.guest_name.trim().is_empty() {
        return Err(SlotError::InvalidBooking("guest name is required".to_string()));
    }
    let email = request.guest_email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(SlotError::InvalidBooking(format!(
            "invalid guest email: {}",
            request.guest_email
        )));
    }
    Ok(())
}

fn calendar_event_for(
    request: &BookingRequest,
    event: &EventType,
    host: &Host,
    start: DateTime<Utc>,
) -> NewCalendarEvent {
    let description = match request.guest_notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => format!("Additional Details: {}", notes),
        _ => "No additional details".to_string(),
    };

    NewCalendarEvent {
        summary: format!("{} + {}: {}", request.guest_name, host.name, event.name),
        description,
        start,
        end: start + Duration::minutes(i64::from(event.duration_minutes)),
        attendees: vec![
            Attendee {
                email: request.guest_email.clone(),
                display_name: request.guest_name.clone(),
                response_status: None,
            },
            Attendee {
                email: host.email.clone(),
                display_name: host.name.clone(),
                response_status: Some("accepted".to_string()),
            },
        ],
    }
}
