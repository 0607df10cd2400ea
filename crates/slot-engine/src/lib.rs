//! # slot-engine
//!
//! Timezone-aware availability resolution for meeting booking.
//!
//! Given a user's recurring weekly schedule, the busy time on their calendar
//! and a list of candidate start times, the engine decides which candidates a
//! guest can book. Weekdays and block boundaries are evaluated in the
//! schedule's own timezone, with explicit handling of DST gaps and folds.
//!
//! ## Modules
//!
//! - [`resolver`] — candidates + schedule + busy time → bookable candidates
//! - [`schedule`] — weekly availability blocks and their validation
//! - [`busy`] — busy intervals from calendar events, overlap and merging
//! - [`candidates`] — quarter-hour candidate generation over a horizon
//! - [`dst`] — DST policies for mapping wall-clock times to instants
//! - [`booking`] — source traits and the [`Booker`] that composes them
//! - [`error`] — Error types

pub mod booking;
pub mod busy;
pub mod candidates;
pub mod dst;
pub mod error;
pub mod resolver;
pub mod schedule;

pub use booking::{
    Booker, BookingRequest, BusySource, EventType, EventTypeSource, Host, NewCalendarEvent,
    ScheduleSource,
};
pub use busy::{merge_busy, BusyInterval, CalendarEvent};
pub use candidates::{CandidateWindow, Horizon};
pub use dst::DstPolicy;
pub use error::SlotError;
pub use resolver::{resolve, resolve_with_policy};
pub use schedule::{AvailabilityBlock, DayOfWeek, Schedule, ScheduleForm};
