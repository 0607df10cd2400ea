//! Error types for slot-engine operations.

use thiserror::Error;

use crate::schedule::ScheduleValidation;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(ScheduleValidation),

    #[error("Invalid duration: {0} minutes")]
    InvalidDuration(u32),

    #[error("Invalid booking: {0}")]
    InvalidBooking(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// The requested start time is not among the bookable slots.
    #[error("Selected time is not valid: {0}")]
    SlotUnavailable(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A schedule, busy-time or event-type source failed.
    #[error("Source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
