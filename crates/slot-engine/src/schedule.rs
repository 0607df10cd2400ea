//! Weekly availability schedules and their boundary validation.
//!
//! A [`ScheduleForm`] is what arrives from the outside world: a timezone name
//! and a list of day/start/end strings. [`ScheduleForm::validate`] turns it into
//! a [`Schedule`], the typed value the resolver consumes. The resolver never
//! re-validates; everything that reaches it has passed through here.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SlotError};

/// Days of the week, in the order a schedule editor lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        };
        f.write_str(name)
    }
}

/// A recurring wall-clock window on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBlock {
    pub day_of_week: DayOfWeek,
    #[serde(serialize_with = "serialize_wall_time")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "serialize_wall_time")]
    pub end_time: NaiveTime,
}

impl AvailabilityBlock {
    /// Build a block from `HH:MM` strings.
    ///
    /// Only the time format is checked here; ordering and overlap are checked
    /// by [`Schedule::new`] and [`ScheduleForm::validate`].
    pub fn new(day_of_week: DayOfWeek, start_time: &str, end_time: &str) -> Result<Self> {
        Ok(Self {
            day_of_week,
            start_time: parse_wall_time(start_time)?,
            end_time: parse_wall_time(end_time)?,
        })
    }
}

/// A user's validated weekly availability in a single IANA timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
    pub availabilities: Vec<AvailabilityBlock>,
}

impl Schedule {
    /// Build a schedule, rejecting reversed or overlapping same-day blocks.
    pub fn new(timezone: Tz, availabilities: Vec<AvailabilityBlock>) -> Result<Self> {
        let timed: Vec<TimedBlock> = availabilities
            .iter()
            .enumerate()
            .map(|(index, b)| TimedBlock {
                index,
                day: b.day_of_week,
                start: b.start_time,
                end: b.end_time,
            })
            .collect();

        let issues = block_issues(&timed);
        if !issues.is_empty() {
            return Err(SlotError::InvalidSchedule(ScheduleValidation { issues }));
        }

        Ok(Self {
            timezone,
            availabilities,
        })
    }

    /// Group the blocks by day of week.
    pub fn blocks_by_day(&self) -> HashMap<DayOfWeek, Vec<&AvailabilityBlock>> {
        let mut by_day: HashMap<DayOfWeek, Vec<&AvailabilityBlock>> = HashMap::new();
        for block in &self.availabilities {
            by_day.entry(block.day_of_week).or_default().push(block);
        }
        by_day
    }
}

// ---------------------------------------------------------------------------
// Raw input and validation
// ---------------------------------------------------------------------------

/// Unvalidated schedule input, as submitted by a schedule editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleForm {
    pub timezone: String,
    #[serde(default)]
    pub availabilities: Vec<AvailabilityForm>,
}

/// One unvalidated availability row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityForm {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

/// The field a validation issue is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleField {
    Timezone,
    StartTime,
    EndTime,
}

impl fmt::Display for ScheduleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScheduleField::Timezone => "timezone",
            ScheduleField::StartTime => "startTime",
            ScheduleField::EndTime => "endTime",
        })
    }
}

/// A single problem found while validating a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleIssue {
    /// Index into `availabilities`, or `None` for schedule-level fields.
    pub index: Option<usize>,
    pub field: ScheduleField,
    pub message: String,
}

impl ScheduleIssue {
    fn new(index: Option<usize>, field: ScheduleField, message: &str) -> Self {
        Self {
            index,
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ScheduleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "availabilities[{}].{}: {}", i, self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Every issue found in one schedule, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleValidation {
    pub issues: Vec<ScheduleIssue>,
}

impl fmt::Display for ScheduleValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_INVALID_TIMEZONE: &str = "Invalid timezone";
pub const MSG_TIME_FORMAT: &str = "Time must be in the format HH:MM";
pub const MSG_OVERLAP: &str = "Availability overlaps with another";
pub const MSG_END_BEFORE_START: &str = "End time must be after start time";

impl ScheduleForm {
    /// Parse a form from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the form and produce a [`Schedule`].
    ///
    /// All issues are collected before returning, so a caller can show every
    /// problem at once rather than one per submission.
    pub fn validate(&self) -> Result<Schedule> {
        let mut issues = Vec::new();

        let timezone = if self.timezone.trim().is_empty() {
            issues.push(ScheduleIssue::new(None, ScheduleField::Timezone, MSG_REQUIRED));
            None
        } else {
            match self.timezone.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    issues.push(ScheduleIssue::new(
                        None,
                        ScheduleField::Timezone,
                        MSG_INVALID_TIMEZONE,
                    ));
                    None
                }
            }
        };

        let mut timed = Vec::with_capacity(self.availabilities.len());
        for (index, form) in self.availabilities.iter().enumerate() {
            let start = parse_wall_time(&form.start_time).ok();
            let end = parse_wall_time(&form.end_time).ok();
            if start.is_none() {
                issues.push(ScheduleIssue::new(
                    Some(index),
                    ScheduleField::StartTime,
                    MSG_TIME_FORMAT,
                ));
            }
            if end.is_none() {
                issues.push(ScheduleIssue::new(
                    Some(index),
                    ScheduleField::EndTime,
                    MSG_TIME_FORMAT,
                ));
            }
            if let (Some(start), Some(end)) = (start, end) {
                timed.push(TimedBlock {
                    index,
                    day: form.day_of_week,
                    start,
                    end,
                });
            }
        }

        issues.extend(block_issues(&timed));

        match timezone {
            Some(timezone) if issues.is_empty() => Ok(Schedule {
                timezone,
                availabilities: timed
                    .into_iter()
                    .map(|b| AvailabilityBlock {
                        day_of_week: b.day,
                        start_time: b.start,
                        end_time: b.end,
                    })
                    .collect(),
            }),
            _ => Err(SlotError::InvalidSchedule(ScheduleValidation { issues })),
        }
    }
}

struct TimedBlock {
    index: usize,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
}

/// Overlap and ordering issues among well-formed blocks.
///
/// Each block that overlaps any other same-day block gets its own issue, so
/// both sides of a clash are flagged.
fn block_issues(blocks: &[TimedBlock]) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();
    for block in blocks {
        let overlaps = blocks.iter().any(|other| {
            other.index != block.index
                && other.day == block.day
                && other.start < block.end
                && other.end > block.start
        });
        if overlaps {
            issues.push(ScheduleIssue::new(
                Some(block.index),
                ScheduleField::StartTime,
                MSG_OVERLAP,
            ));
        }
        if block.start >= block.end {
            issues.push(ScheduleIssue::new(
                Some(block.index),
                ScheduleField::EndTime,
                MSG_END_BEFORE_START,
            ));
        }
    }
    issues
}

// ---------------------------------------------------------------------------
// Wall-clock times
// ---------------------------------------------------------------------------

/// Parse a 24-hour `H:MM` or `HH:MM` wall-clock time.
///
/// Hours `0`..=`23` with one or two digits, minutes exactly two digits.
/// `24:00`, seconds and surrounding whitespace are rejected.
pub fn parse_wall_time(s: &str) -> Result<NaiveTime> {
    let invalid = || SlotError::InvalidTime(s.to_string());

    let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !all_digits(hours) || !all_digits(minutes) {
        return Err(invalid());
    }

    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Hours since midnight as a fraction, e.g. `09:30` → `9.5`.
pub fn time_to_float(time: NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0
}

fn serialize_wall_time<S: Serializer>(
    time: &NaiveTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

fn serialize_tz<S: Serializer>(tz: &Tz, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_maps_directly() {
        assert_eq!(DayOfWeek::from(chrono::Weekday::Mon), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::from(chrono::Weekday::Thu), DayOfWeek::Thursday);
        assert_eq!(DayOfWeek::from(chrono::Weekday::Sun), DayOfWeek::Sunday);
    }

    #[test]
    fn parse_wall_time_accepts_one_or_two_digit_hours() {
        assert_eq!(
            parse_wall_time("9:05").unwrap(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap()
        );
        assert_eq!(
            parse_wall_time("09:05").unwrap(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap()
        );
        assert_eq!(
            parse_wall_time("23:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
    }

    #[test]
    fn parse_wall_time_rejects_malformed() {
        for bad in [
            "24:00", "12:60", "1:5", "123:00", "12", "12:00:00", " 9:00", "ab:cd", ":30", "-1:30",
        ] {
            assert!(parse_wall_time(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn time_to_float_fractional_hours() {
        let t = NaiveTime::from_hms_opt(13, 45, 0).unwrap();
        assert!((time_to_float(t) - 13.75).abs() < f64::EPSILON);
    }

    #[test]
    fn block_serializes_as_hh_mm() {
        let block = AvailabilityBlock::new(DayOfWeek::Friday, "9:00", "17:30").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(
            json,
            r#"{"dayOfWeek":"friday","startTime":"09:00","endTime":"17:30"}"#
        );
    }
}
