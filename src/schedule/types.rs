use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use super::slot_utils::{minutes_to_time_string, parse_time_to_minutes};

/// Day of the week, ordered Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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
    /// All days in canonical (Monday-first) order
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    /// Weekday a calendar date falls on
    pub fn of_date(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        DayOfWeek::ALL
            .iter()
            .copied()
            .find(|day| day.as_str() == lower)
            .ok_or_else(|| ScheduleError::UnknownDay(s.to_string()))
    }
}

/// Wall-clock time with minute granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(23 * 60 + 59);

    /// Parses "HH:MM" or "HH:MM:SS"; seconds are dropped
    pub fn parse(value: &str) -> Result<Self> {
        parse_time_to_minutes(value)
            .map(|minutes| TimeOfDay(minutes as u16))
            .ok_or_else(|| ScheduleError::InvalidTime(value.to_string()))
    }

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes > u32::from(Self::LAST_MINUTE.0) {
            return Err(ScheduleError::InvalidTime(minutes_to_time_string(minutes)));
        }
        Ok(TimeOfDay(minutes as u16))
    }

    pub(crate) fn from_minutes_saturating(minutes: u32) -> Self {
        TimeOfDay(minutes.min(u32::from(Self::LAST_MINUTE.0)) as u16)
    }

    pub fn minutes(&self) -> u32 {
        u32::from(self.0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&minutes_to_time_string(self.minutes()))
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        TimeOfDay::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        TimeOfDay::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// A half-open `[start, end)` interval within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// Hours an organizer needs staffed on a given day
pub type CoverageWindow = TimeWindow;

/// Required coverage per day; a missing day means closed
pub type WeeklyCoverage = BTreeMap<DayOfWeek, CoverageWindow>;

#[derive(Deserialize)]
struct RawWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = ScheduleError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        TimeWindow::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    /// True when `other` lies entirely inside this window
    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    pub fn hours(&self) -> f64 {
        f64::from(self.minutes()) / 60.0
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Category used to spread opening/closing burden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Opening,
    Middle,
    Closing,
}

impl ShiftType {
    pub(crate) fn index(&self) -> usize {
        match self {
            ShiftType::Opening => 0,
            ShiftType::Middle => 1,
            ShiftType::Closing => 2,
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftType::Opening => "opening",
            ShiftType::Middle => "middle",
            ShiftType::Closing => "closing",
        })
    }
}

/// A catalog block placed on a concrete day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBlock {
    pub day: DayOfWeek,
    pub label: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub shift_type: ShiftType,
}

impl ShiftBlock {
    pub fn window(&self) -> TimeWindow {
        TimeWindow { start: self.start, end: self.end }
    }

    pub fn minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

/// One participant's availability on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubmission")]
pub struct AvailabilitySubmission {
    pub participant: String,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Deserialize)]
struct RawSubmission {
    participant: String,
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<RawSubmission> for AvailabilitySubmission {
    type Error = ScheduleError;

    fn try_from(raw: RawSubmission) -> Result<Self> {
        AvailabilitySubmission::new(&raw.participant, raw.day, raw.start, raw.end)
    }
}

impl AvailabilitySubmission {
    pub fn new(participant: &str, day: DayOfWeek, start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        let participant = participant.trim();
        if participant.is_empty() {
            return Err(ScheduleError::InvalidSubmission("participant name is required".to_string()));
        }
        if start >= end {
            return Err(ScheduleError::InvalidSubmission(format!(
                "{} on {}: start {} must be before end {}",
                participant, day, start, end
            )));
        }
        Ok(Self {
            participant: participant.to_string(),
            day,
            start,
            end,
        })
    }

    /// Builds a submission from raw strings, as found in stored rows
    pub fn parse(participant: &str, day: &str, start: &str, end: &str) -> Result<Self> {
        Self::new(participant, day.parse()?, TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow { start: self.start, end: self.end }
    }

    pub fn hours(&self) -> f64 {
        self.window().hours()
    }
}

/// Outcome marker attached to an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssignmentFlag {
    #[default]
    #[serde(rename = "")]
    Clear,
    #[serde(rename = "partial")]
    Partial,
    #[serde(rename = "multi-shift")]
    MultiShift,
    #[serde(rename = "uncovered")]
    Uncovered,
}

impl AssignmentFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentFlag::Clear => "",
            AssignmentFlag::Partial => "partial",
            AssignmentFlag::MultiShift => "multi-shift",
            AssignmentFlag::Uncovered => "uncovered",
        }
    }
}

impl fmt::Display for AssignmentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant (or nobody) placed in a block or time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub day: DayOfWeek,
    pub slot: String,
    pub participant: String, // empty when uncovered
    pub flag: AssignmentFlag,
}

impl Assignment {
    pub fn uncovered(day: DayOfWeek, slot: &str) -> Self {
        Self {
            day,
            slot: slot.to_string(),
            participant: String::new(),
            flag: AssignmentFlag::Uncovered,
        }
    }

    pub fn is_uncovered(&self) -> bool {
        self.flag == AssignmentFlag::Uncovered
    }
}

/// Summary status of a day's coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCoverageStatus {
    Uncovered,
    Partial,
    Covered,
}

impl fmt::Display for DayCoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayCoverageStatus::Uncovered => "Not Covered",
            DayCoverageStatus::Partial => "Partially Covered",
            DayCoverageStatus::Covered => "Fully Covered",
        })
    }
}
