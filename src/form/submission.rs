use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::schedule::{AvailabilitySubmission, CoverageWindow, DayOfWeek, TimeOfDay, WeeklyCoverage};

/// A published schedule together with the availability collected for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub share_code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_schedule: WeeklyCoverage,
    #[serde(default)]
    pub availability: Vec<AvailabilitySubmission>,
}

impl ScheduleRecord {
    /// Stores submissions; a participant's new entry for a day replaces the old one
    pub fn submit(&mut self, submissions: Vec<AvailabilitySubmission>) {
        for submission in submissions {
            match self
                .availability
                .iter_mut()
                .find(|a| a.participant == submission.participant && a.day == submission.day)
            {
                Some(existing) => *existing = submission,
                None => self.availability.push(submission),
            }
        }
    }
}

/// Required hours for one day as typed by the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayHours {
    pub start: String,
    pub end: String,
}

/// Schedule publish request from frontend
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulePublishRequest {
    #[serde(default)]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_schedule: BTreeMap<DayOfWeek, DayHours>,
}

impl SchedulePublishRequest {
    pub fn coverage(&self) -> Result<WeeklyCoverage> {
        self.daily_schedule
            .iter()
            .map(|(&day, hours)| Ok((day, CoverageWindow::parse(&hours.start, &hours.end)?)))
            .collect()
    }
}

/// Validates a schedule before it is published
pub fn validate_publish(req: &SchedulePublishRequest) -> std::result::Result<(), String> {
    if req.daily_schedule.is_empty() {
        return Err("At least one day must have required hours".to_string());
    }

    if req.end_date < req.start_date {
        return Err("End date must not be before start date".to_string());
    }

    let coverage = req.coverage().map_err(|e| e.to_string())?;

    // The period has to include at least one of the configured weekdays
    let opens_in_period = req
        .start_date
        .iter_days()
        .take_while(|d| *d <= req.end_date)
        .take(7)
        .any(|d| coverage.contains_key(&DayOfWeek::of_date(d)));
    if !opens_in_period {
        return Err("No configured day falls within the schedule dates".to_string());
    }

    Ok(())
}

/// One day of a participant's availability form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub available: bool,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// Availability form request from frontend
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityFormRequest {
    pub participant_name: String,
    pub days: BTreeMap<DayOfWeek, DayAvailability>,
}

impl AvailabilityFormRequest {
    /// Submissions for the days marked available
    pub fn to_submissions(&self) -> Result<Vec<AvailabilitySubmission>> {
        self.days
            .iter()
            .filter(|(_, d)| d.available)
            .map(|(&day, d)| {
                AvailabilitySubmission::new(
                    &self.participant_name,
                    day,
                    TimeOfDay::parse(&d.start)?,
                    TimeOfDay::parse(&d.end)?,
                )
            })
            .collect()
    }
}

/// Validates an availability form against the schedule it targets
pub fn validate_submission(req: &AvailabilityFormRequest, coverage: &WeeklyCoverage) -> std::result::Result<(), String> {
    // Validate participant name
    if req.participant_name.trim().is_empty() {
        return Err("Please enter your name".to_string());
    }

    let available: Vec<(&DayOfWeek, &DayAvailability)> = req.days.iter().filter(|(_, d)| d.available).collect();
    if available.is_empty() {
        return Err("Please select at least one day you are available".to_string());
    }

    for (day, hours) in available {
        if !coverage.contains_key(day) {
            return Err(format!("The schedule does not need anyone on {}", day));
        }
        let start = TimeOfDay::parse(&hours.start).map_err(|e| e.to_string())?;
        let end = TimeOfDay::parse(&hours.end).map_err(|e| e.to_string())?;
        if start >= end {
            return Err(ScheduleError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            }
            .to_string());
        }
    }

    Ok(())
}
