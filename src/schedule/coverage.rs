use serde::{Deserialize, Serialize};

use super::types::{AvailabilitySubmission, CoverageWindow, DayCoverageStatus, DayOfWeek, TimeWindow, WeeklyCoverage};

/// Classifies a day against the participants available on it
///
/// A day only counts as covered when a single participant spans the whole
/// window; several people who together fill it still come out `Partial`.
pub fn classify_day_coverage(needed: &CoverageWindow, participants: &[TimeWindow]) -> DayCoverageStatus {
    if participants.is_empty() {
        return DayCoverageStatus::Uncovered;
    }

    let has_gaps = participants
        .iter()
        .all(|p| p.start > needed.start || p.end < needed.end);

    if has_gaps {
        DayCoverageStatus::Partial
    } else {
        DayCoverageStatus::Covered
    }
}

/// A participant's window as shown on the coverage summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantWindow {
    pub name: String,
    pub start: String,
    pub end: String,
}

/// One day of the coverage summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCoverage {
    pub day: DayOfWeek,
    pub needed: CoverageWindow,
    pub participants: Vec<ParticipantWindow>,
    pub status: DayCoverageStatus,
}

/// Coverage status for every configured day, Monday first
pub fn summarize_coverage(coverage: &WeeklyCoverage, availabilities: &[AvailabilitySubmission]) -> Vec<DayCoverage> {
    coverage
        .iter()
        .map(|(&day, needed)| {
            let on_day: Vec<&AvailabilitySubmission> = availabilities.iter().filter(|a| a.day == day).collect();
            let windows: Vec<TimeWindow> = on_day.iter().map(|a| a.window()).collect();
            DayCoverage {
                day,
                needed: *needed,
                participants: on_day
                    .iter()
                    .map(|a| ParticipantWindow {
                        name: a.participant.clone(),
                        start: a.start.to_string(),
                        end: a.end.to_string(),
                    })
                    .collect(),
                status: classify_day_coverage(needed, &windows),
            }
        })
        .collect()
}
