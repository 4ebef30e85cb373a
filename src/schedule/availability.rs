use std::collections::BTreeMap;

use super::types::{AvailabilitySubmission, TimeOfDay};

/// Sum of declared hours across all of a participant's submissions
pub fn total_hours(participant: &str, submissions: &[AvailabilitySubmission]) -> f64 {
    let minutes: u32 = submissions
        .iter()
        .filter(|s| s.participant == participant)
        .map(|s| s.window().minutes())
        .sum();
    f64::from(minutes) / 60.0
}

/// Declared hours for every participant that submitted anything
pub fn participant_hours(submissions: &[AvailabilitySubmission]) -> BTreeMap<String, f64> {
    let mut minutes: BTreeMap<String, u32> = BTreeMap::new();
    for submission in submissions {
        *minutes.entry(submission.participant.clone()).or_insert(0) += submission.window().minutes();
    }
    minutes
        .into_iter()
        .map(|(name, m)| (name, f64::from(m) / 60.0))
        .collect()
}

/// Length of the intersection of `[a_start, a_end)` and `[b_start, b_end)` in minutes
pub fn overlap_minutes(a_start: TimeOfDay, a_end: TimeOfDay, b_start: TimeOfDay, b_end: TimeOfDay) -> u32 {
    let start = a_start.max(b_start).minutes();
    let end = a_end.min(b_end).minutes();
    end.saturating_sub(start)
}

/// Intersection length in hours; 0 when the intervals are disjoint
pub fn overlap_hours(a_start: TimeOfDay, a_end: TimeOfDay, b_start: TimeOfDay, b_end: TimeOfDay) -> f64 {
    f64::from(overlap_minutes(a_start, a_end, b_start, b_end)) / 60.0
}
