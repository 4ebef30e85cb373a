use tracing::warn;

use super::types::{Assignment, AssignmentFlag, AvailabilitySubmission, TimeOfDay, WeeklyCoverage};

/// First-come-first-served allocation over fine-grained time slots
///
/// For every slot from the day's coverage start up to (not including) its
/// end, the first submission in input order that contains the slot wins.
/// Slots nobody can take are left out of the result rather than flagged,
/// and reordering `availabilities` changes the outcome.
pub fn allocate_legacy(
    coverage: &WeeklyCoverage,
    availabilities: &[AvailabilitySubmission],
    time_slots: &[TimeOfDay],
) -> Vec<Assignment> {
    let mut assignments = Vec::new();

    for (&day, window) in coverage {
        let start_idx = time_slots.iter().position(|t| *t == window.start);
        let end_idx = time_slots.iter().position(|t| *t == window.end);
        let (Some(start_idx), Some(end_idx)) = (start_idx, end_idx) else {
            warn!(%day, window = %window, "coverage bounds are not on the slot grid, day skipped");
            continue;
        };

        for &slot in time_slots.iter().take(end_idx).skip(start_idx) {
            let found = availabilities
                .iter()
                .find(|a| a.day == day && slot >= a.start && slot < a.end);
            if let Some(found) = found {
                assignments.push(Assignment {
                    day,
                    slot: slot.to_string(),
                    participant: found.participant.clone(),
                    flag: AssignmentFlag::Clear,
                });
            }
        }
    }

    assignments
}
