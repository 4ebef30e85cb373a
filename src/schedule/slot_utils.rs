use super::types::TimeOfDay;

/// Minutes in a day; the last representable time is 23:59
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses a zero-padded time string (HH:MM or HH:MM:SS) to minutes since
/// midnight. Trailing seconds are truncated
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    if parts.iter().any(|p| p.len() != 2 || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    if let Some(seconds) = parts.get(2) {
        let seconds: u32 = seconds.parse().ok()?;
        if seconds >= 60 {
            return None;
        }
    }
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Calculates fixed-width time slots
/// Slot 1 = start, every following slot = previous + width_minutes,
/// stopping before end
pub fn calculate_time_slots(start: TimeOfDay, end: TimeOfDay, width_minutes: u32) -> Vec<TimeOfDay> {
    let mut slots = Vec::new();
    if width_minutes == 0 {
        return slots;
    }

    let end_minutes = end.minutes();
    let mut current_minutes = start.minutes();
    while current_minutes < end_minutes {
        slots.push(TimeOfDay::from_minutes_saturating(current_minutes));
        current_minutes += width_minutes;
    }

    slots
}

/// Time slots covering the whole day, starting at 00:00
pub fn day_time_slots(width_minutes: u32) -> Vec<TimeOfDay> {
    let mut slots = calculate_time_slots(TimeOfDay::MIDNIGHT, TimeOfDay::LAST_MINUTE, width_minutes);
    if width_minutes == 1 {
        slots.push(TimeOfDay::LAST_MINUTE);
    }
    slots
}
