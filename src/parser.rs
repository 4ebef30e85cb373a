use csv::Reader;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::schedule::{AvailabilitySubmission, WeeklyCoverage};

/// Parses the per-day coverage map, e.g. `{"monday": {"start": "10:00", "end": "19:30"}}`
/// Days without an entry are closed
pub fn parse_coverage_json(json: &str) -> Result<WeeklyCoverage> {
    Ok(serde_json::from_str(json)?)
}

/// Loads the per-day coverage map from a JSON file
pub fn load_coverage<P: AsRef<Path>>(path: P) -> Result<WeeklyCoverage> {
    let text = std::fs::read_to_string(path)?;
    let coverage = parse_coverage_json(&text)?;
    info!(days = coverage.len(), "loaded coverage windows");
    Ok(coverage)
}

/// Reads availability rows from CSV
///
/// Columns are located by header name (`participant` or `name`, `day`,
/// `start`, `end`). A later row for the same participant and day replaces
/// the earlier one, keeping the position of the first.
pub fn read_availability<R: Read>(input: R) -> Result<Vec<AvailabilitySubmission>> {
    let mut reader = Reader::from_reader(input);

    let headers = reader.headers()?.clone();
    let find = |names: &[&str], fallback: usize| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
            .unwrap_or(fallback)
    };
    let participant_col = find(&["participant", "participant_name", "name"][..], 0);
    let day_col = find(&["day", "day_of_week"][..], 1);
    let start_col = find(&["start", "available_start"][..], 2);
    let end_col = find(&["end", "available_end"][..], 3);

    let mut entries: Vec<AvailabilitySubmission> = Vec::new();
    let mut index_by_key: HashMap<(String, String), usize> = HashMap::new();

    for result in reader.records() {
        let record = result?;

        let participant = record.get(participant_col).unwrap_or("").trim();
        // Skip if essential fields are missing
        if participant.is_empty() {
            continue;
        }

        let submission = AvailabilitySubmission::parse(
            participant,
            record.get(day_col).unwrap_or(""),
            record.get(start_col).unwrap_or(""),
            record.get(end_col).unwrap_or(""),
        )?;

        let key = (submission.participant.clone(), submission.day.to_string());
        match index_by_key.get(&key) {
            Some(&idx) => {
                debug!(participant = %submission.participant, day = %submission.day, "resubmission replaces earlier row");
                entries[idx] = submission;
            }
            None => {
                index_by_key.insert(key, entries.len());
                entries.push(submission);
            }
        }
    }

    Ok(entries)
}

/// Loads availability submissions from a CSV file
pub fn load_availability<P: AsRef<Path>>(csv_path: P) -> Result<Vec<AvailabilitySubmission>> {
    let file = std::fs::File::open(csv_path)?;
    let entries = read_availability(file)?;
    info!(submissions = entries.len(), "loaded availability (resubmissions merged)");
    Ok(entries)
}
