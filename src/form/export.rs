use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use crate::schedule::{Assignment, AvailabilitySubmission};

/// Header row understood by `parser::read_availability`
const AVAILABILITY_HEADER: [&str; 4] = ["participant", "day", "start", "end"];

/// Appends availability submissions to a CSV file, writing the header first
/// when the file is new
pub fn export_submissions_to_csv(csv_path: &Path, submissions: &[AvailabilitySubmission]) -> Result<()> {
    let file_exists = csv_path.exists() && std::fs::metadata(csv_path)?.len() > 0;

    // Open file in append mode
    let file = OpenOptions::new().create(true).append(true).open(csv_path)?;

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

    if !file_exists {
        wtr.write_record(AVAILABILITY_HEADER)?;
    }

    for submission in submissions {
        let day = submission.day.to_string();
        let start = submission.start.to_string();
        let end = submission.end.to_string();
        wtr.write_record([submission.participant.as_str(), &day, &start, &end])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes assignments as CSV (`day,slot,participant,flag`), replacing the file
pub fn export_assignments_to_csv(csv_path: &Path, assignments: &[Assignment]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(csv_path)?;
    for assignment in assignments {
        wtr.serialize(assignment)?;
    }
    wtr.flush()?;
    Ok(())
}
