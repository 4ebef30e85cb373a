use std::fs::File;
use std::io::Write;

use crate::error::Result;
use crate::schedule::{Assignment, AssignmentFlag, DayCoverage};

/// Formats one assignment as `slot participant [flag]`
pub fn format_assignment(assignment: &Assignment) -> String {
    let who = if assignment.participant.is_empty() {
        "[EMPTY]".to_string()
    } else {
        assignment.participant.clone()
    };
    match assignment.flag {
        AssignmentFlag::Clear => format!("{} {}", assignment.slot, who),
        flag => format!("{} {} ({})", assignment.slot, who, flag),
    }
}

/// Writes assignments to a file, grouped under a header per day
pub fn write_assignments_to_file(title: &str, assignments: &[Assignment], filename: &str) -> Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", title)?;

    let mut current_day = None;
    for assignment in assignments {
        if current_day != Some(assignment.day) {
            writeln!(file, "-- {} --", assignment.day)?;
            current_day = Some(assignment.day);
        }
        writeln!(file, "{}", format_assignment(assignment))?;
    }

    Ok(())
}

/// Prints assignments in a readable format
pub fn print_assignments(title: &str, assignments: &[Assignment]) {
    println!("\n=== {} ===", title);
    println!("Total assignments: {}", assignments.len());

    let uncovered: Vec<&Assignment> = assignments.iter().filter(|a| a.is_uncovered()).collect();
    if !uncovered.is_empty() {
        println!("⚠️  Uncovered blocks ({}):", uncovered.len());
        for a in &uncovered {
            println!("  - {} {}", a.day, a.slot);
        }
    }

    let mut current_day = None;
    for assignment in assignments {
        if current_day != Some(assignment.day) {
            println!("\n{}:", assignment.day);
            current_day = Some(assignment.day);
        }
        println!("  {}", format_assignment(assignment));
    }
}

/// Prints per-day coverage status with the people available
pub fn print_coverage_summary(summary: &[DayCoverage]) {
    println!("\n=== Coverage ===");
    for day in summary {
        println!("{} (needed {}): {}", day.day, day.needed, day.status);
        if day.participants.is_empty() {
            println!("  No availability submitted for this day");
        }
        for p in &day.participants {
            println!("  {} {}-{}", p.name, p.start, p.end);
        }
    }
}
