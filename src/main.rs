use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_planner::config::PlannerConfig;
use shift_planner::display::{print_assignments, print_coverage_summary, write_assignments_to_file};
use shift_planner::form::export_assignments_to_csv;
use shift_planner::parser::{load_availability, load_coverage};
use shift_planner::schedule::{
    allocate_legacy, day_time_slots, summarize_coverage, ProportionalAllocator, RandomTieBreak,
};
use shift_planner::web;

const USAGE: &str = "usage: shift-planner web [port]\n       shift-planner <coverage.json> <availability.csv> [legacy] [seed]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let mut config = PlannerConfig::from_env()?;

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
            config.server.port = port;
        }

        info!(host = %config.server.host, port = config.server.port, "starting web server");
        println!("Access the site at http://localhost:{}", config.server.port);

        web::start_server(config).await?;
        return Ok(());
    }

    // CLI mode
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let legacy = args.iter().skip(3).any(|a| a == "legacy");
    let seed = args
        .iter()
        .skip(3)
        .find_map(|a| a.parse::<u64>().ok())
        .or(config.allocation.seed);

    println!("Loading coverage and availability...");
    let coverage = load_coverage(&args[1])?;
    let availability = load_availability(&args[2])?;
    println!(
        "Loaded {} open days and {} availability entries (resubmissions merged)",
        coverage.len(),
        availability.len()
    );

    print_coverage_summary(&summarize_coverage(&coverage, &availability));

    let (title, assignments) = if legacy {
        let slots = day_time_slots(config.allocation.legacy_slot_minutes);
        ("Legacy Slot Schedule", allocate_legacy(&coverage, &availability, &slots))
    } else {
        let catalog = config.catalog();
        let mut tie = RandomTieBreak::from_seed_option(seed);
        let assignments = ProportionalAllocator::new(&catalog)
            .with_full_cover_ratio(config.allocation.full_cover_ratio)
            .allocate(&coverage, &availability, &mut tie);
        ("Shift Schedule", assignments)
    };

    print_assignments(title, &assignments);

    write_assignments_to_file(title, &assignments, "assignments.txt")?;
    export_assignments_to_csv(std::path::Path::new("assignments.csv"), &assignments)?;
    println!("\nSchedule saved to assignments.txt and assignments.csv");

    Ok(())
}
