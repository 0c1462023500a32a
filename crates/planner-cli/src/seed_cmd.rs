//! `poc-planner seed` and `poc-planner migrate-prereqs`.

use anyhow::Result;

use planner_core::seed::{SeedReport, migrate_legacy_prerequisites, seed_starter_data};
use planner_core::store::Store;

pub async fn run_seed(store: &dyn Store) -> Result<()> {
    match seed_starter_data(store).await? {
        SeedReport::AlreadySeeded { existing } => {
            println!("Catalog already has {existing} solution(s); nothing seeded.");
        }
        SeedReport::Seeded {
            solutions,
            use_cases,
            prerequisites,
        } => {
            println!("Starter catalog loaded.");
            println!();
            println!("  Solutions:     {solutions}");
            println!("  Use cases:     {use_cases}");
            println!("  Prerequisites: {prerequisites}");
        }
    }
    Ok(())
}

pub async fn run_migrate(store: &dyn Store) -> Result<()> {
    let report = migrate_legacy_prerequisites(store).await?;
    println!("Legacy prerequisites migrated.");
    println!();
    println!("  Copied:          {}", report.copied);
    println!("  Already present: {}", report.already_present);
    println!("  Skipped:         {}", report.skipped);
    if report.skipped > 0 {
        println!();
        println!("Skipped rows have no owner or no text; see the log for their IDs.");
    }
    Ok(())
}
