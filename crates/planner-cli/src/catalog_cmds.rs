//! CLI handlers for `poc-planner solution|use-case|prereq` subcommands.

use anyhow::Result;

use planner_core::aggregate::load_aggregate;
use planner_core::catalog;
use planner_core::store::{Store, UseCaseDeletePolicy};
use planner_db::models::{NewPrerequisite, NewSolution, NewUseCase, PrerequisiteScope};

use crate::{PrereqCommands, SolutionCommands, UseCaseCommands};

// -----------------------------------------------------------------------
// Solutions
// -----------------------------------------------------------------------

pub async fn run_solution_command(command: SolutionCommands, store: &dyn Store) -> Result<()> {
    match command {
        SolutionCommands::List => {
            let aggregate = load_aggregate(store).await?;
            if aggregate.is_empty() {
                println!("No solutions found. Use `poc-planner seed` to load the starter catalog.");
                return Ok(());
            }

            let name_w = aggregate
                .iter()
                .map(|s| s.name().chars().count())
                .max()
                .unwrap_or(4)
                .max(4);
            println!("{:<36}  {:<name_w$}  USE CASES  PREREQS", "ID", "NAME");
            for s in &aggregate {
                println!(
                    "{:<36}  {:<name_w$}  {:>9}  {:>7}",
                    s.id(),
                    s.name(),
                    s.use_cases.len(),
                    s.prerequisites.len(),
                );
            }
        }
        SolutionCommands::Add {
            name,
            description,
            icon,
        } => {
            let solution = catalog::add_solution(
                store,
                &NewSolution {
                    name,
                    description,
                    icon,
                },
            )
            .await?;
            println!("Solution created: {} ({})", solution.name, solution.id);
        }
        SolutionCommands::Update {
            id,
            name,
            description,
            icon,
        } => {
            let current = store.get_solution(id).await?;
            let fields = NewSolution {
                name: name.unwrap_or(current.name),
                description: description.unwrap_or(current.description),
                icon: icon.unwrap_or(current.icon),
            };
            let solution = catalog::update_solution(store, id, &fields).await?;
            println!("Solution updated: {} ({})", solution.name, solution.id);
        }
        SolutionCommands::Delete { id } => {
            let report = catalog::delete_solution(store, id).await?;
            println!("Solution {id} deleted.");
            println!("  Use cases removed:     {}", report.use_cases);
            println!("  Prerequisites removed: {}", report.prerequisites);
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Use cases
// -----------------------------------------------------------------------

pub async fn run_use_case_command(command: UseCaseCommands, store: &dyn Store) -> Result<()> {
    match command {
        UseCaseCommands::List { solution } => {
            let use_cases = catalog::use_cases_for(store, solution).await?;
            if use_cases.is_empty() {
                println!("No use cases for solution {solution}.");
                return Ok(());
            }
            for uc in &use_cases {
                println!("{}  {}", uc.id, uc.text);
                for p in &uc.prerequisites {
                    println!("{:38}- {p}", "");
                }
            }
        }
        UseCaseCommands::Add {
            solution,
            text,
            prerequisites,
        } => {
            // Fail on an unknown solution rather than leave an orphan.
            store.get_solution(solution).await?;
            let use_case = catalog::add_use_case(
                store,
                &NewUseCase {
                    solution_id: solution,
                    text,
                    prerequisites,
                },
            )
            .await?;
            println!("Use case created: {}", use_case.id);
        }
        UseCaseCommands::Update {
            id,
            text,
            prerequisites,
        } => {
            let current = store.get_use_case(id).await?;
            let fields = NewUseCase {
                solution_id: current.solution_id,
                text: text.unwrap_or(current.text),
                prerequisites: prerequisites.unwrap_or(current.prerequisites),
            };
            let use_case = catalog::update_use_case(store, id, &fields).await?;
            println!("Use case updated: {}", use_case.id);
        }
        UseCaseCommands::Delete { id, delete_linked } => {
            let policy = if delete_linked {
                UseCaseDeletePolicy::DeleteLinkedPrerequisites
            } else {
                UseCaseDeletePolicy::KeepLinkedPrerequisites
            };
            let linked = catalog::delete_use_case(store, id, policy).await?;
            println!("Use case {id} deleted.");
            if delete_linked {
                println!("  Linked prerequisites removed: {linked}");
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Prerequisites
// -----------------------------------------------------------------------

pub async fn run_prereq_command(command: PrereqCommands, store: &dyn Store) -> Result<()> {
    match command {
        PrereqCommands::List { solution } => {
            let prerequisites = catalog::prerequisites_for(store, solution).await?;
            if prerequisites.is_empty() {
                println!("No prerequisites for solution {solution}.");
                return Ok(());
            }
            for p in &prerequisites {
                println!("{}  {}", p.id, p.text);
            }
        }
        PrereqCommands::Add {
            solution,
            use_case,
            text,
        } => {
            let scope = match (solution, use_case) {
                (Some(id), None) => {
                    store.get_solution(id).await?;
                    PrerequisiteScope::Solution(id)
                }
                (None, Some(id)) => {
                    store.get_use_case(id).await?;
                    PrerequisiteScope::UseCase(id)
                }
                _ => anyhow::bail!("give exactly one of --solution or --use-case"),
            };
            let prerequisite = catalog::add_prerequisite(store, &NewPrerequisite { text, scope }).await?;
            println!("Prerequisite created: {} ({})", prerequisite.id, prerequisite.scope);
        }
        PrereqCommands::Update { id, text } => {
            let current = store.get_prerequisite(id).await?;
            let prerequisite = catalog::update_prerequisite(
                store,
                id,
                &NewPrerequisite {
                    text,
                    scope: current.scope,
                },
            )
            .await?;
            println!("Prerequisite updated: {}", prerequisite.id);
        }
        PrereqCommands::Delete { id } => {
            catalog::delete_prerequisite(store, id).await?;
            println!("Prerequisite {id} deleted.");
        }
    }
    Ok(())
}
