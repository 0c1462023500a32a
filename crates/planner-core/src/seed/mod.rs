//! Starter data and the legacy prerequisite copy.

mod data;
mod migrate;

pub use data::{STARTER_SOLUTIONS, SeedSolution, SeedUseCase};
pub use migrate::{MigrationReport, migrate_legacy_prerequisites};

use serde::Serialize;
use tracing::info;

use planner_db::models::{NewPrerequisite, NewSolution, NewUseCase, PrerequisiteScope};

use crate::catalog::{self, CatalogResult};
use crate::store::Store;

/// Outcome of [`seed_starter_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedReport {
    /// The catalog already had solutions; nothing was written.
    AlreadySeeded { existing: usize },
    Seeded {
        solutions: usize,
        use_cases: usize,
        prerequisites: usize,
    },
}

impl std::fmt::Display for SeedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySeeded { existing } => {
                write!(f, "already seeded ({existing} solutions present)")
            }
            Self::Seeded {
                solutions,
                use_cases,
                prerequisites,
            } => write!(
                f,
                "seeded {solutions} solutions, {use_cases} use cases, {prerequisites} prerequisites"
            ),
        }
    }
}

/// Load [`STARTER_SOLUTIONS`] into an empty catalog.
///
/// Does nothing when any solution exists. A failure part way through leaves
/// the rows written so far in place.
pub async fn seed_starter_data(store: &dyn Store) -> CatalogResult<SeedReport> {
    let existing = store.count_solutions().await?;
    if existing > 0 {
        info!(existing, "catalog already seeded");
        return Ok(SeedReport::AlreadySeeded { existing });
    }

    let (mut solutions, mut use_cases, mut prerequisites) = (0, 0, 0);
    for seed in STARTER_SOLUTIONS {
        let solution = catalog::add_solution(
            store,
            &NewSolution {
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                icon: seed.icon.to_string(),
            },
        )
        .await?;
        solutions += 1;

        for uc in seed.use_cases {
            catalog::add_use_case(
                store,
                &NewUseCase {
                    solution_id: solution.id,
                    text: uc.text.to_string(),
                    prerequisites: uc.prerequisites.iter().map(|p| p.to_string()).collect(),
                },
            )
            .await?;
            use_cases += 1;
        }

        for text in seed.prerequisites {
            catalog::add_prerequisite(
                store,
                &NewPrerequisite {
                    text: text.to_string(),
                    scope: PrerequisiteScope::Solution(solution.id),
                },
            )
            .await?;
            prerequisites += 1;
        }
    }

    let report = SeedReport::Seeded {
        solutions,
        use_cases,
        prerequisites,
    };
    info!(%report, "starter data loaded");
    Ok(report)
}
