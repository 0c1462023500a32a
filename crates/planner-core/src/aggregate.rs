//! Aggregation view: solutions joined with their use cases and prerequisites.
//!
//! The join is a pure function over three flat lists. Records whose owner
//! cannot be resolved (a use case pointing at a deleted solution, a
//! prerequisite pointing at a deleted use case) are dropped silently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use planner_db::models::{PrerequisiteScope, Solution, SolutionPrerequisite, UseCase};

use crate::store::{Store, StoreResult};

/// A solution with its use cases and the merged text of every prerequisite
/// attached to it or to one of its use cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSolution {
    #[serde(flatten)]
    pub solution: Solution,
    pub use_cases: Vec<UseCase>,
    pub prerequisites: Vec<String>,
}

impl AggregatedSolution {
    pub fn id(&self) -> Uuid {
        self.solution.id
    }

    pub fn name(&self) -> &str {
        &self.solution.name
    }

    pub fn use_case(&self, id: Uuid) -> Option<&UseCase> {
        self.use_cases.iter().find(|uc| uc.id == id)
    }
}

/// Look up a solution in an aggregate by id.
pub fn find(aggregate: &[AggregatedSolution], id: Uuid) -> Option<&AggregatedSolution> {
    aggregate.iter().find(|s| s.id() == id)
}

/// Join the three collections.
///
/// Output follows `solutions` order; use cases and prerequisites keep the
/// order they were given in.
pub fn aggregate(
    solutions: &[Solution],
    use_cases: &[UseCase],
    prerequisites: &[SolutionPrerequisite],
) -> Vec<AggregatedSolution> {
    let owner_of_use_case: HashMap<Uuid, Uuid> = use_cases
        .iter()
        .map(|uc| (uc.id, uc.solution_id))
        .collect();

    let mut use_cases_by_solution: HashMap<Uuid, Vec<UseCase>> = HashMap::new();
    for uc in use_cases {
        use_cases_by_solution
            .entry(uc.solution_id)
            .or_default()
            .push(uc.clone());
    }

    let mut prerequisites_by_solution: HashMap<Uuid, Vec<String>> = HashMap::new();
    for p in prerequisites {
        let owner = match p.scope {
            PrerequisiteScope::Solution(id) => Some(id),
            PrerequisiteScope::UseCase(id) => owner_of_use_case.get(&id).copied(),
        };
        if let Some(solution_id) = owner {
            prerequisites_by_solution
                .entry(solution_id)
                .or_default()
                .push(p.text.clone());
        }
    }

    solutions
        .iter()
        .map(|s| AggregatedSolution {
            solution: s.clone(),
            use_cases: use_cases_by_solution.remove(&s.id).unwrap_or_default(),
            prerequisites: prerequisites_by_solution.remove(&s.id).unwrap_or_default(),
        })
        .collect()
}

/// Fetch all three collections concurrently and join them.
///
/// Fails as soon as any fetch fails; no partial aggregate is returned.
pub async fn load_aggregate(store: &dyn Store) -> StoreResult<Vec<AggregatedSolution>> {
    let (solutions, use_cases, prerequisites) = futures::try_join!(
        store.list_solutions(),
        store.list_use_cases(),
        store.list_prerequisites(),
    )?;

    debug!(
        solutions = solutions.len(),
        use_cases = use_cases.len(),
        prerequisites = prerequisites.len(),
        "aggregating catalog"
    );

    Ok(aggregate(&solutions, &use_cases, &prerequisites))
}
