//! Catalog management: validated create/update/delete of solutions, use
//! cases, and prerequisites.
//!
//! Input is normalised (trimmed, blank embedded prerequisites dropped) and
//! validated before any store call.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use planner_db::models::{
    NewPrerequisite, NewSolution, NewUseCase, PrerequisiteScope, Solution, SolutionPrerequisite,
    UseCase,
};

use crate::store::{CascadeReport, Store, StoreError, UseCaseDeletePolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("solution name must not be empty")]
    EmptySolutionName,

    #[error("use case text must not be empty")]
    EmptyUseCaseText,

    #[error("prerequisite text must not be empty")]
    EmptyPrerequisiteText,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

fn solution_fields(new: &NewSolution) -> Result<NewSolution, ValidationError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptySolutionName);
    }
    Ok(NewSolution {
        name: name.to_string(),
        description: new.description.trim().to_string(),
        icon: new.icon.trim().to_string(),
    })
}

fn use_case_fields(new: &NewUseCase) -> Result<NewUseCase, ValidationError> {
    let text = new.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyUseCaseText);
    }
    Ok(NewUseCase {
        solution_id: new.solution_id,
        text: text.to_string(),
        prerequisites: new
            .prerequisites
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn prerequisite_fields(new: &NewPrerequisite) -> Result<NewPrerequisite, ValidationError> {
    let text = new.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyPrerequisiteText);
    }
    Ok(NewPrerequisite {
        text: text.to_string(),
        scope: new.scope,
    })
}

// ---------------------------------------------------------------------------
// Solutions
// ---------------------------------------------------------------------------

pub async fn add_solution(store: &dyn Store, new: &NewSolution) -> CatalogResult<Solution> {
    let fields = solution_fields(new)?;
    let solution = store.add_solution(&fields).await?;
    info!(solution_id = %solution.id, name = %solution.name, "solution added");
    Ok(solution)
}

pub async fn update_solution(
    store: &dyn Store,
    id: Uuid,
    fields: &NewSolution,
) -> CatalogResult<Solution> {
    let fields = solution_fields(fields)?;
    Ok(store.update_solution(id, &fields).await?)
}

/// Delete a solution and everything that references it.
pub async fn delete_solution(store: &dyn Store, id: Uuid) -> CatalogResult<CascadeReport> {
    let report = store.delete_solution(id).await?;
    info!(
        solution_id = %id,
        use_cases = report.use_cases,
        prerequisites = report.prerequisites,
        "solution deleted"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Use cases
// ---------------------------------------------------------------------------

pub async fn add_use_case(store: &dyn Store, new: &NewUseCase) -> CatalogResult<UseCase> {
    let fields = use_case_fields(new)?;
    let use_case = store.add_use_case(&fields).await?;
    info!(use_case_id = %use_case.id, solution_id = %use_case.solution_id, "use case added");
    Ok(use_case)
}

pub async fn update_use_case(
    store: &dyn Store,
    id: Uuid,
    fields: &NewUseCase,
) -> CatalogResult<UseCase> {
    let fields = use_case_fields(fields)?;
    Ok(store.update_use_case(id, &fields).await?)
}

pub async fn delete_use_case(
    store: &dyn Store,
    id: Uuid,
    policy: UseCaseDeletePolicy,
) -> CatalogResult<u64> {
    let linked = store.delete_use_case(id, policy).await?;
    info!(use_case_id = %id, linked_prerequisites = linked, "use case deleted");
    Ok(linked)
}

/// Use cases of one solution, newest first.
pub async fn use_cases_for(store: &dyn Store, solution_id: Uuid) -> CatalogResult<Vec<UseCase>> {
    let mut use_cases = store.list_use_cases().await?;
    use_cases.retain(|uc| uc.solution_id == solution_id);
    Ok(use_cases)
}

// ---------------------------------------------------------------------------
// Prerequisites
// ---------------------------------------------------------------------------

pub async fn add_prerequisite(
    store: &dyn Store,
    new: &NewPrerequisite,
) -> CatalogResult<SolutionPrerequisite> {
    let fields = prerequisite_fields(new)?;
    let prerequisite = store.add_prerequisite(&fields).await?;
    info!(prerequisite_id = %prerequisite.id, scope = %prerequisite.scope, "prerequisite added");
    Ok(prerequisite)
}

pub async fn update_prerequisite(
    store: &dyn Store,
    id: Uuid,
    fields: &NewPrerequisite,
) -> CatalogResult<SolutionPrerequisite> {
    let fields = prerequisite_fields(fields)?;
    Ok(store.update_prerequisite(id, &fields).await?)
}

pub async fn delete_prerequisite(store: &dyn Store, id: Uuid) -> CatalogResult<()> {
    store.delete_prerequisite(id).await?;
    info!(prerequisite_id = %id, "prerequisite deleted");
    Ok(())
}

/// Prerequisites attached directly to a solution, newest first.
pub async fn prerequisites_for(
    store: &dyn Store,
    solution_id: Uuid,
) -> CatalogResult<Vec<SolutionPrerequisite>> {
    let mut prerequisites = store.list_prerequisites().await?;
    prerequisites.retain(|p| p.scope == PrerequisiteScope::Solution(solution_id));
    Ok(prerequisites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Collection, MemoryStore, Operation};

    #[tokio::test]
    async fn blank_name_rejected_before_store() {
        let store = MemoryStore::new();
        // A store call would fail loudly; validation must come first.
        store.fail(Collection::Solutions, Operation::Add);

        let err = add_solution(
            &store,
            &NewSolution {
                name: "   ".to_string(),
                ..NewSolution::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::EmptySolutionName)
        ));
    }

    #[tokio::test]
    async fn use_case_input_is_normalised() {
        let store = MemoryStore::new();
        let s = add_solution(
            &store,
            &NewSolution {
                name: " Password Safe ".to_string(),
                ..NewSolution::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(s.name, "Password Safe");

        let uc = add_use_case(
            &store,
            &NewUseCase {
                solution_id: s.id,
                text: "  SSH key management ".to_string(),
                prerequisites: vec![" SSH keys discovered ".to_string(), "  ".to_string()],
            },
        )
        .await
        .unwrap();
        assert_eq!(uc.text, "SSH key management");
        assert_eq!(uc.prerequisites, vec!["SSH keys discovered"]);
    }

    #[tokio::test]
    async fn empty_texts_rejected() {
        let store = MemoryStore::new();
        let err = add_use_case(
            &store,
            &NewUseCase {
                solution_id: Uuid::new_v4(),
                text: String::new(),
                prerequisites: vec![],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::EmptyUseCaseText)
        ));

        let err = add_prerequisite(
            &store,
            &NewPrerequisite {
                text: "\t".to_string(),
                scope: PrerequisiteScope::Solution(Uuid::new_v4()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::EmptyPrerequisiteText)
        ));
    }

    #[tokio::test]
    async fn store_failure_surfaces_unchanged() {
        let store = MemoryStore::new();
        store.fail(Collection::UseCases, Operation::List);
        let err = use_cases_for(&store, Uuid::new_v4()).await.unwrap_err();
        match err {
            CatalogError::Store(e) => {
                assert_eq!(e.collection, Collection::UseCases);
                assert_eq!(e.message, "injected failure");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = update_solution(
            &store,
            Uuid::new_v4(),
            &NewSolution {
                name: "x".to_string(),
                ..NewSolution::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn prerequisites_for_lists_solution_scope_only() {
        let store = MemoryStore::new();
        let s = Uuid::new_v4();
        add_prerequisite(
            &store,
            &NewPrerequisite {
                text: "Service account".to_string(),
                scope: PrerequisiteScope::Solution(s),
            },
        )
        .await
        .unwrap();
        add_prerequisite(
            &store,
            &NewPrerequisite {
                text: "Recording storage".to_string(),
                scope: PrerequisiteScope::UseCase(Uuid::new_v4()),
            },
        )
        .await
        .unwrap();

        let listed = prerequisites_for(&store, s).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "Service account");
    }
}
