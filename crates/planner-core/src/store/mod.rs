//! The `Store` trait -- the single seam between planner logic and persistence.
//!
//! Every component takes a `&dyn Store` (or `Arc<dyn Store>`) instead of a
//! global database handle, so the whole planner runs unchanged against
//! [`PgStore`] in production and [`MemoryStore`] in tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use planner_db::models::{
    LegacyPrerequisiteRow, NewPocPlan, NewPrerequisite, NewSolution, NewUseCase, PocPlan,
    PocPlanStatus, Solution, SolutionPrerequisite, UseCase,
};
pub use planner_db::queries::solutions::CascadeReport;

// ---------------------------------------------------------------------------
// Collections and operations
// ---------------------------------------------------------------------------

/// A named collection of records in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Solutions,
    UseCases,
    SolutionPrerequisites,
    PocPlans,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Self::Solutions,
        Self::UseCases,
        Self::SolutionPrerequisites,
        Self::PocPlans,
    ];

    /// Wire name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solutions => "solutions",
            Self::UseCases => "useCases",
            Self::SolutionPrerequisites => "solutionPrerequisites",
            Self::PocPlans => "pocPlans",
        }
    }

    /// PostgreSQL table backing the collection.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Solutions => "solutions",
            Self::UseCases => "use_cases",
            Self::SolutionPrerequisites => "solution_prerequisites",
            Self::PocPlans => "poc_plans",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = CollectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solutions" => Ok(Self::Solutions),
            "useCases" | "use_cases" => Ok(Self::UseCases),
            // `prerequisites` is the legacy name of the collection.
            "solutionPrerequisites" | "solution_prerequisites" | "prerequisites" => {
                Ok(Self::SolutionPrerequisites)
            }
            "pocPlans" | "poc_plans" => Ok(Self::PocPlans),
            other => Err(CollectionParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unknown collection name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection: {0:?}")]
pub struct CollectionParseError(pub String);

/// The kind of store call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    List,
    Get,
    Add,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Broad classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The addressed record does not exist.
    NotFound,
    /// The backend rejected or failed the call.
    Backend,
}

/// A failed store call. Carries the backend's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} {collection} failed: {message}")]
pub struct StoreError {
    pub collection: Collection,
    pub operation: Operation,
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn backend(collection: Collection, operation: Operation, message: impl Into<String>) -> Self {
        Self {
            collection,
            operation,
            kind: StoreErrorKind::Backend,
            message: message.into(),
        }
    }

    pub fn not_found(collection: Collection, operation: Operation, id: Uuid) -> Self {
        Self {
            collection,
            operation,
            kind: StoreErrorKind::NotFound,
            message: format!("no record with id {id}"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Uniform JSON shape of a store outcome: `{success, error?, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Envelope<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What happens to prerequisites linked to a use case when it is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCaseDeletePolicy {
    /// Leave linked rows; aggregation drops them once the use case is gone.
    #[default]
    KeepLinkedPrerequisites,
    /// Delete linked rows together with the use case.
    DeleteLinkedPrerequisites,
}

impl UseCaseDeletePolicy {
    pub fn deletes_linked(&self) -> bool {
        matches!(self, Self::DeleteLinkedPrerequisites)
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistence for the catalog and saved plans.
///
/// Every method reports failure through [`StoreError`]; implementations
/// never panic across this boundary. Lists come back in collection order:
/// solutions by name ascending, everything else newest first.
#[async_trait]
pub trait Store: Send + Sync {
    // -- solutions --

    async fn list_solutions(&self) -> StoreResult<Vec<Solution>>;
    async fn get_solution(&self, id: Uuid) -> StoreResult<Solution>;
    async fn add_solution(&self, new: &NewSolution) -> StoreResult<Solution>;
    async fn update_solution(&self, id: Uuid, fields: &NewSolution) -> StoreResult<Solution>;

    /// Delete a solution and every use case and solution-level prerequisite
    /// that references it. Either everything is removed or nothing is.
    async fn delete_solution(&self, id: Uuid) -> StoreResult<CascadeReport>;

    async fn count_solutions(&self) -> StoreResult<usize> {
        Ok(self.list_solutions().await?.len())
    }

    // -- use cases --

    async fn list_use_cases(&self) -> StoreResult<Vec<UseCase>>;
    async fn get_use_case(&self, id: Uuid) -> StoreResult<UseCase>;
    async fn add_use_case(&self, new: &NewUseCase) -> StoreResult<UseCase>;
    async fn update_use_case(&self, id: Uuid, fields: &NewUseCase) -> StoreResult<UseCase>;

    /// Delete a use case. Returns the number of linked prerequisites removed
    /// under `policy`.
    async fn delete_use_case(&self, id: Uuid, policy: UseCaseDeletePolicy) -> StoreResult<u64>;

    // -- prerequisites --

    async fn list_prerequisites(&self) -> StoreResult<Vec<SolutionPrerequisite>>;
    async fn get_prerequisite(&self, id: Uuid) -> StoreResult<SolutionPrerequisite>;

    /// Insert a prerequisite, keeping `created_at` when one is given.
    async fn insert_prerequisite(
        &self,
        new: &NewPrerequisite,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<SolutionPrerequisite>;

    async fn add_prerequisite(&self, new: &NewPrerequisite) -> StoreResult<SolutionPrerequisite> {
        self.insert_prerequisite(new, None).await
    }

    async fn update_prerequisite(
        &self,
        id: Uuid,
        fields: &NewPrerequisite,
    ) -> StoreResult<SolutionPrerequisite>;
    async fn delete_prerequisite(&self, id: Uuid) -> StoreResult<()>;

    /// Rows of the legacy prerequisite collection, if the backend has one.
    async fn list_legacy_prerequisites(&self) -> StoreResult<Vec<LegacyPrerequisiteRow>> {
        Ok(Vec::new())
    }

    // -- saved plans --

    async fn list_poc_plans(&self) -> StoreResult<Vec<PocPlan>>;
    async fn get_poc_plan(&self, id: Uuid) -> StoreResult<PocPlan>;
    async fn add_poc_plan(&self, new: &NewPocPlan) -> StoreResult<PocPlan>;
    async fn update_poc_plan_status(&self, id: Uuid, status: PocPlanStatus) -> StoreResult<()>;
    async fn delete_poc_plan(&self, id: Uuid) -> StoreResult<()>;
}

// Compile-time assertion: Store must be usable as `dyn Store`.
const _: () = {
    fn _assert_object_safe(_: &dyn Store) {}
};
