//! [`Store`] backed by PostgreSQL through `planner-db` queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use planner_db::error::is_not_found;
use planner_db::models::{
    LegacyPrerequisiteRow, NewPocPlan, NewPrerequisite, NewSolution, NewUseCase, PocPlan,
    PocPlanStatus, Solution, SolutionPrerequisite, UseCase,
};
use planner_db::queries::{poc_plans, prerequisites, solutions, use_cases};

use super::{
    CascadeReport, Collection, Operation, Store, StoreError, StoreErrorKind, StoreResult,
    UseCaseDeletePolicy,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Convert a query error, keeping the full context chain as the message.
fn map_err(collection: Collection, operation: Operation) -> impl Fn(anyhow::Error) -> StoreError {
    move |err| {
        let kind = if is_not_found(&err) {
            StoreErrorKind::NotFound
        } else {
            StoreErrorKind::Backend
        };
        debug!(%collection, %operation, error = %err, "store call failed");
        StoreError {
            collection,
            operation,
            kind,
            message: format!("{err:#}"),
        }
    }
}

/// Turn a `None` from a by-id fetch into a not-found error.
fn require<T>(row: Option<T>, collection: Collection, id: Uuid) -> StoreResult<T> {
    row.ok_or_else(|| StoreError::not_found(collection, Operation::Get, id))
}

#[async_trait]
impl Store for PgStore {
    // -- solutions --

    async fn list_solutions(&self) -> StoreResult<Vec<Solution>> {
        solutions::list_solutions(&self.pool)
            .await
            .map_err(map_err(Collection::Solutions, Operation::List))
    }

    async fn count_solutions(&self) -> StoreResult<usize> {
        let count = solutions::count_solutions(&self.pool)
            .await
            .map_err(map_err(Collection::Solutions, Operation::List))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn get_solution(&self, id: Uuid) -> StoreResult<Solution> {
        let row = solutions::get_solution(&self.pool, id)
            .await
            .map_err(map_err(Collection::Solutions, Operation::Get))?;
        require(row, Collection::Solutions, id)
    }

    async fn add_solution(&self, new: &NewSolution) -> StoreResult<Solution> {
        solutions::insert_solution(&self.pool, new)
            .await
            .map_err(map_err(Collection::Solutions, Operation::Add))
    }

    async fn update_solution(&self, id: Uuid, fields: &NewSolution) -> StoreResult<Solution> {
        solutions::update_solution(&self.pool, id, fields)
            .await
            .map_err(map_err(Collection::Solutions, Operation::Update))
    }

    async fn delete_solution(&self, id: Uuid) -> StoreResult<CascadeReport> {
        solutions::delete_solution_cascade(&self.pool, id)
            .await
            .map_err(map_err(Collection::Solutions, Operation::Delete))
    }

    // -- use cases --

    async fn list_use_cases(&self) -> StoreResult<Vec<UseCase>> {
        use_cases::list_use_cases(&self.pool)
            .await
            .map_err(map_err(Collection::UseCases, Operation::List))
    }

    async fn get_use_case(&self, id: Uuid) -> StoreResult<UseCase> {
        let row = use_cases::get_use_case(&self.pool, id)
            .await
            .map_err(map_err(Collection::UseCases, Operation::Get))?;
        require(row, Collection::UseCases, id)
    }

    async fn add_use_case(&self, new: &NewUseCase) -> StoreResult<UseCase> {
        use_cases::insert_use_case(&self.pool, new)
            .await
            .map_err(map_err(Collection::UseCases, Operation::Add))
    }

    async fn update_use_case(&self, id: Uuid, fields: &NewUseCase) -> StoreResult<UseCase> {
        use_cases::update_use_case(&self.pool, id, fields)
            .await
            .map_err(map_err(Collection::UseCases, Operation::Update))
    }

    async fn delete_use_case(&self, id: Uuid, policy: UseCaseDeletePolicy) -> StoreResult<u64> {
        use_cases::delete_use_case(&self.pool, id, policy.deletes_linked())
            .await
            .map_err(map_err(Collection::UseCases, Operation::Delete))
    }

    // -- prerequisites --

    async fn list_prerequisites(&self) -> StoreResult<Vec<SolutionPrerequisite>> {
        prerequisites::list_prerequisites(&self.pool)
            .await
            .map_err(map_err(Collection::SolutionPrerequisites, Operation::List))
    }

    async fn get_prerequisite(&self, id: Uuid) -> StoreResult<SolutionPrerequisite> {
        let row = prerequisites::get_prerequisite(&self.pool, id)
            .await
            .map_err(map_err(Collection::SolutionPrerequisites, Operation::Get))?;
        require(row, Collection::SolutionPrerequisites, id)
    }

    async fn insert_prerequisite(
        &self,
        new: &NewPrerequisite,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<SolutionPrerequisite> {
        prerequisites::insert_prerequisite(&self.pool, new, created_at)
            .await
            .map_err(map_err(Collection::SolutionPrerequisites, Operation::Add))
    }

    async fn update_prerequisite(
        &self,
        id: Uuid,
        fields: &NewPrerequisite,
    ) -> StoreResult<SolutionPrerequisite> {
        prerequisites::update_prerequisite(&self.pool, id, fields)
            .await
            .map_err(map_err(Collection::SolutionPrerequisites, Operation::Update))
    }

    async fn delete_prerequisite(&self, id: Uuid) -> StoreResult<()> {
        prerequisites::delete_prerequisite(&self.pool, id)
            .await
            .map_err(map_err(Collection::SolutionPrerequisites, Operation::Delete))
    }

    async fn list_legacy_prerequisites(&self) -> StoreResult<Vec<LegacyPrerequisiteRow>> {
        prerequisites::list_legacy_prerequisites(&self.pool)
            .await
            .map_err(map_err(Collection::SolutionPrerequisites, Operation::List))
    }

    // -- saved plans --

    async fn list_poc_plans(&self) -> StoreResult<Vec<PocPlan>> {
        poc_plans::list_poc_plans(&self.pool)
            .await
            .map_err(map_err(Collection::PocPlans, Operation::List))
    }

    async fn get_poc_plan(&self, id: Uuid) -> StoreResult<PocPlan> {
        let row = poc_plans::get_poc_plan(&self.pool, id)
            .await
            .map_err(map_err(Collection::PocPlans, Operation::Get))?;
        require(row, Collection::PocPlans, id)
    }

    async fn add_poc_plan(&self, new: &NewPocPlan) -> StoreResult<PocPlan> {
        poc_plans::insert_poc_plan(&self.pool, new)
            .await
            .map_err(map_err(Collection::PocPlans, Operation::Add))
    }

    async fn update_poc_plan_status(&self, id: Uuid, status: PocPlanStatus) -> StoreResult<()> {
        poc_plans::update_poc_plan_status(&self.pool, id, status)
            .await
            .map_err(map_err(Collection::PocPlans, Operation::Update))
    }

    async fn delete_poc_plan(&self, id: Uuid) -> StoreResult<()> {
        poc_plans::delete_poc_plan(&self.pool, id)
            .await
            .map_err(map_err(Collection::PocPlans, Operation::Delete))
    }
}
