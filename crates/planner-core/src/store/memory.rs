//! In-memory [`Store`] used by tests and by `--memory` runs of the CLI.
//!
//! Rows live in insertion-ordered vectors behind one `RwLock`, so a cascade
//! delete happens under a single write guard. Individual (collection,
//! operation) pairs can be set to fail to exercise error paths.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use planner_db::models::{
    LegacyPrerequisiteRow, NewPocPlan, NewPrerequisite, NewSolution, NewUseCase, PocPlan,
    PocPlanStatus, Solution, SolutionPrerequisite, UseCase,
};

use super::{
    CascadeReport, Collection, Operation, Store, StoreError, StoreResult, UseCaseDeletePolicy,
};

#[derive(Default)]
struct Tables {
    solutions: Vec<Solution>,
    use_cases: Vec<UseCase>,
    prerequisites: Vec<SolutionPrerequisite>,
    poc_plans: Vec<PocPlan>,
    legacy_prerequisites: Vec<LegacyPrerequisiteRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: Mutex<HashSet<(Collection, Operation)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the legacy prerequisite collection.
    pub fn with_legacy_prerequisites(rows: Vec<LegacyPrerequisiteRow>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                legacy_prerequisites: rows,
                ..Tables::default()
            }),
            failing: Mutex::default(),
        }
    }

    /// Make every subsequent `operation` on `collection` fail.
    pub fn fail(&self, collection: Collection, operation: Operation) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert((collection, operation));
        }
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    fn check(&self, collection: Collection, operation: Operation) -> StoreResult<()> {
        let failing = self
            .failing
            .lock()
            .map_err(|e| StoreError::backend(collection, operation, e.to_string()))?;
        if failing.contains(&(collection, operation)) {
            return Err(StoreError::backend(
                collection,
                operation,
                "injected failure",
            ));
        }
        Ok(())
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    out
}

fn not_found(collection: Collection, operation: Operation, id: Uuid) -> StoreError {
    StoreError::not_found(collection, operation, id)
}

#[async_trait]
impl Store for MemoryStore {
    // -- solutions --

    async fn list_solutions(&self) -> StoreResult<Vec<Solution>> {
        self.check(Collection::Solutions, Operation::List)?;
        let tables = self.tables.read().await;
        let mut out = tables.solutions.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get_solution(&self, id: Uuid) -> StoreResult<Solution> {
        self.check(Collection::Solutions, Operation::Get)?;
        let tables = self.tables.read().await;
        tables
            .solutions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found(Collection::Solutions, Operation::Get, id))
    }

    async fn add_solution(&self, new: &NewSolution) -> StoreResult<Solution> {
        self.check(Collection::Solutions, Operation::Add)?;
        let now = Utc::now();
        let solution = Solution {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            description: new.description.clone(),
            icon: new.icon.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.solutions.push(solution.clone());
        Ok(solution)
    }

    async fn update_solution(&self, id: Uuid, fields: &NewSolution) -> StoreResult<Solution> {
        self.check(Collection::Solutions, Operation::Update)?;
        let mut tables = self.tables.write().await;
        let solution = tables
            .solutions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(Collection::Solutions, Operation::Update, id))?;
        solution.name = fields.name.clone();
        solution.description = fields.description.clone();
        solution.icon = fields.icon.clone();
        solution.updated_at = Utc::now();
        Ok(solution.clone())
    }

    async fn delete_solution(&self, id: Uuid) -> StoreResult<CascadeReport> {
        self.check(Collection::Solutions, Operation::Delete)?;
        let mut tables = self.tables.write().await;
        if !tables.solutions.iter().any(|s| s.id == id) {
            return Err(not_found(Collection::Solutions, Operation::Delete, id));
        }

        let use_cases_before = tables.use_cases.len();
        tables.use_cases.retain(|uc| uc.solution_id != id);
        let prerequisites_before = tables.prerequisites.len();
        tables
            .prerequisites
            .retain(|p| p.scope.solution_id() != Some(id));
        tables.solutions.retain(|s| s.id != id);

        Ok(CascadeReport {
            use_cases: (use_cases_before - tables.use_cases.len()) as u64,
            prerequisites: (prerequisites_before - tables.prerequisites.len()) as u64,
        })
    }

    // -- use cases --

    async fn list_use_cases(&self) -> StoreResult<Vec<UseCase>> {
        self.check(Collection::UseCases, Operation::List)?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.use_cases, |uc| uc.created_at))
    }

    async fn get_use_case(&self, id: Uuid) -> StoreResult<UseCase> {
        self.check(Collection::UseCases, Operation::Get)?;
        let tables = self.tables.read().await;
        tables
            .use_cases
            .iter()
            .find(|uc| uc.id == id)
            .cloned()
            .ok_or_else(|| not_found(Collection::UseCases, Operation::Get, id))
    }

    async fn add_use_case(&self, new: &NewUseCase) -> StoreResult<UseCase> {
        self.check(Collection::UseCases, Operation::Add)?;
        let now = Utc::now();
        let use_case = UseCase {
            id: Uuid::new_v4(),
            solution_id: new.solution_id,
            text: new.text.clone(),
            prerequisites: new.prerequisites.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.use_cases.push(use_case.clone());
        Ok(use_case)
    }

    async fn update_use_case(&self, id: Uuid, fields: &NewUseCase) -> StoreResult<UseCase> {
        self.check(Collection::UseCases, Operation::Update)?;
        let mut tables = self.tables.write().await;
        let use_case = tables
            .use_cases
            .iter_mut()
            .find(|uc| uc.id == id)
            .ok_or_else(|| not_found(Collection::UseCases, Operation::Update, id))?;
        use_case.solution_id = fields.solution_id;
        use_case.text = fields.text.clone();
        use_case.prerequisites = fields.prerequisites.clone();
        use_case.updated_at = Utc::now();
        Ok(use_case.clone())
    }

    async fn delete_use_case(&self, id: Uuid, policy: UseCaseDeletePolicy) -> StoreResult<u64> {
        self.check(Collection::UseCases, Operation::Delete)?;
        let mut tables = self.tables.write().await;
        if !tables.use_cases.iter().any(|uc| uc.id == id) {
            return Err(not_found(Collection::UseCases, Operation::Delete, id));
        }

        let mut linked = 0;
        if policy.deletes_linked() {
            let before = tables.prerequisites.len();
            tables
                .prerequisites
                .retain(|p| p.scope.use_case_id() != Some(id));
            linked = (before - tables.prerequisites.len()) as u64;
        }
        tables.use_cases.retain(|uc| uc.id != id);
        Ok(linked)
    }

    // -- prerequisites --

    async fn list_prerequisites(&self) -> StoreResult<Vec<SolutionPrerequisite>> {
        self.check(Collection::SolutionPrerequisites, Operation::List)?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.prerequisites, |p| p.created_at))
    }

    async fn get_prerequisite(&self, id: Uuid) -> StoreResult<SolutionPrerequisite> {
        self.check(Collection::SolutionPrerequisites, Operation::Get)?;
        let tables = self.tables.read().await;
        tables
            .prerequisites
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(Collection::SolutionPrerequisites, Operation::Get, id))
    }

    async fn insert_prerequisite(
        &self,
        new: &NewPrerequisite,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<SolutionPrerequisite> {
        self.check(Collection::SolutionPrerequisites, Operation::Add)?;
        let now = Utc::now();
        let prerequisite = SolutionPrerequisite {
            id: Uuid::new_v4(),
            text: new.text.clone(),
            scope: new.scope,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .prerequisites
            .push(prerequisite.clone());
        Ok(prerequisite)
    }

    async fn update_prerequisite(
        &self,
        id: Uuid,
        fields: &NewPrerequisite,
    ) -> StoreResult<SolutionPrerequisite> {
        self.check(Collection::SolutionPrerequisites, Operation::Update)?;
        let mut tables = self.tables.write().await;
        let prerequisite = tables
            .prerequisites
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(Collection::SolutionPrerequisites, Operation::Update, id))?;
        prerequisite.text = fields.text.clone();
        prerequisite.scope = fields.scope;
        prerequisite.updated_at = Utc::now();
        Ok(prerequisite.clone())
    }

    async fn delete_prerequisite(&self, id: Uuid) -> StoreResult<()> {
        self.check(Collection::SolutionPrerequisites, Operation::Delete)?;
        let mut tables = self.tables.write().await;
        let before = tables.prerequisites.len();
        tables.prerequisites.retain(|p| p.id != id);
        if tables.prerequisites.len() == before {
            return Err(not_found(
                Collection::SolutionPrerequisites,
                Operation::Delete,
                id,
            ));
        }
        Ok(())
    }

    async fn list_legacy_prerequisites(&self) -> StoreResult<Vec<LegacyPrerequisiteRow>> {
        self.check(Collection::SolutionPrerequisites, Operation::List)?;
        Ok(self.tables.read().await.legacy_prerequisites.clone())
    }

    // -- saved plans --

    async fn list_poc_plans(&self) -> StoreResult<Vec<PocPlan>> {
        self.check(Collection::PocPlans, Operation::List)?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.poc_plans, |p| p.created_at))
    }

    async fn get_poc_plan(&self, id: Uuid) -> StoreResult<PocPlan> {
        self.check(Collection::PocPlans, Operation::Get)?;
        let tables = self.tables.read().await;
        tables
            .poc_plans
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(Collection::PocPlans, Operation::Get, id))
    }

    async fn add_poc_plan(&self, new: &NewPocPlan) -> StoreResult<PocPlan> {
        self.check(Collection::PocPlans, Operation::Add)?;
        let now = Utc::now();
        let plan = PocPlan {
            id: Uuid::new_v4(),
            customer_info: new.customer_info.clone(),
            solutions: new.solutions.clone(),
            selected_use_cases: new.selected_use_cases.clone(),
            custom_use_cases: new.custom_use_cases.clone(),
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.poc_plans.push(plan.clone());
        Ok(plan)
    }

    async fn update_poc_plan_status(&self, id: Uuid, status: PocPlanStatus) -> StoreResult<()> {
        self.check(Collection::PocPlans, Operation::Update)?;
        let mut tables = self.tables.write().await;
        let plan = tables
            .poc_plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(Collection::PocPlans, Operation::Update, id))?;
        plan.status = status;
        plan.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_poc_plan(&self, id: Uuid) -> StoreResult<()> {
        self.check(Collection::PocPlans, Operation::Delete)?;
        let mut tables = self.tables.write().await;
        let before = tables.poc_plans.len();
        tables.poc_plans.retain(|p| p.id != id);
        if tables.poc_plans.len() == before {
            return Err(not_found(Collection::PocPlans, Operation::Delete, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_db::models::PrerequisiteScope;

    fn solution(name: &str) -> NewSolution {
        NewSolution {
            name: name.to_string(),
            ..NewSolution::default()
        }
    }

    #[tokio::test]
    async fn solutions_listed_by_name() {
        let store = MemoryStore::new();
        store.add_solution(&solution("Remote Support")).await.unwrap();
        store.add_solution(&solution("Endpoint Privilege Management")).await.unwrap();

        let names: Vec<String> = store
            .list_solutions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Endpoint Privilege Management", "Remote Support"]);
    }

    #[tokio::test]
    async fn use_cases_listed_newest_first() {
        let store = MemoryStore::new();
        let s = store.add_solution(&solution("S")).await.unwrap();
        for text in ["first", "second", "third"] {
            store
                .add_use_case(&NewUseCase {
                    solution_id: s.id,
                    text: text.to_string(),
                    prerequisites: vec![],
                })
                .await
                .unwrap();
        }

        let texts: Vec<String> = store
            .list_use_cases()
            .await
            .unwrap()
            .into_iter()
            .map(|uc| uc.text)
            .collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn preserved_timestamp_orders_prerequisites() {
        let store = MemoryStore::new();
        let owner = PrerequisiteScope::Solution(Uuid::new_v4());
        let old = Utc::now() - chrono::Duration::days(30);

        store
            .add_prerequisite(&NewPrerequisite {
                text: "recent".to_string(),
                scope: owner,
            })
            .await
            .unwrap();
        let copied = store
            .insert_prerequisite(
                &NewPrerequisite {
                    text: "copied".to_string(),
                    scope: owner,
                },
                Some(old),
            )
            .await
            .unwrap();
        assert_eq!(copied.created_at, old);

        let texts: Vec<String> = store
            .list_prerequisites()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, vec!["recent", "copied"]);
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(store.get_solution(id).await.unwrap_err().is_not_found());
        assert!(
            store
                .update_solution(id, &solution("x"))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.delete_solution(id).await.unwrap_err().is_not_found());
        assert!(
            store
                .delete_use_case(id, UseCaseDeletePolicy::default())
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.delete_prerequisite(id).await.unwrap_err().is_not_found());
        assert!(store.get_poc_plan(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn injected_failure_until_healed() {
        let store = MemoryStore::new();
        store.fail(Collection::Solutions, Operation::Add);

        let err = store.add_solution(&solution("S")).await.unwrap_err();
        assert_eq!(err.collection, Collection::Solutions);
        assert_eq!(err.operation, Operation::Add);
        assert!(store.list_solutions().await.unwrap().is_empty());

        store.heal();
        store.add_solution(&solution("S")).await.unwrap();
        assert_eq!(store.count_solutions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let store = MemoryStore::new();
        let created = store.add_solution(&solution("PRA")).await.unwrap();
        let updated = store
            .update_solution(created.id, &solution("Privileged Remote Access"))
            .await
            .unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.name, "Privileged Remote Access");
    }

    #[tokio::test]
    async fn plan_status_update() {
        let store = MemoryStore::new();
        let plan = store.add_poc_plan(&NewPocPlan::default()).await.unwrap();
        assert_eq!(plan.status, PocPlanStatus::Draft);

        store
            .update_poc_plan_status(plan.id, PocPlanStatus::Approved)
            .await
            .unwrap();
        let fetched = store.get_poc_plan(plan.id).await.unwrap();
        assert_eq!(fetched.status, PocPlanStatus::Approved);

        store.delete_poc_plan(plan.id).await.unwrap();
        assert!(store.list_poc_plans().await.unwrap().is_empty());
    }
}
