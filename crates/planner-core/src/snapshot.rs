//! Saved plan snapshots.
//!
//! A snapshot stores references (solution ids and names, use case ids) and
//! the raw selection maps. Use case text is not copied, so reading a plan
//! back re-joins it against the live catalog.

use tracing::info;
use uuid::Uuid;

use planner_db::models::{NewPocPlan, PocPlan, PocPlanStatus, SolutionRef};

use crate::aggregate::{self, AggregatedSolution};
use crate::document::{
    Checklist, CriterionRow, MissingUseCase, PlanSelection, PocDocument, SolutionSection,
    build_section,
};
use crate::store::{Store, StoreResult};

/// Stands in for a selected use case that no longer exists.
pub const UNKNOWN_USE_CASE: &str = "Unknown use case";

/// Build the record to persist for `selection`.
///
/// Solutions are stored as `{id, name}` pairs taken from `aggregate`;
/// selected ids that are not in the aggregate are skipped.
pub fn format_plan_for_save(
    aggregate: &[AggregatedSolution],
    selection: &PlanSelection,
) -> NewPocPlan {
    let solutions = selection
        .solutions
        .iter()
        .filter_map(|id| aggregate::find(aggregate, *id))
        .map(|s| SolutionRef {
            id: s.id(),
            name: s.solution.name.clone(),
        })
        .collect();

    NewPocPlan {
        customer_info: selection.customer.clone(),
        solutions,
        selected_use_cases: selection.selected_use_cases.clone(),
        custom_use_cases: selection.custom_use_cases.clone(),
        status: PocPlanStatus::Draft,
    }
}

/// Append a snapshot of `selection` to the store.
pub async fn save_poc_plan(
    store: &dyn Store,
    aggregate: &[AggregatedSolution],
    selection: &PlanSelection,
) -> StoreResult<PocPlan> {
    let new = format_plan_for_save(aggregate, selection);
    let plan = store.add_poc_plan(&new).await?;
    info!(plan_id = %plan.id, solutions = plan.solutions.len(), "poc plan saved");
    Ok(plan)
}

/// The selection a saved plan was made from.
pub fn selection_of(plan: &PocPlan) -> PlanSelection {
    PlanSelection {
        solutions: plan.solutions.iter().map(|s| s.id).collect(),
        selected_use_cases: plan.selected_use_cases.clone(),
        custom_use_cases: plan.custom_use_cases.clone(),
        customer: plan.customer_info.clone(),
    }
}

/// Re-join a saved plan against live catalog data.
///
/// Every solution in the snapshot yields a section. A solution that has
/// since been deleted keeps its stored name and is flagged `missing`; a
/// selected use case that cannot be resolved becomes an
/// [`UNKNOWN_USE_CASE`] row.
pub fn resolve_saved_plan(plan: &PocPlan, aggregate: &[AggregatedSolution]) -> PocDocument {
    let selection = selection_of(plan);

    let sections = plan
        .solutions
        .iter()
        .map(|stored| {
            let selected = selection.use_cases_for(stored.id);
            let custom = selection.custom_for(stored.id);
            match aggregate::find(aggregate, stored.id) {
                Some(live) => build_section(
                    live,
                    selected,
                    custom,
                    MissingUseCase::Placeholder(UNKNOWN_USE_CASE),
                ),
                None => missing_section(stored, selected, custom),
            }
        })
        .collect();

    PocDocument {
        customer: plan.customer_info.clone(),
        sections,
    }
}

fn missing_section(stored: &SolutionRef, selected: &[Uuid], custom: Option<&str>) -> SolutionSection {
    let mut rows: Vec<CriterionRow> = selected
        .iter()
        .map(|_| CriterionRow::new(UNKNOWN_USE_CASE, Vec::new(), false))
        .collect();
    if let Some(custom) = custom {
        rows.push(CriterionRow::new(custom, Vec::new(), true));
    }

    SolutionSection {
        solution_id: stored.id,
        name: stored.name.clone(),
        icon: String::new(),
        prerequisites: Vec::new(),
        checklist: Checklist::from_rows(rows),
        missing: true,
    }
}

/// Fetch a saved plan and the live catalog, and resolve one against the
/// other.
pub async fn load_saved_plan(
    store: &dyn Store,
    id: Uuid,
) -> StoreResult<(PocPlan, PocDocument)> {
    let plan = store.get_poc_plan(id).await?;
    let aggregate = aggregate::load_aggregate(store).await?;
    let doc = resolve_saved_plan(&plan, &aggregate);
    Ok((plan, doc))
}

/// Number of placeholder rows in a resolved document.
pub fn unresolved_count(doc: &PocDocument) -> usize {
    doc.sections
        .iter()
        .flat_map(|s| s.checklist.rows())
        .filter(|row| row.milestone == UNKNOWN_USE_CASE)
        .count()
}
