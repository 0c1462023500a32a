//! `poc-planner items`: the dashboard item list, non-interactively.

use anyhow::{Result, bail};
use uuid::Uuid;

use planner_core::aggregate::{AggregatedSolution, load_aggregate};
use planner_core::dashboard::{
    DashboardItem, ItemKind, SolutionSelection, ViewMode, apply_filter, dashboard_items,
    dashboard_totals,
};
use planner_core::store::Store;

pub struct ItemsOptions {
    pub search: String,
    /// Solution names or IDs; empty means every solution.
    pub solutions: Vec<String>,
    pub view: ViewMode,
    pub json: bool,
}

/// Build a selection from names (case-insensitive) or IDs. No references
/// selects everything.
pub fn selection_from_references(
    aggregate: &[AggregatedSolution],
    references: &[String],
) -> Result<SolutionSelection> {
    if references.is_empty() {
        return Ok(SolutionSelection::all(aggregate));
    }

    let mut ids = Vec::with_capacity(references.len());
    for reference in references {
        let reference = reference.trim();
        let found = match reference.parse::<Uuid>() {
            Ok(id) => aggregate.iter().find(|s| s.id() == id),
            Err(_) => aggregate
                .iter()
                .find(|s| s.name().eq_ignore_ascii_case(reference)),
        };
        match found {
            Some(s) => ids.push(s.id()),
            None => bail!("no solution matches {reference:?}"),
        }
    }
    Ok(SolutionSelection::only(aggregate, ids))
}

pub async fn run_items(store: &dyn Store, options: &ItemsOptions) -> Result<()> {
    let aggregate = load_aggregate(store).await?;
    let selection = selection_from_references(&aggregate, &options.solutions)?;
    let filtered = apply_filter(&aggregate, &selection, &options.search);
    let items = dashboard_items(&filtered, options.view);
    let totals = dashboard_totals(&items, &selection);

    if options.json {
        let body = serde_json::json!({ "totals": totals, "items": items });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!(
        "{} item(s): {} use case(s), {} prerequisite(s) across {} solution(s)",
        totals.total, totals.use_cases, totals.prerequisites, totals.solutions
    );
    if items.is_empty() {
        return Ok(());
    }
    println!();
    for line in item_lines(&items) {
        println!("{line}");
    }
    Ok(())
}

fn item_lines(items: &[DashboardItem]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<Uuid> = None;
    for item in items {
        if current != Some(item.solution_id) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("{} {}", item.solution_icon, item.solution_name));
            current = Some(item.solution_id);
        }
        let tag = match item.kind {
            ItemKind::UseCase => "use case",
            ItemKind::Prerequisite => "prereq",
        };
        lines.push(format!("  [{tag:<8}] {}", item.text));
        for p in &item.prerequisites {
            lines.push(format!("{:14}- {p}", ""));
        }
    }
    lines
}
