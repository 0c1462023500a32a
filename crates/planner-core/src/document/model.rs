use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use planner_db::models::CustomerInfo;

use crate::aggregate::{self, AggregatedSolution};

/// Shown in place of an empty success-criteria checklist.
pub const NO_CRITERIA_PLACEHOLDER: &str = "No success criteria defined";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything the user picked while planning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSelection {
    /// Selected solutions, in the order they were selected.
    pub solutions: Vec<Uuid>,
    pub selected_use_cases: BTreeMap<Uuid, Vec<Uuid>>,
    /// At most one free-text use case per solution.
    pub custom_use_cases: BTreeMap<Uuid, String>,
    pub customer: CustomerInfo,
}

impl PlanSelection {
    pub fn use_cases_for(&self, solution_id: Uuid) -> &[Uuid] {
        self.selected_use_cases
            .get(&solution_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The custom entry for a solution, if it has any non-blank text.
    pub fn custom_for(&self, solution_id: Uuid) -> Option<&str> {
        self.custom_use_cases
            .get(&solution_id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Output model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionStatus {
    #[default]
    Pending,
}

impl fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
        }
    }
}

/// One milestone of the success plan. Owner and target date are left blank
/// for the customer to fill in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRow {
    pub milestone: String,
    /// Embedded prerequisites of the use case behind this row.
    pub prerequisites: Vec<String>,
    pub owner: String,
    pub target_date: String,
    pub status: CriterionStatus,
    /// Whether the row came from the free-text custom entry.
    pub custom: bool,
}

impl CriterionRow {
    pub(crate) fn new(milestone: impl Into<String>, prerequisites: Vec<String>, custom: bool) -> Self {
        Self {
            milestone: milestone.into(),
            prerequisites,
            owner: String::new(),
            target_date: String::new(),
            status: CriterionStatus::Pending,
            custom,
        }
    }
}

/// The success-criteria part of a section: rows, or the placeholder when
/// nothing was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Checklist {
    Criteria(Vec<CriterionRow>),
    Placeholder(String),
}

impl Checklist {
    pub(crate) fn from_rows(rows: Vec<CriterionRow>) -> Self {
        if rows.is_empty() {
            Self::Placeholder(NO_CRITERIA_PLACEHOLDER.to_string())
        } else {
            Self::Criteria(rows)
        }
    }

    pub fn rows(&self) -> &[CriterionRow] {
        match self {
            Self::Criteria(rows) => rows,
            Self::Placeholder(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSection {
    pub solution_id: Uuid,
    pub name: String,
    pub icon: String,
    /// Technical prerequisites, de-duplicated, first occurrence kept.
    pub prerequisites: Vec<String>,
    pub checklist: Checklist,
    /// Set when the solution no longer exists in the catalog.
    #[serde(default)]
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocDocument {
    pub customer: CustomerInfo,
    pub sections: Vec<SolutionSection>,
}

// ---------------------------------------------------------------------------
// Export kinds
// ---------------------------------------------------------------------------

/// Which parts of the document to export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Prerequisites,
    SuccessPlan,
    #[default]
    Full,
}

impl ExportKind {
    pub fn includes_prerequisites(self) -> bool {
        matches!(self, Self::Prerequisites | Self::Full)
    }

    pub fn includes_success_plan(self) -> bool {
        matches!(self, Self::SuccessPlan | Self::Full)
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Prerequisites => "prerequisites",
            Self::SuccessPlan => "success-plan",
            Self::Full => "full",
        };
        f.write_str(s)
    }
}

impl FromStr for ExportKind {
    type Err = ExportKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prerequisites" | "prereqs" => Ok(Self::Prerequisites),
            "success-plan" | "success" => Ok(Self::SuccessPlan),
            "full" => Ok(Self::Full),
            other => Err(ExportKindParseError(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid export kind: {0:?} (expected prerequisites, success-plan, or full)")]
pub struct ExportKindParseError(pub String);

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// How a selected use case id that cannot be resolved is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MissingUseCase {
    Omit,
    Placeholder(&'static str),
}

fn dedup_first(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|p| seen.insert(p.as_str()))
        .cloned()
        .collect()
}

/// Build one section.
///
/// Known selected use cases come first in catalog order; unresolvable ids
/// follow as placeholder rows (or are dropped) and the custom entry is last.
pub(crate) fn build_section(
    solution: &AggregatedSolution,
    selected: &[Uuid],
    custom: Option<&str>,
    missing_use_case: MissingUseCase,
) -> SolutionSection {
    let mut rows: Vec<CriterionRow> = solution
        .use_cases
        .iter()
        .filter(|uc| selected.contains(&uc.id))
        .map(|uc| CriterionRow::new(uc.text.clone(), uc.prerequisites.clone(), false))
        .collect();

    if let MissingUseCase::Placeholder(text) = missing_use_case {
        let unresolved = selected.iter().filter(|id| solution.use_case(**id).is_none());
        rows.extend(unresolved.map(|_| CriterionRow::new(text, Vec::new(), false)));
    }

    if let Some(custom) = custom {
        rows.push(CriterionRow::new(custom, Vec::new(), true));
    }

    SolutionSection {
        solution_id: solution.id(),
        name: solution.solution.name.clone(),
        icon: solution.solution.icon.clone(),
        prerequisites: dedup_first(&solution.prerequisites),
        checklist: Checklist::from_rows(rows),
        missing: false,
    }
}

/// Build the document for a live selection.
///
/// Solutions missing from `aggregate`, and selected use cases that do not
/// belong to their solution, are left out.
pub fn build_document(aggregate: &[AggregatedSolution], selection: &PlanSelection) -> PocDocument {
    let sections = selection
        .solutions
        .iter()
        .filter_map(|id| aggregate::find(aggregate, *id))
        .map(|s| {
            build_section(
                s,
                selection.use_cases_for(s.id()),
                selection.custom_for(s.id()),
                MissingUseCase::Omit,
            )
        })
        .collect();

    PocDocument {
        customer: selection.customer.clone(),
        sections,
    }
}
