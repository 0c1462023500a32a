//! Dashboard filtering: solution checklist, free-text search, and the
//! flattened item list shown to the user.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::AggregatedSolution;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which solutions are checked on the dashboard.
///
/// Tracks the full set of known solutions so that [`toggle_all`] can decide
/// between "check everything" and "clear".
///
/// [`toggle_all`]: SolutionSelection::toggle_all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionSelection {
    known: Vec<Uuid>,
    checked: BTreeSet<Uuid>,
}

impl SolutionSelection {
    /// Every solution in `aggregate` checked.
    pub fn all(aggregate: &[AggregatedSolution]) -> Self {
        let known: Vec<Uuid> = aggregate.iter().map(AggregatedSolution::id).collect();
        let checked = known.iter().copied().collect();
        Self { known, checked }
    }

    /// Only `ids` checked. Ids not present in `aggregate` are ignored.
    pub fn only(aggregate: &[AggregatedSolution], ids: impl IntoIterator<Item = Uuid>) -> Self {
        let known: Vec<Uuid> = aggregate.iter().map(AggregatedSolution::id).collect();
        let checked = ids.into_iter().filter(|id| known.contains(id)).collect();
        Self { known, checked }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.checked.contains(&id)
    }

    pub fn toggle(&mut self, id: Uuid) {
        if !self.checked.remove(&id) {
            self.checked.insert(id);
        }
    }

    /// Clear when everything is checked, otherwise check everything.
    pub fn toggle_all(&mut self) {
        if self.all_checked() {
            self.checked.clear();
        } else {
            self.checked = self.known.iter().copied().collect();
        }
    }

    pub fn all_checked(&self) -> bool {
        self.known.iter().all(|id| self.checked.contains(id))
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    /// Follow a refreshed aggregate: solutions that disappeared are
    /// forgotten and newly seen ones start checked.
    pub fn refresh(&mut self, aggregate: &[AggregatedSolution]) {
        let known: Vec<Uuid> = aggregate.iter().map(AggregatedSolution::id).collect();
        for id in &known {
            if !self.known.contains(id) {
                self.checked.insert(*id);
            }
        }
        self.checked.retain(|id| known.contains(id));
        self.known = known;
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Keep checked solutions and narrow them by `search`.
///
/// A solution whose name matches keeps all of its children. Otherwise use
/// cases (matched on text or embedded prerequisites) and prerequisites are
/// filtered independently, and the solution is dropped if nothing survives.
/// A blank search matches everything. A non-blank search is matched as
/// typed, surrounding whitespace included.
pub fn apply_filter(
    aggregate: &[AggregatedSolution],
    selection: &SolutionSelection,
    search: &str,
) -> Vec<AggregatedSolution> {
    let needle = if search.trim().is_empty() {
        String::new()
    } else {
        search.to_lowercase()
    };

    aggregate
        .iter()
        .filter(|s| selection.contains(s.id()))
        .filter_map(|s| search_solution(s, &needle))
        .collect()
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn search_solution(solution: &AggregatedSolution, needle: &str) -> Option<AggregatedSolution> {
    if needle.is_empty() || matches(solution.name(), needle) {
        return Some(solution.clone());
    }

    let use_cases: Vec<_> = solution
        .use_cases
        .iter()
        .filter(|uc| matches(&uc.text, needle) || uc.prerequisites.iter().any(|p| matches(p, needle)))
        .cloned()
        .collect();
    let prerequisites: Vec<String> = solution
        .prerequisites
        .iter()
        .filter(|p| matches(p, needle))
        .cloned()
        .collect();

    if use_cases.is_empty() && prerequisites.is_empty() {
        return None;
    }

    Some(AggregatedSolution {
        solution: solution.solution.clone(),
        use_cases,
        prerequisites,
    })
}

// ---------------------------------------------------------------------------
// Flattened items
// ---------------------------------------------------------------------------

/// Which item kinds the dashboard lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    All,
    UseCases,
    Prerequisites,
}

impl ViewMode {
    /// Next mode in the All -> UseCases -> Prerequisites cycle.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::UseCases,
            Self::UseCases => Self::Prerequisites,
            Self::Prerequisites => Self::All,
        }
    }

    fn shows_use_cases(self) -> bool {
        matches!(self, Self::All | Self::UseCases)
    }

    fn shows_prerequisites(self) -> bool {
        matches!(self, Self::All | Self::Prerequisites)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::UseCases => "use_cases",
            Self::Prerequisites => "prerequisites",
        };
        f.write_str(s)
    }
}

impl FromStr for ViewMode {
    type Err = ViewModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "use_cases" | "usecases" => Ok(Self::UseCases),
            "prerequisites" | "prereqs" => Ok(Self::Prerequisites),
            other => Err(ViewModeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ViewMode`] string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid view mode: {0:?} (expected all, use_cases, or prerequisites)")]
pub struct ViewModeParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    UseCase,
    Prerequisite,
}

/// One row of the dashboard item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardItem {
    pub kind: ItemKind,
    /// Use case id, or `<solution id>-prereq-<index>` for prerequisites.
    pub id: String,
    pub solution_id: Uuid,
    pub solution_name: String,
    pub solution_icon: String,
    pub text: String,
    /// Embedded prerequisites of a use case; empty for prerequisite rows.
    pub prerequisites: Vec<String>,
}

/// Flatten filtered solutions into dashboard rows: per solution, its use
/// cases first, then its prerequisites.
pub fn dashboard_items(filtered: &[AggregatedSolution], mode: ViewMode) -> Vec<DashboardItem> {
    let mut items = Vec::new();

    for s in filtered {
        if mode.shows_use_cases() {
            items.extend(s.use_cases.iter().map(|uc| DashboardItem {
                kind: ItemKind::UseCase,
                id: uc.id.to_string(),
                solution_id: s.id(),
                solution_name: s.solution.name.clone(),
                solution_icon: s.solution.icon.clone(),
                text: uc.text.clone(),
                prerequisites: uc.prerequisites.clone(),
            }));
        }
        if mode.shows_prerequisites() {
            items.extend(s.prerequisites.iter().enumerate().map(|(i, p)| DashboardItem {
                kind: ItemKind::Prerequisite,
                id: format!("{}-prereq-{i}", s.id()),
                solution_id: s.id(),
                solution_name: s.solution.name.clone(),
                solution_icon: s.solution.icon.clone(),
                text: p.clone(),
                prerequisites: Vec::new(),
            }));
        }
    }

    items
}

/// Counters shown above the item list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardTotals {
    pub total: usize,
    pub use_cases: usize,
    pub prerequisites: usize,
    /// Checked solutions, regardless of whether any item survived search.
    pub solutions: usize,
}

pub fn dashboard_totals(items: &[DashboardItem], selection: &SolutionSelection) -> DashboardTotals {
    let use_cases = items.iter().filter(|i| i.kind == ItemKind::UseCase).count();
    DashboardTotals {
        total: items.len(),
        use_cases,
        prerequisites: items.len() - use_cases,
        solutions: selection.checked_count(),
    }
}
