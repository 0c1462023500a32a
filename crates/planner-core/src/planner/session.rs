//! The interactive planning session.
//!
//! Holds the transient selection while a user moves through the steps.
//! Nothing here touches the store; [`PlannerSession::snapshot`] produces the
//! record to persist.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use planner_db::models::{CustomerInfo, NewPocPlan};

use crate::aggregate::AggregatedSolution;
use crate::document::{PlanSelection, PocDocument, build_document};
use crate::snapshot::format_plan_for_save;

/// Steps of the planner, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerStep {
    #[default]
    SelectSolutions,
    SelectUseCases,
    Review,
}

impl PlannerStep {
    /// 1-based position, for "step N of 3" displays.
    pub fn number(self) -> usize {
        match self {
            Self::SelectSolutions => 1,
            Self::SelectUseCases => 2,
            Self::Review => 3,
        }
    }
}

impl fmt::Display for PlannerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SelectSolutions => "select solutions",
            Self::SelectUseCases => "select use cases",
            Self::Review => "review",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("select at least one solution before continuing")]
    NoSolutionsSelected,

    #[error("solution {0} is not part of this plan")]
    SolutionNotSelected(Uuid),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerSession {
    step: PlannerStep,
    selection: PlanSelection,
}

impl PlannerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from an existing selection, at the first step.
    pub fn from_selection(selection: PlanSelection) -> Self {
        Self {
            step: PlannerStep::SelectSolutions,
            selection,
        }
    }

    pub fn step(&self) -> PlannerStep {
        self.step
    }

    pub fn selection(&self) -> &PlanSelection {
        &self.selection
    }

    pub fn into_selection(self) -> PlanSelection {
        self.selection
    }

    pub fn is_selected(&self, solution_id: Uuid) -> bool {
        self.selection.solutions.contains(&solution_id)
    }

    /// Replace the selected solutions.
    ///
    /// Use case picks and custom entries survive only for solutions that
    /// remain selected. Duplicate ids are collapsed, first position kept.
    pub fn select_solutions(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        let mut solutions: Vec<Uuid> = Vec::new();
        for id in ids {
            if !solutions.contains(&id) {
                solutions.push(id);
            }
        }

        self.selection
            .selected_use_cases
            .retain(|id, _| solutions.contains(id));
        self.selection
            .custom_use_cases
            .retain(|id, _| solutions.contains(id));
        self.selection.solutions = solutions;
    }

    /// Add or remove one solution, keeping the others in place.
    pub fn toggle_solution(&mut self, id: Uuid) {
        let mut ids = self.selection.solutions.clone();
        if let Some(pos) = ids.iter().position(|s| *s == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        self.select_solutions(ids);
    }

    /// Mark a use case as selected or not. Repeating a call is a no-op.
    pub fn set_use_case(
        &mut self,
        solution_id: Uuid,
        use_case_id: Uuid,
        selected: bool,
    ) -> Result<(), PlannerError> {
        self.require_selected(solution_id)?;

        let entry = self
            .selection
            .selected_use_cases
            .entry(solution_id)
            .or_default();
        let present = entry.contains(&use_case_id);
        if selected && !present {
            entry.push(use_case_id);
        } else if !selected && present {
            entry.retain(|id| *id != use_case_id);
        }

        if entry.is_empty() {
            self.selection.selected_use_cases.remove(&solution_id);
        }
        Ok(())
    }

    /// Set the free-text use case for a solution. Blank text clears it.
    pub fn set_custom_use_case(
        &mut self,
        solution_id: Uuid,
        text: &str,
    ) -> Result<(), PlannerError> {
        self.require_selected(solution_id)?;

        if text.trim().is_empty() {
            self.selection.custom_use_cases.remove(&solution_id);
        } else {
            self.selection
                .custom_use_cases
                .insert(solution_id, text.to_string());
        }
        Ok(())
    }

    pub fn set_customer(&mut self, customer: CustomerInfo) {
        self.selection.customer = customer;
    }

    /// Move to the next step. Leaving the first step requires at least one
    /// selected solution.
    pub fn advance(&mut self) -> Result<PlannerStep, PlannerError> {
        self.step = match self.step {
            PlannerStep::SelectSolutions => {
                if self.selection.solutions.is_empty() {
                    return Err(PlannerError::NoSolutionsSelected);
                }
                PlannerStep::SelectUseCases
            }
            PlannerStep::SelectUseCases | PlannerStep::Review => PlannerStep::Review,
        };
        Ok(self.step)
    }

    /// Move to the previous step, staying put on the first one.
    pub fn back(&mut self) -> PlannerStep {
        self.step = match self.step {
            PlannerStep::SelectSolutions | PlannerStep::SelectUseCases => {
                PlannerStep::SelectSolutions
            }
            PlannerStep::Review => PlannerStep::SelectUseCases,
        };
        self.step
    }

    pub fn document(&self, aggregate: &[AggregatedSolution]) -> PocDocument {
        build_document(aggregate, &self.selection)
    }

    pub fn snapshot(&self, aggregate: &[AggregatedSolution]) -> NewPocPlan {
        format_plan_for_save(aggregate, &self.selection)
    }

    fn require_selected(&self, solution_id: Uuid) -> Result<(), PlannerError> {
        if self.is_selected(solution_id) {
            Ok(())
        } else {
            Err(PlannerError::SolutionNotSelected(solution_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_leave_first_step_without_solutions() {
        let mut session = PlannerSession::new();
        assert_eq!(session.advance(), Err(PlannerError::NoSolutionsSelected));
        assert_eq!(session.step(), PlannerStep::SelectSolutions);

        session.select_solutions([Uuid::new_v4()]);
        assert_eq!(session.advance(), Ok(PlannerStep::SelectUseCases));
        assert_eq!(session.advance(), Ok(PlannerStep::Review));
        assert_eq!(session.advance(), Ok(PlannerStep::Review));
    }

    #[test]
    fn back_never_fails() {
        let mut session = PlannerSession::new();
        assert_eq!(session.back(), PlannerStep::SelectSolutions);

        session.select_solutions([Uuid::new_v4()]);
        session.advance().unwrap();
        session.advance().unwrap();
        assert_eq!(session.back(), PlannerStep::SelectUseCases);
        assert_eq!(session.back(), PlannerStep::SelectSolutions);
    }

    #[test]
    fn deselecting_prunes_picks() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut session = PlannerSession::new();
        session.select_solutions([a, b]);
        session.set_use_case(a, Uuid::new_v4(), true).unwrap();
        session.set_use_case(b, Uuid::new_v4(), true).unwrap();
        session.set_custom_use_case(b, "Vendor onboarding").unwrap();

        session.toggle_solution(b);
        let sel = session.selection();
        assert_eq!(sel.solutions, vec![a]);
        assert!(sel.selected_use_cases.contains_key(&a));
        assert!(!sel.selected_use_cases.contains_key(&b));
        assert!(sel.custom_use_cases.is_empty());
    }

    #[test]
    fn set_use_case_is_idempotent() {
        let s = Uuid::new_v4();
        let uc = Uuid::new_v4();
        let mut session = PlannerSession::new();
        session.select_solutions([s]);

        session.set_use_case(s, uc, true).unwrap();
        session.set_use_case(s, uc, true).unwrap();
        assert_eq!(session.selection().use_cases_for(s), &[uc]);

        session.set_use_case(s, uc, false).unwrap();
        session.set_use_case(s, uc, false).unwrap();
        assert!(session.selection().selected_use_cases.is_empty());
    }

    #[test]
    fn picks_require_selected_solution() {
        let mut session = PlannerSession::new();
        let s = Uuid::new_v4();
        assert_eq!(
            session.set_use_case(s, Uuid::new_v4(), true),
            Err(PlannerError::SolutionNotSelected(s))
        );
        assert!(session.set_custom_use_case(s, "x").is_err());
    }

    #[test]
    fn blank_custom_entry_clears() {
        let s = Uuid::new_v4();
        let mut session = PlannerSession::new();
        session.select_solutions([s]);
        session.set_custom_use_case(s, "Audit trail review").unwrap();
        session.set_custom_use_case(s, "  ").unwrap();
        assert!(session.selection().custom_use_cases.is_empty());
    }

    #[test]
    fn select_solutions_collapses_duplicates() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut session = PlannerSession::new();
        session.select_solutions([b, a, b]);
        assert_eq!(session.selection().solutions, vec![b, a]);
    }
}
