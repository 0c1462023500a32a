//! TUI application state and data model.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use uuid::Uuid;

use planner_core::aggregate::{AggregatedSolution, load_aggregate};
use planner_core::dashboard::{
    DashboardItem, DashboardTotals, SolutionSelection, ViewMode, apply_filter, dashboard_items,
    dashboard_totals,
};
use planner_core::document::{ExportKind, render_text};
use planner_core::snapshot::{load_saved_plan, unresolved_count};
use planner_core::store::Store;
use planner_db::models::{PocPlan, PocPlanStatus};

/// Which view the TUI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Plans,
    PlanDetail(Uuid),
    Help,
}

/// Which dashboard pane receives movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Solutions,
    Items,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Application state for the TUI.
pub struct App {
    pub store: Arc<dyn Store>,
    pub current_view: View,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub aggregate: Vec<AggregatedSolution>,
    pub selection: SolutionSelection,
    pub search: String,
    pub view_mode: ViewMode,
    pub items: Vec<DashboardItem>,
    pub totals: DashboardTotals,
    pub selected_solution: usize,
    pub selected_item: usize,
    pub plans: Vec<PocPlan>,
    pub selected_plan: usize,
    pub document_lines: Vec<String>,
    pub unresolved: usize,
    pub scroll: u16,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            current_view: View::Dashboard,
            input_mode: InputMode::Normal,
            focus: Focus::Solutions,
            aggregate: Vec::new(),
            selection: SolutionSelection::default(),
            search: String::new(),
            view_mode: ViewMode::default(),
            items: Vec::new(),
            totals: DashboardTotals::default(),
            selected_solution: 0,
            selected_item: 0,
            plans: Vec::new(),
            selected_plan: 0,
            document_lines: Vec::new(),
            unresolved: 0,
            scroll: 0,
            tick_rate: Duration::from_millis(250),
            should_quit: false,
            status_message: None,
        }
    }

    /// Reload whatever the current view shows from the store.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.current_view {
            View::Dashboard => {
                self.aggregate = load_aggregate(self.store.as_ref()).await?;
                // Solutions seen for the first time start checked.
                self.selection.refresh(&self.aggregate);
                self.selected_solution = clamp(self.selected_solution, self.aggregate.len());
                self.recompute();
            }
            View::Plans => {
                self.plans = self.store.list_poc_plans().await?;
                self.selected_plan = clamp(self.selected_plan, self.plans.len());
            }
            View::PlanDetail(plan_id) => {
                let (_, document) = load_saved_plan(self.store.as_ref(), plan_id).await?;
                self.unresolved = unresolved_count(&document);
                self.document_lines = render_text(&document, ExportKind::Full)
                    .lines()
                    .map(str::to_string)
                    .collect();
            }
            View::Help => {}
        }
        Ok(())
    }

    /// Re-derive the item list from the loaded aggregate. No store access.
    pub fn recompute(&mut self) {
        let filtered = apply_filter(&self.aggregate, &self.selection, &self.search);
        self.items = dashboard_items(&filtered, self.view_mode);
        self.totals = dashboard_totals(&self.items, &self.selection);
        self.selected_item = clamp(self.selected_item, self.items.len());
    }

    // -- Dashboard --

    pub fn toggle_selected_solution(&mut self) {
        if let Some(solution) = self.aggregate.get(self.selected_solution) {
            self.selection.toggle(solution.id());
            self.recompute();
        }
    }

    pub fn toggle_all(&mut self) {
        self.selection.toggle_all();
        self.recompute();
    }

    pub fn cycle_view_mode(&mut self) {
        self.view_mode = self.view_mode.next();
        self.recompute();
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.recompute();
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.recompute();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.recompute();
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Solutions => Focus::Items,
            Focus::Items => Focus::Solutions,
        };
    }

    // -- Navigation --

    pub fn navigate_back(&mut self) {
        match self.current_view {
            View::Dashboard => self.should_quit = true,
            View::PlanDetail(_) => self.current_view = View::Plans,
            View::Plans | View::Help => self.current_view = View::Dashboard,
        }
    }

    pub fn navigate_enter(&mut self) {
        match self.current_view {
            View::Dashboard => self.toggle_selected_solution(),
            View::Plans => {
                if let Some(id) = self.selected_plan_id() {
                    self.current_view = View::PlanDetail(id);
                    self.scroll = 0;
                }
            }
            View::PlanDetail(_) | View::Help => {}
        }
    }

    pub fn move_up(&mut self) {
        match (self.current_view, self.focus) {
            (View::Dashboard, Focus::Solutions) => {
                self.selected_solution = self.selected_solution.saturating_sub(1);
            }
            (View::Dashboard, Focus::Items) => {
                self.selected_item = self.selected_item.saturating_sub(1);
            }
            (View::Plans, _) => {
                self.selected_plan = self.selected_plan.saturating_sub(1);
            }
            (View::PlanDetail(_), _) => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            (View::Help, _) => {}
        }
    }

    pub fn move_down(&mut self) {
        match (self.current_view, self.focus) {
            (View::Dashboard, Focus::Solutions) => {
                self.selected_solution = step_down(self.selected_solution, self.aggregate.len());
            }
            (View::Dashboard, Focus::Items) => {
                self.selected_item = step_down(self.selected_item, self.items.len());
            }
            (View::Plans, _) => {
                self.selected_plan = step_down(self.selected_plan, self.plans.len());
            }
            (View::PlanDetail(_), _) => {
                if usize::from(self.scroll) + 1 < self.document_lines.len() {
                    self.scroll = self.scroll.saturating_add(1);
                }
            }
            (View::Help, _) => {}
        }
    }

    pub fn cycle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Dashboard => View::Plans,
            View::Plans => View::Dashboard,
            other => other,
        };
    }

    pub fn show_help(&mut self) {
        self.current_view = View::Help;
    }

    // -- Actions --

    /// Advance the status of the highlighted (or open) plan:
    /// draft, approved, completed, then back to draft.
    pub async fn cycle_plan_status(&mut self) -> Result<()> {
        let plan = match self.current_view {
            View::Plans => self.plans.get(self.selected_plan),
            View::PlanDetail(id) => self.plans.iter().find(|p| p.id == id),
            _ => None,
        };
        let Some(plan) = plan else {
            return Ok(());
        };

        let (id, status) = (plan.id, next_status(plan.status));
        self.store.update_poc_plan_status(id, status).await?;
        self.plans = self.store.list_poc_plans().await?;
        self.status_message = Some(format!("Plan marked {status}"));
        Ok(())
    }

    pub fn selected_plan_id(&self) -> Option<Uuid> {
        self.plans.get(self.selected_plan).map(|p| p.id)
    }
}

fn next_status(status: PocPlanStatus) -> PocPlanStatus {
    match status {
        PocPlanStatus::Draft => PocPlanStatus::Approved,
        PocPlanStatus::Approved => PocPlanStatus::Completed,
        PocPlanStatus::Completed => PocPlanStatus::Draft,
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

fn step_down(index: usize, len: usize) -> usize {
    if index + 1 < len { index + 1 } else { index }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
