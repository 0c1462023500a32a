//! Document generator: turns a plan selection into a printable technical
//! prerequisites document and a mutual POC success plan.
//!
//! [`build_document`] produces a [`PocDocument`] model; [`render_text`] and
//! [`render_html`] format it.

mod html;
mod model;
mod text;

pub use html::{escape as escape_html, render_html};
pub(crate) use model::{MissingUseCase, build_section};
pub use model::{
    Checklist, CriterionRow, CriterionStatus, ExportKind, ExportKindParseError,
    NO_CRITERIA_PLACEHOLDER, PlanSelection, PocDocument, SolutionSection, build_document,
};
pub use text::render_text;
