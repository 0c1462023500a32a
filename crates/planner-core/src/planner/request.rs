//! Plan request files: a TOML description of a plan for non-interactive use.
//!
//! ```toml
//! [plan]
//! # id = "..."  written back after the plan is saved
//!
//! [customer]
//! company_name = "Acme Corporation"
//! contact_name = "Jordan Lee"
//! contact_email = "jordan@acme.test"
//! se_name = "Sam"
//! poc_start_date = "2025-04-01"
//! poc_end_date = "2025-04-30"
//!
//! [[solutions]]
//! name = "Password Safe"
//! use_cases = ["SSH key management", "Session recording"]
//! custom = "Rotate the break-glass account weekly"
//! ```
//!
//! Solutions are referenced by `name` (case-insensitive) or `id`; use cases
//! by text (case-insensitive) or id.

use std::collections::HashSet;
use std::fmt::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use planner_db::models::CustomerInfo;

use super::session::PlannerSession;
use crate::aggregate::AggregatedSolution;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub plan: PlanMeta,
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default)]
    pub solutions: Vec<SolutionRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMeta {
    /// Id of the saved plan, once there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl SolutionRequest {
    /// Human-readable reference used in messages.
    pub fn label(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => format!("{name:?}"),
            (None, Some(id)) => id.to_string(),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanRequestError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("plan request must list at least one solution")]
    NoSolutions,

    #[error("solution entry #{index} has neither a name nor an id")]
    UnnamedSolution { index: usize },

    #[error("solution entry #{index} has both a name and an id")]
    AmbiguousSolution { index: usize },

    #[error("solution {0} is listed more than once")]
    DuplicateSolution(String),
}

/// Parse and validate a plan request.
pub fn parse_plan_request(content: &str) -> Result<PlanRequest, PlanRequestError> {
    let request: PlanRequest = toml::from_str(content)?;
    validate(&request)?;
    Ok(request)
}

fn validate(request: &PlanRequest) -> Result<(), PlanRequestError> {
    if request.solutions.is_empty() {
        return Err(PlanRequestError::NoSolutions);
    }

    let mut seen = HashSet::new();
    for (i, entry) in request.solutions.iter().enumerate() {
        let index = i + 1;
        let key = match (&entry.name, entry.id) {
            (Some(_), Some(_)) => return Err(PlanRequestError::AmbiguousSolution { index }),
            (Some(name), None) if !name.trim().is_empty() => name.trim().to_lowercase(),
            (None, Some(id)) => id.to_string(),
            _ => return Err(PlanRequestError::UnnamedSolution { index }),
        };
        if !seen.insert(key) {
            return Err(PlanRequestError::DuplicateSolution(entry.label()));
        }
    }

    Ok(())
}

/// A session built from a request, with anything that could not be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub session: PlannerSession,
    pub warnings: Vec<String>,
}

fn find_solution<'a>(
    aggregate: &'a [AggregatedSolution],
    entry: &SolutionRequest,
) -> Option<&'a AggregatedSolution> {
    match (&entry.name, entry.id) {
        (_, Some(id)) => aggregate.iter().find(|s| s.id() == id),
        (Some(name), None) => {
            let wanted = name.trim().to_lowercase();
            aggregate.iter().find(|s| s.name().to_lowercase() == wanted)
        }
        (None, None) => None,
    }
}

fn find_use_case(solution: &AggregatedSolution, reference: &str) -> Option<Uuid> {
    let reference = reference.trim();
    if let Ok(id) = reference.parse::<Uuid>() {
        return solution.use_case(id).map(|uc| uc.id);
    }
    let wanted = reference.to_lowercase();
    solution
        .use_cases
        .iter()
        .find(|uc| uc.text.trim().to_lowercase() == wanted)
        .map(|uc| uc.id)
}

/// Resolve a request against the live catalog.
///
/// Unknown solutions and use cases are skipped and reported as warnings;
/// they never fail the build.
pub fn build_session(request: &PlanRequest, aggregate: &[AggregatedSolution]) -> ResolvedRequest {
    let mut warnings = Vec::new();
    let mut resolved = Vec::new();

    for entry in &request.solutions {
        match find_solution(aggregate, entry) {
            Some(solution) => resolved.push((entry, solution)),
            None => warnings.push(format!("solution {} not found in catalog", entry.label())),
        }
    }

    let mut session = PlannerSession::new();
    session.set_customer(request.customer.clone());
    session.select_solutions(resolved.iter().map(|(_, s)| s.id()));

    for (entry, solution) in resolved {
        for reference in &entry.use_cases {
            match find_use_case(solution, reference) {
                Some(uc) => {
                    // The solution was selected just above.
                    let _ = session.set_use_case(solution.id(), uc, true);
                }
                None => warnings.push(format!(
                    "use case {reference:?} not found in solution {:?}",
                    solution.name()
                )),
            }
        }
        if let Some(custom) = &entry.custom {
            let _ = session.set_custom_use_case(solution.id(), custom);
        }
    }

    ResolvedRequest { session, warnings }
}

/// A starter request listing every solution in the catalog, with its use
/// cases as comments.
pub fn request_template(aggregate: &[AggregatedSolution]) -> String {
    let mut out = String::new();
    out.push_str("[plan]\n\n[customer]\ncompany_name = \"\"\ncontact_name = \"\"\n");
    out.push_str("contact_email = \"\"\nse_name = \"\"\n");
    out.push_str("# poc_start_date = \"YYYY-MM-DD\"\n# poc_end_date = \"YYYY-MM-DD\"\n");

    for solution in aggregate {
        let _ = writeln!(out, "\n[[solutions]]");
        let _ = writeln!(out, "name = {}", toml_string(solution.name()));
        out.push_str("use_cases = [\n");
        for uc in &solution.use_cases {
            let _ = writeln!(out, "  # {},", toml_string(&uc.text));
        }
        out.push_str("]\n# custom = \"\"\n");
    }

    out
}

fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_request() {
        let req = parse_plan_request(
            r#"
            [[solutions]]
            name = "Password Safe"
            "#,
        )
        .unwrap();
        assert_eq!(req.solutions.len(), 1);
        assert!(req.plan.id.is_none());
        assert!(req.customer.company_name.is_empty());
    }

    #[test]
    fn parse_full_request() {
        let req = parse_plan_request(
            r#"
            [plan]
            id = "6f0c6a0e-8f4e-4b8e-9a53-2f7d0c2b6e11"

            [customer]
            company_name = "Acme"
            poc_start_date = "2025-04-01"

            [[solutions]]
            name = "Remote Support"
            use_cases = ["Vendor access"]
            custom = "Chat escalation"
            "#,
        )
        .unwrap();
        assert!(req.plan.id.is_some());
        assert_eq!(
            req.customer.poc_start_date,
            chrono::NaiveDate::from_ymd_opt(2025, 4, 1)
        );
        assert_eq!(req.solutions[0].use_cases, vec!["Vendor access"]);
        assert_eq!(req.solutions[0].custom.as_deref(), Some("Chat escalation"));
    }

    #[test]
    fn rejects_empty_request() {
        assert!(matches!(
            parse_plan_request("[customer]\ncompany_name = \"Acme\"\n"),
            Err(PlanRequestError::NoSolutions)
        ));
    }

    #[test]
    fn rejects_unnamed_and_ambiguous_entries() {
        assert!(matches!(
            parse_plan_request("[[solutions]]\nuse_cases = []\n"),
            Err(PlanRequestError::UnnamedSolution { index: 1 })
        ));
        assert!(matches!(
            parse_plan_request(
                "[[solutions]]\nname = \"A\"\nid = \"6f0c6a0e-8f4e-4b8e-9a53-2f7d0c2b6e11\"\n"
            ),
            Err(PlanRequestError::AmbiguousSolution { index: 1 })
        ));
    }

    #[test]
    fn rejects_duplicates_case_insensitively() {
        let err = parse_plan_request(
            "[[solutions]]\nname = \"Password Safe\"\n\n[[solutions]]\nname = \"password safe\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, PlanRequestError::DuplicateSolution(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            parse_plan_request("[[solutions]\n"),
            Err(PlanRequestError::TomlError(_))
        ));
    }
}
