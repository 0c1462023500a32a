use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a saved POC plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PocPlanStatus {
    #[default]
    Draft,
    Approved,
    Completed,
}

impl fmt::Display for PocPlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for PocPlanStatus {
    type Err = PocPlanStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "approved" => Ok(Self::Approved),
            "completed" => Ok(Self::Completed),
            other => Err(PocPlanStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PocPlanStatus`] string.
#[derive(Debug, Clone)]
pub struct PocPlanStatusParseError(pub String);

impl fmt::Display for PocPlanStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid plan status: {:?}", self.0)
    }
}

impl std::error::Error for PocPlanStatusParseError {}

// ---------------------------------------------------------------------------

/// What a prerequisite is attached to: a whole solution or a single use case.
///
/// Stored as two nullable columns (`solution_id`, `use_case_id`) guarded by a
/// CHECK constraint; exactly one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrerequisiteScope {
    Solution(Uuid),
    UseCase(Uuid),
}

impl PrerequisiteScope {
    /// Build a scope from the two nullable reference columns.
    pub fn from_columns(
        solution_id: Option<Uuid>,
        use_case_id: Option<Uuid>,
    ) -> Result<Self, PrerequisiteScopeError> {
        match (solution_id, use_case_id) {
            (Some(id), None) => Ok(Self::Solution(id)),
            (None, Some(id)) => Ok(Self::UseCase(id)),
            (None, None) => Err(PrerequisiteScopeError::Unattached),
            (Some(solution_id), Some(use_case_id)) => Err(PrerequisiteScopeError::Ambiguous {
                solution_id,
                use_case_id,
            }),
        }
    }

    pub fn solution_id(&self) -> Option<Uuid> {
        match self {
            Self::Solution(id) => Some(*id),
            Self::UseCase(_) => None,
        }
    }

    pub fn use_case_id(&self) -> Option<Uuid> {
        match self {
            Self::Solution(_) => None,
            Self::UseCase(id) => Some(*id),
        }
    }
}

impl fmt::Display for PrerequisiteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solution(id) => write!(f, "solution:{id}"),
            Self::UseCase(id) => write!(f, "use_case:{id}"),
        }
    }
}

/// A prerequisite row that references neither or both owners.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrerequisiteScopeError {
    #[error("prerequisite is attached to neither a solution nor a use case")]
    Unattached,

    #[error(
        "prerequisite is attached to both solution {solution_id} and use case {use_case_id}"
    )]
    Ambiguous { solution_id: Uuid, use_case_id: Uuid },
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A product solution offered in a POC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Solution {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A use case belonging to one solution. Selected use cases become the
/// success criteria of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UseCase {
    pub id: Uuid,
    pub solution_id: Uuid,
    pub text: String,
    /// Use-case specific prerequisites, embedded in the record.
    pub prerequisites: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `solution_prerequisites` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct PrerequisiteRow {
    pub id: Uuid,
    pub text: String,
    pub solution_id: Option<Uuid>,
    pub use_case_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A technical prerequisite attached to a solution or to one of its use cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionPrerequisite {
    pub id: Uuid,
    pub text: String,
    pub scope: PrerequisiteScope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PrerequisiteRow> for SolutionPrerequisite {
    type Error = PrerequisiteScopeError;

    fn try_from(row: PrerequisiteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            text: row.text,
            scope: PrerequisiteScope::from_columns(row.solution_id, row.use_case_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Customer-facing metadata captured while planning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub se_name: String,
    pub poc_start_date: Option<NaiveDate>,
    pub poc_end_date: Option<NaiveDate>,
}

/// Reference to a solution as stored in a saved plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRef {
    pub id: Uuid,
    pub name: String,
}

/// A saved planning session.
///
/// Holds references only: use case text is not copied, so rendering a saved
/// plan re-resolves ids against the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PocPlan {
    pub id: Uuid,
    pub customer_info: CustomerInfo,
    pub solutions: Vec<SolutionRef>,
    pub selected_use_cases: BTreeMap<Uuid, Vec<Uuid>>,
    pub custom_use_cases: BTreeMap<Uuid, String>,
    pub status: PocPlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `poc_plans` row with JSON columns.
#[derive(Debug, Clone, FromRow)]
pub struct PocPlanRow {
    pub id: Uuid,
    pub customer_info: sqlx::types::Json<CustomerInfo>,
    pub solutions: sqlx::types::Json<Vec<SolutionRef>>,
    pub selected_use_cases: sqlx::types::Json<BTreeMap<Uuid, Vec<Uuid>>>,
    pub custom_use_cases: sqlx::types::Json<BTreeMap<Uuid, String>>,
    pub status: PocPlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PocPlanRow> for PocPlan {
    fn from(row: PocPlanRow) -> Self {
        Self {
            id: row.id,
            customer_info: row.customer_info.0,
            solutions: row.solutions.0,
            selected_use_cases: row.selected_use_cases.0,
            custom_use_cases: row.custom_use_cases.0,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row from the legacy `prerequisites` table that predates
/// `solution_prerequisites`.
#[derive(Debug, Clone, FromRow)]
pub struct LegacyPrerequisiteRow {
    pub id: Uuid,
    pub text: String,
    pub solution_id: Option<Uuid>,
    pub use_case_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Insert / update payloads
// ---------------------------------------------------------------------------

/// Fields of a solution supplied by the user. Used for insert and full
/// overwrite on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSolution {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUseCase {
    pub solution_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrerequisite {
    pub text: String,
    pub scope: PrerequisiteScope,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPocPlan {
    pub customer_info: CustomerInfo,
    pub solutions: Vec<SolutionRef>,
    pub selected_use_cases: BTreeMap<Uuid, Vec<Uuid>>,
    pub custom_use_cases: BTreeMap<Uuid, String>,
    #[serde(default)]
    pub status: PocPlanStatus,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poc_plan_status_display_roundtrip() {
        let variants = [
            PocPlanStatus::Draft,
            PocPlanStatus::Approved,
            PocPlanStatus::Completed,
        ];
        for v in &variants {
            let s = v.to_string();
            let parsed: PocPlanStatus = s.parse().expect("should parse");
            assert_eq!(*v, parsed);
        }
    }

    #[test]
    fn poc_plan_status_invalid() {
        let result = "shipped".parse::<PocPlanStatus>();
        assert!(result.is_err());
    }

    #[test]
    fn poc_plan_status_defaults_to_draft() {
        assert_eq!(PocPlanStatus::default(), PocPlanStatus::Draft);
    }

    #[test]
    fn scope_from_exactly_one_column() {
        let id = Uuid::new_v4();
        assert_eq!(
            PrerequisiteScope::from_columns(Some(id), None),
            Ok(PrerequisiteScope::Solution(id))
        );
        assert_eq!(
            PrerequisiteScope::from_columns(None, Some(id)),
            Ok(PrerequisiteScope::UseCase(id))
        );
    }

    #[test]
    fn scope_rejects_neither_or_both() {
        assert_eq!(
            PrerequisiteScope::from_columns(None, None),
            Err(PrerequisiteScopeError::Unattached)
        );
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(matches!(
            PrerequisiteScope::from_columns(Some(a), Some(b)),
            Err(PrerequisiteScopeError::Ambiguous { .. })
        ));
    }

    #[test]
    fn scope_accessors() {
        let id = Uuid::new_v4();
        let s = PrerequisiteScope::Solution(id);
        assert_eq!(s.solution_id(), Some(id));
        assert_eq!(s.use_case_id(), None);
        let u = PrerequisiteScope::UseCase(id);
        assert_eq!(u.solution_id(), None);
        assert_eq!(u.use_case_id(), Some(id));
    }

    #[test]
    fn scope_serializes_as_tagged_variant() {
        let id = Uuid::nil();
        let json = serde_json::to_value(PrerequisiteScope::UseCase(id)).unwrap();
        assert_eq!(json, serde_json::json!({ "use_case": id.to_string() }));
    }

    #[test]
    fn customer_info_accepts_partial_json() {
        let info: CustomerInfo =
            serde_json::from_str(r#"{"company_name":"Acme","poc_start_date":"2025-03-01"}"#)
                .unwrap();
        assert_eq!(info.company_name, "Acme");
        assert_eq!(info.poc_start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(info.contact_email.is_empty());
    }

    #[test]
    fn selection_maps_roundtrip_through_json() {
        let solution = Uuid::new_v4();
        let use_case = Uuid::new_v4();
        let mut selected = BTreeMap::new();
        selected.insert(solution, vec![use_case]);
        let json = serde_json::to_string(&selected).unwrap();
        let back: BTreeMap<Uuid, Vec<Uuid>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selected);
    }
}
