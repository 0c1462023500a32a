//! One-off copy of the legacy `prerequisites` table into
//! `solution_prerequisites`. Safe to re-run: rows already copied are counted,
//! not duplicated.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use planner_db::models::{NewPrerequisite, PrerequisiteScope};

use crate::store::{Store, StoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub copied: usize,
    /// Rows already present in the target collection with the same text and owner.
    pub already_present: usize,
    /// Rows with no usable owner or no text.
    pub skipped: usize,
}

/// Copy rows from the legacy `prerequisites` collection into
/// `solutionPrerequisites`, keeping their original creation time.
///
/// Legacy rows are never deleted. Rows whose text and owner already exist in
/// the target are not copied again, so repeated runs are harmless.
pub async fn migrate_legacy_prerequisites(store: &dyn Store) -> StoreResult<MigrationReport> {
    let legacy = store.list_legacy_prerequisites().await?;
    if legacy.is_empty() {
        info!("no legacy prerequisites to migrate");
        return Ok(MigrationReport::default());
    }

    let mut present: HashSet<(String, PrerequisiteScope)> = store
        .list_prerequisites()
        .await?
        .into_iter()
        .map(|p| (p.text, p.scope))
        .collect();

    let mut report = MigrationReport::default();
    for row in legacy {
        let scope = match PrerequisiteScope::from_columns(row.solution_id, row.use_case_id) {
            Ok(scope) => scope,
            Err(e) => {
                warn!(legacy_id = %row.id, error = %e, "skipping legacy prerequisite");
                report.skipped += 1;
                continue;
            }
        };
        let text = row.text.trim();
        if text.is_empty() {
            warn!(legacy_id = %row.id, "skipping legacy prerequisite with empty text");
            report.skipped += 1;
            continue;
        }
        if !present.insert((text.to_string(), scope)) {
            report.already_present += 1;
            continue;
        }

        store
            .insert_prerequisite(
                &NewPrerequisite {
                    text: text.to_string(),
                    scope,
                },
                row.created_at,
            )
            .await?;
        report.copied += 1;
    }

    info!(
        copied = report.copied,
        already_present = report.already_present,
        skipped = report.skipped,
        "legacy prerequisites migrated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use planner_db::models::LegacyPrerequisiteRow;
    use uuid::Uuid;

    use crate::store::MemoryStore;

    fn row(text: &str, solution_id: Option<Uuid>, use_case_id: Option<Uuid>) -> LegacyPrerequisiteRow {
        LegacyPrerequisiteRow {
            id: Uuid::new_v4(),
            text: text.to_string(),
            solution_id,
            use_case_id,
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn copies_rows_and_keeps_created_at() {
        let s = Uuid::new_v4();
        let uc = Uuid::new_v4();
        let store = MemoryStore::with_legacy_prerequisites(vec![
            row("SSL certificate", Some(s), None),
            row("Recording storage", None, Some(uc)),
        ]);

        let report = migrate_legacy_prerequisites(&store).await.unwrap();
        assert_eq!(report.copied, 2);

        let copied = store.list_prerequisites().await.unwrap();
        assert_eq!(copied.len(), 2);
        let ssl = copied.iter().find(|p| p.text == "SSL certificate").unwrap();
        assert_eq!(ssl.scope, PrerequisiteScope::Solution(s));
        assert_eq!(
            ssl.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
        );
        // Source rows stay where they were.
        assert_eq!(store.list_legacy_prerequisites().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn second_run_copies_nothing() {
        let s = Uuid::new_v4();
        let store = MemoryStore::with_legacy_prerequisites(vec![row("DNS entry", Some(s), None)]);
        migrate_legacy_prerequisites(&store).await.unwrap();
        let again = migrate_legacy_prerequisites(&store).await.unwrap();
        assert_eq!(
            again,
            MigrationReport {
                copied: 0,
                already_present: 1,
                skipped: 0,
            }
        );
        assert_eq!(store.list_prerequisites().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unattributable_rows_are_skipped() {
        let store = MemoryStore::with_legacy_prerequisites(vec![
            row("orphan", None, None),
            row("both", Some(Uuid::new_v4()), Some(Uuid::new_v4())),
            row("  ", Some(Uuid::new_v4()), None),
        ]);
        let report = migrate_legacy_prerequisites(&store).await.unwrap();
        assert_eq!(report.skipped, 3);
        assert_eq!(report.copied, 0);
        assert!(store.list_prerequisites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_legacy_collection_is_a_no_op() {
        let store = MemoryStore::new();
        assert_eq!(
            migrate_legacy_prerequisites(&store).await.unwrap(),
            MigrationReport::default()
        );
    }
}
