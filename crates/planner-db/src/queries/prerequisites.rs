//! Database query functions for the `solution_prerequisites` table and the
//! legacy `prerequisites` table it replaced.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::error::{Entity, NotFound};
use crate::models::{LegacyPrerequisiteRow, NewPrerequisite, PrerequisiteRow, SolutionPrerequisite};

fn into_model(row: PrerequisiteRow) -> Result<SolutionPrerequisite> {
    let id = row.id;
    SolutionPrerequisite::try_from(row).with_context(|| format!("invalid prerequisite row {id}"))
}

/// Insert a prerequisite.
///
/// `created_at` preserves an original timestamp when copying rows; `None`
/// lets the database assign one.
pub async fn insert_prerequisite(
    pool: &PgPool,
    new: &NewPrerequisite,
    created_at: Option<DateTime<Utc>>,
) -> Result<SolutionPrerequisite> {
    let row = sqlx::query_as::<_, PrerequisiteRow>(
        "INSERT INTO solution_prerequisites (text, solution_id, use_case_id, created_at) \
         VALUES ($1, $2, $3, COALESCE($4, now())) \
         RETURNING *",
    )
    .bind(&new.text)
    .bind(new.scope.solution_id())
    .bind(new.scope.use_case_id())
    .bind(created_at)
    .fetch_one(pool)
    .await
    .context("failed to insert prerequisite")?;

    into_model(row)
}

/// Fetch a prerequisite by ID.
pub async fn get_prerequisite(pool: &PgPool, id: Uuid) -> Result<Option<SolutionPrerequisite>> {
    let row = sqlx::query_as::<_, PrerequisiteRow>(
        "SELECT * FROM solution_prerequisites WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch prerequisite")?;

    row.map(into_model).transpose()
}

/// List all prerequisites, newest first.
pub async fn list_prerequisites(pool: &PgPool) -> Result<Vec<SolutionPrerequisite>> {
    let rows = sqlx::query_as::<_, PrerequisiteRow>(
        "SELECT * FROM solution_prerequisites ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
    .context("failed to list prerequisites")?;

    rows.into_iter().map(into_model).collect()
}

/// Overwrite a prerequisite's text and owner and refresh `updated_at`.
pub async fn update_prerequisite(
    pool: &PgPool,
    id: Uuid,
    fields: &NewPrerequisite,
) -> Result<SolutionPrerequisite> {
    let row = sqlx::query_as::<_, PrerequisiteRow>(
        "UPDATE solution_prerequisites \
         SET text = $1, solution_id = $2, use_case_id = $3, updated_at = now() \
         WHERE id = $4 \
         RETURNING *",
    )
    .bind(&fields.text)
    .bind(fields.scope.solution_id())
    .bind(fields.scope.use_case_id())
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to update prerequisite")?;

    into_model(row.ok_or(NotFound::new(Entity::Prerequisite, id))?)
}

/// Delete a prerequisite.
pub async fn delete_prerequisite(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM solution_prerequisites WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete prerequisite")?;

    if result.rows_affected() == 0 {
        return Err(NotFound::new(Entity::Prerequisite, id).into());
    }

    Ok(())
}

/// Whether the legacy `prerequisites` table exists in this database.
pub async fn legacy_table_exists(pool: &PgPool) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT to_regclass('public.prerequisites') IS NOT NULL")
            .fetch_one(pool)
            .await
            .context("failed to check for legacy prerequisites table")?;

    Ok(exists)
}

/// Read every row of the legacy `prerequisites` table, oldest first.
///
/// Returns an empty list when the table does not exist.
pub async fn list_legacy_prerequisites(pool: &PgPool) -> Result<Vec<LegacyPrerequisiteRow>> {
    if !legacy_table_exists(pool).await? {
        warn!("legacy prerequisites table not found");
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, LegacyPrerequisiteRow>(
        "SELECT id, text, solution_id, use_case_id, created_at \
         FROM prerequisites ORDER BY created_at ASC NULLS LAST",
    )
    .fetch_all(pool)
    .await
    .context("failed to list legacy prerequisites")?;

    Ok(rows)
}
