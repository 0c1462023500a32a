//! Database query functions for the `use_cases` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Entity, NotFound};
use crate::models::{NewUseCase, UseCase};

/// Insert a new use case.
pub async fn insert_use_case(pool: &PgPool, new: &NewUseCase) -> Result<UseCase> {
    let use_case = sqlx::query_as::<_, UseCase>(
        "INSERT INTO use_cases (solution_id, text, prerequisites) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(new.solution_id)
    .bind(&new.text)
    .bind(&new.prerequisites)
    .fetch_one(pool)
    .await
    .context("failed to insert use case")?;

    Ok(use_case)
}

/// Fetch a single use case by ID.
pub async fn get_use_case(pool: &PgPool, id: Uuid) -> Result<Option<UseCase>> {
    let use_case = sqlx::query_as::<_, UseCase>("SELECT * FROM use_cases WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch use case")?;

    Ok(use_case)
}

/// List all use cases, newest first.
pub async fn list_use_cases(pool: &PgPool) -> Result<Vec<UseCase>> {
    let use_cases =
        sqlx::query_as::<_, UseCase>("SELECT * FROM use_cases ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("failed to list use cases")?;

    Ok(use_cases)
}

/// List the use cases of one solution, newest first.
pub async fn list_use_cases_for_solution(pool: &PgPool, solution_id: Uuid) -> Result<Vec<UseCase>> {
    let use_cases = sqlx::query_as::<_, UseCase>(
        "SELECT * FROM use_cases WHERE solution_id = $1 ORDER BY created_at DESC",
    )
    .bind(solution_id)
    .fetch_all(pool)
    .await
    .context("failed to list use cases for solution")?;

    Ok(use_cases)
}

/// Overwrite a use case and refresh `updated_at`.
pub async fn update_use_case(pool: &PgPool, id: Uuid, fields: &NewUseCase) -> Result<UseCase> {
    let use_case = sqlx::query_as::<_, UseCase>(
        "UPDATE use_cases \
         SET solution_id = $1, text = $2, prerequisites = $3, updated_at = now() \
         WHERE id = $4 \
         RETURNING *",
    )
    .bind(fields.solution_id)
    .bind(&fields.text)
    .bind(&fields.prerequisites)
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to update use case")?;

    Ok(use_case.ok_or(NotFound::new(Entity::UseCase, id))?)
}

/// Delete a use case.
///
/// When `delete_linked_prerequisites` is set, rows in
/// `solution_prerequisites` that reference the use case are removed in the
/// same transaction. Returns the number of linked prerequisites deleted.
pub async fn delete_use_case(
    pool: &PgPool,
    id: Uuid,
    delete_linked_prerequisites: bool,
) -> Result<u64> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let mut linked = 0;
    if delete_linked_prerequisites {
        linked = sqlx::query("DELETE FROM solution_prerequisites WHERE use_case_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to delete prerequisites of use case")?
            .rows_affected();
    }

    let result = sqlx::query("DELETE FROM use_cases WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete use case")?;

    if result.rows_affected() == 0 {
        return Err(NotFound::new(Entity::UseCase, id).into());
    }

    tx.commit().await.context("failed to commit transaction")?;

    Ok(linked)
}
