//! Database query functions for the `solutions` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{Entity, NotFound};
use crate::models::{NewSolution, Solution};

/// Rows removed by [`delete_solution_cascade`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub use_cases: u64,
    pub prerequisites: u64,
}

/// Insert a new solution. Returns the row with server-generated id and
/// timestamps.
pub async fn insert_solution(pool: &PgPool, new: &NewSolution) -> Result<Solution> {
    let solution = sqlx::query_as::<_, Solution>(
        "INSERT INTO solutions (name, description, icon) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.icon)
    .fetch_one(pool)
    .await
    .context("failed to insert solution")?;

    Ok(solution)
}

/// Fetch a solution by its ID.
pub async fn get_solution(pool: &PgPool, id: Uuid) -> Result<Option<Solution>> {
    let solution = sqlx::query_as::<_, Solution>("SELECT * FROM solutions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch solution")?;

    Ok(solution)
}

/// List all solutions, ordered by name.
pub async fn list_solutions(pool: &PgPool) -> Result<Vec<Solution>> {
    let solutions = sqlx::query_as::<_, Solution>("SELECT * FROM solutions ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("failed to list solutions")?;

    Ok(solutions)
}

/// Count solutions. Used by the seeder to detect an already-populated catalog.
pub async fn count_solutions(pool: &PgPool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM solutions")
        .fetch_one(pool)
        .await
        .context("failed to count solutions")?;

    Ok(row.0)
}

/// Overwrite every user-editable field of a solution and refresh
/// `updated_at`.
pub async fn update_solution(pool: &PgPool, id: Uuid, fields: &NewSolution) -> Result<Solution> {
    let solution = sqlx::query_as::<_, Solution>(
        "UPDATE solutions \
         SET name = $1, description = $2, icon = $3, updated_at = now() \
         WHERE id = $4 \
         RETURNING *",
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(&fields.icon)
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to update solution")?;

    Ok(solution.ok_or(NotFound::new(Entity::Solution, id))?)
}

/// Delete a solution together with its use cases and solution-level
/// prerequisites, inside a single transaction.
///
/// Prerequisites attached to one of the deleted use cases (by `use_case_id`)
/// are left in place; aggregation drops them once their use case is gone.
pub async fn delete_solution_cascade(pool: &PgPool, id: Uuid) -> Result<CascadeReport> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let use_cases = sqlx::query("DELETE FROM use_cases WHERE solution_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete use cases of solution")?
        .rows_affected();

    let prerequisites = sqlx::query("DELETE FROM solution_prerequisites WHERE solution_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete prerequisites of solution")?
        .rows_affected();

    let result = sqlx::query("DELETE FROM solutions WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete solution")?;

    if result.rows_affected() == 0 {
        // Transaction rolls back on drop.
        return Err(NotFound::new(Entity::Solution, id).into());
    }

    tx.commit().await.context("failed to commit transaction")?;

    info!(
        solution = %id,
        use_cases,
        prerequisites,
        "solution deleted with dependents"
    );

    Ok(CascadeReport {
        use_cases,
        prerequisites,
    })
}
