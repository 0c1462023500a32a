//! Database query functions for the `poc_plans` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{Entity, NotFound};
use crate::models::{NewPocPlan, PocPlan, PocPlanRow, PocPlanStatus};

/// Append a plan snapshot. Returns the stored plan.
pub async fn insert_poc_plan(pool: &PgPool, new: &NewPocPlan) -> Result<PocPlan> {
    let row = sqlx::query_as::<_, PocPlanRow>(
        "INSERT INTO poc_plans \
         (customer_info, solutions, selected_use_cases, custom_use_cases, status) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(Json(&new.customer_info))
    .bind(Json(&new.solutions))
    .bind(Json(&new.selected_use_cases))
    .bind(Json(&new.custom_use_cases))
    .bind(new.status)
    .fetch_one(pool)
    .await
    .context("failed to insert poc plan")?;

    Ok(row.into())
}

/// Fetch a plan by ID.
pub async fn get_poc_plan(pool: &PgPool, id: Uuid) -> Result<Option<PocPlan>> {
    let row = sqlx::query_as::<_, PocPlanRow>("SELECT * FROM poc_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch poc plan")?;

    Ok(row.map(Into::into))
}

/// List all plans, newest first.
pub async fn list_poc_plans(pool: &PgPool) -> Result<Vec<PocPlan>> {
    let rows = sqlx::query_as::<_, PocPlanRow>("SELECT * FROM poc_plans ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list poc plans")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Overwrite a plan and refresh `updated_at`.
pub async fn update_poc_plan(pool: &PgPool, id: Uuid, fields: &NewPocPlan) -> Result<PocPlan> {
    let row = sqlx::query_as::<_, PocPlanRow>(
        "UPDATE poc_plans \
         SET customer_info = $1, solutions = $2, selected_use_cases = $3, \
             custom_use_cases = $4, status = $5, updated_at = now() \
         WHERE id = $6 \
         RETURNING *",
    )
    .bind(Json(&fields.customer_info))
    .bind(Json(&fields.solutions))
    .bind(Json(&fields.selected_use_cases))
    .bind(Json(&fields.custom_use_cases))
    .bind(fields.status)
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to update poc plan")?;

    Ok(row.ok_or(NotFound::new(Entity::PocPlan, id))?.into())
}

/// Update only the status of a plan.
pub async fn update_poc_plan_status(pool: &PgPool, id: Uuid, status: PocPlanStatus) -> Result<()> {
    let result =
        sqlx::query("UPDATE poc_plans SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(pool)
            .await
            .context("failed to update poc plan status")?;

    if result.rows_affected() == 0 {
        return Err(NotFound::new(Entity::PocPlan, id).into());
    }

    Ok(())
}

/// Delete a plan.
pub async fn delete_poc_plan(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM poc_plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete poc plan")?;

    if result.rows_affected() == 0 {
        return Err(NotFound::new(Entity::PocPlan, id).into());
    }

    Ok(())
}
