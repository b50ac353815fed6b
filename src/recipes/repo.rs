use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewSavedRecipe, SavedRecipe};

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SavedRecipe>> {
    sqlx::query_as::<_, SavedRecipe>(
        r#"
        SELECT id, user_id, recipe_id, title, image, source_url, created_at
          FROM saved_recipes
         WHERE user_id = $1
         ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list saved recipes")
}

/// Returns the row and whether it was newly created.
pub async fn save(
    db: &PgPool,
    user_id: Uuid,
    recipe: &NewSavedRecipe,
) -> anyhow::Result<(SavedRecipe, bool)> {
    let inserted = sqlx::query_as::<_, SavedRecipe>(
        r#"
        INSERT INTO saved_recipes (user_id, recipe_id, title, image, source_url)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, recipe_id) DO NOTHING
        RETURNING id, user_id, recipe_id, title, image, source_url, created_at
        "#,
    )
    .bind(user_id)
    .bind(recipe.recipe_id)
    .bind(&recipe.title)
    .bind(&recipe.image)
    .bind(&recipe.source_url)
    .fetch_optional(db)
    .await
    .context("insert saved recipe")?;

    if let Some(row) = inserted {
        return Ok((row, true));
    }

    let existing = sqlx::query_as::<_, SavedRecipe>(
        r#"
        SELECT id, user_id, recipe_id, title, image, source_url, created_at
          FROM saved_recipes
         WHERE user_id = $1 AND recipe_id = $2
        "#,
    )
    .bind(user_id)
    .bind(recipe.recipe_id)
    .fetch_one(db)
    .await
    .context("load existing saved recipe")?;
    Ok((existing, false))
}

pub async fn delete(db: &PgPool, user_id: Uuid, recipe_id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await
        .context("delete saved recipe")?;
    Ok(res.rows_affected() > 0)
}

pub async fn is_saved(db: &PgPool, user_id: Uuid, recipe_id: i64) -> anyhow::Result<bool> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"SELECT id FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2"#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(db)
    .await
    .context("check saved recipe")?;
    Ok(row.is_some())
}
