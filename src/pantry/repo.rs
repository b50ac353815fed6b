use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::repo_types::{NewPantryItem, PantryItem, QuantityStep};

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<PantryItem>> {
    sqlx::query_as::<_, PantryItem>(
        r#"
        SELECT id, user_id, name, quantity, unit, created_at
          FROM pantry_items
         WHERE user_id = $1
         ORDER BY lower(name) ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list pantry items")
}

/// Names only, for building ingredient lists.
pub async fn names_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"SELECT name FROM pantry_items WHERE user_id = $1 ORDER BY lower(name) ASC"#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list pantry names")?;
    Ok(rows.into_iter().map(|(n,)| n).collect())
}

pub async fn create(db: &PgPool, user_id: Uuid, item: &NewPantryItem) -> anyhow::Result<PantryItem> {
    sqlx::query_as::<_, PantryItem>(
        r#"
        INSERT INTO pantry_items (user_id, name, quantity, unit)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, name, quantity, unit, created_at
        "#,
    )
    .bind(user_id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(&item.unit)
    .fetch_one(db)
    .await
    .context("insert pantry item")
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    item: &NewPantryItem,
) -> anyhow::Result<Option<PantryItem>> {
    sqlx::query_as::<_, PantryItem>(
        r#"
        UPDATE pantry_items
           SET name = $3, quantity = $4, unit = $5
         WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, quantity, unit, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(&item.unit)
    .fetch_optional(db)
    .await
    .context("update pantry item")
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM pantry_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete pantry item")?;
    Ok(res.rows_affected() > 0)
}

/// Applies a +1/-1 step under a row lock so concurrent clicks serialize.
pub async fn step_quantity(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    step: QuantityStep,
) -> anyhow::Result<Option<PantryItem>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let current: Option<(i32,)> = sqlx::query_as(
        r#"SELECT quantity FROM pantry_items WHERE id = $1 AND user_id = $2 FOR UPDATE"#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("lock pantry item")?;

    let Some((quantity,)) = current else {
        return Ok(None);
    };

    let item = sqlx::query_as::<_, PantryItem>(
        r#"
        UPDATE pantry_items SET quantity = $3
         WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, quantity, unit, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(step.apply(quantity))
    .fetch_one(&mut *tx)
    .await
    .context("step pantry quantity")?;

    tx.commit().await.context("commit tx")?;
    Ok(Some(item))
}

// Sum is widened to bigint and capped at i32::MAX so a merge never overflows.
const MERGE_SQL: &str = r#"
    UPDATE pantry_items
       SET quantity = LEAST(quantity::bigint + $4, 2147483647)::int
     WHERE id = (
           SELECT id FROM pantry_items
            WHERE user_id = $1 AND lower(name) = lower($2) AND unit = $3
            ORDER BY created_at ASC
            LIMIT 1)
    RETURNING id, user_id, name, quantity, unit, created_at
"#;

/// Adds to an existing row with the same name and unit, or inserts a new one.
pub async fn add_or_merge(
    conn: &mut PgConnection,
    user_id: Uuid,
    item: &NewPantryItem,
) -> anyhow::Result<PantryItem> {
    let merged = sqlx::query_as::<_, PantryItem>(MERGE_SQL)
        .bind(user_id)
        .bind(&item.name)
        .bind(&item.unit)
        .bind(item.quantity)
        .fetch_optional(&mut *conn)
        .await
        .context("merge pantry item")?;

    if let Some(existing) = merged {
        return Ok(existing);
    }

    sqlx::query_as::<_, PantryItem>(
        r#"
        INSERT INTO pantry_items (user_id, name, quantity, unit)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, name, quantity, unit, created_at
        "#,
    )
    .bind(user_id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(&item.unit)
    .fetch_one(&mut *conn)
    .await
    .context("insert pantry item")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_caps_at_int_max() {
        assert!(MERGE_SQL.contains("LEAST(quantity::bigint + $4, 2147483647)::int"));
        assert_eq!(2147483647_i64, i64::from(i32::MAX));
    }
}
