use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::repo_types::{GroceryItem, NewGroceryItem};

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<GroceryItem>> {
    sqlx::query_as::<_, GroceryItem>(
        r#"
        SELECT id, user_id, name, quantity, category, purchased, created_at
          FROM grocery_items
         WHERE user_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list grocery items")
}

/// Inserts every item in one transaction, preserving order.
pub async fn create_many(
    db: &PgPool,
    user_id: Uuid,
    items: &[NewGroceryItem],
) -> anyhow::Result<Vec<GroceryItem>> {
    let mut tx = db.begin().await.context("begin tx")?;
    let mut created = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, GroceryItem>(
            r#"
            INSERT INTO grocery_items (user_id, name, quantity, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, quantity, category, purchased, created_at
            "#,
        )
        .bind(user_id)
        .bind(&item.name)
        .bind(&item.quantity)
        .bind(&item.category)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("insert grocery item {}", item.name))?;
        created.push(row);
    }
    tx.commit().await.context("commit tx")?;
    Ok(created)
}

pub async fn toggle_purchased(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<GroceryItem>> {
    sqlx::query_as::<_, GroceryItem>(
        r#"
        UPDATE grocery_items SET purchased = NOT purchased
         WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, quantity, category, purchased, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("toggle grocery item")
}

pub async fn update_category(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    category: &str,
) -> anyhow::Result<Option<GroceryItem>> {
    sqlx::query_as::<_, GroceryItem>(
        r#"
        UPDATE grocery_items SET category = $3
         WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, quantity, category, purchased, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(category)
    .fetch_optional(db)
    .await
    .context("update grocery category")
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM grocery_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete grocery item")?;
    Ok(res.rows_affected() > 0)
}

pub async fn clear_purchased(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM grocery_items WHERE user_id = $1 AND purchased")
        .bind(user_id)
        .execute(db)
        .await
        .context("clear purchased grocery items")?;
    Ok(res.rows_affected())
}

/// Removes and returns the user's purchased items.
pub async fn take_purchased(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> anyhow::Result<Vec<GroceryItem>> {
    sqlx::query_as::<_, GroceryItem>(
        r#"
        DELETE FROM grocery_items
         WHERE user_id = $1 AND purchased
        RETURNING id, user_id, name, quantity, category, purchased, created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .context("take purchased grocery items")
}
