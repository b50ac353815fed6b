use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use tracing::warn;
use uuid::Uuid;

use super::dto::Slot;

/// Deletes the marker if present, otherwise creates it. Returns whether the dose is now taken.
pub async fn toggle(db: &PgPool, user_id: Uuid, date: Date, slot: Slot) -> anyhow::Result<bool> {
    let mut tx = db.begin().await.context("begin tx")?;

    let removed = sqlx::query(
        r#"DELETE FROM supplement_logs WHERE user_id = $1 AND date = $2 AND slot = $3"#,
    )
    .bind(user_id)
    .bind(date)
    .bind(slot.as_str())
    .execute(&mut *tx)
    .await
    .context("delete supplement log")?
    .rows_affected();

    if removed == 0 {
        sqlx::query(
            r#"
            INSERT INTO supplement_logs (user_id, date, slot)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date, slot) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(slot.as_str())
        .execute(&mut *tx)
        .await
        .context("insert supplement log")?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(removed == 0)
}

pub async fn taken_between(
    db: &PgPool,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<(Date, Slot)>> {
    let rows: Vec<(Date, String)> = sqlx::query_as(
        r#"
        SELECT date, slot FROM supplement_logs
         WHERE user_id = $1 AND date >= $2 AND date <= $3
         ORDER BY date ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("list supplement logs")?;

    Ok(rows
        .into_iter()
        .filter_map(|(date, slot)| match slot.parse::<Slot>() {
            Ok(slot) => Some((date, slot)),
            Err(e) => {
                warn!(error = %e, "skipping supplement row");
                None
            }
        })
        .collect())
}
