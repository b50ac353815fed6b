use anyhow::Context;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::dto::to_pantry_item;
use super::repo;
use crate::pantry::{repo as pantry_repo, repo_types::PantryItem};

/// Moves purchased grocery items into the pantry in one transaction.
pub async fn move_purchased_to_pantry(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<PantryItem>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let purchased = repo::take_purchased(&mut *tx, user_id).await?;
    let mut stocked = Vec::with_capacity(purchased.len());
    for item in &purchased {
        let row = pantry_repo::add_or_merge(&mut *tx, user_id, &to_pantry_item(item)).await?;
        stocked.push(row);
    }

    tx.commit().await.context("commit tx")?;
    info!(%user_id, moved = purchased.len(), "purchased groceries moved to pantry");
    Ok(stocked)
}
