use anyhow::Context;
use lazy_static::lazy_static;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::{DatedNutrients, FoodLog, LogFilter, LogSort, NewFoodLog};
use crate::nutrition::Nutrient;

/// Leading columns before the nutrient block: food_name, quantity, unit, category, date.
const BASE_COLUMNS: usize = 5;

const LIST_WHERE: &str = "WHERE ($1::date IS NULL OR date >= $1) \
     AND ($2::date IS NULL OR date <= $2) \
     AND ($3::text IS NULL OR category = $3)";

lazy_static! {
    static ref NUTRIENT_COLUMNS: String = Nutrient::ALL
        .iter()
        .map(|n| n.key())
        .collect::<Vec<_>>()
        .join(", ");
    static ref SELECT_COLUMNS: String = format!(
        "id, food_name, quantity, unit, category, date, {}, created_at",
        *NUTRIENT_COLUMNS
    );
    static ref INSERT_SQL: String = {
        let placeholders = (1..=BASE_COLUMNS + Nutrient::ALL.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO food_logs (food_name, quantity, unit, category, date, {}) \
             VALUES ({}) RETURNING {}",
            *NUTRIENT_COLUMNS, placeholders, *SELECT_COLUMNS
        )
    };
    // $1 is the id, the rest follow insert order shifted by one.
    static ref UPDATE_SQL: String = {
        let base = ["food_name", "quantity", "unit", "category", "date"];
        let assignments = base
            .iter()
            .copied()
            .chain(Nutrient::ALL.iter().map(|n| n.key()))
            .enumerate()
            .map(|(i, col)| format!("{col} = ${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE food_logs SET {} WHERE id = $1 RETURNING {}",
            assignments, *SELECT_COLUMNS
        )
    };
    static ref GET_SQL: String = format!("SELECT {} FROM food_logs WHERE id = $1", *SELECT_COLUMNS);
    static ref LIST_SQL: String =
        format!("SELECT {} FROM food_logs {}", *SELECT_COLUMNS, LIST_WHERE);
    static ref COUNT_SQL: String = format!("SELECT COUNT(*) FROM food_logs {}", LIST_WHERE);
    static ref RANGE_SQL: String = format!(
        "SELECT date, {} FROM food_logs WHERE date >= $1 AND date <= $2 ORDER BY date ASC",
        *NUTRIENT_COLUMNS
    );
}

pub async fn create(db: &PgPool, log: &NewFoodLog) -> anyhow::Result<FoodLog> {
    let mut query = sqlx::query_as::<_, FoodLog>(INSERT_SQL.as_str())
        .bind(&log.food_name)
        .bind(log.quantity)
        .bind(&log.unit)
        .bind(&log.category)
        .bind(log.date);
    for v in log.nutrients.values() {
        query = query.bind(v);
    }
    query.fetch_one(db).await.context("insert food log")
}

pub async fn update(db: &PgPool, id: Uuid, log: &NewFoodLog) -> anyhow::Result<Option<FoodLog>> {
    let mut query = sqlx::query_as::<_, FoodLog>(UPDATE_SQL.as_str())
        .bind(id)
        .bind(&log.food_name)
        .bind(log.quantity)
        .bind(&log.unit)
        .bind(&log.category)
        .bind(log.date);
    for v in log.nutrients.values() {
        query = query.bind(v);
    }
    query.fetch_optional(db).await.context("update food log")
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<FoodLog>> {
    sqlx::query_as::<_, FoodLog>(GET_SQL.as_str())
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get food log")
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM food_logs WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete food log")?;
    Ok(res.rows_affected() > 0)
}

fn list_sql(sort: LogSort) -> String {
    format!(
        "{} ORDER BY {}, created_at DESC LIMIT $4 OFFSET $5",
        *LIST_SQL,
        sort.order_by()
    )
}

/// One page of logs matching `filter`; either date bound may be open.
pub async fn list(
    db: &PgPool,
    filter: &LogFilter,
    sort: LogSort,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<FoodLog>> {
    let sql = list_sql(sort);
    sqlx::query_as::<_, FoodLog>(&sql)
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.category)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list food logs")
}

pub async fn count(db: &PgPool, filter: &LogFilter) -> anyhow::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(COUNT_SQL.as_str())
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.category)
        .fetch_one(db)
        .await
        .context("count food logs")?;
    Ok(n)
}

pub async fn nutrients_in_range(
    db: &PgPool,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<DatedNutrients>> {
    sqlx::query_as::<_, DatedNutrients>(RANGE_SQL.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
        .context("food log nutrients in range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_binds_every_column() {
        assert!(INSERT_SQL.contains("$23"));
        assert!(!INSERT_SQL.contains("$24"));
        assert!(INSERT_SQL.contains("vitamin_b12"));
    }

    #[test]
    fn list_orders_by_whitelisted_column() {
        let sql = list_sql(LogSort::CaloriesAsc);
        assert!(sql.contains("ORDER BY calories ASC, created_at DESC"));
        assert!(sql.contains("category = $3"));
        assert!(sql.ends_with("LIMIT $4 OFFSET $5"));
        assert!(list_sql(LogSort::default()).contains("ORDER BY date DESC"));
        assert!(COUNT_SQL.starts_with("SELECT COUNT(*) FROM food_logs WHERE"));
    }

    #[test]
    fn update_keeps_id_as_first_parameter() {
        assert!(UPDATE_SQL.contains("food_name = $2"));
        assert!(UPDATE_SQL.contains("calories = $7"));
        assert!(UPDATE_SQL.contains("zinc = $24"));
        assert!(UPDATE_SQL.contains("WHERE id = $1"));
    }
}
