use crate::models::{AnalysisStatus, HistoryRecord};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Row of mb_analysis_history
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub bill_name: String,
    pub status: String,
    pub item_count: i32,
    pub result: Json<serde_json::Value>,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            bill_name: row.bill_name,
            status: AnalysisStatus::from_db(&row.status),
            item_count: row.item_count,
            result: row.result.0,
        }
    }
}

/// Insert the account if missing, return the current balance
pub async fn upsert_account(pool: &PgPool, user_id: &str, grant: i64) -> Result<i64, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO mb_account (user_id, credits)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(grant)
    .execute(pool)
    .await?;

    sqlx::query_scalar::<_, i64>("SELECT credits FROM mb_account WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Works on the pool or inside an open transaction
pub async fn get_credits<'e, E>(executor: E, user_id: &str) -> Result<Option<i64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>("SELECT credits FROM mb_account WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn add_credits(pool: &PgPool, user_id: &str, amount: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE mb_account SET credits = credits + $2
        WHERE user_id = $1
        RETURNING credits
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(pool)
    .await
}

/// Conditional decrement; `None` when the balance is below `cost`
pub async fn charge_credits(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    cost: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE mb_account SET credits = credits - $2
        WHERE user_id = $1 AND credits >= $2
        RETURNING credits
        "#,
    )
    .bind(user_id)
    .bind(cost)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn insert_history(
    tx: &mut Transaction<'_, Postgres>,
    record: &HistoryRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO mb_analysis_history
            (id, user_id, created_at, bill_name, status, item_count, result)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id)
    .bind(&record.user_id)
    .bind(record.created_at)
    .bind(&record.bill_name)
    .bind(record.status.as_str())
    .bind(record.item_count)
    .bind(Json(&record.result))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Newest first
pub async fn list_history(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<HistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT id, user_id, created_at, bill_name, status, item_count, result
        FROM mb_analysis_history
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn get_history(
    pool: &PgPool,
    user_id: &str,
    id: Uuid,
) -> Result<Option<HistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT id, user_id, created_at, bill_name, status, item_count, result
        FROM mb_analysis_history
        WHERE user_id = $1 AND id = $2
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}
