use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult};
use crate::db::queries;
use crate::models::{Account, HistoryRecord};

/// Postgres backed store (tables from `db::ensure_schema`)
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn commit(&self, user_id: &str, cost: i64, record: &HistoryRecord) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let Some(remaining) = queries::charge_credits(&mut tx, user_id, cost).await? else {
            let available = queries::get_credits(&mut *tx, user_id)
                .await?
                .ok_or_else(|| StoreError::AccountNotFound(user_id.to_string()))?;
            tx.rollback().await?;
            return Err(StoreError::InsufficientCredits {
                available,
                required: cost,
            });
        };

        queries::insert_history(&mut tx, record).await?;
        tx.commit().await?;

        tracing::info!(
            "Committed analysis {} for {}: -{} credits, {} left",
            record.id,
            user_id,
            cost,
            remaining
        );
        Ok(remaining)
    }
}

impl AccountStore for PgAccountStore {
    fn ensure_account<'a>(&'a self, user_id: &'a str, grant: i64) -> BoxFuture<'a, StoreResult<Account>> {
        async move {
            let credits = queries::upsert_account(&self.pool, user_id, grant).await?;
            Ok(Account {
                user_id: user_id.to_string(),
                credits,
            })
        }
        .boxed()
    }

    fn credits<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, StoreResult<i64>> {
        async move {
            queries::get_credits(&self.pool, user_id)
                .await?
                .ok_or_else(|| StoreError::AccountNotFound(user_id.to_string()))
        }
        .boxed()
    }

    fn add_credits<'a>(&'a self, user_id: &'a str, amount: i64) -> BoxFuture<'a, StoreResult<Account>> {
        async move {
            let credits = queries::add_credits(&self.pool, user_id, amount)
                .await?
                .ok_or_else(|| StoreError::AccountNotFound(user_id.to_string()))?;
            Ok(Account {
                user_id: user_id.to_string(),
                credits,
            })
        }
        .boxed()
    }

    fn commit_analysis<'a>(
        &'a self,
        user_id: &'a str,
        cost: i64,
        record: &'a HistoryRecord,
    ) -> BoxFuture<'a, StoreResult<i64>> {
        self.commit(user_id, cost, record).boxed()
    }

    fn list_history<'a>(&'a self, user_id: &'a str, limit: usize) -> BoxFuture<'a, StoreResult<Vec<HistoryRecord>>> {
        async move {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows = queries::list_history(&self.pool, user_id, limit).await?;
            Ok(rows.into_iter().map(HistoryRecord::from).collect())
        }
        .boxed()
    }

    fn get_history<'a>(&'a self, user_id: &'a str, id: Uuid) -> BoxFuture<'a, StoreResult<Option<HistoryRecord>>> {
        async move {
            let row = queries::get_history(&self.pool, user_id, id).await?;
            Ok(row.map(HistoryRecord::from))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, ensure_schema};
    use crate::models::AnalysisStatus;
    use chrono::Utc;
    use std::time::{Duration, Instant};

    /// Single-connection store on `DATABASE_URL`; `None` when no database is configured.
    async fn single_connection_store() -> Option<PgAccountStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = create_pool(&url, 1).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        Some(PgAccountStore::new(pool))
    }

    fn record(user_id: &str) -> HistoryRecord {
        HistoryRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            bill_name: "City Hospital".to_string(),
            status: AnalysisStatus::Completed,
            item_count: 1,
            result: serde_json::json!({ "classified_items": [], "anomalies": [] }),
        }
    }

    #[tokio::test]
    async fn short_balance_is_reported_without_a_second_connection() {
        let Some(store) = single_connection_store().await else {
            return;
        };
        let user = format!("pg-{}", Uuid::new_v4());
        store.ensure_account(&user, 0).await.unwrap();

        let started = Instant::now();
        let err = store.commit_analysis(&user, 1, &record(&user)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientCredits {
                available: 0,
                required: 1
            }
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(store.list_history(&user, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn charge_and_history_land_together() {
        let Some(store) = single_connection_store().await else {
            return;
        };
        let user = format!("pg-{}", Uuid::new_v4());
        store.ensure_account(&user, 2).await.unwrap();

        let entry = record(&user);
        assert_eq!(store.commit_analysis(&user, 1, &entry).await.unwrap(), 1);
        assert_eq!(store.credits(&user).await.unwrap(), 1);

        let saved = store.get_history(&user, entry.id).await.unwrap().unwrap();
        assert_eq!(saved.bill_name, "City Hospital");
        assert_eq!(saved.status, AnalysisStatus::Completed);
    }
}
