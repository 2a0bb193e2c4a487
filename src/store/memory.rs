use dashmap::DashMap;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult};
use crate::models::{Account, HistoryRecord};

#[derive(Debug, Default)]
struct Ledger {
    credits: i64,
    history: Vec<HistoryRecord>,
}

/// Process-local store. The per-user entry guard makes `commit_analysis` atomic.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    ledgers: DashMap<String, Ledger>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&self, user_id: &str, grant: i64) -> Account {
        let ledger = self.ledgers.entry(user_id.to_string()).or_insert_with(|| {
            tracing::info!("New account {} with {} credits", user_id, grant);
            Ledger {
                credits: grant,
                history: Vec::new(),
            }
        });
        Account {
            user_id: user_id.to_string(),
            credits: ledger.credits,
        }
    }

    fn commit(&self, user_id: &str, cost: i64, record: &HistoryRecord) -> StoreResult<i64> {
        let mut ledger = self
            .ledgers
            .get_mut(user_id)
            .ok_or_else(|| StoreError::AccountNotFound(user_id.to_string()))?;

        if ledger.credits < cost {
            return Err(StoreError::InsufficientCredits {
                available: ledger.credits,
                required: cost,
            });
        }

        ledger.credits -= cost;
        ledger.history.push(record.clone());
        Ok(ledger.credits)
    }
}

impl AccountStore for MemoryAccountStore {
    fn ensure_account<'a>(&'a self, user_id: &'a str, grant: i64) -> BoxFuture<'a, StoreResult<Account>> {
        future::ready(Ok(self.ensure(user_id, grant))).boxed()
    }

    fn credits<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, StoreResult<i64>> {
        let result = self
            .ledgers
            .get(user_id)
            .map(|l| l.credits)
            .ok_or_else(|| StoreError::AccountNotFound(user_id.to_string()));
        future::ready(result).boxed()
    }

    fn add_credits<'a>(&'a self, user_id: &'a str, amount: i64) -> BoxFuture<'a, StoreResult<Account>> {
        let result = match self.ledgers.get_mut(user_id) {
            Some(mut ledger) => {
                ledger.credits += amount;
                Ok(Account {
                    user_id: user_id.to_string(),
                    credits: ledger.credits,
                })
            }
            None => Err(StoreError::AccountNotFound(user_id.to_string())),
        };
        future::ready(result).boxed()
    }

    fn commit_analysis<'a>(
        &'a self,
        user_id: &'a str,
        cost: i64,
        record: &'a HistoryRecord,
    ) -> BoxFuture<'a, StoreResult<i64>> {
        future::ready(self.commit(user_id, cost, record)).boxed()
    }

    fn list_history<'a>(&'a self, user_id: &'a str, limit: usize) -> BoxFuture<'a, StoreResult<Vec<HistoryRecord>>> {
        let records = self
            .ledgers
            .get(user_id)
            .map(|l| l.history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();
        future::ready(Ok(records)).boxed()
    }

    fn get_history<'a>(&'a self, user_id: &'a str, id: Uuid) -> BoxFuture<'a, StoreResult<Option<HistoryRecord>>> {
        let record = self
            .ledgers
            .get(user_id)
            .and_then(|l| l.history.iter().find(|r| r.id == id).cloned());
        future::ready(Ok(record)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisStatus;
    use chrono::Utc;

    fn record(user_id: &str, bill_name: &str) -> HistoryRecord {
        HistoryRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            bill_name: bill_name.to_string(),
            status: AnalysisStatus::Completed,
            item_count: 1,
            result: serde_json::json!({ "classified_items": [], "anomalies": [] }),
        }
    }

    #[tokio::test]
    async fn ensure_account_grants_once() {
        let store = MemoryAccountStore::new();
        assert_eq!(store.ensure_account("u1", 5).await.unwrap().credits, 5);
        store.add_credits("u1", 25).await.unwrap();
        assert_eq!(store.ensure_account("u1", 5).await.unwrap().credits, 30);
    }

    #[tokio::test]
    async fn commit_charges_and_records_together() {
        let store = MemoryAccountStore::new();
        store.ensure_account("u1", 2).await.unwrap();

        let first = record("u1", "City Hospital");
        assert_eq!(store.commit_analysis("u1", 1, &first).await.unwrap(), 1);
        let second = record("u1", "Lab Tests");
        assert_eq!(store.commit_analysis("u1", 1, &second).await.unwrap(), 0);

        let history = store.list_history("u1", 10).await.unwrap();
        let names: Vec<_> = history.iter().map(|r| r.bill_name.as_str()).collect();
        assert_eq!(names, ["Lab Tests", "City Hospital"]);
        assert_eq!(
            store.get_history("u1", first.id).await.unwrap().map(|r| r.bill_name),
            Some("City Hospital".to_string())
        );
    }

    #[tokio::test]
    async fn commit_without_credits_leaves_no_trace() {
        let store = MemoryAccountStore::new();
        store.ensure_account("u1", 0).await.unwrap();

        let err = store.commit_analysis("u1", 1, &record("u1", "ER visit")).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientCredits { available: 0, required: 1 }));
        assert_eq!(store.credits("u1").await.unwrap(), 0);
        assert!(store.list_history("u1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_account() {
        let store = MemoryAccountStore::new();
        assert!(matches!(store.credits("ghost").await, Err(StoreError::AccountNotFound(_))));
        assert!(store.list_history("ghost", 10).await.unwrap().is_empty());
    }
}
