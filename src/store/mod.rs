//! Credit balances and analysis history.
//!
//! The credit charge and the history record of one analysis are written by a
//! single `commit_analysis` call, so either both land or neither does.

pub mod memory;
pub mod postgres;

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, HistoryRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insufficient credits: {available} available, {required} required")]
    InsufficientCredits { available: i64, required: i64 },

    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait AccountStore: Send + Sync {
    /// Create the account with `grant` credits if it does not exist yet.
    fn ensure_account<'a>(&'a self, user_id: &'a str, grant: i64) -> BoxFuture<'a, StoreResult<Account>>;

    fn credits<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, StoreResult<i64>>;

    fn add_credits<'a>(&'a self, user_id: &'a str, amount: i64) -> BoxFuture<'a, StoreResult<Account>>;

    /// Charge `cost` credits and save `record` atomically. Returns the new
    /// balance. Fails without side effects when the balance is below `cost`.
    fn commit_analysis<'a>(
        &'a self,
        user_id: &'a str,
        cost: i64,
        record: &'a HistoryRecord,
    ) -> BoxFuture<'a, StoreResult<i64>>;

    /// Newest first
    fn list_history<'a>(&'a self, user_id: &'a str, limit: usize) -> BoxFuture<'a, StoreResult<Vec<HistoryRecord>>>;

    fn get_history<'a>(&'a self, user_id: &'a str, id: Uuid) -> BoxFuture<'a, StoreResult<Option<HistoryRecord>>>;
}
