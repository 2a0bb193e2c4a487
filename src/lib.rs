pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use db::{create_pool, ensure_schema};
pub use error::{AppError, AppResult};
pub use service::{BillSession, BillWorkflow, HttpAnalysisClient};
pub use store::{AccountStore, MemoryAccountStore, PgAccountStore};
