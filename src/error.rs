use thiserror::Error;

use crate::models::ValidationError;
use crate::service::AnalysisClientError;
use crate::store::StoreError;

/// Where the UI should send the user after a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    BillEntry,
    Pricing,
}

impl Redirect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Redirect::BillEntry => "bill-entry",
            Redirect::Pricing => "pricing",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid bill: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed request body: {0}")]
    InvalidBody(String),

    #[error("insufficient credits: {available} available, {required} required")]
    InsufficientCredits { available: i64, required: i64 },

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisClientError),

    #[error("storage error: {0}")]
    Store(StoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("unknown pricing plan '{0}'")]
    UnknownPlan(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientCredits {
                available,
                required,
            } => AppError::InsufficientCredits {
                available,
                required,
            },
            StoreError::AccountNotFound(user) => AppError::NotFound(format!("account {user}")),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            AppError::InsufficientCredits { .. } => Some(Redirect::Pricing),
            AppError::Analysis(_) => Some(Redirect::BillEntry),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
