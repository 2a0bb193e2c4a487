use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome recorded with each completed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    NeedsReview,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::NeedsReview => "needs_review",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "needs_review" => AnalysisStatus::NeedsReview,
            _ => AnalysisStatus::Completed,
        }
    }
}

/// History entry (one per completed analysis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub bill_name: String,
    pub status: AnalysisStatus,
    pub item_count: i32,
    /// Analysis reply as returned to the user
    pub result: serde_json::Value,
}
