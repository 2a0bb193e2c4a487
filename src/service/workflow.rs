use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::CreditsConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    format_amount, AnalysisResult, BillLineItem, BillSummary, Category, HistoryRecord, LineItemDraft,
    ValidationError, WireItem,
};
use crate::service::analysis_client::AnalysisBackend;
use crate::service::categorizer;
use crate::service::summary::summarize;
use crate::store::AccountStore;

/// State of the bill being worked on. One per user session; every workflow
/// step takes it by reference.
#[derive(Debug, Clone, Default)]
pub struct BillSession {
    pub bill_name: String,
    pub declared_total: Option<BigDecimal>,
    items: Vec<BillLineItem>,
    analysis: Option<AnalysisResult>,
}

impl BillSession {
    pub fn new(bill_name: impl Into<String>) -> Self {
        Self {
            bill_name: bill_name.into(),
            ..Default::default()
        }
    }

    /// Replace the items with the finalized form rows. Any previous analysis
    /// no longer matches and is dropped.
    pub fn enter_items(&mut self, drafts: &[LineItemDraft]) -> Result<(), ValidationError> {
        self.items = categorizer::categorize(drafts)?;
        self.analysis = None;
        Ok(())
    }

    pub fn override_category(&mut self, index: usize, category: Category) -> Result<(), ValidationError> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(ValidationError::UnknownLine { index })?;
        item.category = category;
        self.analysis = None;
        Ok(())
    }

    pub fn items(&self) -> &[BillLineItem] {
        &self.items
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Summary of the current items against the attached analysis, if any
    pub fn summary(&self) -> BillSummary {
        let anomalies = self
            .analysis
            .as_ref()
            .map(|a| a.anomalies.as_slice())
            .unwrap_or_default();
        summarize(&self.items, anomalies, self.declared_total.as_ref())
    }

    pub fn snapshot(&self) -> BillSnapshot {
        BillSnapshot {
            bill_name: self.bill_name.clone(),
            declared_total: self.declared_total.clone(),
            items: Arc::from(self.items.as_slice()),
        }
    }

    /// Start a new bill
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Read-only copy of a session handed across the remote boundary
#[derive(Debug, Clone)]
pub struct BillSnapshot {
    pub bill_name: String,
    pub declared_total: Option<BigDecimal>,
    pub items: Arc<[BillLineItem]>,
}

impl BillSnapshot {
    pub fn wire_items(&self) -> Vec<WireItem> {
        self.items.iter().map(WireItem::from).collect()
    }
}

/// Everything one analysis run produced. `history` is `None` and `charged`
/// false when nothing was committed (empty bill).
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
    pub analysis: AnalysisResult,
    pub summary: BillSummary,
    pub history: Option<HistoryRecord>,
    pub credits_remaining: i64,
    pub charged: bool,
}

/// Credit check, remote analysis, then credit charge and history save in one commit.
pub struct BillWorkflow {
    backend: Arc<dyn AnalysisBackend>,
    store: Arc<dyn AccountStore>,
    credits: CreditsConfig,
}

impl BillWorkflow {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        store: Arc<dyn AccountStore>,
        credits: CreditsConfig,
    ) -> Self {
        Self {
            backend,
            store,
            credits,
        }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub fn credits_config(&self) -> &CreditsConfig {
        &self.credits
    }

    pub async fn analyze(&self, user_id: &str, session: &mut BillSession) -> AppResult<WorkflowOutcome> {
        let snapshot = session.snapshot();
        let account = self
            .store
            .ensure_account(user_id, self.credits.signup_grant)
            .await?;

        if snapshot.items.is_empty() {
            tracing::info!("Bill '{}' for {} has no items, skipping analysis", snapshot.bill_name, user_id);
            let analysis = AnalysisResult::default();
            session.analysis = Some(analysis.clone());
            return Ok(WorkflowOutcome {
                analysis,
                summary: summarize(&[], &[], snapshot.declared_total.as_ref()),
                history: None,
                credits_remaining: account.credits,
                charged: false,
            });
        }

        let cost = self.credits.cost_per_analysis;
        if account.credits < cost {
            tracing::warn!("{} has {} credits, analysis needs {}", user_id, account.credits, cost);
            return Err(AppError::InsufficientCredits {
                available: account.credits,
                required: cost,
            });
        }

        let wire_items = snapshot.wire_items();
        let analysis = match self.backend.analyze(&wire_items).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!("Analysis of '{}' for {} failed: {}", snapshot.bill_name, user_id, e);
                return Err(e.into());
            }
        };

        let summary = summarize(&snapshot.items, &analysis.anomalies, snapshot.declared_total.as_ref());
        let record = HistoryRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            bill_name: snapshot.bill_name.clone(),
            status: summary.status,
            item_count: i32::try_from(snapshot.items.len()).unwrap_or(i32::MAX),
            result: serde_json::to_value(&analysis)?,
        };

        let credits_remaining = self.store.commit_analysis(user_id, cost, &record).await?;

        tracing::info!(
            "Bill '{}' for {}: {} items, total ₹{}, {} flagged",
            snapshot.bill_name,
            user_id,
            summary.item_count,
            format_amount(&summary.grand_total),
            summary.flagged_count
        );

        session.analysis = Some(analysis.clone());
        Ok(WorkflowOutcome {
            analysis,
            summary,
            history: Some(record),
            credits_remaining,
            charged: true,
        })
    }
}
