use crate::error::AppError;
use crate::models::{
    find_plan, format_amount, Account, BillLineItem, BillSummary, HistoryRecord, LineItemDraft, PricingPlan,
    PRICING_PLANS,
};
use crate::service::{categorize, summarize, BillSession, BillWorkflow, WorkflowOutcome};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Request body: bill rows for a categorization preview
#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub items: Vec<LineItemDraft>,
    #[serde(default)]
    pub declared_total: Option<BigDecimal>,
}

#[derive(Debug, Serialize)]
pub struct CategorizeResponse {
    pub success: bool,
    pub items: Vec<BillLineItem>,
    pub summary: BillSummary,
}

/// Request body: bill to analyze
#[derive(Debug, Deserialize)]
pub struct AnalyzeBillRequest {
    pub user_id: String,
    #[serde(default)]
    pub bill_name: String,
    pub items: Vec<LineItemDraft>,
    #[serde(default)]
    pub declared_total: Option<BigDecimal>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeBillResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub outcome: WorkflowOutcome,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub plan: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::InvalidBody(_) | AppError::UnknownPlan(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::Analysis(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = ErrorResponse {
            success: false,
            message: format!("Error: {}", self),
            redirect: self.redirect().map(|r| r.as_str()),
        };
        (status, Json(response)).into_response()
    }
}

/// Undecodable bodies get the same JSON error shape as every other failure
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Credit packs
pub async fn list_plans() -> Json<&'static [PricingPlan]> {
    Json(&PRICING_PLANS[..])
}

/// Categorize rows and compute totals; no remote call, no credits
pub async fn categorize_bill(
    payload: Result<Json<CategorizeRequest>, JsonRejection>,
) -> Result<Json<CategorizeResponse>, AppError> {
    let Json(req) = payload?;
    let items = categorize(&req.items)?;
    let summary = summarize(&items, &[], req.declared_total.as_ref());
    Ok(Json(CategorizeResponse {
        success: true,
        items,
        summary,
    }))
}

/// Full analysis: credit check, remote call, credit charge + history
pub async fn analyze_bill(
    State(workflow): State<Arc<BillWorkflow>>,
    payload: Result<Json<AnalyzeBillRequest>, JsonRejection>,
) -> Result<Json<AnalyzeBillResponse>, AppError> {
    let Json(req) = payload?;
    let mut session = BillSession::new(req.bill_name);
    session.declared_total = req.declared_total;
    session.enter_items(&req.items)?;

    let outcome = workflow.analyze(&req.user_id, &mut session).await?;
    let message = format!(
        "Analyzed {} items totalling ₹{}, {} flagged",
        outcome.summary.item_count,
        format_amount(&outcome.summary.grand_total),
        outcome.summary.flagged_count
    );
    Ok(Json(AnalyzeBillResponse {
        success: true,
        message,
        outcome,
    }))
}

/// Balance (new users receive the signup grant)
pub async fn get_credits(
    State(workflow): State<Arc<BillWorkflow>>,
    Path(user_id): Path<String>,
) -> Result<Json<Account>, AppError> {
    let grant = workflow.credits_config().signup_grant;
    let account = workflow.store().ensure_account(&user_id, grant).await?;
    Ok(Json(account))
}

/// Add the credits of a pricing plan
pub async fn purchase_credits(
    State(workflow): State<Arc<BillWorkflow>>,
    Path(user_id): Path<String>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let Json(req) = payload?;
    let plan = find_plan(&req.plan).ok_or_else(|| AppError::UnknownPlan(req.plan.clone()))?;

    let grant = workflow.credits_config().signup_grant;
    workflow.store().ensure_account(&user_id, grant).await?;
    let account = workflow.store().add_credits(&user_id, plan.credits).await?;

    tracing::info!("{} bought plan {} (+{} credits)", user_id, plan.id, plan.credits);
    Ok(Json(account))
}

pub async fn list_history(
    State(workflow): State<Arc<BillWorkflow>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let records = workflow.store().list_history(&user_id, limit).await?;
    Ok(Json(records))
}

pub async fn get_history(
    State(workflow): State<Arc<BillWorkflow>>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<HistoryRecord>, AppError> {
    workflow
        .store()
        .get_history(&user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("analysis {id}")))
}
