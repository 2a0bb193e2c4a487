pub mod handlers;

pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::service::BillWorkflow;

pub fn router(workflow: Arc<BillWorkflow>) -> Router {
    let bill_routes = Router::new()
        .route("/api/bills/categorize", post(categorize_bill))
        .route("/api/bills/analyze", post(analyze_bill));

    let user_routes = Router::new()
        .route(
            "/api/users/:user_id/credits",
            get(get_credits).post(purchase_credits),
        )
        .route("/api/users/:user_id/history", get(list_history))
        .route("/api/users/:user_id/history/:id", get(get_history));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/pricing", get(list_plans))
        .merge(bill_routes)
        .merge(user_routes)
        .with_state(workflow)
}
