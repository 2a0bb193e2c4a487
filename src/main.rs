use medbill_analyzer::{
    api, create_pool, ensure_schema, AccountStore, AppConfig, BillWorkflow, HttpAnalysisClient,
    MemoryAccountStore, PgAccountStore,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging with local timestamps
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // accounts and history: postgres when configured, memory otherwise
    let store: Arc<dyn AccountStore> = match &config.database.url {
        Some(url) => {
            let pool = create_pool(url, config.database.max_connections).await?;
            ensure_schema(&pool).await?;
            info!("Database pool created");
            Arc::new(PgAccountStore::new(pool))
        }
        None => {
            warn!("No database configured, credits and history are kept in memory");
            Arc::new(MemoryAccountStore::new())
        }
    };

    let backend = Arc::new(HttpAnalysisClient::from_config(&config.analysis)?);
    info!("Analysis endpoint: {}", backend.endpoint());

    let workflow = Arc::new(BillWorkflow::new(backend, store, config.credits.clone()));
    let app = api::router(workflow);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/bills/categorize          - categorize + totals");
    info!("  POST /api/bills/analyze             - full analysis (1 credit)");
    info!("  GET  /api/users/:id/credits         - balance");
    info!("  POST /api/users/:id/credits         - buy a plan");
    info!("  GET  /api/users/:id/history[/:hid]  - past analyses");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
