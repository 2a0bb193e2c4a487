use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS mb_account (
        user_id     VARCHAR(128) PRIMARY KEY,
        credits     BIGINT NOT NULL CHECK (credits >= 0),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mb_analysis_history (
        id          UUID PRIMARY KEY,
        user_id     VARCHAR(128) NOT NULL REFERENCES mb_account (user_id),
        created_at  TIMESTAMPTZ NOT NULL,
        bill_name   TEXT NOT NULL,
        status      VARCHAR(32) NOT NULL,
        item_count  INTEGER NOT NULL,
        result      JSONB NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_mb_history_user_created
        ON mb_analysis_history (user_id, created_at DESC)
    "#,
];

/// Create tables on startup if missing
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database schema ready");
    Ok(())
}
