//! Days Upload Lambda - Handles POST /upload/days.
//!
//! Accepts a school calendar CSV export and upserts one day record per date,
//! assigning each date the schedule named in its caption.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::db::{create_pool, ensure_schema};
use shared::http::{failure_response, json_response, ApiResponse};
use shared::{
    csv_upload, get_database_credentials, get_upload_token, ingest_days, log_progress, Config,
    PgDocumentStore, UploadResponse,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    store: PgDocumentStore,
    upload_token: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let token_source = config
            .upload_token
            .as_ref()
            .ok_or("UPLOAD_TOKEN_SECRET_ARN or UPLOAD_TOKEN not set")?;
        let upload_token = get_upload_token(&secrets_client, token_source).await?;

        let creds = get_database_credentials(&secrets_client, &config.db_secret_arn).await?;
        let pool = create_pool(&config, &creds).await?;
        ensure_schema(&pool).await?;

        Ok(Self {
            store: PgDocumentStore::new(pool),
            upload_token,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let csv_text = csv_upload!(&event, &state.upload_token);

    info!("Processing days upload ({} bytes)", csv_text.len());

    match ingest_days(&state.store, &csv_text, log_progress).await {
        Ok(summary) => json_response(
            200,
            &ApiResponse::success(UploadResponse {
                saved: summary.inserted,
                updated: summary.replaced,
                warnings: Vec::new(),
            }),
        ),
        Err(e) => failure_response(&e, "Failed to import days"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
