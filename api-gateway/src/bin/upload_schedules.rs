//! Schedules Upload Lambda - Handles POST /upload/schedules.
//!
//! Accepts a class schedule CSV export, groups its rows into named schedules
//! and upserts each one. Rows that cannot be assigned to a schedule are
//! returned to the uploader as warnings.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::db::{create_pool, ensure_schema};
use shared::http::{failure_response, json_response, ApiResponse};
use shared::{
    csv_upload, get_database_credentials, get_upload_token, ingest_schedules, log_progress, Config,
    PgDocumentStore, UploadResponse, UploadWarning,
};
use std::sync::Arc;
use tracing::{info, warn};
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

    info!("Processing schedules upload ({} bytes)", csv_text.len());

    let result = match ingest_schedules(&state.store, &csv_text, log_progress).await {
        Ok(result) => result,
        Err(e) => return failure_response(&e, "Failed to import schedules"),
    };

    for orphan in &result.orphans {
        warn!(
            "Unassigned schedule row: '{}' ({} - {}), Day '{}'",
            orphan.description, orphan.start_time, orphan.end_time, orphan.day
        );
    }

    json_response(
        200,
        &ApiResponse::success(UploadResponse {
            saved: result.summary.inserted,
            updated: result.summary.replaced,
            warnings: result.orphans.into_iter().map(UploadWarning::from).collect(),
        }),
    )
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
