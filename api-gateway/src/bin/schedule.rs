//! Schedule Lambda - Handles GET /schedules.
//!
//! Endpoints:
//! - GET /schedules?name={name} - Schedule by name
//! - GET /schedules?date={M-D-YY} - Schedule assigned to a date

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use shared::db::create_pool;
use shared::http::{error_response, failure_response, json_response, method_not_allowed, ApiResponse};
use shared::{fetch_schedule, fetch_schedule_for_date, get_database_credentials, Config, PgDocumentStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    store: PgDocumentStore,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let creds = get_database_credentials(&secrets_client, &config.db_secret_arn).await?;
        let pool = create_pool(&config, &creds).await?;

        Ok(Self {
            store: PgDocumentStore::new(pool),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    if let Some(response) = method_not_allowed(&event, Method::GET)? {
        return Ok(response);
    }

    let params = event.query_string_parameters();

    let result = if let Some(name) = params.first("name") {
        info!("Fetching schedule {}", name);
        fetch_schedule(&state.store, name).await
    } else if let Some(date) = params.first("date") {
        info!("Fetching schedule for {}", date);
        fetch_schedule_for_date(&state.store, &state.store, date).await
    } else {
        return error_response(400, "name or date parameter required");
    };

    match result {
        Ok(schedule) => json_response(200, &ApiResponse::success(schedule)),
        Err(e @ shared::Error::NotFound(_)) => error_response(404, e.to_string()),
        Err(e) => failure_response(&e, "Failed to load schedule"),
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
