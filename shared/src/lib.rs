//! Shared library for the bell schedule Lambda functions.
//!
//! This crate turns calendar and schedule CSV exports into documents, upserts
//! them into the document store, and serves them back for display.

pub mod aggregate;
pub mod auth;
pub mod config;
pub mod db;
pub mod drain;
pub mod error;
pub mod http;
pub mod ingest;
pub mod lookup;
pub mod mapper;
pub mod models;
pub mod normalize;
pub mod secrets;
pub mod store;

pub use auth::{bearer_token, verify_bearer};
pub use config::{Config, UploadTokenSource};
pub use drain::{drain, log_progress, DrainProgress, DrainSummary};
pub use error::{Error, Result};
pub use ingest::{ingest_days, ingest_schedules, SchedulesIngest};
pub use lookup::{fetch_schedule, fetch_schedule_for_date};
pub use models::{DayRecord, ScheduleDocument, ScheduleEvent, ScheduleRow, UploadResponse, UploadWarning};
pub use secrets::{get_database_credentials, get_secret, get_upload_token, DatabaseCredentials};
pub use store::{Collection, MemoryCollection, PgDocumentStore, StoreError};
