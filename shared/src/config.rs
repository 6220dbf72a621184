//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

/// Where the upload bearer token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTokenSource {
    /// ARN of a Secrets Manager secret holding the token
    Secret(String),
    /// Token given directly, for local runs
    Literal(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database host
    pub db_host: String,
    /// Database name
    pub db_name: String,
    /// ARN of the secret containing database credentials
    pub db_secret_arn: String,
    /// Upload token location (upload functions only)
    pub upload_token: Option<UploadTokenSource>,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let upload_token = match (lookup("UPLOAD_TOKEN_SECRET_ARN"), lookup("UPLOAD_TOKEN")) {
            (Some(arn), _) if !arn.is_empty() => Some(UploadTokenSource::Secret(arn)),
            (_, Some(token)) if !token.is_empty() => Some(UploadTokenSource::Literal(token)),
            _ => None,
        };

        Ok(Self {
            db_host: required("DB_HOST")?,
            db_name: lookup("DB_NAME").unwrap_or_else(|| "bell_schedule".to_string()),
            db_secret_arn: required("DB_SECRET_ARN")?,
            upload_token,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}
