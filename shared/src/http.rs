//! HTTP helpers for Lambda functions.

use lambda_http::http::header::CONTENT_TYPE;
use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};
use serde::Serialize;
use tracing::error;

use crate::auth::verify_bearer;
use crate::Error;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Create an error response with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ApiResponse::<()>::error(message))
}

/// Log a failure in full and answer with a generic message.
pub fn failure_response(err: &Error, generic_message: &str) -> Result<Response<Body>, lambda_http::Error> {
    error!("{}: {}", generic_message, err);
    error_response(err.status_code(), generic_message)
}

/// 405 rejection for any request whose method is not `allowed`.
pub fn method_not_allowed(event: &Request, allowed: Method) -> Result<Option<Response<Body>>, lambda_http::Error> {
    if event.method() == allowed {
        return Ok(None);
    }
    Ok(Some(error_response(405, "Method not allowed")?))
}

/// Validate an upload request and return its CSV body.
///
/// Returns `Ok(Ok(text))` for an acceptable upload, `Ok(Err(Response))` with
/// the rejection to send back, or `Err(lambda_http::Error)` if the rejection
/// could not be built.
pub fn read_csv_upload(
    event: &Request,
    expected_token: &str,
) -> Result<Result<String, Response<Body>>, lambda_http::Error> {
    if let Some(response) = method_not_allowed(event, Method::POST)? {
        return Ok(Err(response));
    }

    if let Err(e) = verify_bearer(event.headers(), expected_token) {
        error!("Rejected upload: {}", e);
        return Ok(Err(error_response(401, "Unauthorized")?));
    }

    let declares_csv = event
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("csv"));
    if !declares_csv {
        return Ok(Err(error_response(415, "Content-Type must be CSV")?));
    }

    let text = match std::str::from_utf8(event.body().as_ref()) {
        Ok(text) => text,
        Err(_) => return Ok(Err(error_response(400, "Body must be UTF-8 text")?)),
    };
    if text.trim().is_empty() {
        return Ok(Err(error_response(400, "Body cannot be empty")?));
    }

    Ok(Ok(text.to_string()))
}

/// Macro to read a CSV upload, returning early with the rejection response.
///
/// Usage:
/// ```ignore
/// let csv_text = csv_upload!(&event, &state.upload_token);
/// ```
#[macro_export]
macro_rules! csv_upload {
    ($event:expr, $token:expr) => {
        match shared::http::read_csv_upload($event, $token)? {
            Ok(text) => text,
            Err(response) => return Ok(response),
        }
    };
}
