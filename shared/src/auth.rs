//! Bearer-token authentication for upload endpoints.

use lambda_http::http::header::AUTHORIZATION;
use lambda_http::http::HeaderMap;

use crate::{Error, Result};

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| Error::Auth("Authorization header is not valid text".to_string()))?;

    let token = value
        .trim()
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| Error::Auth("Authorization header is not a bearer token".to_string()))?;

    if token.is_empty() {
        return Err(Error::Auth("Empty bearer token".to_string()));
    }
    Ok(token)
}

/// Check that the request carries the configured upload token.
pub fn verify_bearer(headers: &HeaderMap, expected: &str) -> Result<()> {
    let token = bearer_token(headers)?;
    if expected.is_empty() || !constant_time_eq(token, expected) {
        return Err(Error::Auth("Bearer token does not match".to_string()));
    }
    Ok(())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer s3cret")).unwrap(), "s3cret");
        assert_eq!(bearer_token(&headers("  Bearer  s3cret ")).unwrap(), "s3cret");
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers("Bearer ")).is_err());
        assert!(bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_verify_bearer() {
        assert!(verify_bearer(&headers("Bearer s3cret"), "s3cret").is_ok());
        assert!(matches!(
            verify_bearer(&headers("Bearer wrong"), "s3cret"),
            Err(Error::Auth(_))
        ));
        assert!(verify_bearer(&headers("Bearer s3cret"), "").is_err());
    }
}
