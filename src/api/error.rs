use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session is no longer valid: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(truncated),
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::Status {
                status: status.as_u16(),
                body: truncated,
            },
        }
    }

    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::ServerError(_) => Some(500),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, "nope"),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::FORBIDDEN, ""),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::Status { status: 422, .. }
        ));
    }

    #[test]
    fn test_body_preserved_in_error() {
        let err = ApiError::from_status(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"detail": "Incorrect email or password"}"#,
        );
        match err {
            ApiError::Unauthorized(body) => assert!(body.contains("Incorrect email")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::ServerError(msg) => {
                assert!(msg.len() < 600);
                assert!(msg.contains("truncated, 2000 total bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(ApiError::Unauthorized(String::new()).status(), Some(401));
        assert_eq!(
            ApiError::Status { status: 409, body: String::new() }.status(),
            Some(409)
        );
        assert_eq!(ApiError::Timeout.status(), None);
    }
}
