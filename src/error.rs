//! Controller error domain and its mapping onto HTTP status codes.

use hyper::StatusCode;
use thiserror::Error;

/// Every failure a resource store, the log proxy or the response writers
/// can report.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NameExists(String),

    /// The caller's resource version is stale.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NoSpace(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    ChecksumFail(String),

    #[error("{0}")]
    SizeLimitExceeded(String),

    /// The log database behind `/proxy/{dbType}` failed or refused the query.
    #[error("{0}")]
    LogBackend(String),

    #[error("failed to write response: {0}")]
    ResponseWrite(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Status code for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NameExists(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidArgument(_) | ApiError::ChecksumFail(_) => StatusCode::BAD_REQUEST,
            ApiError::NoSpace(_) => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::SizeLimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::LogBackend(_) => StatusCode::BAD_GATEWAY,
            ApiError::ResponseWrite(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Translate an error into the status code and message sent to the client.
///
/// Total over [`ApiError`]: an empty message is replaced with the canonical
/// reason phrase so the client always receives some text.
pub fn translate(err: &ApiError) -> (StatusCode, String) {
    let status = err.status();
    let mut message = err.to_string();
    if message.trim().is_empty() {
        message = status
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_string();
    }
    (status, message)
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidArgument(format!("failed to decode request body: {}", err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::LogBackend(err.to_string())
    }
}

impl From<hyper::http::Error> for ApiError {
    fn from(err: hyper::http::Error) -> Self {
        ApiError::ResponseWrite(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_kind(message: &str) -> Vec<ApiError> {
        let m = message.to_string();
        vec![
            ApiError::NotAuthorized(m.clone()),
            ApiError::NotFound(m.clone()),
            ApiError::NameExists(m.clone()),
            ApiError::Conflict(m.clone()),
            ApiError::InvalidArgument(m.clone()),
            ApiError::NoSpace(m.clone()),
            ApiError::NotImplemented(m.clone()),
            ApiError::ChecksumFail(m.clone()),
            ApiError::SizeLimitExceeded(m.clone()),
            ApiError::LogBackend(m.clone()),
            ApiError::ResponseWrite(m.clone()),
            ApiError::Internal(m),
        ]
    }

    #[test]
    fn test_translate_is_total() {
        for message in ["boom", "", "   "] {
            for err in every_kind(message) {
                let (status, msg) = translate(&err);
                assert!(
                    (400..600).contains(&status.as_u16()),
                    "{:?} mapped to {}",
                    err,
                    status
                );
                assert!(!msg.trim().is_empty(), "{:?} produced empty message", err);
            }
        }
    }

    #[test]
    fn test_translate_known_kinds() {
        assert_eq!(
            translate(&ApiError::not_found("function 'hello' not found")),
            (StatusCode::NOT_FOUND, "function 'hello' not found".to_string())
        );
        assert_eq!(
            translate(&ApiError::NameExists("x".into())).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            translate(&ApiError::invalid_argument("bad")).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            translate(&ApiError::LogBackend("down".into())).0,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_translate_fallback() {
        let (status, msg) = translate(&ApiError::internal(""));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Internal Server Error");
    }

    #[test]
    fn test_json_error_is_client_error() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
