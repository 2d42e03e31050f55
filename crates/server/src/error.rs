use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use remsig_slashing::StoreError;
use thiserror::Error;

/// Request-scoped failure, mapped onto the HTTP surface as plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("type not supported")]
    UnsupportedType,
    #[error("unknown validator public key")]
    UnknownValidator,
    #[error("provided signing_root != computed signing_root (provided={provided} computed={computed})")]
    SigningRootMismatch { provided: String, computed: String },
    #[error("slashing protection: {kind} already signed for this (validator_pubkey, signing_root)")]
    AlreadySigned { kind: &'static str },
    #[error("slashing protection {kind}: {source}")]
    Storage {
        kind: &'static str,
        source: StoreError,
    },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::UnsupportedType
            | ApiError::SigningRootMismatch { .. }
            | ApiError::AlreadySigned { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnknownValidator => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::UnknownValidator.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::AlreadySigned { kind: "block" }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_mismatch_message_quotes_both_roots() {
        let err = ApiError::SigningRootMismatch {
            provided: "0xaa".into(),
            computed: "0xbb".into(),
        };
        let message = err.to_string();
        assert!(message.contains("provided=0xaa"));
        assert!(message.contains("computed=0xbb"));
    }
}
