//! RPC error types and their HTTP mapping.

use atelier_verification::VerificationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing x-caller-address header")]
    MissingCaller,

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    fn kind(&self) -> &'static str {
        match self {
            Self::MissingCaller => "missing_caller",
            Self::Verification(e) => match e {
                VerificationError::Validation(_) => "validation",
                VerificationError::NotAuthorized { .. } => "not_authorized",
                VerificationError::StorageUnavailable { .. } => "storage_unavailable",
                VerificationError::LedgerUnavailable { .. } => "ledger_unavailable",
                VerificationError::LedgerRejected { .. } => "ledger_rejected",
                VerificationError::NotFound { .. } => "not_found",
            },
            Self::Server(_) => "server",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCaller => StatusCode::BAD_REQUEST,
            Self::Verification(e) => match e {
                VerificationError::Validation(_) => StatusCode::BAD_REQUEST,
                VerificationError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
                VerificationError::NotFound { .. } => StatusCode::NOT_FOUND,
                VerificationError::LedgerRejected { .. } => StatusCode::CONFLICT,
                VerificationError::StorageUnavailable { .. }
                | VerificationError::LedgerUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        }));
        (self.status_code(), body).into_response()
    }
}
