//! Error types for the ledger backend

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strategy_ledger::StrategyError;
use thiserror::Error;

/// Backend error types
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Strategy already exists: {0}")]
    AlreadyExists(String),

    #[error("Strategy limit of {0} reached")]
    CapacityReached(usize),

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl BackendError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BackendError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            BackendError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            BackendError::AlreadyExists(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            BackendError::CapacityReached(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "CAPACITY_REACHED")
            }
            BackendError::Strategy(err) => match err {
                StrategyError::Construction(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
                StrategyError::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
                StrategyError::StrategyTerminated => (StatusCode::CONFLICT, "STRATEGY_TERMINATED"),
                StrategyError::InsufficientShares { .. } => {
                    (StatusCode::BAD_REQUEST, "INSUFFICIENT_SHARES")
                }
                StrategyError::NoRewards => (StatusCode::UNPROCESSABLE_ENTITY, "NO_REWARDS"),
                StrategyError::SlippageExceeded { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "SLIPPAGE_EXCEEDED")
                }
                StrategyError::AdapterFailure(_) => (StatusCode::BAD_GATEWAY, "ADAPTER_FAILURE"),
                StrategyError::InvalidSwapData { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_SWAP_DATA")
                }
                StrategyError::ZeroAmount => (StatusCode::BAD_REQUEST, "ZERO_AMOUNT"),
                StrategyError::DepositTooSmall => (StatusCode::BAD_REQUEST, "DEPOSIT_TOO_SMALL"),
                StrategyError::MathOverflow
                | StrategyError::DivisionByZero
                | StrategyError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "LEDGER_ERROR"),
            },
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminated_maps_to_conflict() {
        let err = BackendError::from(StrategyError::StrategyTerminated);
        assert_eq!(
            err.status_and_code(),
            (StatusCode::CONFLICT, "STRATEGY_TERMINATED")
        );
    }

    #[test]
    fn test_ledger_message_is_passed_through() {
        let err = BackendError::from(StrategyError::ZeroAmount);
        assert_eq!(err.to_string(), "Amount must be greater than zero");
    }
}
