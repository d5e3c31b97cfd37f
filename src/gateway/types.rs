//! API response envelope and error codes.
//!
//! Every endpoint answers with `ApiResponse<T>`:
//! - code: 0 = success, non-zero = error code
//! - msg: short message description
//! - data: actual data (success) or absent (error)

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::ledger::LedgerError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVENTORY_EXHAUSTED: i32 = 1003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4091;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const GATEWAY_ERROR: i32 = 5002;
}

/// Handler result alias: success envelope or (status, error envelope).
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Map a ledger failure onto HTTP status + error code, message verbatim.
pub fn reject<T>(err: LedgerError) -> ApiResult<T> {
    Err(rejection(err))
}

pub fn rejection(err: LedgerError) -> (StatusCode, Json<ApiResponse<()>>) {
    let (status, code) = match &err {
        LedgerError::InvalidInput(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
        LedgerError::InsufficientFunds(_) => {
            (StatusCode::BAD_REQUEST, error_codes::INSUFFICIENT_BALANCE)
        }
        LedgerError::InventoryExhausted => {
            (StatusCode::BAD_REQUEST, error_codes::INVENTORY_EXHAUSTED)
        }
        LedgerError::AccountNotFound(_)
        | LedgerError::UserNotFound(_)
        | LedgerError::BookingNotFound(_)
        | LedgerError::PropertyNotFound(_)
        | LedgerError::FrozenDepositNotFound(_)
        | LedgerError::TransactionNotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        LedgerError::Conflict | LedgerError::AccountNoExhausted => {
            (StatusCode::CONFLICT, error_codes::CONFLICT)
        }
        LedgerError::Gateway(_) => (StatusCode::BAD_GATEWAY, error_codes::GATEWAY_ERROR),
        LedgerError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
        }
    };
    if status.is_server_error() {
        tracing::error!("request failed: {}", err);
    } else {
        tracing::warn!("request rejected: {}", err);
    }
    (status, Json(ApiResponse::<()>::error(code, err.to_string())))
}
