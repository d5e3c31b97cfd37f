//! Wallet route handlers.
//!
//! Thin layer over [`WalletService`]: deserialize, parse amounts, delegate,
//! map failures through [`super::types::reject`]. Amounts cross the wire as
//! decimal strings.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::state::AppState;
use super::types::{ApiResponse, ApiResult, ok, reject, rejection};
use crate::ledger::{Account, FrozenDeposit, LedgerError, TxRecord};
use crate::store::{ReleaseOutcome, TransferOutcome};
use crate::wallet::{BalanceView, CheckoutOutcome};

fn parse_amount(raw: &str) -> Result<Decimal, (StatusCode, Json<ApiResponse<()>>)> {
    Decimal::from_str(raw.trim())
        .map_err(|_| rejection(LedgerError::invalid(format!("invalid amount: {}", raw))))
}

// --- Requests ---

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequestBody {
    #[serde(rename = "fromAccountNo")]
    pub from_account_no: String,
    #[serde(rename = "toAccountNo")]
    pub to_account_no: String,
    pub amount: String,
    #[serde(rename = "bookingId")]
    pub booking_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FundingRequestBody {
    pub user_id: i64,
    pub amount: String,
    /// Withdrawals only: which provider rail to pay out through.
    #[serde(default)]
    pub gateway: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub tx_ref: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EscrowQuery {
    pub account_no: String,
}

// --- Responses ---

#[derive(Debug, Serialize)]
pub struct SeenResponse {
    pub marked: u64,
}

#[derive(Debug, Serialize)]
pub struct UnseenResponse {
    pub unseen: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// --- Handlers ---

/// POST /api/v1/wallet/account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<Account> {
    match state.wallet.create_account(req.user_id).await {
        Ok(account) => ok(account),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/transfer — booking payment
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequestBody>,
) -> ApiResult<TransferOutcome> {
    let amount = parse_amount(&req.amount)?;
    match state
        .wallet
        .transfer(
            &req.from_account_no,
            &req.to_account_no,
            amount,
            &req.booking_id,
        )
        .await
    {
        Ok(outcome) => ok(outcome),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/deposit
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundingRequestBody>,
) -> ApiResult<CheckoutOutcome> {
    let amount = parse_amount(&req.amount)?;
    match state.wallet.deposit(req.user_id, amount).await {
        Ok(outcome) => ok(outcome),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/withdraw
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundingRequestBody>,
) -> ApiResult<CheckoutOutcome> {
    let amount = parse_amount(&req.amount)?;
    match state.wallet.withdraw(req.user_id, amount, req.gateway).await {
        Ok(outcome) => ok(outcome),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/own-deposit — balance into the deposit pool
pub async fn own_deposit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundingRequestBody>,
) -> ApiResult<BalanceView> {
    let amount = parse_amount(&req.amount)?;
    match state.wallet.own_deposit(req.user_id, amount).await {
        Ok(view) => ok(view),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/deposit-to-balance — deposit pool back into balance
pub async fn deposit_to_balance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundingRequestBody>,
) -> ApiResult<BalanceView> {
    let amount = parse_amount(&req.amount)?;
    match state.wallet.deposit_to_balance(req.user_id, amount).await {
        Ok(view) => ok(view),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/release/{booking_id}
pub async fn release_frozen_deposit(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> ApiResult<ReleaseOutcome> {
    match state.wallet.release_frozen_deposit(&booking_id).await {
        Ok(outcome) => ok(outcome),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/wallet/escrow/{booking_id}?account_no=...
pub async fn get_frozen_deposit(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Query(q): Query<EscrowQuery>,
) -> ApiResult<FrozenDeposit> {
    match state.wallet.frozen_deposit(&q.account_no, &booking_id).await {
        Ok(Some(fd)) => ok(fd),
        Ok(None) => reject(LedgerError::FrozenDepositNotFound(booking_id)),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/wallet/balance/{user_id}
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<BalanceView> {
    match state.wallet.balance_of(user_id).await {
        Ok(view) => ok(view),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/wallet/account/{account_no}
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_no): Path<String>,
) -> ApiResult<Account> {
    match state.wallet.account_by_no(&account_no).await {
        Ok(account) => ok(account),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/wallet/transactions/{user_id}
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<TxRecord>> {
    match state.wallet.transactions(user_id).await {
        Ok(txs) => ok(txs),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/wallet/transactions/{user_id}/unseen
pub async fn get_unseen_count(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<UnseenResponse> {
    match state.wallet.unseen_count(user_id).await {
        Ok(unseen) => ok(UnseenResponse { unseen }),
        Err(e) => reject(e),
    }
}

/// POST /api/v1/wallet/transactions/{user_id}/seen
pub async fn mark_seen(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<SeenResponse> {
    match state.wallet.mark_seen(user_id).await {
        Ok(marked) => ok(SeenResponse { marked }),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/payment/callback?tx_ref=...&status=...
///
/// Target of the provider's status report; flips the transaction row.
pub async fn payment_callback(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CallbackQuery>,
) -> ApiResult<()> {
    match state.wallet.payment_callback(&q.tx_ref, &q.status).await {
        Ok(()) => ok(()),
        Err(e) => reject(e),
    }
}

/// GET /api/v1/health
pub async fn health_check() -> ApiResult<HealthResponse> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
