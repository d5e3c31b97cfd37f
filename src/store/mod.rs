//! Ledger store backends.
//!
//! [`LedgerStore`] is the seam between the wallet operations and
//! persistence. Every trait method is one all-or-nothing unit: the Postgres
//! backend runs it as a single SQL transaction with `FOR UPDATE` row locks,
//! the in-memory backend holds its one mutex for the duration. The store is
//! the sole serialization point; there is no in-process locking above it.

pub mod db;
pub mod mem;
pub mod pg;
pub mod schema;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::ledger::{
    Account, FrozenDeposit, LedgerError, TxRecord, TxStatus, UserProfile,
};

pub use db::Database;
pub use mem::MemLedger;
pub use pg::PgLedger;

/// Booking payment request as the store executes it. The platform account
/// number comes from service configuration, not from the caller.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_account_no: String,
    pub to_account_no: String,
    pub amount: Decimal,
    pub booking_id: String,
    pub platform_account_no: String,
}

/// Result of a committed booking payment.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TransferOutcome {
    /// Payer balance after price and fee left it.
    pub new_balance: Decimal,
    pub price: Decimal,
    pub service_fee: Decimal,
    /// Reference of the `transfer` transaction row.
    pub tx_ref: String,
}

/// Result of releasing a frozen deposit back into the account's pool.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReleaseOutcome {
    pub account_no: String,
    pub released_amount: Decimal,
    pub new_deposit: Decimal,
}

/// A settled gateway interaction to be applied to the balance and logged.
#[derive(Debug, Clone)]
pub struct FundingReceipt {
    pub user_id: i64,
    pub account_no: String,
    pub amount: Decimal,
    pub tx_ref: String,
    pub payment_url: String,
    pub provider: String,
}

/// Direction of an internal balance/deposit reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reallocation {
    /// own-deposit: move spendable balance into the deposit pool.
    ToDeposit,
    /// deposit-to-balance: move deposit pool back into spendable balance.
    ToBalance,
}

/// Persistence seam for the wallet ledger. Each method is atomic.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a fresh zero-balance account. Fails with `Conflict` when the
    /// account number is already taken (caller regenerates and retries) and
    /// with `InvalidInput` when the user already owns an account.
    async fn create_account(
        &self,
        user_id: i64,
        account_no: &str,
    ) -> Result<Account, LedgerError>;

    async fn account_by_user(&self, user_id: i64) -> Result<Option<Account>, LedgerError>;

    async fn account_by_no(&self, account_no: &str) -> Result<Option<Account>, LedgerError>;

    async fn user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, LedgerError>;

    /// The booking payment unit: balances, booking status, inventory,
    /// escrow upsert and log rows move together or not at all.
    async fn execute_transfer(
        &self,
        req: &TransferRequest,
    ) -> Result<TransferOutcome, LedgerError>;

    /// Compensating action after rental completion: move the frozen amount
    /// back into the account's deposit pool and mark the record released.
    async fn release_frozen_deposit(
        &self,
        booking_id: &str,
    ) -> Result<ReleaseOutcome, LedgerError>;

    async fn frozen_deposit(
        &self,
        account_no: &str,
        booking_id: &str,
    ) -> Result<Option<FrozenDeposit>, LedgerError>;

    /// Credit the balance and append the `deposit` log row. Returns the new
    /// balance.
    async fn record_deposit(&self, receipt: &FundingReceipt) -> Result<Decimal, LedgerError>;

    /// Debit the balance and append the `withdrawal` log row. Sufficiency is
    /// re-checked inside the unit. Returns the new balance.
    async fn record_withdrawal(&self, receipt: &FundingReceipt)
    -> Result<Decimal, LedgerError>;

    /// Internal reallocation between `balance` and `deposit`, validated
    /// against the source pool and logged under its own transaction kind.
    async fn reallocate(
        &self,
        user_id: i64,
        direction: Reallocation,
        amount: Decimal,
    ) -> Result<Account, LedgerError>;

    /// Newest-first transaction log for a user.
    async fn transactions_for_user(&self, user_id: i64) -> Result<Vec<TxRecord>, LedgerError>;

    async fn unseen_count(&self, user_id: i64) -> Result<i64, LedgerError>;

    /// Mark every unseen row seen; returns how many were flipped.
    async fn mark_transactions_seen(&self, user_id: i64) -> Result<u64, LedgerError>;

    /// Gateway status callback target: flip the row identified by `tx_ref`.
    async fn set_transaction_status(
        &self,
        tx_ref: &str,
        status: TxStatus,
    ) -> Result<(), LedgerError>;
}
