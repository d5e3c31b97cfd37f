//! Record shapes for the wallet ledger.
//!
//! Every shape is fully typed with defaults applied at construction time;
//! optional fields are explicit `Option`s, never absent keys checked at
//! runtime. String forms of the enum fields match what the stores persist
//! and what the mobile client already expects on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Per-user ledger account.
///
/// `balance` holds spendable funds, `deposit` the escrow pool that booking
/// payments freeze against. Both are non-negative at every observable point.
/// The account number is a 10-digit numeric string, globally unique and
/// immutable once assigned; it is distinct from the owning user id.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_no: String,
    pub user_id: i64,
    pub balance: Decimal,
    pub deposit: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(account_no: String, user_id: i64) -> Self {
        Self {
            account_no,
            user_id,
            balance: Decimal::ZERO,
            deposit: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }
}

/// Owner's answer to a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Accepted => "accepted",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "accepted" => Ok(ApprovalStatus::Accepted),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status: {}", other)),
        }
    }
}

/// Payment state of a booking. Flipped to `Booked` by a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Booked,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Booked => "booked",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "booked" => Ok(BookingStatus::Booked),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Booking as seen by the ledger: external collaborator record, read under
/// the transfer unit and mutated only through its `status` field.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub booking_id: String,
    pub property_id: String,
    pub tenant_id: i64,
    pub owner_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub approval: ApprovalStatus,
    pub status: BookingStatus,
    pub total_price: Decimal,
}

/// Property inventory view: the transfer unit decrements `quantity` by one
/// per paid booking and treats exhaustion as a hard failure.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub property_id: String,
    pub owner_id: i64,
    pub quantity: i32,
    pub verified: bool,
}

/// Identity fields the payment gateway needs for the payer.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
}

/// Escrow lifecycle of a frozen deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrozenStatus {
    Active,
    Frozen,
    Released,
}

impl FrozenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrozenStatus::Active => "active",
            FrozenStatus::Frozen => "frozen",
            FrozenStatus::Released => "released",
        }
    }
}

impl FromStr for FrozenStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FrozenStatus::Active),
            "frozen" => Ok(FrozenStatus::Frozen),
            "released" => Ok(FrozenStatus::Released),
            other => Err(format!("unknown frozen status: {}", other)),
        }
    }
}

/// Escrow record for one `(account, booking)` pair.
///
/// Created lazily on the first transfer for the pair with a zero amount,
/// then accumulated; release moves the amount back into the account's
/// deposit pool and zeroes it.
#[derive(Debug, Clone, Serialize)]
pub struct FrozenDeposit {
    pub id: String,
    pub account_no: String,
    pub booking_id: String,
    pub frozen_amount: Decimal,
    pub status: FrozenStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FrozenDeposit {
    /// Fresh escrow record for a pair, before any amount is frozen.
    pub fn open(account_no: &str, booking_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            account_no: account_no.to_string(),
            booking_id: booking_id.to_string(),
            frozen_amount: Decimal::ZERO,
            status: FrozenStatus::Frozen,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Kind of money movement a transaction row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    #[serde(rename = "deposit")]
    Deposit,
    #[serde(rename = "withdrawal")]
    Withdrawal,
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "own-deposit")]
    OwnDeposit,
    #[serde(rename = "deposit-to-balance")]
    DepositToBalance,
    #[serde(rename = "service_fee")]
    ServiceFee,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deposit => "deposit",
            TxKind::Withdrawal => "withdrawal",
            TxKind::Transfer => "transfer",
            TxKind::OwnDeposit => "own-deposit",
            TxKind::DepositToBalance => "deposit-to-balance",
            TxKind::ServiceFee => "service_fee",
        }
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TxKind::Deposit),
            "withdrawal" => Ok(TxKind::Withdrawal),
            "transfer" => Ok(TxKind::Transfer),
            "own-deposit" => Ok(TxKind::OwnDeposit),
            "deposit-to-balance" => Ok(TxKind::DepositToBalance),
            "service_fee" => Ok(TxKind::ServiceFee),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction settlement state. `Pending` rows are flipped by the payment
/// status callback; everything the ledger settles itself is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Completed,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Completed => "completed",
            TxStatus::Failed => "failed",
        }
    }
}

impl FromStr for TxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TxStatus::Pending),
            "completed" => Ok(TxStatus::Completed),
            "failed" => Ok(TxStatus::Failed),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// One row of the append-mostly transaction log.
///
/// Only `status` and `seen` are mutated after insert: `status` by the
/// gateway callback, `seen` by the unread-notification flow.
#[derive(Debug, Clone, Serialize)]
pub struct TxRecord {
    pub tx_id: String,
    pub user_id: i64,
    pub kind: TxKind,
    pub amount: Decimal,
    /// Unique reference correlating this row with an external gateway call.
    pub tx_ref: String,
    pub status: TxStatus,
    pub payment_url: Option<String>,
    pub payment_provider: Option<String>,
    pub from_account_no: Option<String>,
    pub to_account_no: Option<String>,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl TxRecord {
    pub fn new(user_id: i64, kind: TxKind, amount: Decimal, tx_ref: String) -> Self {
        Self {
            tx_id: Uuid::new_v4().to_string(),
            user_id,
            kind,
            amount,
            tx_ref,
            status: TxStatus::Completed,
            payment_url: None,
            payment_provider: None,
            from_account_no: None,
            to_account_no: None,
            seen: false,
            created_at: Utc::now(),
        }
    }

    pub fn between(mut self, from: &str, to: &str) -> Self {
        self.from_account_no = Some(from.to_string());
        self.to_account_no = Some(to.to_string());
        self
    }

    /// Gateway-mediated rows start `Pending`; the provider's status callback
    /// settles them.
    pub fn via_gateway(mut self, payment_url: &str, provider: &str) -> Self {
        self.payment_url = Some(payment_url.to_string());
        self.payment_provider = Some(provider.to_string());
        self.status = TxStatus::Pending;
        self
    }
}

/// Fresh unique reference for correlating with the payment gateway.
pub fn new_tx_ref() -> String {
    format!("sf-{}", Uuid::new_v4().simple())
}
