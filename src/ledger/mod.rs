//! Ledger core: account/booking/escrow record shapes, the error taxonomy,
//! account-number generation and the pure transfer planner.
//!
//! Everything here is synchronous and store-agnostic. The [`crate::store`]
//! backends load records, run [`transfer::plan_transfer`] and apply the
//! resulting plan inside their own atomic unit.

pub mod account_no;
pub mod error;
pub mod models;
pub mod transfer;

pub use error::LedgerError;
pub use models::{
    Account, ApprovalStatus, Booking, BookingStatus, FrozenDeposit, FrozenStatus, Property,
    TxKind, TxRecord, TxStatus, UserProfile,
};
pub use transfer::{TransferInputs, TransferPlan, plan_transfer};
