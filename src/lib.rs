//! StayFund — wallet & escrow ledger backend for a two-sided rental
//! marketplace.
//!
//! Per-user accounts carry a spendable `balance` and an escrow `deposit`
//! pool; booking payments move money between tenant and owner atomically,
//! freeze the booking price into a per-(account, booking) escrow record,
//! decrement property inventory and log every movement. Deposits and
//! withdrawals run through an external payment-initiation provider.
//!
//! # Modules
//!
//! - [`ledger`] - record shapes, error taxonomy, pure transfer planning
//! - [`store`] - `LedgerStore` seam with PostgreSQL and in-memory backends
//! - [`wallet`] - operation surface + payment gateway adapter
//! - [`gateway`] - axum HTTP surface
//! - [`config`] / [`logging`] - YAML config and tracing setup

pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod store;
pub mod wallet;

// Convenient re-exports at crate root
pub use ledger::{
    Account, Booking, BookingStatus, FrozenDeposit, FrozenStatus, LedgerError, Property,
    TxKind, TxRecord, TxStatus, UserProfile,
};
pub use store::{LedgerStore, MemLedger, PgLedger};
pub use wallet::{MockPaymentGateway, PaymentGateway, WalletService};
