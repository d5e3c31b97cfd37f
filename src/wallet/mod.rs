//! Wallet operation surface: the service layer the HTTP gateway calls, plus
//! the external payment-initiation adapter.

pub mod payment;
pub mod service;

pub use payment::{
    CheckoutSession, HttpPaymentGateway, InitializePayment, MockPaymentGateway, PaymentError,
    PaymentGateway,
};
pub use service::{BalanceView, CheckoutOutcome, WalletService};
