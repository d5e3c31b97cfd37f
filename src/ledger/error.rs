use thiserror::Error;

/// Failure taxonomy for every money-moving operation.
///
/// Any variant raised inside a store unit aborts that unit as a whole; no
/// partial balance, escrow or inventory mutation survives a failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("booking {0} not found")]
    BookingNotFound(String),

    #[error("property {0} not found")]
    PropertyNotFound(String),

    #[error("no frozen deposit for booking {0}")]
    FrozenDepositNotFound(String),

    #[error("no transaction with reference {0}")]
    TransactionNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient {0}")]
    InsufficientFunds(&'static str),

    #[error("property has no remaining units")]
    InventoryExhausted,

    #[error("payment gateway error: {0}")]
    Gateway(String),

    /// Duplicate account number on insert. Retried internally by the
    /// generator, never surfaced to API callers as-is.
    #[error("account number already taken")]
    Conflict,

    #[error("could not allocate a unique account number")]
    AccountNoExhausted,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::InvalidInput(msg.into())
    }
}
