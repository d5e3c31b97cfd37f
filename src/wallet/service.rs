//! Wallet operation surface.
//!
//! `WalletService` owns the store and the payment gateway adapter and
//! exposes one method per externally-triggered operation. Input validation
//! lives here; atomicity lives in the store; money arithmetic lives in
//! [`crate::ledger::transfer`].

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::WalletConfig;
use crate::ledger::models::new_tx_ref;
use crate::ledger::{Account, FrozenDeposit, LedgerError, TxRecord, TxStatus, account_no};
use crate::store::{
    FundingReceipt, LedgerStore, Reallocation, ReleaseOutcome, TransferOutcome, TransferRequest,
};
use crate::wallet::payment::{InitializePayment, PaymentGateway};

/// Balance snapshot returned by the read operations.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BalanceView {
    pub account_no: String,
    pub balance: Decimal,
    pub deposit: Decimal,
}

impl From<Account> for BalanceView {
    fn from(a: Account) -> Self {
        Self {
            account_no: a.account_no,
            balance: a.balance,
            deposit: a.deposit,
        }
    }
}

/// Result of a deposit/withdraw initiation: where to send the payer, and
/// the balance after the optimistic ledger move.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutOutcome {
    pub checkout_url: String,
    pub balance: Decimal,
}

pub struct WalletService {
    store: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
    cfg: WalletConfig,
}

impl WalletService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        cfg: WalletConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            cfg,
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Open a wallet account for a user. Samples 10-digit numbers until the
    /// store accepts one, bounded by [`account_no::MAX_ATTEMPTS`].
    pub async fn create_account(&self, user_id: i64) -> Result<Account, LedgerError> {
        self.store
            .user_profile(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))?;

        for attempt in 0..account_no::MAX_ATTEMPTS {
            let candidate = account_no::generate();
            match self.store.create_account(user_id, &candidate).await {
                Ok(account) => {
                    tracing::info!(user = user_id, account = %account.account_no, "account opened");
                    return Ok(account);
                }
                Err(LedgerError::Conflict) => {
                    tracing::warn!(
                        user = user_id,
                        attempt,
                        "account number collision, regenerating"
                    );
                    tokio::time::sleep(account_no::backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
        Err(LedgerError::AccountNoExhausted)
    }

    /// Booking payment: the caller authorizes `amount`, which must cover at
    /// least the booking price; any overshoot is collected by the platform
    /// account as a service fee.
    pub async fn transfer(
        &self,
        from_account_no: &str,
        to_account_no: &str,
        amount: Decimal,
        booking_id: &str,
    ) -> Result<TransferOutcome, LedgerError> {
        for (field, value) in [
            ("fromAccountNo", from_account_no),
            ("toAccountNo", to_account_no),
            ("bookingId", booking_id),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::invalid(format!("{} is required", field)));
            }
        }
        ensure_positive(amount)?;

        self.store
            .execute_transfer(&TransferRequest {
                from_account_no: from_account_no.to_string(),
                to_account_no: to_account_no.to_string(),
                amount,
                booking_id: booking_id.to_string(),
                platform_account_no: self.cfg.platform_account_no.clone(),
            })
            .await
    }

    /// Top up the spendable balance through the payment provider.
    ///
    /// The credit is optimistic: it lands as soon as the provider opens a
    /// checkout session, not when the payer completes it. The status
    /// callback only flips the transaction row afterwards.
    pub async fn deposit(
        &self,
        user_id: i64,
        amount: Decimal,
    ) -> Result<CheckoutOutcome, LedgerError> {
        ensure_positive(amount)?;
        let user = self
            .store
            .user_profile(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))?;
        let account = self
            .store
            .account_by_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(format!("user:{}", user_id)))?;

        let tx_ref = new_tx_ref();
        let session = self
            .gateway
            .initialize(&InitializePayment {
                amount,
                currency: self.cfg.currency.clone(),
                email: user.email,
                name: user.display_name,
                account_no: account.account_no.clone(),
                tx_ref: tx_ref.clone(),
                callback_url: self.cfg.callback_url.clone(),
            })
            .await
            .map_err(|e| LedgerError::Gateway(e.to_string()))?;

        let balance = self
            .store
            .record_deposit(&FundingReceipt {
                user_id,
                account_no: account.account_no,
                amount,
                tx_ref,
                payment_url: session.checkout_url.clone(),
                provider: session.provider,
            })
            .await?;

        tracing::info!(user = user_id, %amount, "deposit initiated and credited");
        Ok(CheckoutOutcome {
            checkout_url: session.checkout_url,
            balance,
        })
    }

    /// Withdraw from the spendable balance through the payment provider.
    /// Sufficiency is checked before the provider is ever contacted.
    pub async fn withdraw(
        &self,
        user_id: i64,
        amount: Decimal,
        provider: Option<String>,
    ) -> Result<CheckoutOutcome, LedgerError> {
        ensure_positive(amount)?;
        let user = self
            .store
            .user_profile(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))?;
        let account = self
            .store
            .account_by_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(format!("user:{}", user_id)))?;

        if account.balance < amount {
            return Err(LedgerError::InsufficientFunds("balance"));
        }

        let tx_ref = new_tx_ref();
        let session = self
            .gateway
            .initialize(&InitializePayment {
                amount,
                currency: self.cfg.currency.clone(),
                email: user.email,
                name: user.display_name,
                account_no: account.account_no.clone(),
                tx_ref: tx_ref.clone(),
                callback_url: self.cfg.callback_url.clone(),
            })
            .await
            .map_err(|e| LedgerError::Gateway(e.to_string()))?;

        let balance = self
            .store
            .record_withdrawal(&FundingReceipt {
                user_id,
                account_no: account.account_no,
                amount,
                tx_ref,
                payment_url: session.checkout_url.clone(),
                provider: provider.unwrap_or(session.provider),
            })
            .await?;

        tracing::info!(user = user_id, %amount, "withdrawal initiated and debited");
        Ok(CheckoutOutcome {
            checkout_url: session.checkout_url,
            balance,
        })
    }

    /// own-deposit: move spendable balance into the escrow deposit pool.
    pub async fn own_deposit(
        &self,
        user_id: i64,
        amount: Decimal,
    ) -> Result<BalanceView, LedgerError> {
        ensure_positive(amount)?;
        let account = self
            .store
            .reallocate(user_id, Reallocation::ToDeposit, amount)
            .await?;
        Ok(account.into())
    }

    /// deposit-to-balance: move escrow deposit pool back into balance.
    pub async fn deposit_to_balance(
        &self,
        user_id: i64,
        amount: Decimal,
    ) -> Result<BalanceView, LedgerError> {
        ensure_positive(amount)?;
        let account = self
            .store
            .reallocate(user_id, Reallocation::ToBalance, amount)
            .await?;
        Ok(account.into())
    }

    /// Reconciliation after rental completion: hand the frozen amount back
    /// to the payer's deposit pool.
    pub async fn release_frozen_deposit(
        &self,
        booking_id: &str,
    ) -> Result<ReleaseOutcome, LedgerError> {
        if booking_id.trim().is_empty() {
            return Err(LedgerError::invalid("bookingId is required"));
        }
        self.store.release_frozen_deposit(booking_id).await
    }

    pub async fn balance_of(&self, user_id: i64) -> Result<BalanceView, LedgerError> {
        let account = self
            .store
            .account_by_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(format!("user:{}", user_id)))?;
        Ok(account.into())
    }

    pub async fn account_by_no(&self, account_no: &str) -> Result<Account, LedgerError> {
        self.store
            .account_by_no(account_no)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_no.to_string()))
    }

    pub async fn frozen_deposit(
        &self,
        account_no: &str,
        booking_id: &str,
    ) -> Result<Option<FrozenDeposit>, LedgerError> {
        self.store.frozen_deposit(account_no, booking_id).await
    }

    pub async fn transactions(&self, user_id: i64) -> Result<Vec<TxRecord>, LedgerError> {
        self.store.transactions_for_user(user_id).await
    }

    pub async fn unseen_count(&self, user_id: i64) -> Result<i64, LedgerError> {
        self.store.unseen_count(user_id).await
    }

    pub async fn mark_seen(&self, user_id: i64) -> Result<u64, LedgerError> {
        self.store.mark_transactions_seen(user_id).await
    }

    /// Provider status callback: flip the transaction row for `tx_ref`.
    pub async fn payment_callback(
        &self,
        tx_ref: &str,
        status: &str,
    ) -> Result<(), LedgerError> {
        let status = match status {
            "success" | "completed" => TxStatus::Completed,
            "failed" | "cancelled" => TxStatus::Failed,
            other => {
                return Err(LedgerError::invalid(format!(
                    "unknown callback status: {}",
                    other
                )));
            }
        };
        self.store.set_transaction_status(tx_ref, status).await
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid("amount must be positive"));
    }
    Ok(())
}
