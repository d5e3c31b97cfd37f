//! In-memory ledger store.
//!
//! Backs the integration tests and gateway-less development runs. One mutex
//! guards the whole state; every [`LedgerStore`] unit takes the lock once,
//! never awaits while holding it, and writes back only after the plan
//! validated — so failed units leave the state byte-for-byte untouched,
//! matching the Postgres backend's rollback behavior.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{
    FundingReceipt, LedgerStore, Reallocation, ReleaseOutcome, TransferOutcome, TransferRequest,
};
use crate::ledger::models::new_tx_ref;
use crate::ledger::{
    Account, Booking, BookingStatus, FrozenDeposit, FrozenStatus, LedgerError, Property,
    TransferInputs, TxKind, TxRecord, TxStatus, UserProfile, plan_transfer,
};

#[derive(Default)]
struct MemState {
    users: HashMap<i64, UserProfile>,
    /// Keyed by account number.
    accounts: HashMap<String, Account>,
    accounts_by_user: HashMap<i64, String>,
    bookings: HashMap<String, Booking>,
    properties: HashMap<String, Property>,
    /// Keyed by `(account_no, booking_id)`.
    frozen: HashMap<(String, String), FrozenDeposit>,
    transactions: Vec<TxRecord>,
}

#[derive(Default)]
pub struct MemLedger {
    state: Mutex<MemState>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Seed helpers for the external collaborator records (users, bookings,
    // properties are owned by the marketplace CRUD service in production).
    // ------------------------------------------------------------------

    pub fn insert_user(&self, user_id: i64, email: &str, display_name: &str) {
        self.state.lock().unwrap().users.insert(
            user_id,
            UserProfile {
                user_id,
                email: email.to_string(),
                display_name: display_name.to_string(),
            },
        );
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.state
            .lock()
            .unwrap()
            .bookings
            .insert(booking.booking_id.clone(), booking);
    }

    pub fn insert_property(&self, property: Property) {
        self.state
            .lock()
            .unwrap()
            .properties
            .insert(property.property_id.clone(), property);
    }

    /// Directly set an account's pools. Test seeding only; production funds
    /// arrive through deposits.
    pub fn set_funds(&self, account_no: &str, balance: Decimal, deposit: Decimal) {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.get_mut(account_no) {
            account.balance = balance;
            account.deposit = deposit;
        }
    }

    pub fn booking(&self, booking_id: &str) -> Option<Booking> {
        self.state.lock().unwrap().bookings.get(booking_id).cloned()
    }

    pub fn property(&self, property_id: &str) -> Option<Property> {
        self.state
            .lock()
            .unwrap()
            .properties
            .get(property_id)
            .cloned()
    }
}

#[async_trait]
impl LedgerStore for MemLedger {
    async fn create_account(
        &self,
        user_id: i64,
        account_no: &str,
    ) -> Result<Account, LedgerError> {
        let mut state = self.state.lock().unwrap();
        if state.accounts_by_user.contains_key(&user_id) {
            return Err(LedgerError::invalid(format!(
                "user {} already has an account",
                user_id
            )));
        }
        if state.accounts.contains_key(account_no) {
            return Err(LedgerError::Conflict);
        }
        let account = Account::new(account_no.to_string(), user_id);
        state
            .accounts
            .insert(account_no.to_string(), account.clone());
        state
            .accounts_by_user
            .insert(user_id, account_no.to_string());
        Ok(account)
    }

    async fn account_by_user(&self, user_id: i64) -> Result<Option<Account>, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts_by_user
            .get(&user_id)
            .and_then(|no| state.accounts.get(no))
            .cloned())
    }

    async fn account_by_no(&self, account_no: &str) -> Result<Option<Account>, LedgerError> {
        Ok(self.state.lock().unwrap().accounts.get(account_no).cloned())
    }

    async fn user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, LedgerError> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn execute_transfer(
        &self,
        req: &TransferRequest,
    ) -> Result<TransferOutcome, LedgerError> {
        let mut state = self.state.lock().unwrap();

        let from = state
            .accounts
            .get(&req.from_account_no)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(req.from_account_no.clone()))?;
        let to = state
            .accounts
            .get(&req.to_account_no)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(req.to_account_no.clone()))?;
        let platform = state.accounts.get(&req.platform_account_no).cloned();
        let booking = state
            .bookings
            .get(&req.booking_id)
            .cloned()
            .ok_or_else(|| LedgerError::BookingNotFound(req.booking_id.clone()))?;
        let property = state
            .properties
            .get(&booking.property_id)
            .cloned()
            .ok_or_else(|| LedgerError::PropertyNotFound(booking.property_id.clone()))?;

        // Validation happens entirely before the first write; an Err here
        // leaves the state untouched.
        let plan = plan_transfer(&TransferInputs {
            from: &from,
            to: &to,
            platform: platform.as_ref(),
            booking: &booking,
            property: &property,
            amount: req.amount,
        })?;

        {
            let a = state.accounts.get_mut(&req.from_account_no).unwrap();
            a.balance = plan.from_balance;
            a.deposit = plan.from_deposit;
        }
        state.accounts.get_mut(&req.to_account_no).unwrap().balance = plan.to_balance;
        if let Some(platform_balance) = plan.platform_balance {
            state
                .accounts
                .get_mut(&req.platform_account_no)
                .unwrap()
                .balance = platform_balance;
        }
        state.bookings.get_mut(&req.booking_id).unwrap().status = BookingStatus::Booked;
        state
            .properties
            .get_mut(&booking.property_id)
            .unwrap()
            .quantity = plan.property_quantity;

        let key = (req.from_account_no.clone(), req.booking_id.clone());
        let escrow = state
            .frozen
            .entry(key)
            .or_insert_with(|| FrozenDeposit::open(&req.from_account_no, &req.booking_id));
        escrow.frozen_amount += plan.escrow_increment;
        escrow.status = FrozenStatus::Frozen;
        escrow.updated_at = Utc::now();

        let tx_ref = new_tx_ref();
        let transfer_rec =
            TxRecord::new(from.user_id, TxKind::Transfer, plan.price, tx_ref.clone())
                .between(&req.from_account_no, &req.to_account_no);
        state.transactions.push(transfer_rec);

        if plan.service_fee > Decimal::ZERO {
            let fee_rec = TxRecord::new(
                from.user_id,
                TxKind::ServiceFee,
                plan.service_fee,
                new_tx_ref(),
            )
            .between(&req.from_account_no, &req.platform_account_no);
            state.transactions.push(fee_rec);
        }

        Ok(TransferOutcome {
            new_balance: plan.from_balance,
            price: plan.price,
            service_fee: plan.service_fee,
            tx_ref,
        })
    }

    async fn release_frozen_deposit(
        &self,
        booking_id: &str,
    ) -> Result<ReleaseOutcome, LedgerError> {
        let mut state = self.state.lock().unwrap();

        let key = state
            .frozen
            .iter()
            .find(|((_, bk), fd)| bk == booking_id && fd.status == FrozenStatus::Frozen)
            .map(|(k, _)| k.clone())
            .ok_or_else(|| LedgerError::FrozenDepositNotFound(booking_id.to_string()))?;

        let frozen_amount = state.frozen[&key].frozen_amount;
        let account_no = key.0.clone();

        let new_deposit = {
            let account = state
                .accounts
                .get_mut(&account_no)
                .ok_or_else(|| LedgerError::AccountNotFound(account_no.clone()))?;
            account.deposit += frozen_amount;
            account.deposit
        };

        let escrow = state.frozen.get_mut(&key).unwrap();
        escrow.frozen_amount = Decimal::ZERO;
        escrow.status = FrozenStatus::Released;
        escrow.updated_at = Utc::now();

        Ok(ReleaseOutcome {
            account_no,
            released_amount: frozen_amount,
            new_deposit,
        })
    }

    async fn frozen_deposit(
        &self,
        account_no: &str,
        booking_id: &str,
    ) -> Result<Option<FrozenDeposit>, LedgerError> {
        let key = (account_no.to_string(), booking_id.to_string());
        Ok(self.state.lock().unwrap().frozen.get(&key).cloned())
    }

    async fn record_deposit(&self, receipt: &FundingReceipt) -> Result<Decimal, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let new_balance = {
            let account = state
                .accounts
                .get_mut(&receipt.account_no)
                .ok_or_else(|| LedgerError::AccountNotFound(receipt.account_no.clone()))?;
            account.balance += receipt.amount;
            account.balance
        };
        let rec = TxRecord::new(
            receipt.user_id,
            TxKind::Deposit,
            receipt.amount,
            receipt.tx_ref.clone(),
        )
        .via_gateway(&receipt.payment_url, &receipt.provider);
        state.transactions.push(rec);
        Ok(new_balance)
    }

    async fn record_withdrawal(
        &self,
        receipt: &FundingReceipt,
    ) -> Result<Decimal, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let new_balance = {
            let account = state
                .accounts
                .get_mut(&receipt.account_no)
                .ok_or_else(|| LedgerError::AccountNotFound(receipt.account_no.clone()))?;
            if account.balance < receipt.amount {
                return Err(LedgerError::InsufficientFunds("balance"));
            }
            account.balance -= receipt.amount;
            account.balance
        };
        let rec = TxRecord::new(
            receipt.user_id,
            TxKind::Withdrawal,
            receipt.amount,
            receipt.tx_ref.clone(),
        )
        .via_gateway(&receipt.payment_url, &receipt.provider);
        state.transactions.push(rec);
        Ok(new_balance)
    }

    async fn reallocate(
        &self,
        user_id: i64,
        direction: Reallocation,
        amount: Decimal,
    ) -> Result<Account, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let account_no = state
            .accounts_by_user
            .get(&user_id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(format!("user:{}", user_id)))?;

        let (updated, kind) = {
            let account = state.accounts.get_mut(&account_no).unwrap();
            let kind = match direction {
                Reallocation::ToDeposit => {
                    if account.balance < amount {
                        return Err(LedgerError::InsufficientFunds("balance"));
                    }
                    account.balance -= amount;
                    account.deposit += amount;
                    TxKind::OwnDeposit
                }
                Reallocation::ToBalance => {
                    if account.deposit < amount {
                        return Err(LedgerError::InsufficientFunds("deposit"));
                    }
                    account.deposit -= amount;
                    account.balance += amount;
                    TxKind::DepositToBalance
                }
            };
            (account.clone(), kind)
        };

        state
            .transactions
            .push(TxRecord::new(user_id, kind, amount, new_tx_ref()));
        Ok(updated)
    }

    async fn transactions_for_user(&self, user_id: i64) -> Result<Vec<TxRecord>, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut txs: Vec<TxRecord> = state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        txs.reverse();
        Ok(txs)
    }

    async fn unseen_count(&self, user_id: i64) -> Result<i64, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id && !t.seen)
            .count() as i64)
    }

    async fn mark_transactions_seen(&self, user_id: i64) -> Result<u64, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let mut marked = 0u64;
        for t in state
            .transactions
            .iter_mut()
            .filter(|t| t.user_id == user_id && !t.seen)
        {
            t.seen = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn set_transaction_status(
        &self,
        tx_ref: &str,
        status: TxStatus,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();
        let rec = state
            .transactions
            .iter_mut()
            .find(|t| t.tx_ref == tx_ref)
            .ok_or_else(|| LedgerError::TransactionNotFound(tx_ref.to_string()))?;
        rec.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn account_creation_enforces_both_uniqueness_rules() {
        let store = MemLedger::new();
        store.create_account(1, "1000000001").await.unwrap();

        let err = store.create_account(2, "1000000001").await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict));

        let err = store.create_account(1, "1000000002").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn withdrawal_is_rechecked_inside_the_unit() {
        let store = MemLedger::new();
        store.create_account(1, "1000000001").await.unwrap();
        store.set_funds("1000000001", Decimal::from(50), Decimal::ZERO);

        let receipt = FundingReceipt {
            user_id: 1,
            account_no: "1000000001".to_string(),
            amount: Decimal::from(80),
            tx_ref: new_tx_ref(),
            payment_url: "https://checkout.example/x".to_string(),
            provider: "testpay".to_string(),
        };
        let err = store.record_withdrawal(&receipt).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds("balance")));

        // no log row and no balance change on failure
        let account = store.account_by_no("1000000001").await.unwrap().unwrap();
        assert_eq!(account.balance, Decimal::from(50));
        assert_eq!(store.unseen_count(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn seen_flags_flip_once() {
        let store = MemLedger::new();
        store.create_account(1, "1000000001").await.unwrap();
        for _ in 0..2 {
            let receipt = FundingReceipt {
                user_id: 1,
                account_no: "1000000001".to_string(),
                amount: Decimal::from(10),
                tx_ref: new_tx_ref(),
                payment_url: "https://checkout.example/x".to_string(),
                provider: "testpay".to_string(),
            };
            store.record_deposit(&receipt).await.unwrap();
        }

        assert_eq!(store.unseen_count(1).await.unwrap(), 2);
        assert_eq!(store.mark_transactions_seen(1).await.unwrap(), 2);
        assert_eq!(store.unseen_count(1).await.unwrap(), 0);
        assert_eq!(store.mark_transactions_seen(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_tx_ref_is_not_found() {
        let store = MemLedger::new();
        let err = store
            .set_transaction_status("sf-missing", TxStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransactionNotFound(_)));
    }
}
