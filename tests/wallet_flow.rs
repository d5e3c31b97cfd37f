//! End-to-end wallet flows over the in-memory store and mock payment
//! gateway: booking payments, escrow lifecycle, funding through the
//! provider, and the failure paths that must leave the ledger untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use stayfund::config::WalletConfig;
use stayfund::ledger::{
    ApprovalStatus, Booking, BookingStatus, FrozenStatus, LedgerError, Property, TxKind,
    TxStatus,
};
use stayfund::store::{LedgerStore, MemLedger};
use stayfund::wallet::{MockPaymentGateway, WalletService};

const TENANT: i64 = 1;
const OWNER: i64 = 2;
const PLATFORM_USER: i64 = 99;

const TENANT_ACC: &str = "1000000001";
const OWNER_ACC: &str = "1000000002";
const PLATFORM_ACC: &str = "9000000000";

struct Harness {
    svc: WalletService,
    store: Arc<MemLedger>,
    gateway: Arc<MockPaymentGateway>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemLedger::new());
        let gateway = Arc::new(MockPaymentGateway::new("testpay"));
        let svc = WalletService::new(store.clone(), gateway.clone(), WalletConfig::default());
        Self {
            svc,
            store,
            gateway,
        }
    }

    /// Tenant and owner with funded accounts, an accepted pending booking
    /// and a property with `quantity` units.
    async fn with_booking(price: i64, quantity: i32) -> Self {
        let h = Self::new();
        h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
        h.store.insert_user(OWNER, "owner@example.com", "Kebede");
        h.store
            .create_account(TENANT, TENANT_ACC)
            .await
            .unwrap();
        h.store.create_account(OWNER, OWNER_ACC).await.unwrap();
        h.store
            .set_funds(TENANT_ACC, Decimal::from(1000), Decimal::from(500));

        h.store.insert_property(Property {
            property_id: "pr-1".to_string(),
            owner_id: OWNER,
            quantity,
            verified: true,
        });
        h.store.insert_booking(Booking {
            booking_id: "bk-1".to_string(),
            property_id: "pr-1".to_string(),
            tenant_id: TENANT,
            owner_id: OWNER,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 8).unwrap(),
            approval: ApprovalStatus::Accepted,
            status: BookingStatus::Pending,
            total_price: Decimal::from(price),
        });
        h
    }

    async fn with_platform_account(self) -> Self {
        self.store
            .insert_user(PLATFORM_USER, "platform@example.com", "StayFund");
        self.store
            .create_account(PLATFORM_USER, PLATFORM_ACC)
            .await
            .unwrap();
        self
    }

    async fn balance(&self, account_no: &str) -> (Decimal, Decimal) {
        let a = self
            .store
            .account_by_no(account_no)
            .await
            .unwrap()
            .unwrap();
        (a.balance, a.deposit)
    }
}

fn d(v: i64) -> Decimal {
    Decimal::from(v)
}

#[tokio::test]
async fn booking_payment_moves_price_and_freezes_escrow() {
    let h = Harness::with_booking(300, 2).await;

    let outcome = h
        .svc
        .transfer(TENANT_ACC, OWNER_ACC, d(300), "bk-1")
        .await
        .unwrap();
    assert_eq!(outcome.price, d(300));
    assert_eq!(outcome.service_fee, Decimal::ZERO);
    assert_eq!(outcome.new_balance, d(700));

    assert_eq!(h.balance(TENANT_ACC).await, (d(700), d(200)));
    assert_eq!(h.balance(OWNER_ACC).await, (d(300), Decimal::ZERO));

    let frozen = h
        .svc
        .frozen_deposit(TENANT_ACC, "bk-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frozen.frozen_amount, d(300));
    assert_eq!(frozen.status, FrozenStatus::Frozen);

    assert_eq!(h.store.booking("bk-1").unwrap().status, BookingStatus::Booked);
    assert_eq!(h.store.property("pr-1").unwrap().quantity, 1);

    let txs = h.svc.transactions(TENANT).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TxKind::Transfer);
    assert_eq!(txs[0].amount, d(300));
    assert_eq!(txs[0].status, TxStatus::Completed);
    assert_eq!(txs[0].from_account_no.as_deref(), Some(TENANT_ACC));
    assert_eq!(txs[0].to_account_no.as_deref(), Some(OWNER_ACC));
}

#[tokio::test]
async fn overshoot_collects_the_service_fee_on_the_platform_account() {
    let h = Harness::with_booking(300, 1).await.with_platform_account().await;

    let outcome = h
        .svc
        .transfer(TENANT_ACC, OWNER_ACC, d(500), "bk-1")
        .await
        .unwrap();
    assert_eq!(outcome.price, d(300));
    assert_eq!(outcome.service_fee, d(200));
    assert_eq!(outcome.new_balance, d(500));

    assert_eq!(h.balance(TENANT_ACC).await, (d(500), d(200)));
    assert_eq!(h.balance(OWNER_ACC).await.0, d(300));
    assert_eq!(h.balance(PLATFORM_ACC).await.0, d(200));

    // payer sees both the transfer row and the fee row
    let txs = h.svc.transactions(TENANT).await.unwrap();
    assert_eq!(txs.len(), 2);
    let fee = txs.iter().find(|t| t.kind == TxKind::ServiceFee).unwrap();
    assert_eq!(fee.amount, d(200));
    assert_eq!(fee.to_account_no.as_deref(), Some(PLATFORM_ACC));
}

#[tokio::test]
async fn failed_payment_leaves_every_record_untouched() {
    let h = Harness::with_booking(300, 2).await;
    h.store.set_funds(TENANT_ACC, d(100), d(500));

    let err = h
        .svc
        .transfer(TENANT_ACC, OWNER_ACC, d(300), "bk-1")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds("balance")));

    assert_eq!(h.balance(TENANT_ACC).await, (d(100), d(500)));
    assert_eq!(h.balance(OWNER_ACC).await.0, Decimal::ZERO);
    assert!(h
        .svc
        .frozen_deposit(TENANT_ACC, "bk-1")
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        h.store.booking("bk-1").unwrap().status,
        BookingStatus::Pending
    );
    assert_eq!(h.store.property("pr-1").unwrap().quantity, 2);
    assert!(h.svc.transactions(TENANT).await.unwrap().is_empty());
}

#[tokio::test]
async fn exhausted_inventory_blocks_the_payment() {
    let h = Harness::with_booking(300, 0).await;

    let err = h
        .svc
        .transfer(TENANT_ACC, OWNER_ACC, d(300), "bk-1")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InventoryExhausted));
    assert_eq!(h.balance(TENANT_ACC).await, (d(1000), d(500)));
    assert!(h.svc.transactions(TENANT).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeat_payment_for_a_booking_accumulates_the_escrow() {
    let h = Harness::with_booking(200, 5).await;

    h.svc
        .transfer(TENANT_ACC, OWNER_ACC, d(200), "bk-1")
        .await
        .unwrap();
    h.svc
        .transfer(TENANT_ACC, OWNER_ACC, d(200), "bk-1")
        .await
        .unwrap();

    let frozen = h
        .svc
        .frozen_deposit(TENANT_ACC, "bk-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frozen.frozen_amount, d(400));
    assert_eq!(h.balance(TENANT_ACC).await, (d(600), d(100)));
    assert_eq!(h.store.property("pr-1").unwrap().quantity, 3);
}

#[tokio::test]
async fn release_hands_the_frozen_amount_back_to_the_deposit_pool() {
    let h = Harness::with_booking(300, 1).await;
    h.svc
        .transfer(TENANT_ACC, OWNER_ACC, d(300), "bk-1")
        .await
        .unwrap();
    let (_, deposit_before) = h.balance(TENANT_ACC).await;

    let outcome = h.svc.release_frozen_deposit("bk-1").await.unwrap();
    assert_eq!(outcome.account_no, TENANT_ACC);
    assert_eq!(outcome.released_amount, d(300));
    assert_eq!(outcome.new_deposit, deposit_before + d(300));

    let frozen = h
        .svc
        .frozen_deposit(TENANT_ACC, "bk-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frozen.frozen_amount, Decimal::ZERO);
    assert_eq!(frozen.status, FrozenStatus::Released);

    // double release has nothing frozen left to find
    let err = h.svc.release_frozen_deposit("bk-1").await.unwrap_err();
    assert!(matches!(err, LedgerError::FrozenDepositNotFound(_)));
}

#[tokio::test]
async fn withdrawal_over_balance_never_reaches_the_provider() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.create_account(TENANT, TENANT_ACC).await.unwrap();
    h.store.set_funds(TENANT_ACC, d(50), Decimal::ZERO);

    let err = h.svc.withdraw(TENANT, d(80), None).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds("balance")));
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(h.balance(TENANT_ACC).await.0, d(50));
}

#[tokio::test]
async fn provider_failure_aborts_the_deposit_without_a_ledger_trace() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.create_account(TENANT, TENANT_ACC).await.unwrap();
    h.gateway.set_fail(true);

    let err = h.svc.deposit(TENANT, d(200)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Gateway(_)));
    assert_eq!(h.balance(TENANT_ACC).await.0, Decimal::ZERO);
    assert!(h.svc.transactions(TENANT).await.unwrap().is_empty());
}

#[tokio::test]
async fn deposit_credits_optimistically_and_the_callback_settles_the_row() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.create_account(TENANT, TENANT_ACC).await.unwrap();

    let outcome = h.svc.deposit(TENANT, d(250)).await.unwrap();
    assert_eq!(outcome.balance, d(250));
    assert!(outcome.checkout_url.starts_with("https://checkout.example/"));

    let txs = h.svc.transactions(TENANT).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TxKind::Deposit);
    assert_eq!(txs[0].status, TxStatus::Pending);
    assert_eq!(txs[0].payment_provider.as_deref(), Some("testpay"));

    h.svc
        .payment_callback(&txs[0].tx_ref, "success")
        .await
        .unwrap();
    let txs = h.svc.transactions(TENANT).await.unwrap();
    assert_eq!(txs[0].status, TxStatus::Completed);
}

#[tokio::test]
async fn withdrawal_debits_and_the_callback_can_fail_the_row() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.create_account(TENANT, TENANT_ACC).await.unwrap();
    h.store.set_funds(TENANT_ACC, d(500), Decimal::ZERO);

    let outcome = h
        .svc
        .withdraw(TENANT, d(200), Some("telebirr".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.balance, d(300));

    let txs = h.svc.transactions(TENANT).await.unwrap();
    assert_eq!(txs[0].kind, TxKind::Withdrawal);
    assert_eq!(txs[0].status, TxStatus::Pending);
    assert_eq!(txs[0].payment_provider.as_deref(), Some("telebirr"));

    h.svc
        .payment_callback(&txs[0].tx_ref, "failed")
        .await
        .unwrap();
    let txs = h.svc.transactions(TENANT).await.unwrap();
    assert_eq!(txs[0].status, TxStatus::Failed);
}

#[tokio::test]
async fn pool_reallocation_round_trips_and_checks_the_source_pool() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.create_account(TENANT, TENANT_ACC).await.unwrap();
    h.store.set_funds(TENANT_ACC, d(400), d(100));

    let view = h.svc.own_deposit(TENANT, d(150)).await.unwrap();
    assert_eq!((view.balance, view.deposit), (d(250), d(250)));

    let view = h.svc.deposit_to_balance(TENANT, d(50)).await.unwrap();
    assert_eq!((view.balance, view.deposit), (d(300), d(200)));

    let err = h.svc.own_deposit(TENANT, d(1000)).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds("balance")));
    let err = h.svc.deposit_to_balance(TENANT, d(1000)).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds("deposit")));

    // both reallocations were logged under their own kinds
    let txs = h.svc.transactions(TENANT).await.unwrap();
    let kinds: Vec<TxKind> = txs.iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TxKind::OwnDeposit));
    assert!(kinds.contains(&TxKind::DepositToBalance));
}

#[tokio::test]
async fn unseen_counter_tracks_new_activity_until_marked() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.create_account(TENANT, TENANT_ACC).await.unwrap();

    h.svc.deposit(TENANT, d(100)).await.unwrap();
    h.svc.deposit(TENANT, d(100)).await.unwrap();
    assert_eq!(h.svc.unseen_count(TENANT).await.unwrap(), 2);

    assert_eq!(h.svc.mark_seen(TENANT).await.unwrap(), 2);
    assert_eq!(h.svc.unseen_count(TENANT).await.unwrap(), 0);

    h.svc.deposit(TENANT, d(100)).await.unwrap();
    assert_eq!(h.svc.unseen_count(TENANT).await.unwrap(), 1);
}

#[tokio::test]
async fn opened_accounts_get_a_fresh_ten_digit_number() {
    let h = Harness::new();
    h.store.insert_user(TENANT, "tenant@example.com", "Abeba");
    h.store.insert_user(OWNER, "owner@example.com", "Kebede");

    let a = h.svc.create_account(TENANT).await.unwrap();
    let b = h.svc.create_account(OWNER).await.unwrap();

    for acc in [&a, &b] {
        assert_eq!(acc.account_no.len(), 10);
        assert!(acc.account_no.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(acc.balance, Decimal::ZERO);
        assert_eq!(acc.deposit, Decimal::ZERO);
    }
    assert_ne!(a.account_no, b.account_no);

    // one account per user
    let err = h.svc.create_account(TENANT).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
}

#[tokio::test]
async fn unknown_callback_reference_is_reported_not_found() {
    let h = Harness::new();
    let err = h
        .svc
        .payment_callback("sf-deadbeef", "success")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::TransactionNotFound(_)));
}
