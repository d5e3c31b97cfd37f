//! Payment initiation gateway adapter.
//!
//! One narrow contract: hand the provider an amount plus payer identity and
//! get back a hosted checkout URL, synchronously, success or failure. No
//! webhook reconciliation lives here — the provider later hits the status
//! callback endpoint, which flips the transaction row.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("provider rejected the payment: {0}")]
    Rejected(String),
    #[error("provider unreachable: {0}")]
    Unreachable(String),
    #[error("malformed provider response: {0}")]
    BadResponse(String),
}

/// Inputs for one payment initiation call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InitializePayment {
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub name: String,
    pub account_no: String,
    pub tx_ref: String,
    pub callback_url: String,
}

/// A successfully opened checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub checkout_url: String,
    pub provider: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + Debug {
    async fn initialize(&self, req: &InitializePayment)
    -> Result<CheckoutSession, PaymentError>;
}

// ============================================================================
// HTTP provider (Chapa-style initialize endpoint)
// ============================================================================

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    checkout_url: String,
}

/// Real provider adapter: bearer-authenticated POST to the provider's
/// `transaction/initialize` endpoint.
#[derive(Debug)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    secret_key: String,
}

impl HttpPaymentGateway {
    pub fn new(provider: &str, base_url: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider: provider.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initialize(
        &self,
        req: &InitializePayment,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/transaction/initialize", self.base_url);
        let body = serde_json::json!({
            "amount": req.amount.to_string(),
            "currency": req.currency,
            "email": req.email,
            "first_name": req.name,
            "tx_ref": req.tx_ref,
            "callback_url": req.callback_url,
            "customization": { "title": "StayFund wallet" },
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Unreachable(e.to_string()))?;

        let parsed: InitializeResponse = resp
            .json()
            .await
            .map_err(|e| PaymentError::BadResponse(e.to_string()))?;

        if parsed.status != "success" {
            return Err(PaymentError::Rejected(
                parsed.message.unwrap_or_else(|| parsed.status.clone()),
            ));
        }
        let data = parsed
            .data
            .ok_or_else(|| PaymentError::BadResponse("missing data.checkout_url".to_string()))?;

        Ok(CheckoutSession {
            checkout_url: data.checkout_url,
            provider: self.provider.clone(),
        })
    }
}

// ============================================================================
// Mock provider for tests and gateway-less development
// ============================================================================

/// Deterministic gateway: returns a fake checkout URL, can be flipped into
/// failure mode, and counts initiation calls so tests can assert that a
/// failed validation never reached the provider.
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    provider: String,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initialize(
        &self,
        req: &InitializePayment,
    ) -> Result<CheckoutSession, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentError::Rejected("mock gateway set to fail".to_string()));
        }
        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.example/{}", req.tx_ref),
            provider: self.provider.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_gateway_counts_calls_and_fails_on_demand() {
        let gw = MockPaymentGateway::new("testpay");
        let req = InitializePayment {
            amount: Decimal::from(100),
            currency: "ETB".to_string(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            account_no: "1000000001".to_string(),
            tx_ref: "sf-abc".to_string(),
            callback_url: "http://localhost/cb".to_string(),
        };

        let session = gw.initialize(&req).await.unwrap();
        assert_eq!(session.checkout_url, "https://checkout.example/sf-abc");
        assert_eq!(session.provider, "testpay");

        gw.set_fail(true);
        assert!(gw.initialize(&req).await.is_err());
        assert_eq!(gw.calls(), 2);
    }
}
