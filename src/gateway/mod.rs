//! HTTP gateway: axum router over the wallet service.

pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::wallet::WalletService;
use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let wallet_routes = Router::new()
        .route("/account", post(handlers::create_account))
        .route("/account/{account_no}", get(handlers::get_account))
        .route("/balance/{user_id}", get(handlers::get_balance))
        .route("/transfer", post(handlers::transfer))
        .route("/deposit", post(handlers::deposit))
        .route("/withdraw", post(handlers::withdraw))
        .route("/own-deposit", post(handlers::own_deposit))
        .route("/deposit-to-balance", post(handlers::deposit_to_balance))
        .route("/release/{booking_id}", post(handlers::release_frozen_deposit))
        .route("/escrow/{booking_id}", get(handlers::get_frozen_deposit))
        .route("/transactions/{user_id}", get(handlers::get_transactions))
        .route(
            "/transactions/{user_id}/unseen",
            get(handlers::get_unseen_count),
        )
        .route("/transactions/{user_id}/seen", post(handlers::mark_seen));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/payment/callback", get(handlers::payment_callback))
        .nest("/api/v1/wallet", wallet_routes)
        .with_state(state)
}

/// Start the HTTP gateway server.
pub async fn run_server(cfg: &GatewayConfig, wallet: Arc<WalletService>) {
    let state = Arc::new(AppState::new(wallet));
    let app = build_router(state);

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                cfg.port, cfg.port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Wallet gateway listening on http://{}", addr);
    println!("💰 Wallet API: /api/v1/wallet/*");
    println!("🔔 Payment callback: /api/v1/payment/callback");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
