//! StayFund service entry point.
//!
//! Wiring: config → logging → store (PostgreSQL, or in-memory when no
//! `postgres_url` is configured) → payment gateway adapter → HTTP server.

use std::sync::Arc;

use stayfund::config::AppConfig;
use stayfund::gateway;
use stayfund::logging::init_logging;
use stayfund::store::{Database, LedgerStore, MemLedger, PgLedger, schema};
use stayfund::wallet::{HttpPaymentGateway, MockPaymentGateway, PaymentGateway, WalletService};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    tracing::info!("StayFund starting (env: {})", env);

    let store: Arc<dyn LedgerStore> = match &config.postgres_url {
        Some(url) => {
            let db = Database::connect_with(url, config.postgres_pool_size).await?;
            schema::ensure_schema(db.pool()).await?;
            Arc::new(PgLedger::new(Arc::new(db)))
        }
        None => {
            println!("⚠️  No postgres_url configured; using the in-memory store");
            Arc::new(MemLedger::new())
        }
    };

    let payment = &config.wallet.payment;
    let gateway_adapter: Arc<dyn PaymentGateway> = if payment.mock {
        println!("⚠️  Payment gateway in mock mode ({})", payment.provider);
        Arc::new(MockPaymentGateway::new(&payment.provider))
    } else {
        Arc::new(HttpPaymentGateway::new(
            &payment.provider,
            &payment.base_url,
            &payment.secret_key,
        ))
    };

    let wallet = Arc::new(WalletService::new(
        store,
        gateway_adapter,
        config.wallet.clone(),
    ));

    gateway::run_server(&config.gateway, wallet).await;
    Ok(())
}
