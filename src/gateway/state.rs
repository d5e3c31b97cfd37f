use std::sync::Arc;

use crate::wallet::WalletService;

/// Shared gateway state.
#[derive(Clone)]
pub struct AppState {
    pub wallet: Arc<WalletService>,
}

impl AppState {
    pub fn new(wallet: Arc<WalletService>) -> Self {
        Self { wallet }
    }
}
