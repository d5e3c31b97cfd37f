use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_pool_size")]
    pub postgres_pool_size: u32,
    #[serde(default)]
    pub wallet: WalletConfig,
}

fn default_pool_size() -> u32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WalletConfig {
    /// Currency passed to the payment provider.
    pub currency: String,
    /// Fixed account that collects service fees.
    pub platform_account_no: String,
    /// Where the provider reports payment status back to.
    pub callback_url: String,
    #[serde(default)]
    pub payment: PaymentConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            currency: "ETB".to_string(),
            platform_account_no: "9000000000".to_string(),
            callback_url: "http://localhost:8080/api/v1/payment/callback".to_string(),
            payment: PaymentConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentConfig {
    pub provider: String,
    pub base_url: String,
    pub secret_key: String,
    /// Use the mock gateway instead of the HTTP provider.
    pub mock: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: "chapa".to_string(),
            base_url: "https://api.chapa.co/v1".to_string(),
            secret_key: String::new(),
            mock: true,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: stayfund.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.postgres_url.is_none());
        assert_eq!(cfg.postgres_pool_size, 10);
        assert!(cfg.wallet.payment.mock);
        assert_eq!(cfg.wallet.platform_account_no, "9000000000");
    }
}
