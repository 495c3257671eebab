use log::*;
use mkt_common::Secret;

#[derive(Debug, Clone)]
pub struct ChapaConfig {
    /// Base URL of the gateway API, e.g. "https://api.chapa.co/v1"
    pub api_url: String,
    pub secret_key: Secret<String>,
}

impl Default for ChapaConfig {
    fn default() -> Self {
        Self { api_url: "https://api.chapa.co/v1".to_string(), secret_key: Secret::default() }
    }
}

impl ChapaConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("MKT_CHAPA_API_URL").unwrap_or_else(|_| {
            info!("MKT_CHAPA_API_URL not set, using the production gateway URL");
            "https://api.chapa.co/v1".to_string()
        });
        let secret_key = Secret::new(std::env::var("MKT_CHAPA_SECRET_KEY").unwrap_or_else(|_| {
            error!("MKT_CHAPA_SECRET_KEY is not set. Gateway calls will be rejected until it is configured.");
            String::default()
        }));
        Self { api_url, secret_key }
    }
}
