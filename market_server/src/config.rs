use std::env;

use chapa_tools::ChapaConfig;
use log::*;
use mkt_common::Secret;
use rand::Rng;

use crate::errors::ServerError;

const DEFAULT_MKT_HOST: &str = "127.0.0.1";
const DEFAULT_MKT_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Configuration for the outbound Chapa API client.
    pub chapa: ChapaConfig,
    /// The secret shared with the gateway for signing webhook deliveries.
    pub webhook_secret: Secret<String>,
    /// Skips the webhook signature check when set. Local development only; with this on, anyone can settle orders.
    pub disable_webhook_signature: bool,
    /// The URL the gateway redirects buyers to (and posts webhooks against) after payment. Must be reachable from
    /// the public internet in production.
    pub callback_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MKT_HOST.to_string(),
            port: DEFAULT_MKT_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            chapa: ChapaConfig::default(),
            webhook_secret: Secret::new(String::default()),
            disable_webhook_signature: false,
            callback_url: String::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MKT_HOST").ok().unwrap_or_else(|| DEFAULT_MKT_HOST.into());
        let port = env::var("MKT_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MKT_PORT. {e} Using the default, {DEFAULT_MKT_PORT}, instead."
                    );
                    DEFAULT_MKT_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MKT_PORT);
        let database_url = env::var("MKT_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MKT_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let chapa = ChapaConfig::new_from_env_or_default();
        let webhook_secret = env::var("MKT_CHAPA_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ MKT_CHAPA_WEBHOOK_SECRET is not set. Webhook signatures cannot be verified and all payment \
                 callbacks will be rejected."
            );
            String::default()
        });
        let webhook_secret = Secret::new(webhook_secret);
        let disable_webhook_signature =
            mkt_common::parse_boolean_flag(env::var("MKT_DISABLE_WEBHOOK_SIGNATURE").ok(), false);
        if disable_webhook_signature {
            warn!(
                "🚨️ MKT_DISABLE_WEBHOOK_SIGNATURE is set. Webhook signatures will NOT be checked. Never run \
                 production like this."
            );
        }
        let callback_url = env::var("MKT_CALLBACK_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ MKT_CALLBACK_URL is not set. Using an empty callback URL; checkout redirects will not work.");
            String::default()
        });
        Self { host, port, database_url, auth, chapa, webhook_secret, disable_webhook_signature, callback_url }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The symmetric secret used to verify (and, in tests and ops tooling, to sign) access token JWTs.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued by \
             other services will NOT verify against it. Set MKT_JWT_SECRET in production. 🚨️🚨️🚨️"
        );
        let mut rng = rand::thread_rng();
        let secret = (0..32).map(|_| format!("{:02x}", rng.gen::<u8>())).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("MKT_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [MKT_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "MKT_JWT_SECRET must be at least 32 characters long.".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
