use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::ChapaConfig,
    data_objects::{CheckoutRequest, CheckoutSession, GatewayEnvelope, VerificationData},
    ChapaApiError,
    HostedCheckout,
};

#[derive(Clone)]
pub struct ChapaApi {
    config: ChapaConfig,
    client: Arc<Client>,
}

impl ChapaApi {
    pub fn new(config: ChapaConfig) -> Result<Self, ChapaApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| ChapaApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ChapaApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, ChapaApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ChapaApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ChapaApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ChapaApiError::RestResponseError(e.to_string()))?;
            Err(ChapaApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }
}

impl HostedCheckout for ChapaApi {
    /// Create a hosted checkout session. On success, the buyer should be redirected to the returned checkout URL.
    async fn initialize(&self, request: &CheckoutRequest) -> Result<CheckoutSession, ChapaApiError> {
        debug!("Initializing checkout session for tx_ref {}", request.tx_ref);
        let result = self
            .rest_query::<GatewayEnvelope<CheckoutSession>, _>(Method::POST, "/transaction/initialize", Some(request))
            .await?;
        if result.status != "success" {
            return Err(ChapaApiError::Rejected(result.message));
        }
        let session = result.data.ok_or_else(|| {
            ChapaApiError::RestResponseError("Gateway reported success but returned no checkout session".to_string())
        })?;
        info!("Checkout session created for tx_ref {}", request.tx_ref);
        Ok(session)
    }

    /// Fetch the ground-truth status of a transaction. Never trust a webhook payload's embedded status without
    /// calling this.
    async fn verify(&self, tx_ref: &str) -> Result<VerificationData, ChapaApiError> {
        let path = format!("/transaction/verify/{tx_ref}");
        debug!("Verifying transaction {tx_ref}");
        let result = self.rest_query::<GatewayEnvelope<VerificationData>, ()>(Method::GET, &path, None).await?;
        if result.status != "success" {
            return Err(ChapaApiError::Rejected(result.message));
        }
        result.data.ok_or_else(|| {
            ChapaApiError::RestResponseError("Gateway reported success but returned no transaction data".to_string())
        })
    }
}
