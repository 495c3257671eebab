//! Bearer-token authentication.
//!
//! The server does not issue tokens to end users; identity management lives elsewhere. Requests carry a JWT in the
//! `mkt_access_token` header, signed with the shared HS256 secret, and the [`JwtClaims`] extractor verifies it and
//! hands the handler the authenticated user id. [`TokenIssuer`] signs tokens with the same secret and exists for
//! tests and ops tooling.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError};

pub const AUTH_HEADER: &str = "mkt_access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The authenticated user's id.
    pub sub: i64,
    pub name: String,
    /// Expiry, as a unix timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }
}

impl FromRequest for JwtClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).map_err(|e| crate::errors::ServerError::AuthenticationError(e).into()))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, AuthError> {
    let header = req.headers().get(AUTH_HEADER).ok_or(AuthError::MissingToken)?;
    let token = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| AuthError::ValidationError("Token verification is not configured".to_string()))?;
    issuer.validate_token(token)
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self { encoding_key: EncodingKey::from_secret(secret), decoding_key: DecodingKey::from_secret(secret) }
    }

    /// Sign an access token for the given user. This method does NOT verify that the user exists; callers are
    /// expected to have done so.
    pub fn issue_token(&self, user_id: i64, name: &str, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::hours(24));
        let exp = (Utc::now() + duration).timestamp();
        let claims = JwtClaims { sub: user_id, name: name.to_string(), exp };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("🔐️ Token validation failed. {e}");
            AuthError::ValidationError(e.to_string())
        })?;
        Ok(data.claims)
    }
}
