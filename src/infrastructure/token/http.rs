//! Token exchange over HTTP GET

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::token::{TokenGrant, TokenProvider};

/// Fetches `{"token", "identity"}` from a user-supplied URL
#[derive(Debug, Clone)]
pub struct HttpTokenProvider {
    client: reqwest::Client,
}

impl HttpTokenProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn fetch_token(&self, endpoint: &str) -> Result<TokenGrant> {
        if endpoint.is_empty() {
            warn!("No token endpoint configured");
            return Err(DomainError::token_fetch_failed());
        }

        debug!("Requesting token from {}", endpoint);
        let response = self.client.get(endpoint).send().await.map_err(|e| {
            warn!("Token request to {} failed: {}", endpoint, e);
            DomainError::token_fetch_failed()
        })?;

        if response.status() != StatusCode::OK {
            warn!("Token endpoint {} answered {}", endpoint, response.status());
            return Err(DomainError::token_fetch_failed());
        }

        let grant = response.json::<TokenGrant>().await.map_err(|e| {
            warn!("Token endpoint {} returned an unusable body: {}", endpoint, e);
            DomainError::token_fetch_failed()
        })?;

        debug!("Token issued for identity {}", grant.identity);
        Ok(grant)
    }
}
