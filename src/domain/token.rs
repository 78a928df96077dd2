//! Token exchange port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::AccessToken;

/// Body returned by the token endpoint: `{"token": ..., "identity": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub identity: String,
    pub token: AccessToken,
}

impl TokenGrant {
    pub fn new(identity: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            token: AccessToken::new(token),
        }
    }
}

/// Resolves a user-supplied endpoint to a token grant
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch a grant. Every failure is a `DomainError::Config`.
    async fn fetch_token(&self, endpoint: &str) -> Result<TokenGrant>;
}
