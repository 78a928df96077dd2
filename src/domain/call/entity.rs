//! Call entities

use crate::domain::shared::value_objects::ProviderCallId;
use serde::{Deserialize, Serialize};

use super::value_object::CallDirection;

/// One in-progress or ringing call on top of a device session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallConnection {
    /// Who started the call
    direction: CallDirection,
    /// Dialed number, or caller id for incoming calls
    remote_address: String,
    /// Assigned by the provider once signalling is under way
    provider_call_id: Option<ProviderCallId>,
}

impl CallConnection {
    pub fn outgoing(remote_address: impl Into<String>) -> Self {
        Self {
            direction: CallDirection::Outgoing,
            remote_address: remote_address.into(),
            provider_call_id: None,
        }
    }

    pub fn incoming(from: impl Into<String>, provider_call_id: ProviderCallId) -> Self {
        Self {
            direction: CallDirection::Incoming,
            remote_address: from.into(),
            provider_call_id: Some(provider_call_id),
        }
    }

    pub fn with_call_id(mut self, provider_call_id: ProviderCallId) -> Self {
        self.provider_call_id = Some(provider_call_id);
        self
    }

    pub fn direction(&self) -> CallDirection {
        self.direction
    }

    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }

    pub fn provider_call_id(&self) -> Option<&ProviderCallId> {
        self.provider_call_id.as_ref()
    }
}
