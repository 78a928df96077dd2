//! Device session - one authenticated connection to the provider

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::domain::call::CallConnection;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::token::TokenGrant;

use super::event::{DeviceEvent, DeviceEventReceiver};
use super::provider::TelephonyProvider;
use super::value_object::{DeviceOptions, DeviceStatus};

/// Wraps the provider for a single device registration and owns the
/// ordered event stream the provider pushes back.
pub struct DeviceSession {
    provider: Arc<dyn TelephonyProvider>,
    identity: Option<String>,
    status: DeviceStatus,
    events: Option<DeviceEventReceiver>,
}

impl DeviceSession {
    pub fn new(provider: Arc<dyn TelephonyProvider>) -> Self {
        Self {
            provider,
            identity: None,
            status: DeviceStatus::Uninitialized,
            events: None,
        }
    }

    /// Register with the provider using a freshly issued token.
    ///
    /// On success the session is `Initializing` until the provider emits
    /// [`DeviceEvent::Ready`]. On failure it stays `Uninitialized`.
    pub fn initialize(&mut self, grant: TokenGrant, options: &DeviceOptions) -> Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.provider.register(&grant.token, options, tx)?;

        info!("Device registered for identity {}", grant.identity);
        self.identity = Some(grant.identity);
        self.status = DeviceStatus::Initializing;
        self.events = Some(rx);
        Ok(())
    }

    /// Track readiness from a provider event
    pub fn observe(&mut self, event: &DeviceEvent) {
        let next = match event {
            DeviceEvent::Ready => DeviceStatus::Ready,
            DeviceEvent::Offline => DeviceStatus::Offline,
            DeviceEvent::Error { .. } if self.status == DeviceStatus::Initializing => {
                DeviceStatus::Failed
            }
            _ => return,
        };
        if next != self.status {
            debug!("Device status {:?} -> {:?}", self.status, next);
            self.status = next;
        }
    }

    /// Ask the provider to originate a call. Does not wait for it to connect.
    pub fn place_call(&self, remote_address: &str) -> Result<CallConnection> {
        if !self.status.can_place_calls() {
            return Err(DomainError::NotReady);
        }
        self.provider.connect(remote_address)?;
        Ok(CallConnection::outgoing(remote_address))
    }

    pub fn terminate_all(&self) {
        self.provider.disconnect_all();
    }

    pub fn accept(&self, connection: &CallConnection) -> Result<()> {
        self.provider.accept(connection)
    }

    pub fn reject(&self, connection: &CallConnection) -> Result<()> {
        self.provider.reject(connection)
    }

    pub fn ignore(&self, connection: &CallConnection) -> Result<()> {
        self.provider.ignore(connection)
    }

    /// Wait for the next provider event.
    ///
    /// Pends forever once the provider has dropped its sender, so callers
    /// can keep this in a `select!` loop.
    pub async fn next_event(&mut self) -> Option<DeviceEvent> {
        let Some(rx) = self.events.as_mut() else {
            return std::future::pending().await;
        };
        match rx.recv().await {
            Some(event) => Some(event),
            None => {
                debug!("Provider closed the device event stream");
                self.events = None;
                std::future::pending().await
            }
        }
    }

    /// Next already-delivered event, if any
    pub fn try_next_event(&mut self) -> Option<DeviceEvent> {
        self.events.as_mut().and_then(|rx| rx.try_recv().ok())
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }
}
