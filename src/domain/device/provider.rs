//! Telephony provider port
//!
//! The transport and signalling live behind this trait. Every request is
//! fire-and-forget: its outcome comes back later as a [`DeviceEvent`].
//!
//! [`DeviceEvent`]: super::event::DeviceEvent

use crate::domain::call::CallConnection;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::AccessToken;

use super::event::DeviceEventSender;
use super::value_object::DeviceOptions;

pub trait TelephonyProvider: Send + Sync {
    /// Register a device with the provider. Subsequent events for this
    /// device are pushed into `events`, replacing any earlier registration.
    fn register(
        &self,
        token: &AccessToken,
        options: &DeviceOptions,
        events: DeviceEventSender,
    ) -> Result<()>;

    /// Originate an outgoing call
    fn connect(&self, to: &str) -> Result<()>;

    /// End every active connection. Must be harmless with none active.
    fn disconnect_all(&self);

    fn accept(&self, connection: &CallConnection) -> Result<()>;

    fn reject(&self, connection: &CallConnection) -> Result<()>;

    /// Stop ringing locally without answering or rejecting
    fn ignore(&self, connection: &CallConnection) -> Result<()>;
}
