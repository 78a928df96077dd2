//! Events pushed by the provider into a device session

use crate::domain::call::CallConnection;
use tokio::sync::mpsc;

/// Provider-level notification, delivered in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Ready,
    Offline,
    Error { message: String, code: u32 },
    /// Remote party is being alerted for an outgoing call
    Ringing,
    Connected { connection: CallConnection },
    Disconnected,
    Cancelled,
    Incoming { connection: CallConnection },
}

impl DeviceEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DeviceEvent::Ready => "device.ready",
            DeviceEvent::Offline => "device.offline",
            DeviceEvent::Error { .. } => "device.error",
            DeviceEvent::Ringing => "device.ringing",
            DeviceEvent::Connected { .. } => "device.connected",
            DeviceEvent::Disconnected => "device.disconnected",
            DeviceEvent::Cancelled => "device.cancelled",
            DeviceEvent::Incoming { .. } => "device.incoming",
        }
    }
}

/// Sending half handed to the provider on registration
pub type DeviceEventSender = mpsc::UnboundedSender<DeviceEvent>;

/// Receiving half owned by the device session
pub type DeviceEventReceiver = mpsc::UnboundedReceiver<DeviceEvent>;
