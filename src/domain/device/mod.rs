//! Device bounded context - the authenticated connection calls ride on

pub mod event;
pub mod provider;
pub mod session;
pub mod value_object;

pub use event::{DeviceEvent, DeviceEventReceiver, DeviceEventSender};
pub use provider::TelephonyProvider;
pub use session::DeviceSession;
pub use value_object::{DeviceOptions, DeviceStatus};
