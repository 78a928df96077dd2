//! Application layer - Use cases and application services
//!
//! This layer drives the domain objects for one popup session:
//! - The call-session state machine
//! - Publishing its notifications to presenters

pub mod controller;
pub mod notification;

pub use controller::CallSessionController;
pub use notification::{NotificationBroadcaster, SessionEvent, SessionNotification};
