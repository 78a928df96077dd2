//! callpad - call-session core for a browser-popup softphone
//!
//! A Domain-Driven Design layout: the domain holds call/device types and
//! the ports to the telephony provider, token endpoint and settings store;
//! the application layer holds the call-session state machine.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use application::CallSessionController;
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
