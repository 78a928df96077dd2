//! Domain layer - Core call-session rules and the ports they depend on
//!
//! This layer contains:
//! - Value objects and entities for calls and devices
//! - Ports (traits) for the telephony provider, token exchange and settings
//! - The append-only session log

pub mod call;
pub mod device;
pub mod log;
pub mod settings;
pub mod shared;
pub mod token;

// Re-export commonly used types
pub use shared::{DomainError, Result};
