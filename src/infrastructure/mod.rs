//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - Telephony provider adapters
//! - Token endpoint client
//! - Settings persistence

pub mod provider;
pub mod settings;
pub mod token;
