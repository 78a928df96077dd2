//! Telephony provider adapters

pub mod loopback;

pub use loopback::{LoopbackProvider, ProviderRequest};
