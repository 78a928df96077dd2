//! Token provider adapters

pub mod http;

pub use http::HttpTokenProvider;
