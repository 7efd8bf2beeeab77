//! Adapter implementations for the outbound ports.

pub mod http;

pub use http::*;
