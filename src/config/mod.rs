//! Configuration types for gateway access

pub mod gateway;

pub use gateway::{GatewayConfig, TimeoutConfig};
