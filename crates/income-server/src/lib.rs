//! Process wiring for the income snapshot service: configuration and the HTTP
//! client for the external income registry.

pub mod registry;
pub mod settings;

pub use registry::HttpRegistry;
pub use settings::ServerConfig;
