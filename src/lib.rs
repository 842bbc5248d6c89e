//! AURA Studio Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod ai;
pub mod config;
pub mod metrics;
pub mod server;
pub mod studio;

// Re-export commonly used types for convenience
pub use ai::{GeminiProvider, GenerativeModel};
#[cfg(any(test, feature = "mock"))]
pub use ai::ScriptedModel;
pub use config::HttpConfig;
pub use server::{run_server, RequestsLoggingLevel};
pub use studio::{QuotaGate, Studio, StudioSettings};
