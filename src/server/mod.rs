//! HTTP server module.
//!
//! Route registration and testable startup plumbing.

pub mod http;
pub mod startup;

pub use http::{create_router, AppState};
pub use startup::{run_server_with_config, ServerConfig, ServerHandle};
