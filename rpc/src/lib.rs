//! HTTP server for the YAM verification service.
//!
//! Provides endpoints for:
//! - Proof verification and session status checks (`POST /verify`)
//! - Existing-verification lookups on page load (`POST /check-verification`)
//!
//! Plus the service configuration (TOML + defaults) and structured-logging
//! initialisation used by the daemon.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;

pub use config::ServiceConfig;
pub use error::RpcError;
pub use logging::{init_logging, LogFormat};
pub use server::{AppState, RpcServer};
