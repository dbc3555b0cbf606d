//! # HTTP Server Module
//!
//! Transport for the session layer.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/ws` - WebSocket for participants
//! - `/api/model` - Current model snapshot
//! - `/api/metrics` - Operational counters
//! - everything else - static assets

pub mod config;
pub mod observability_routes;
pub mod realtime_routes;
pub mod server;

pub use config::ServerConfig;
pub use realtime_routes::{ClientMessage, ServerMessage};
pub use server::{AppState, HttpServer};
