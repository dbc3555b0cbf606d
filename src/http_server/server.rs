//! # HTTP Server
//!
//! Main HTTP server combining the realtime endpoint, read-only API routes
//! and static asset serving.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::observability::{log_event_with_fields, Event};
use crate::session::{ChannelBroadcast, SessionState};

use super::config::ServerConfig;
use super::observability_routes::{api_routes, health_routes};
use super::realtime_routes::realtime_routes;

/// State shared by every handler
pub struct AppState {
    pub config: ServerConfig,
    pub session: Arc<SessionState>,
    pub broadcast: ChannelBroadcast,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let broadcast = ChannelBroadcast::new(config.broadcast_capacity);
        let session = Arc::new(SessionState::new(Arc::new(broadcast.clone())));
        Self {
            config,
            session,
            broadcast,
        }
    }
}

/// HTTP server
pub struct HttpServer {
    state: Arc<AppState>,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::new(config));
        let router = Self::build_router(Arc::clone(&state));
        Self { state, router }
    }

    fn build_router(state: Arc<AppState>) -> Router {
        let config = &state.config;

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(realtime_routes(Arc::clone(&state)))
            .nest("/api", api_routes(Arc::clone(&state)))
            .fallback_service(ServeDir::new(&config.static_dir))
            .layer(ServiceBuilder::new().layer(cors))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.state.config.socket_addr()
    }

    /// Session shared by all connections
    pub fn session(&self) -> Arc<SessionState> {
        Arc::clone(&self.state.session)
    }

    /// Bind the configured address and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address: {}", e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let local_addr = listener.local_addr()?.to_string();
        log_event_with_fields(
            Event::ServerReady,
            &[
                ("addr", &local_addr),
                ("static_dir", &self.state.config.static_dir),
            ],
        );

        axum::serve(listener, self.router).await
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}
