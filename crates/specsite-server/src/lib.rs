//! Development server for a built spec site.
//!
//! Serves the output directory over HTTP on the loopback interface while
//! watch mode keeps the files up to date. Directory requests resolve to
//! their `index.html`, so `/` shows the version listing.

#![warn(clippy::all)]

pub mod shutdown;

pub use shutdown::shutdown_signal;

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Serve(#[source] std::io::Error),
}

/// What to serve and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory whose files are served.
    pub root: PathBuf,
    /// Loopback port to listen on.
    pub port: u16,
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Address the server binds. Always localhost.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.port))
    }
}

/// Static file server over the site output.
pub struct DevServer {
    config: ServerConfig,
}

impl DevServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Build the router: every path falls through to the output directory.
    pub fn router(&self) -> Router {
        let files = ServeDir::new(&self.config.root).append_index_html_on_directories(true);

        Router::new()
            .fallback_service(files)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)
    }

    /// Bind the configured port and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!("Serving {} at http://{}", self.config.root.display(), addr);

        self.serve(listener, shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_localhost_only() {
        let config = ServerConfig::new("/site/build").with_port(9000);
        assert_eq!(config.socket_addr(), "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn test_default_port() {
        let config = ServerConfig::new("build");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.socket_addr().port(), DEFAULT_PORT);
    }
}
