use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use studymate_core::{Config, SessionRegistry, StudyEngine};
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub(crate) struct AppState {
    pub engine: Arc<StudyEngine>,
    pub sessions: Arc<SessionRegistry>,
    pub started_at: Instant,
}

pub struct GatewayServer {
    addr: SocketAddr,
    auth_token: Option<String>,
    rate_limit: u32,
    max_body_size: usize,
    engine: StudyEngine,
    sessions: Arc<SessionRegistry>,
    session_ttl: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        engine: StudyEngine,
        sessions: Arc<SessionRegistry>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to all interfaces, uploads are reachable from the network");
        }

        Self {
            addr,
            auth_token: None,
            rate_limit: 120,
            max_body_size: 52_428_800,
            engine,
            sessions,
            session_ttl: Duration::from_secs(3600),
            shutdown_rx,
        }
    }

    /// Build a server from the `[gateway]`, `[document]` and `[retrieval]`
    /// sections.
    #[must_use]
    pub fn from_config(config: &Config, shutdown_rx: watch::Receiver<bool>) -> Self {
        let gw = &config.gateway;
        let session_ttl = Duration::from_secs(gw.session_ttl_secs);
        let sessions = Arc::new(SessionRegistry::new(gw.max_sessions, session_ttl));
        Self::new(
            &gw.bind,
            gw.port,
            StudyEngine::new(config),
            sessions,
            shutdown_rx,
        )
        .with_auth(gw.auth_token.clone())
        .with_rate_limit(gw.rate_limit)
        .with_max_body_size(gw.max_body_size)
        .with_session_ttl(session_ttl)
    }

    #[must_use]
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Controls how often idle sessions are swept; the registry owns the TTL
    /// itself.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    fn sweep_interval(&self) -> Duration {
        (self.session_ttl / 2).max(MIN_SWEEP_INTERVAL)
    }

    /// Start the HTTP gateway server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        if self.auth_token.is_none() {
            tracing::warn!("gateway auth disabled, set gateway.auth_token to require a bearer token");
        }

        let sweep_every = self.sweep_interval();
        let state = AppState {
            engine: Arc::new(self.engine),
            sessions: Arc::clone(&self.sessions),
            started_at: Instant::now(),
        };
        let router = build_router(state, self.auth_token, self.rate_limit, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let sweeper = spawn_sweeper(
            Arc::clone(&self.sessions),
            sweep_every,
            self.shutdown_rx.clone(),
        );

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow_and_update() {
                if shutdown_rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            tracing::info!("gateway shutting down");
        })
        .await
        .map_err(|e| GatewayError::Server(format!("{e}")))?;

        sweeper.abort();
        Ok(())
    }
}

fn spawn_sweeper(
    sessions: Arc<SessionRegistry>,
    every: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = sessions.evict_expired().await;
                    if evicted > 0 {
                        tracing::info!(evicted, "evicted idle sessions");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(4, Duration::from_secs(60)))
    }

    #[test]
    fn server_builder_chain() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 8090, StudyEngine::default(), registry(), srx)
            .with_auth(Some("token".into()))
            .with_rate_limit(60)
            .with_max_body_size(512);

        assert_eq!(server.rate_limit, 60);
        assert_eq!(server.max_body_size, 512);
        assert!(server.auth_token.is_some());
    }

    #[test]
    fn server_invalid_bind_fallback() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("not_an_ip", 9999, StudyEngine::default(), registry(), srx);
        assert_eq!(server.addr.port(), 9999);
        assert!(server.addr.ip().is_loopback());
    }

    #[test]
    fn from_config_applies_gateway_section() {
        let mut config = Config::default();
        config.gateway.port = 9100;
        config.gateway.auth_token = Some("secret".into());
        config.gateway.max_body_size = 1024;
        config.gateway.session_ttl_secs = 600;
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::from_config(&config, srx);
        assert_eq!(server.addr.port(), 9100);
        assert_eq!(server.auth_token.as_deref(), Some("secret"));
        assert_eq!(server.max_body_size, 1024);
        assert_eq!(server.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn sweep_interval_has_floor() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 8090, StudyEngine::default(), registry(), srx)
            .with_session_ttl(Duration::from_secs(10));
        assert_eq!(server.sweep_interval(), MIN_SWEEP_INTERVAL);
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown_signal() {
        let (stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 0, StudyEngine::default(), registry(), srx);
        let handle = tokio::spawn(server.serve());
        stx.send(true).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
