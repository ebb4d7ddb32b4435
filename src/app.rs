//! Composition root: wires configuration, persistence, auth and HTTP together.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, DatabaseSelection};
use crate::db::{self, Database};
use crate::docs;
use crate::middleware::{self, OriginPolicy};
use crate::routes;
use crate::state::AppState;

/// A bound, migrated server that has not started accepting requests yet.
pub struct Application {
    listener: TcpListener,
    router: Router,
    db: Database,
}

impl Application {
    /// Runs the startup sequence up to (not including) serving.
    ///
    /// Any failure here aborts startup; in particular the database must be
    /// reachable and fully migrated before the listener is handed to `serve`.
    pub async fn build(config: AppConfig) -> anyhow::Result<Self> {
        // Service registration. Nothing below touches the network or disk.
        let origins = Arc::new(OriginPolicy::new(config.allowed_origins.clone()));
        let db = Database::register(&config.database, &config.pool)?;
        info!(
            backend = db.backend_name(),
            explicit_origins = origins.allowed_origins().len(),
            issuer_check = config.jwt.issuer.is_some(),
            audience_check = config.jwt.audience.is_some(),
            "services registered"
        );

        let addr = config.server.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        let state = AppState::new(db.clone(), &config.jwt);

        if let DatabaseSelection::LocalFile(path) = &config.database {
            db::ensure_sqlite_parent_dir(path)?;
            info!("Using SQLite database at {}", path.display());
        }
        db.run_migrations().await.context("applying database migrations")?;
        info!(backend = db.backend_name(), "database migrations applied");

        let router = router(state, origins);

        Ok(Self { listener, router, db })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Serves until Ctrl-C or SIGTERM, then closes the pool.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        info!("codex-backend listening on http://{}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).with_graceful_shutdown(shutdown_signal()).await?;
        self.db.close().await;
        Ok(())
    }
}

/// Builds the HTTP surface: docs, public routes, protected routes and the
/// middleware stack (trace → CORS → authentication; authorization per route).
pub fn router(state: AppState, origins: Arc<OriginPolicy>) -> Router {
    let protected = Router::new()
        .route("/api/session", get(routes::session::current_session))
        .route_layer(from_fn(middleware::require_auth));

    Router::new()
        .merge(docs::swagger_routes())
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/version", get(routes::health::version))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors_layer(origins))
                .layer(from_fn_with_state(state.clone(), middleware::authenticate)),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
