//! Admin endpoint: read-only view of the balancer over HTTP.
//!
//! # Routes
//! - `GET /admin/status`: balancer state and server counts
//! - `GET /admin/servers`: health of every server, in configuration order
//! - `GET /admin/pick`: the server a read would be routed to right now
//!
//! All routes require `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::load_balancer::Balancer;

/// Shared state of the admin routes.
#[derive(Clone)]
pub struct AdminState {
    pub balancer: Arc<Balancer>,
    pub api_key: Arc<str>,
}

/// Build the admin router.
pub fn router(balancer: Arc<Balancer>, api_key: &str) -> Router {
    let state = AdminState {
        balancer,
        api_key: Arc::from(api_key),
    };

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/servers", get(get_servers))
        .route("/admin/pick", get(get_pick))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin router on `config.bind_address` until `shutdown` resolves.
///
/// Returns immediately when the endpoint is disabled.
pub async fn serve<F>(balancer: Arc<Balancer>, config: &AdminConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if !config.enabled {
        tracing::debug!("Admin endpoint disabled");
        return Ok(());
    }
    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Admin endpoint listening");

    axum::serve(listener, router(balancer, &config.api_key))
        .with_graceful_shutdown(shutdown)
        .await
}
