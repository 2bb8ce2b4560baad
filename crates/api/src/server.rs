use crate::{middleware, routes, ws};
use axum::{
    routing::{delete, get},
    Router,
};
use relaymq_broker::Broker;
use relaymq_common::SystemConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared state handed to every route and connection handler. The broker is
/// the single process-wide instance; everything else clones the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
}

pub struct RelayServer {
    config: SystemConfig,
    state: AppState,
}

impl RelayServer {
    pub fn new(config: SystemConfig) -> Self {
        let broker = Arc::new(Broker::new(&config.broker));
        Self {
            config,
            state: AppState { broker },
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws::ws_handler))
            .route(
                "/topics",
                get(routes::topics::list_topics).post(routes::topics::create_topic),
            )
            .route("/topics/:name", delete(routes::topics::delete_topic))
            .route("/health", get(routes::health::health))
            .route("/stats", get(routes::stats::stats))
            .layer(axum::middleware::from_fn(
                middleware::logging::logging_middleware,
            ))
            .layer(middleware::logging::get_tracing_layer())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %addr, "relaymq server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
