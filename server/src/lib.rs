//! HTTP API service for the items table.
//!
//! Routes map one-to-one onto store operations:
//!
//! | Route | Operation |
//! |---|---|
//! | `POST /items` | validate, insert one row, return it with its id |
//! | `GET /items/{id}` | fetch one row or 404 |
//! | `GET /items` | every row, ordered by id |
//! | `POST /analyze` | simulated image analysis |
//! | `GET /health` | liveness |

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod analyze;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod store;

pub use analyze::{Analyzer, SimulatedAnalyzer};
pub use config::ServerConfig;
pub use error::ServiceError;
pub use model::{Item, NewItem};
pub use store::{ConnectOpts, Store, StoreError};

/// Everything a handler may touch. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub analyzer: Arc<dyn Analyzer>,
}

impl AppState {
    pub fn new(store: Store, analyzer: Arc<dyn Analyzer>) -> Self {
        Self { store, analyzer }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/items", get(handlers::list_items).post(handlers::create_item))
        .route("/items/{id}", get(handlers::get_item))
        .route("/analyze", post(handlers::analyze))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
