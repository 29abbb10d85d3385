use axum::{routing::get, routing::post, Router};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::render::SharedScene;
use crate::tracker::{TrackerCommand, TrackerStatus};

use super::api::tracker as tracker_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub status: Arc<StdMutex<TrackerStatus>>,
    pub scene: SharedScene,
    pub commands: mpsc::Sender<TrackerCommand>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/tracker/status", get(tracker_handlers::status))
        .route("/api/planes", get(tracker_handlers::planes))
        // Location source
        .route("/api/location", post(tracker_handlers::location))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server<F>(bind_addr: &str, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
