//! HTTP surface of the relay.
//!
//! The real-time transport (signalling, encoding) lives outside this crate; the
//! server only exposes what the viewer page needs around it.

mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use contracts::{FrameSource, ServerConfig};
use sync_engine::CalibrationAccessor;
use telemetry::TelemetryRelay;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

/// State shared by all handlers
pub struct AppState<S> {
    /// `None` when the camera is disabled or failed to start
    pub camera: Option<Arc<S>>,
    pub calibration: Arc<CalibrationAccessor<S>>,
    pub relay: Arc<TelemetryRelay>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            camera: self.camera.clone(),
            calibration: Arc::clone(&self.calibration),
            relay: Arc::clone(&self.relay),
        }
    }
}

impl<S> AppState<S>
where
    S: FrameSource + Send + Sync,
{
    pub fn new(camera: Option<Arc<S>>, relay: Arc<TelemetryRelay>) -> Self {
        let calibration = Arc::new(CalibrationAccessor::new(camera.clone()));
        Self {
            camera,
            calibration,
            relay,
        }
    }
}

/// Build the application router
pub fn build_router<S>(state: AppState<S>, server: &ServerConfig) -> Router
where
    S: FrameSource + Send + Sync + 'static,
{
    let mut router = Router::new()
        .route("/calibration", get(routes::calibration::<S>))
        .route("/pose", post(routes::pose::<S>))
        .route("/health", get(routes::health::<S>))
        .with_state(state);

    if let Some(dir) = &server.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    // Viewer pages must never be served from cache
    router = router.layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ));

    if server.cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Serve until `shutdown` resolves, then drain in-flight requests
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
