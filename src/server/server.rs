use anyhow::{Context, Result};
use std::time::Duration;

use tracing::info;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;

use super::{log_requests, make_studio_routes, state::*};
use crate::config::HttpConfig;
use crate::metrics;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub model: String,
    pub quota_exhausted: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: state.version.clone(),
        model: format!("{}/{}", state.studio.model_name(), state.studio.model_id()),
        quota_exhausted: state.studio.quota_exhausted(),
    };
    Json(stats)
}

pub fn make_app(config: HttpConfig, studio: GuardedStudio) -> Router {
    let state = ServerState::new(config.clone(), studio);

    let studio_routes = make_studio_routes(state.clone());

    let home_router: Router = match config.frontend_dir_path.clone() {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/v1/studio", studio_routes)
        .layer(middleware::from_fn_with_state(config, log_requests))
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::render() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(config: HttpConfig, studio: GuardedStudio) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, studio);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", err);
        }
    });
    info!("Metrics available at port {}!", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedModel;
    use crate::server::RequestsLoggingLevel;
    use crate::studio::{QuotaGate, Studio, StudioSettings};
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app_with(model: Arc<ScriptedModel>) -> Router {
        let config = HttpConfig {
            logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let studio = Studio::new(model, QuotaGate::new(), StudioSettings::default());
        make_app(config, Arc::new(studio))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn home_reports_stats() {
        let app = app_with(Arc::new(ScriptedModel::new()));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["model"], "scripted/scripted");
        assert_eq!(body["quota_exhausted"], false);
    }

    #[tokio::test]
    async fn empty_idea_is_a_bad_request() {
        let model = Arc::new(ScriptedModel::new());
        let app = app_with(model.clone());
        let request = Request::builder()
            .method("POST")
            .uri("/v1/studio/analysis")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"idea":"   "}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "BAD_REQUEST");
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_element_is_not_found() {
        let app = app_with(Arc::new(ScriptedModel::new()));
        let request = Request::builder()
            .method("POST")
            .uri("/v1/studio/analysis/elements/Nothing/details")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn quota_route_reports_flag() {
        let app = app_with(Arc::new(ScriptedModel::new()));
        let request = Request::builder()
            .uri("/v1/studio/quota")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["exhausted"], false);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_text() {
        crate::metrics::init_metrics();
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = make_metrics_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
