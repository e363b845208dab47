use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqlog_core::ReqlogError;
use reqlog_core::query::{LogFileItem, SearchPage, SearchParams};
use reqlog_store::LogDir;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Level;

#[derive(Clone)]
pub struct QueryState {
    pub dir: LogDir,
}

pub async fn run_query_http_server(
    dir: LogDir,
    public_dir: PathBuf,
    addr: SocketAddr,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .context("bind query HTTP listener")?;
    axum::serve(listener, router(dir, public_dir))
        .await
        .context("query HTTP server failed")
}

/// `/api/*` answers JSON with permissive CORS; every other path is served
/// from `public_dir`.
pub fn router(dir: LogDir, public_dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/logs", get(list_logs))
        .route("/logs/search", get(search_logs))
        .layer(cors)
        .with_state(QueryState { dir });

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(public_dir))
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
}

async fn list_logs(State(state): State<QueryState>) -> Result<Json<Vec<LogFileItem>>, ApiError> {
    Ok(Json(state.dir.list()?))
}

async fn search_logs(
    State(state): State<QueryState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, ApiError> {
    let dir = state.dir.clone();
    let page = tokio::task::spawn_blocking(move || dir.search(&params))
        .await
        .map_err(|e| ReqlogError::Internal(format!("search task failed: {e}")))??;
    Ok(Json(page))
}

/// Plain-text error response; the status follows the error kind.
pub struct ApiError(ReqlogError);

impl From<ReqlogError> for ApiError {
    fn from(err: ReqlogError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ReqlogError::InvalidArgument(_) | ReqlogError::Parse(_) => StatusCode::BAD_REQUEST,
            ReqlogError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "query request failed");
        }
        (status, format!("{}\n", self.0.reason())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const LOG_ID: &str = "2026-02-01T00:00:00+01:00";

    fn fixture() -> (tempfile::TempDir, Router) {
        let temp = tempfile::tempdir().unwrap();
        let logs = temp.path().join("logs");
        let public = temp.path().join("public");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::write(public.join("index.html"), "<h1>reqlog</h1>").unwrap();

        let dir = LogDir::create(&logs).unwrap();
        let mut contents = testkit::minute_series(25);
        contents.push_str("not json at all\n");
        testkit::write_log(&logs, LOG_ID, &contents).unwrap();

        let app = router(dir, public);
        (temp, app)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: &Router, uri: &str) -> Value {
        let (status, body) = get(app, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn lists_log_files() {
        let (_temp, app) = fixture();
        let files = get_json(&app, "/api/logs").await;
        assert_eq!(files, serde_json::json!([{ "name": LOG_ID }]));
    }

    #[tokio::test]
    async fn search_pages_with_plus_restored_from_space() {
        let (_temp, app) = fixture();
        let page = get_json(
            &app,
            "/api/logs/search?file=2026-02-01T00:00:00+01:00&page=3&page_size=10",
        )
        .await;
        assert_eq!(page["total_count"], 26);
        assert_eq!(page["page"], 3);
        assert_eq!(page["page_size"], 10);
        assert_eq!(page["has_more"], false);
        let entries = page["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0]["request_number"], 21);
        assert_eq!(entries[5], serde_json::json!({ "raw_entry": "not json at all" }));
    }

    #[tokio::test]
    async fn search_filters_by_text_and_time() {
        let (_temp, app) = fixture();
        let page = get_json(
            &app,
            "/api/logs/search?file=2026-02-01T00:00:00%2B01:00&q=%2Fevents%2F1\
             &start_time=2026-02-01T01:10:00+01:00&end_time=2026-02-01T00:15:00Z",
        )
        .await;
        let urls: Vec<&str> = page["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["url"].as_str().unwrap())
            .collect();
        assert_eq!(
            urls,
            vec![
                "/events/11",
                "/events/12",
                "/events/13",
                "/events/14",
                "/events/15",
                "/events/16"
            ]
        );
        assert_eq!(page["total_count"], 6);
    }

    #[tokio::test]
    async fn defaults_apply_to_bad_paging() {
        let (_temp, app) = fixture();
        let page = get_json(
            &app,
            "/api/logs/search?file=2026-02-01T00:00:00%2B01:00&page=0&page_size=abc",
        )
        .await;
        assert_eq!(page["page"], 1);
        assert_eq!(page["page_size"], 10);
        assert_eq!(page["has_more"], true);
        assert_eq!(page["entries"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn error_statuses_are_distinct() {
        let (_temp, app) = fixture();

        let (status, body) = get(&app, "/api/logs/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"File name is required\n");

        let (status, body) = get(&app, "/api/logs/search?file=missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body = String::from_utf8(body).unwrap();
        assert!(body.starts_with("Log file by name "));
        assert!(body.contains("missing.log"));

        let (status, body) = get(
            &app,
            "/api/logs/search?file=2026-02-01T00:00:00%2B01:00&end_time=tomorrow",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Invalid end_time format. Use RFC3339 format\n");
    }

    #[tokio::test]
    async fn identical_queries_return_identical_bytes() {
        let (_temp, app) = fixture();
        let uri = "/api/logs/search?file=2026-02-01T00:00:00%2B01:00&q=events&page=2";
        let (_, first) = get(&app, uri).await;
        let (_, second) = get(&app, uri).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn preflight_is_answered_with_cors_headers() {
        let (_temp, app) = fixture();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/logs/search")
                    .header(header::ORIGIN, "http://viewer.test")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn api_rejects_other_methods() {
        let (_temp, app) = fixture();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/logs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn serves_static_ui() {
        let (_temp, app) = fixture();
        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>reqlog</h1>");
        let (status, _) = get(&app, "/definitely-missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
