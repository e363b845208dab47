use std::collections::BTreeMap;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use reqlog_core::ReqlogError;
use reqlog_core::model::record::canonical_header_key;
use reqlog_store::{CaptureLog, CapturedRequest};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::Level;

#[derive(Clone)]
pub struct CaptureState {
    pub log: CaptureLog,
    pub max_body_bytes: usize,
    /// Receives the write error that ends the capture server.
    pub fatal_tx: mpsc::Sender<ReqlogError>,
}

/// Every method and path lands in the same handler.
pub fn router(state: CaptureState) -> Router {
    Router::new()
        .fallback(capture_request)
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

async fn capture_request(State(state): State<CaptureState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read request body");
            return plain_error(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    let captured = CapturedRequest {
        method: parts.method.to_string(),
        url: parts.uri.to_string(),
        headers: capture_headers(&parts.headers),
        body: body.to_vec(),
    };

    match state.log.append(&captured) {
        Ok(receipt) => {
            tracing::trace!(request_number = receipt.request_number, "request captured");
            StatusCode::CREATED.into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "capture write failed, stopping capture server");
            let _ = state.fatal_tx.try_send(err);
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write to log file")
        }
    }
}

/// Header map in canonical name form, values in arrival order. `Host` is
/// carried by the request line in existing logs, not by the header map.
fn capture_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if *name == HOST {
            continue;
        }
        out.entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

fn plain_error(status: StatusCode, message: &str) -> Response {
    (status, format!("{message}\n")).into_response()
}
