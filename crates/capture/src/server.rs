use std::net::SocketAddr;

use reqlog_core::error::{ReqlogError, Result};
use reqlog_store::CaptureLog;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::http::{CaptureState, router};

pub async fn run_capture_server(
    log: CaptureLog,
    addr: SocketAddr,
    max_body_bytes: usize,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ReqlogError::Io(format!("failed to bind capture listener {addr}: {e}")))?;
    serve(listener, log, max_body_bytes).await
}

/// Serves until the listener fails or a capture write fails. A failed write
/// is returned as the error so the process stops taking traffic it could not
/// record.
pub async fn serve(listener: TcpListener, log: CaptureLog, max_body_bytes: usize) -> Result<()> {
    let (fatal_tx, mut fatal_rx) = mpsc::channel(1);
    let app = router(CaptureState {
        log,
        max_body_bytes,
        fatal_tx,
    });

    let mut http_task = tokio::spawn(async move { axum::serve(listener, app).await });

    tokio::select! {
        res = &mut http_task => {
            let inner = res.map_err(|e| ReqlogError::Internal(format!("capture task join failed: {e}")))?;
            inner.map_err(|e| ReqlogError::Io(format!("capture server failed: {e}")))
        }
        Some(err) = fatal_rx.recv() => {
            http_task.abort();
            Err(err)
        }
    }
}
