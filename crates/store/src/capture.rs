use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqlog_core::error::{ReqlogError, Result};
use reqlog_core::model::LogRecord;
use reqlog_core::model::codec::encode_line;
use reqlog_core::model::record::encode_body;
use reqlog_core::time::now_timestamp;

use crate::dir::LogDir;

/// Body handling chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePolicy {
    pub include_body_in_json: bool,
    pub body_as_base64: bool,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            include_body_in_json: true,
            body_as_base64: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureReceipt {
    pub request_number: u64,
    pub body_size: usize,
    pub largest_yet: bool,
}

/// The capture file of one process lifetime.
///
/// Sequence numbers, the largest-body tracker and the append handle share a
/// single lock, so numbers are gap-free and appear in the file in order, and
/// the metadata line and its body line are never split by another request.
#[derive(Clone)]
pub struct CaptureLog {
    state: Arc<Mutex<CaptureState>>,
    path: PathBuf,
    policy: CapturePolicy,
}

struct CaptureState {
    file: File,
    last_request_number: u64,
    largest_body: usize,
}

impl CaptureLog {
    /// Creates `<dir>/<now>.log` named after the current local time.
    pub fn create(dir: &LogDir, policy: CapturePolicy) -> Result<Self> {
        Self::open(dir.path_for(&now_timestamp()), policy)
    }

    pub fn open(path: impl Into<PathBuf>, policy: CapturePolicy) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| {
                ReqlogError::Io(format!("failed to create log file {}: {e}", path.display()))
            })?;

        Ok(Self {
            state: Arc::new(Mutex::new(CaptureState {
                file,
                last_request_number: 0,
                largest_body: 0,
            })),
            path,
            policy,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log id: the file name without extension.
    pub fn id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn policy(&self) -> CapturePolicy {
        self.policy
    }

    /// Assigns the next sequence number and appends the request. An error
    /// here means the file could not be written and the capture is no
    /// longer trustworthy.
    pub fn append(&self, req: &CapturedRequest) -> Result<CaptureReceipt> {
        let mut state = self.state.lock().expect("capture log mutex poisoned");
        let request_number = state.last_request_number + 1;
        let body_size = req.body.len();
        tracing::debug!(size = body_size, request_number, "received request body");

        let payload = self.encode(request_number, req)?;
        state.file.write_all(&payload).map_err(|e| {
            ReqlogError::Capture(format!(
                "failed to write to log file {}: {e}",
                self.path.display()
            ))
        })?;
        state.last_request_number = request_number;

        let largest_yet = body_size > state.largest_body;
        if largest_yet {
            state.largest_body = body_size;
            tracing::info!(size = body_size, request_number, "largest request body yet");
        }

        Ok(CaptureReceipt {
            request_number,
            body_size,
            largest_yet,
        })
    }

    fn encode(&self, request_number: u64, req: &CapturedRequest) -> Result<Vec<u8>> {
        let body = self.policy.include_body_in_json.then(|| {
            serde_json::Value::String(encode_body(&req.body, self.policy.body_as_base64))
        });
        let record = LogRecord {
            body,
            headers: req.headers.clone(),
            is_body_base64: self.policy.body_as_base64,
            method: req.method.clone(),
            request_number,
            time: now_timestamp(),
            url: req.url.clone(),
        };

        let mut payload = encode_line(&record)?;
        if !self.policy.include_body_in_json {
            if self.policy.body_as_base64 {
                payload.extend_from_slice(STANDARD.encode(&req.body).as_bytes());
            } else {
                payload.extend_from_slice(&req.body);
            }
            payload.push(b'\n');
        }
        Ok(payload)
    }
}
