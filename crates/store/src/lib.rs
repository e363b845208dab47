pub mod capture;
pub mod dir;
pub mod scan;

pub use capture::{CaptureLog, CapturePolicy, CaptureReceipt, CapturedRequest};
pub use dir::LogDir;
