pub mod codec;
pub mod entry;
pub mod record;

pub use entry::LogEntry;
pub use record::LogRecord;
