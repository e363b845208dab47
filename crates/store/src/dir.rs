use std::fs::{self, File};
use std::path::{Path, PathBuf};

use reqlog_core::error::{ReqlogError, Result};
use reqlog_core::query::LogFileItem;

pub const LOG_EXTENSION: &str = "log";

/// Directory holding one `<id>.log` file per capture process.
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Like [`LogDir::new`], creating the directory if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ReqlogError::Io(format!(
                "failed to create logs directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{LOG_EXTENSION}"))
    }

    pub fn list(&self) -> Result<Vec<LogFileItem>> {
        let root = self.root.to_str().ok_or_else(|| {
            ReqlogError::Io(format!("logs directory is not utf-8: {}", self.root.display()))
        })?;
        let pattern = format!("{}/*.{LOG_EXTENSION}", glob::Pattern::escape(root));
        let paths = glob::glob(&pattern)
            .map_err(|e| ReqlogError::Internal(format!("bad logs glob {pattern}: {e}")))?;

        let mut files = Vec::new();
        for path in paths {
            let path =
                path.map_err(|e| ReqlogError::Io(format!("Failed to read logs directory: {e}")))?;
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                files.push(LogFileItem {
                    name: name.to_string(),
                });
            }
        }
        Ok(files)
    }

    /// Opens an existing log for reading. Ids that would escape the
    /// directory are reported as missing.
    pub fn open(&self, id: &str) -> Result<File> {
        let path = self.path_for(id);
        let not_found =
            || ReqlogError::NotFound(format!("Log file by name {} not found", path.display()));
        if id.contains(['/', '\\']) || id == ".." {
            return Err(not_found());
        }
        File::open(&path).map_err(|_| not_found())
    }
}
