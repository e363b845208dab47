use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReqlogError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub logs_dir: PathBuf,
    pub public_dir: PathBuf,
    pub capture_addr: String,
    pub query_addr: String,
    pub include_body_in_json: bool,
    pub body_as_base64: bool,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            public_dir: PathBuf::from("public"),
            capture_addr: "0.0.0.0:8081".to_string(),
            query_addr: "0.0.0.0:8082".to_string(),
            include_body_in_json: true,
            body_as_base64: true,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults, then the optional config file, then the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides(|key| env::var(key).ok())?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    logs_dir: Option<PathBuf>,
    public_dir: Option<PathBuf>,
    capture_addr: Option<String>,
    query_addr: Option<String>,
    include_body_in_json: Option<bool>,
    body_as_base64: Option<bool>,
    max_body_bytes: Option<usize>,
}

/// Capture toggles are on when unset, empty or `"true"`; any other value
/// turns them off.
pub fn parse_toggle(value: &str) -> bool {
    value.is_empty() || value == "true"
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("REQLOG_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("reqlog/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| ReqlogError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| ReqlogError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides<F>(lookup: F) -> Result<ConfigOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let max_body_bytes = match lookup("REQLOG_MAX_BODY_BYTES") {
        Some(v) => Some(v.parse::<usize>().map_err(|e| {
            ReqlogError::Config(format!("bad REQLOG_MAX_BODY_BYTES in environment: {e}"))
        })?),
        None => None,
    };

    Ok(ConfigOverrides {
        logs_dir: lookup("REQLOG_LOGS_DIR").map(PathBuf::from),
        public_dir: lookup("REQLOG_PUBLIC_DIR").map(PathBuf::from),
        capture_addr: lookup("REQLOG_CAPTURE_ADDR"),
        query_addr: lookup("REQLOG_QUERY_ADDR"),
        include_body_in_json: lookup("INCLUDE_BODY_IN_JSON").map(|v| parse_toggle(&v)),
        body_as_base64: lookup("BODY_AS_BASE64").map(|v| parse_toggle(&v)),
        max_body_bytes,
    })
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.logs_dir {
        cfg.logs_dir = v;
    }
    if let Some(v) = overrides.public_dir {
        cfg.public_dir = v;
    }
    if let Some(v) = overrides.capture_addr {
        cfg.capture_addr = v;
    }
    if let Some(v) = overrides.query_addr {
        cfg.query_addr = v;
    }
    if let Some(v) = overrides.include_body_in_json {
        cfg.include_body_in_json = v;
    }
    if let Some(v) = overrides.body_as_base64 {
        cfg.body_as_base64 = v;
    }
    if let Some(v) = overrides.max_body_bytes {
        if v == 0 {
            return Err(ReqlogError::Config(format!(
                "bad max_body_bytes in {source}: must be greater than zero"
            )));
        }
        cfg.max_body_bytes = v;
    }
    Ok(())
}
