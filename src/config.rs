// src/config.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{CheckError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Harness configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Grading server base URL, without a trailing slash.
    pub base_url: String,
    /// Directory holding the fixture submissions and rubric.
    pub assets_dir: PathBuf,
    /// Upper bound on one check, so a hung request fails instead of blocking the run.
    pub check_timeout: Duration,
    /// Fail checks on audit findings instead of only warning.
    pub strict: bool,
    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl HarnessConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_url = lookup("API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        reqwest::Url::parse(raw_url.trim())
            .map_err(|e| CheckError::Config(format!("API_URL '{}' is not a valid URL: {}", raw_url, e)))?;
        let base_url = raw_url.trim().trim_end_matches('/').to_string();

        let assets_dir = lookup("GRADECHECK_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(default_assets_dir);

        let check_timeout = match lookup("GRADECHECK_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    CheckError::Config(format!("GRADECHECK_TIMEOUT_SECS '{}' is not a whole number", raw))
                })?;
                if secs == 0 {
                    return Err(CheckError::Config(
                        "GRADECHECK_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let strict = match lookup("GRADECHECK_STRICT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                CheckError::Config(format!("GRADECHECK_STRICT '{}' is not a boolean", raw))
            })?,
            None => false,
        };

        let report_path = lookup("GRADECHECK_REPORT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(HarnessConfig { base_url, assets_dir, check_timeout, strict, report_path })
    }

    /// Joins an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn default_assets_dir() -> PathBuf {
    let exe = std::env::current_exe().ok();
    resolve_assets_dir(exe.as_deref())
}

/// An `assets/` directory next to the installed binary wins; otherwise the
/// one in the source checkout the binary was built from.
fn resolve_assets_dir(exe: Option<&Path>) -> PathBuf {
    if let Some(dir) = exe.and_then(Path::parent).map(|dir| dir.join("assets")) {
        if dir.is_dir() {
            return dir;
        }
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
