//! Configuration loading from bundlecov.toml.

use serde::Deserialize;
use std::path::PathBuf;
use std::{fs, path::Path};

use crate::error::{BundlecovError, BundlecovResult, IoResultExt};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "bundlecov.toml";

/// Main configuration structure for bundlecov.toml.
#[derive(Debug, Deserialize, Default)]
pub struct BundlecovConfig {
    /// Project root used to resolve module sizes.
    pub root: Option<PathBuf>,
    /// Module names or patterns to leave out of the unused list.
    pub ignore: Option<Vec<String>>,
    /// Regex an asset URL must match to be analyzed.
    pub asset_filter: Option<String>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl BundlecovConfig {
    /// True when the configured output format asks for JSON.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from `bundlecov.toml` in `dir` if it exists.
pub fn load_config(dir: &Path) -> BundlecovResult<Option<BundlecovConfig>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit file path.
///
/// An unreadable file is an I/O error; malformed TOML is a (recoverable)
/// config error.
pub fn load_config_file(path: &Path) -> BundlecovResult<BundlecovConfig> {
    let content = fs::read_to_string(path).with_path(path)?;
    toml::from_str(&content).map_err(|e| BundlecovError::config(path, e.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("bundlecov_config_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = create_temp_dir("missing");
        assert!(load_config(&dir).unwrap().is_none());
    }

    #[test]
    fn test_full_config() {
        let dir = create_temp_dir("full");
        fs::write(
            dir.join(CONFIG_FILE),
            r#"
root = "../app"
ignore = ["polyfill", "./src/entry.js"]
asset_filter = "static/js/.*"

[output]
format = "json"
"#,
        )
        .unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.root, Some(PathBuf::from("../app")));
        assert_eq!(cfg.ignore.as_ref().map(Vec::len), Some(2));
        assert_eq!(cfg.asset_filter.as_deref(), Some("static/js/.*"));
        assert!(cfg.wants_json());
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = create_temp_dir("invalid");
        fs::write(dir.join(CONFIG_FILE), "ignore = 12").unwrap();
        let err = load_config(&dir).unwrap_err();
        assert!(matches!(err, BundlecovError::Config { .. }));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_unreadable_config_is_io_error() {
        let dir = create_temp_dir("unreadable");
        let err = load_config_file(&dir.join("absent.toml")).unwrap_err();
        assert!(matches!(err, BundlecovError::Io { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_default_output_is_plain() {
        assert!(!BundlecovConfig::default().wants_json());
    }
}
