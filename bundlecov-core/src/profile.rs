//! Coverage profile reading.
//!
//! The profile format is the JSON array exported by Chrome DevTools and
//! Puppeteer's `stopJSCoverage()`: one entry per script with its URL, the
//! executed ranges and the full script text.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{BundlecovError, BundlecovResult, IoResultExt};
use crate::interval::CoverageRange;

/// Directories never worth descending into when collecting profiles.
const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// One script entry of a coverage profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageAsset {
    pub url: String,
    #[serde(default)]
    pub ranges: Vec<CoverageRange>,
    #[serde(default)]
    pub text: String,
}

impl CoverageAsset {
    /// Only JavaScript assets can carry a module registration object.
    pub fn is_javascript(&self) -> bool {
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or(self.url.as_str());
        path.ends_with(".js")
    }
}

/// Parses a profile from JSON text. `origin` is only used for error context.
pub fn parse_profile(json: &str, origin: &Path) -> BundlecovResult<Vec<CoverageAsset>> {
    serde_json::from_str(json).map_err(|e| BundlecovError::json(origin, &e))
}

/// Reads one profile file.
pub fn load_profile(path: &Path) -> BundlecovResult<Vec<CoverageAsset>> {
    let content = fs::read_to_string(path).with_path(path)?;
    let assets = parse_profile(&content, path)?;
    debug!(path = %path.display(), assets = assets.len(), "loaded coverage profile");
    Ok(assets)
}

/// Collects profile files: the path itself if it is a file, otherwise every
/// `*.json` file below it, sorted.
pub fn gather_profile_files(input: &Path) -> BundlecovResult<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(BundlecovError::io(
            input,
            std::io::Error::new(std::io::ErrorKind::NotFound, "coverage input not found"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && e
                .file_name()
                .to_str()
                .is_some_and(|name| EXCLUDED_DIRS.contains(&name)))
    }) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| input.to_path_buf());
            BundlecovError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Loads every asset from a profile file or a directory of profiles.
///
/// Files are read in parallel; assets keep file order, then in-file order.
pub fn load_profiles(input: &Path) -> BundlecovResult<Vec<CoverageAsset>> {
    let files = gather_profile_files(input)?;
    let per_file = files
        .par_iter()
        .map(|f| load_profile(f))
        .collect::<BundlecovResult<Vec<_>>>()?;
    Ok(per_file.into_iter().flatten().collect())
}
