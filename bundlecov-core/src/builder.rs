//! Builder pattern API for bundle coverage analysis.
//!
//! Runs the whole pipeline for every asset of a coverage profile:
//!
//! ```rust,ignore
//! use bundlecov_core::prelude::*;
//!
//! let report = Bundlecov::new("coverage.json")
//!     .with_root("/path/to/app")
//!     .ignore_patterns(["polyfill"])
//!     .analyze()?;
//!
//! for asset in &report.assets {
//!     println!("{}: {} unused modules", asset.url, asset.unused.len());
//! }
//! ```
//!
//! Per asset: validate → extract modules → normalize → reconcile → drop
//! ignored modules → resolve sizes → aggregate by package. A failure on one
//! asset is logged and recorded as skipped; the other assets still run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{BundlecovError, BundlecovResult};
use crate::extract::extract_asset_modules;
use crate::interval::{is_well_formed, normalize_ranges, sort_modules};
use crate::package::{aggregate, PackageTotal, SizedModule};
use crate::profile::{load_profiles, CoverageAsset};
use crate::reconcile::reconcile;
use crate::size::{resolve_sizes, FsSizeResolver, SizeResolver};

/// Builder for configuring coverage analysis.
#[derive(Debug, Clone)]
pub struct Bundlecov {
    /// Coverage profile file, or a directory of profiles
    input: PathBuf,

    /// Project root used to resolve module sizes
    root: Option<PathBuf>,

    /// Module name patterns to drop from the unused list
    ignored_patterns: Vec<String>,

    /// Regex an asset URL must match
    asset_filter: Option<String>,

    /// Sort and merge inputs before the sweep
    normalize: bool,
}

impl Bundlecov {
    /// Create a new analysis builder for the given profile path.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            root: None,
            ignored_patterns: Vec::new(),
            asset_filter: None,
            normalize: true,
        }
    }

    /// Set the project root used for module size lookups.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Add patterns for modules to ignore.
    ///
    /// `prefix*` and `*suffix` match by prefix/suffix, anything else matches
    /// exactly or as a substring.
    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Only analyze assets whose URL matches this regex.
    pub fn asset_filter(mut self, pattern: impl Into<String>) -> Self {
        self.asset_filter = Some(pattern.into());
        self
    }

    /// Enable or disable sorting/merging of inputs before reconciliation.
    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    /// Project root used for size lookups, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Module patterns currently ignored.
    pub fn ignored(&self) -> &[String] {
        &self.ignored_patterns
    }

    /// Load the profile(s) and analyze every asset.
    pub fn analyze(&self) -> Result<CoverageReport> {
        let assets = load_profiles(&self.input)
            .with_context(|| format!("Failed to load coverage from {}", self.input.display()))?;
        self.analyze_assets(&assets)
    }

    /// Analyze already-loaded assets, resolving sizes on the local filesystem.
    pub fn analyze_assets(&self, assets: &[CoverageAsset]) -> Result<CoverageReport> {
        let resolver = FsSizeResolver::new(self.root.clone());
        self.analyze_with_resolver(assets, &resolver)
    }

    /// Analyze already-loaded assets with a custom size resolver.
    pub fn analyze_with_resolver(
        &self,
        assets: &[CoverageAsset],
        resolver: &dyn SizeResolver,
    ) -> Result<CoverageReport> {
        let filter = self
            .asset_filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| BundlecovError::invalid_argument(format!("asset filter: {e}")))?;

        // Assets are independent; par_iter keeps input order on collect.
        let outcomes: Vec<AssetOutcome> = assets
            .par_iter()
            .map(|asset| self.process_asset(asset, filter.as_ref(), resolver))
            .collect::<BundlecovResult<_>>()?;

        let mut report = CoverageReport::default();
        for outcome in outcomes {
            match outcome {
                AssetOutcome::Analyzed(asset) => report.assets.push(asset),
                AssetOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }
        Ok(report)
    }

    fn process_asset(
        &self,
        asset: &CoverageAsset,
        filter: Option<&Regex>,
        resolver: &dyn SizeResolver,
    ) -> BundlecovResult<AssetOutcome> {
        debug!(url = %asset.url, "processing asset");

        if !asset.is_javascript() {
            debug!(url = %asset.url, "asset is not javascript");
            return Ok(AssetOutcome::skipped(asset, SkipReason::NotJavascript));
        }
        if filter.is_some_and(|re| !re.is_match(&asset.url)) {
            debug!(url = %asset.url, "asset filtered out");
            return Ok(AssetOutcome::skipped(asset, SkipReason::FilteredOut));
        }

        let mut modules = match extract_asset_modules(asset) {
            Ok(Some(modules)) => modules,
            Ok(None) => {
                debug!(url = %asset.url, "no module registry found");
                return Ok(AssetOutcome::skipped(asset, SkipReason::NoModuleRegistry));
            }
            Err(e) => return AssetOutcome::skip_or_abort(asset, e),
        };

        let verdict = if self.normalize {
            sort_modules(&mut modules);
            let ranges = normalize_ranges(asset.ranges.clone());
            reconcile(&modules, &ranges)
        } else {
            if !is_well_formed(&modules, &asset.ranges) {
                warn!(url = %asset.url, "inputs are unsorted or overlapping, verdict may be wrong");
            }
            reconcile(&modules, &asset.ranges)
        };

        let unused: Vec<&str> = verdict
            .unused()
            .filter(|name| !self.is_ignored(name))
            .collect();
        let unused = resolve_sizes(unused, resolver);
        let packages = aggregate(&unused);

        debug!(
            url = %asset.url,
            modules = verdict.len(),
            unused = unused.len(),
            packages = packages.len(),
            "asset analyzed"
        );

        Ok(AssetOutcome::Analyzed(AssetReport {
            url: asset.url.clone(),
            total_modules: verdict.len(),
            used_modules: verdict.used_count(),
            unused,
            packages,
        }))
    }

    /// Check if a module name matches any ignored pattern.
    fn is_ignored(&self, name: &str) -> bool {
        self.ignored_patterns.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix('*') {
                name.starts_with(prefix)
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                name.ends_with(suffix)
            } else {
                name == pattern || name.contains(pattern.as_str())
            }
        })
    }
}

enum AssetOutcome {
    Analyzed(AssetReport),
    Skipped(SkippedAsset),
}

impl AssetOutcome {
    fn skipped(asset: &CoverageAsset, reason: SkipReason) -> Self {
        Self::Skipped(SkippedAsset {
            url: asset.url.clone(),
            reason,
        })
    }

    /// Records a recoverable failure as a skipped asset, propagates the rest.
    fn skip_or_abort(asset: &CoverageAsset, err: BundlecovError) -> BundlecovResult<Self> {
        if !err.is_recoverable() {
            return Err(err);
        }
        warn!(url = %asset.url, error = %err, "skipping asset");
        let detail = match err {
            BundlecovError::Parse { message, .. } => message,
            other => other.to_string(),
        };
        Ok(Self::skipped(asset, SkipReason::ParseError(detail)))
    }
}

/// Analysis result for one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReport {
    pub url: String,
    /// Modules found in the registration object
    pub total_modules: usize,
    /// Modules overlapping at least one executed range
    pub used_modules: usize,
    /// Never-executed modules in encounter order, minus ignored ones
    pub unused: Vec<SizedModule>,
    /// Unused bytes per third-party package
    pub packages: Vec<PackageTotal>,
}

impl AssetReport {
    pub fn unused_bytes(&self) -> u64 {
        self.unused.iter().map(|m| m.size).sum()
    }
}

/// An asset that produced no analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub url: String,
    pub reason: SkipReason,
}

/// Why an asset was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    NotJavascript,
    FilteredOut,
    NoModuleRegistry,
    ParseError(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJavascript => write!(f, "not a javascript asset"),
            Self::FilteredOut => write!(f, "filtered out"),
            Self::NoModuleRegistry => write!(f, "no module registry"),
            Self::ParseError(message) => write!(f, "parse error: {}", message),
        }
    }
}

/// Result of analyzing a whole coverage profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub assets: Vec<AssetReport>,
    pub skipped: Vec<SkippedAsset>,
}

impl CoverageReport {
    /// Check if any asset has unused modules.
    pub fn has_unused(&self) -> bool {
        self.assets.iter().any(|a| !a.unused.is_empty())
    }

    /// Total unused modules across all assets.
    pub fn unused_count(&self) -> usize {
        self.assets.iter().map(|a| a.unused.len()).sum()
    }

    /// Total resolved unused bytes across all assets.
    pub fn unused_bytes(&self) -> u64 {
        self.assets.iter().map(AssetReport::unused_bytes).sum()
    }
}
