//! bundlecov-core: unused module detection for JavaScript bundles.
//!
//! Takes a runtime coverage profile (executed ranges per script, as exported by
//! Chrome DevTools or Puppeteer), finds the modules registered inside each
//! bundle, and reports which of them never ran and how many bytes of
//! third-party package code they account for.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bundlecov_core::prelude::*;
//!
//! let report = Bundlecov::new("coverage.json")
//!     .with_root("/path/to/app")
//!     .analyze()?;
//!
//! print_plain(&report);
//! ```
//!
//! The core is usable on its own:
//!
//! ```rust
//! use bundlecov_core::{reconcile, CoverageRange, ModuleInterval};
//!
//! let modules = vec![
//!     ModuleInterval::new("a", 0, 10),
//!     ModuleInterval::new("b", 10, 30),
//!     ModuleInterval::new("c", 30, 40),
//! ];
//! let verdict = reconcile(&modules, &[CoverageRange::new(5, 25)]);
//! assert_eq!(verdict.unused().collect::<Vec<_>>(), vec!["c"]);
//! ```
//!
//! # Module Organization
//!
//! - [`interval`]: Module boundary and coverage range model
//! - [`reconcile`]: Linear sweep classifying modules as used/unused
//! - [`package`]: Attribution of unused bytes to npm packages
//! - [`extract`]: Module registry extraction from bundle text (oxc)
//! - [`profile`]: Coverage profile reading
//! - [`size`]: On-disk size resolution
//! - [`builder`]: Fluent pipeline API
//! - [`report`]: Markdown and JSON output
//! - [`error`]: Typed error handling

pub mod builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod interval;
pub mod logging;
pub mod package;
pub mod prelude;
pub mod profile;
pub mod reconcile;
pub mod report;
pub mod size;

// Error types
pub use error::{BundlecovError, BundlecovResult, IoResultExt};

// Builder API
pub use builder::{AssetReport, Bundlecov, CoverageReport, SkipReason, SkippedAsset};

// Configuration
pub use config::{load_config, load_config_file, BundlecovConfig, OutputConfig, CONFIG_FILE};

// Data model
pub use interval::{is_well_formed, normalize_ranges, sort_modules, CoverageRange, ModuleInterval};

// Reconciliation
pub use reconcile::{reconcile, CoverageVerdict, Overlap};

// Package aggregation
pub use package::{aggregate, package_name, PackageTotal, SizedModule};

// Extraction
pub use extract::{extract_asset_modules, extract_modules, OffsetMap};

// Profile reading
pub use profile::{gather_profile_files, load_profile, load_profiles, parse_profile, CoverageAsset};

// Size resolution
pub use size::{resolve_sizes, FsSizeResolver, SizeResolver};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{print_json, print_plain, render_json, render_plain};

#[cfg(test)]
mod tests;
