//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use bundlecov_core::prelude::*;
//! ```

// Core types
pub use crate::error::{BundlecovError, BundlecovResult};
pub use crate::interval::{CoverageRange, ModuleInterval};
pub use crate::package::{PackageTotal, SizedModule};
pub use crate::reconcile::CoverageVerdict;

// Core algorithms
pub use crate::package::aggregate;
pub use crate::reconcile::reconcile;

// Pipeline
pub use crate::builder::{AssetReport, Bundlecov, CoverageReport};
pub use crate::extract::extract_modules;
pub use crate::profile::{load_profiles, CoverageAsset};
pub use crate::size::{FsSizeResolver, SizeResolver};

// Configuration
pub use crate::config::{load_config, BundlecovConfig};

// Output
pub use crate::report::{print_json, print_plain};
