//! On-disk size lookup for unused modules.
//!
//! Never fails: a missing root, a missing file or a permission error all
//! resolve to 0 bytes.

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::debug;

use crate::package::SizedModule;

/// Resolves a module name to a byte size.
pub trait SizeResolver: Sync {
    fn size_of(&self, name: &str) -> u64;
}

/// Looks module names up relative to a project root on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsSizeResolver {
    root: Option<PathBuf>,
}

impl FsSizeResolver {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl SizeResolver for FsSizeResolver {
    fn size_of(&self, name: &str) -> u64 {
        let Some(root) = &self.root else {
            return 0;
        };

        let path = root.join(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => {
                debug!(module = %name, path = %path.display(), "not a regular file");
                0
            }
            Err(e) => {
                debug!(module = %name, path = %path.display(), error = %e, "size lookup failed");
                0
            }
        }
    }
}

/// Attaches a size to each unused module name, preserving input order.
pub fn resolve_sizes<'a, I>(names: I, resolver: &dyn SizeResolver) -> Vec<SizedModule>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    names
        .par_iter()
        .map(|name| SizedModule::new(*name, resolver.size_of(name)))
        .collect()
}
