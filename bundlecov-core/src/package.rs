//! Attribution of unused module bytes to their owning npm packages.
//!
//! A module belongs to a package when its path contains a `node_modules`
//! segment; the package name is the next segment, or the next two for a
//! scoped package (`@scope/name`). First-party modules are not attributed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const NODE_MODULES: &str = "node_modules";

/// An unused module together with its resolved on-disk size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedModule {
    pub name: String,
    /// Size in bytes, 0 when it could not be resolved.
    pub size: u64,
}

impl SizedModule {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Total unused bytes attributed to one package. Always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTotal {
    pub package: String,
    pub size: u64,
}

/// Extracts the owning package name from a module path.
///
/// Uses the first `node_modules` segment. Returns `None` for first-party paths
/// or when nothing follows `node_modules`.
pub fn package_name(path: &str) -> Option<String> {
    let mut segments = path.split(['/', '\\']);

    while let Some(segment) = segments.next() {
        if segment != NODE_MODULES {
            continue;
        }

        match segments.next() {
            Some(scope) if scope.starts_with('@') => {
                return match segments.next() {
                    Some(name) if !name.is_empty() => Some(format!("{scope}/{name}")),
                    _ => Some(scope.to_string()),
                };
            }
            Some(name) if !name.is_empty() => return Some(name.to_string()),
            // `node_modules/` with an empty tail, keep looking further along.
            _ => continue,
        }
    }

    None
}

/// Sums unused module sizes per owning package.
///
/// Packages appear in the order they are first seen; packages whose total is
/// zero are dropped.
pub fn aggregate(modules: &[SizedModule]) -> Vec<PackageTotal> {
    let mut by_package: IndexMap<String, u64> = IndexMap::new();

    for module in modules {
        let Some(package) = package_name(&module.name) else {
            continue;
        };
        *by_package.entry(package).or_insert(0) += module.size;
    }

    by_package
        .into_iter()
        .filter(|(_, size)| *size > 0)
        .map(|(package, size)| PackageTotal { package, size })
        .collect()
}
