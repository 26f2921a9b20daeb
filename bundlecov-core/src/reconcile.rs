//! Coverage reconciliation: decides which bundle modules were executed.
//!
//! A single forward two-pointer sweep over the module intervals and the
//! executed ranges. Both inputs must be sorted by start and internally
//! non-overlapping; the sweep neither re-sorts nor validates them.
//!
//! Performance characteristics:
//! - O(|modules| + |ranges|) time, every iteration advances at least one index
//! - O(|modules|) space for the verdict map

use indexmap::IndexMap;
use serde::Serialize;

use crate::interval::{CoverageRange, ModuleInterval};

/// How a module interval relates to the current coverage range.
///
/// Variants are checked in declaration order; touching endpoints count as
/// disjoint (half-open intervals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// `module.end <= range.start`
    ModuleBefore,
    /// `module.start >= range.end`
    ModuleAfter,
    /// Module lies entirely within the range.
    ModuleInside,
    /// Range lies entirely within the module.
    RangeInside,
    /// Module starts before the range and ends inside it.
    EndsInside,
    /// Module starts inside the range and ends after it.
    StartsInside,
}

impl Overlap {
    pub fn classify(module: &ModuleInterval, range: &CoverageRange) -> Self {
        let starts_before = module.start <= range.start;
        let starts_within = module.start >= range.start;
        let ends_within = module.end <= range.end;
        let ends_after = module.end >= range.end;

        if module.end <= range.start {
            Self::ModuleBefore
        } else if module.start >= range.end {
            Self::ModuleAfter
        } else if starts_within && ends_within {
            Self::ModuleInside
        } else if starts_before && ends_after {
            Self::RangeInside
        } else if starts_before && ends_within {
            Self::EndsInside
        } else {
            // Past the first four checks, start > range.start and end > range.end.
            Self::StartsInside
        }
    }

    /// Whether the module shares at least one offset with the range.
    pub fn is_overlap(self) -> bool {
        !matches!(self, Self::ModuleBefore | Self::ModuleAfter)
    }
}

/// Used/unused flag per module name, in the order modules were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoverageVerdict {
    flags: IndexMap<String, bool>,
}

impl CoverageVerdict {
    /// Registers a module as unused unless it is already known.
    fn register(&mut self, name: &str) {
        if !self.flags.contains_key(name) {
            self.flags.insert(name.to_string(), false);
        }
    }

    fn mark_used(&mut self, name: &str) {
        if let Some(used) = self.flags.get_mut(name) {
            *used = true;
        }
    }

    /// `Some(true)` if executed, `Some(false)` if never executed, `None` if unknown.
    pub fn is_used(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    /// Names whose flag stayed `false`, in encounter order.
    pub fn unused(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, used)| !**used)
            .map(|(name, _)| name.as_str())
    }

    /// Names that overlapped at least one executed range, in encounter order.
    pub fn used(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, used)| **used)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(name, used)| (name.as_str(), *used))
    }

    pub fn used_count(&self) -> usize {
        self.flags.values().filter(|used| **used).count()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Classifies every module as used or unused against the executed ranges.
///
/// Every module appears exactly once in the result, including modules the
/// sweep never reached because the ranges ran out first.
pub fn reconcile(modules: &[ModuleInterval], ranges: &[CoverageRange]) -> CoverageVerdict {
    let mut verdict = CoverageVerdict::default();
    let mut m = 0;
    let mut r = 0;

    while m < modules.len() && r < ranges.len() {
        let module = &modules[m];
        let range = &ranges[r];

        verdict.register(&module.name);

        let overlap = Overlap::classify(module, range);
        if overlap.is_overlap() {
            verdict.mark_used(&module.name);
        }

        match overlap {
            Overlap::ModuleBefore | Overlap::ModuleInside | Overlap::EndsInside => m += 1,
            Overlap::ModuleAfter => r += 1,
            Overlap::RangeInside | Overlap::StartsInside => {
                m += 1;
                r += 1;
            }
        }
    }

    for module in &modules[m..] {
        verdict.register(&module.name);
    }

    verdict
}
