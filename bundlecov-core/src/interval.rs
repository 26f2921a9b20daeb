//! Interval data model: module boundaries and executed coverage ranges.
//!
//! Both are half-open `[start, end)` spans over the bundle text, measured in the
//! same offset unit the profiler uses.

use serde::{Deserialize, Serialize};

/// One module registered in a bundle, with the span of its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInterval {
    /// Module name as written in the registration object (usually a path).
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl ModuleInterval {
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Width of the module body. Zero for an empty body.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One executed range reported by the profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRange {
    pub start: usize,
    pub end: usize,
}

impl CoverageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Sorts ranges by start and merges overlapping or touching ones.
///
/// Well-formed profiler output passes through unchanged apart from merging
/// adjacent ranges, which cannot change any half-open overlap result.
pub fn normalize_ranges(mut ranges: Vec<CoverageRange>) -> Vec<CoverageRange> {
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<CoverageRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Sorts modules by start offset, keeping registration order for equal starts.
pub fn sort_modules(modules: &mut [ModuleInterval]) {
    modules.sort_by_key(|m| m.start);
}

/// Returns true if both sequences already satisfy the sweep precondition.
pub fn is_well_formed(modules: &[ModuleInterval], ranges: &[CoverageRange]) -> bool {
    let modules_ok = modules
        .windows(2)
        .all(|w| w[0].start <= w[1].start && w[0].end <= w[1].start);
    let ranges_ok = ranges
        .windows(2)
        .all(|w| w[0].start <= w[1].start && w[0].end <= w[1].start);
    modules_ok && ranges_ok
}
