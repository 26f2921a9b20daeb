//! Output formatting - markdown tables and JSON.
//!
//! The engine hands over modules in encounter order; sorting by size happens
//! only here.

use std::fmt::Write;

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::builder::{AssetReport, CoverageReport, SkippedAsset};

const SEPARATOR: &str = "===================================================";

/// Renders the report as plain text with github-markdown tables.
pub fn render_plain(report: &CoverageReport) -> String {
    let mut out = String::new();

    if report.assets.is_empty() {
        out.push_str("No analyzable assets found.\n");
    }

    for asset in &report.assets {
        render_asset(&mut out, asset);
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped assets ({}):", report.skipped.len());
        for skipped in &report.skipped {
            let _ = writeln!(out, "- {} ({})", skipped.url, skipped.reason);
        }
    }

    out.push('\n');
    out
}

fn render_asset(out: &mut String, asset: &AssetReport) {
    let _ = writeln!(out, "{}", SEPARATOR);
    let _ = writeln!(out, "Asset: ");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", asset.url);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Modules: {} total, {} used, {} unused",
        asset.total_modules,
        asset.used_modules,
        asset.unused.len()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Unused modules:");
    let _ = writeln!(out);
    if asset.unused.iter().any(|m| m.size > 0) {
        let mut rows: Vec<(u64, &str)> = asset
            .unused
            .iter()
            .filter(|m| m.size > 0)
            .map(|m| (m.size, m.name.as_str()))
            .collect();
        rows.sort_by_key(|(size, _)| *size);
        out.push_str(&markdown_table("Module", &rows));
    } else if asset.unused.is_empty() {
        let _ = writeln!(out, "None.");
    } else {
        // Nothing could be measured (no root given), names only.
        for module in &asset.unused {
            let _ = writeln!(out, "- {}", module.name);
        }
    }
    let _ = writeln!(out);

    if !asset.packages.is_empty() {
        let mut rows: Vec<(u64, &str)> = asset
            .packages
            .iter()
            .map(|p| (p.size, p.package.as_str()))
            .collect();
        rows.sort_by_key(|(size, _)| *size);

        let _ = writeln!(out, "Unused external packages:");
        let _ = writeln!(out);
        out.push_str(&markdown_table("Packages", &rows));
        let _ = writeln!(out);
    }
}

/// Two-column github-markdown table with a right-aligned size column.
fn markdown_table(label: &str, rows: &[(u64, &str)]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_content_arrangement(ContentArrangement::Disabled);
    table.set_header(vec![Cell::new("Size (bytes)"), Cell::new(label)]);

    for (size, name) in rows {
        table.add_row(vec![Cell::new(size), Cell::new(name)]);
    }
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    let mut out = table.to_string();
    out.push('\n');
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    unused_modules: usize,
    unused_bytes: u64,
    assets: &'a [AssetReport],
    skipped: &'a [SkippedAsset],
}

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &CoverageReport) -> serde_json::Result<String> {
    let doc = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        unused_modules: report.unused_count(),
        unused_bytes: report.unused_bytes(),
        assets: &report.assets,
        skipped: &report.skipped,
    };
    serde_json::to_string_pretty(&doc)
}

/// Prints the report in plain text format.
pub fn print_plain(report: &CoverageReport) {
    print!("{}", render_plain(report));
}

/// Prints the report in JSON format.
///
/// Falls back to a minimal summary if serialization fails.
pub fn print_json(report: &CoverageReport) {
    match render_json(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!(
                "{{\"unused_modules\": {}, \"unused_bytes\": {}}}",
                report.unused_count(),
                report.unused_bytes()
            );
        }
    }
}
