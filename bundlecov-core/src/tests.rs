//! End-to-end test suite for bundlecov-core.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("bundlecov_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Builds a webpack chunk registering `modules` as `name -> body`.
fn webpack_chunk(modules: &[(&str, &str)]) -> String {
    let entries: Vec<String> = modules
        .iter()
        .map(|(name, body)| format!("\"{}\": function (module, exports, require) {{ {} }}", name, body))
        .collect();
    format!(
        "(self.webpackChunk = self.webpackChunk || []).push([[42], {{\n{}\n}}]);",
        entries.join(",\n")
    )
}

fn executed(text: &str, bodies: &[&str]) -> Vec<serde_json::Value> {
    bodies
        .iter()
        .map(|body| {
            let start = text.find(body).unwrap();
            serde_json::json!({ "start": start, "end": start + body.len() })
        })
        .collect()
}

fn write_profile(path: &Path, assets: &[(&str, &str, Vec<serde_json::Value>)]) {
    let json: Vec<_> = assets
        .iter()
        .map(|(url, text, ranges)| serde_json::json!({ "url": url, "text": text, "ranges": ranges }))
        .collect();
    write_file(path, &serde_json::to_string(&json).unwrap());
}

// Core Test 1: profile on disk, sizes from a project root
#[test]
fn test_end_to_end_with_root() {
    let dir = setup_temp_project();
    let app = dir.join("app");
    write_file(&app.join("src/index.js"), "start();\n");
    write_file(&app.join("src/settings.js"), "export const x = 1;\n");
    write_file(&app.join("node_modules/@ui/kit/button.js"), &"b".repeat(300));
    write_file(&app.join("node_modules/@ui/kit/modal.js"), &"m".repeat(200));
    write_file(&app.join("node_modules/left-pad/index.js"), &"l".repeat(50));

    let bundle = webpack_chunk(&[
        ("./src/index.js", "start();"),
        ("./src/settings.js", "settings();"),
        ("./node_modules/@ui/kit/button.js", "button();"),
        ("./node_modules/@ui/kit/modal.js", "modal();"),
        ("./node_modules/left-pad/index.js", "leftPad();"),
    ]);
    let ranges = executed(&bundle, &["start();", "leftPad();"]);
    let profile = dir.join("coverage.json");
    write_profile(
        &profile,
        &[
            ("https://example.com/main.js", bundle.as_str(), ranges),
            ("https://example.com/main.css", "body {}", Vec::new()),
        ],
    );

    let report = Bundlecov::new(&profile).with_root(&app).analyze().unwrap();

    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.skipped.len(), 1);

    let asset = &report.assets[0];
    assert_eq!(asset.total_modules, 5);
    assert_eq!(asset.used_modules, 2);
    assert_eq!(
        asset.unused,
        vec![
            SizedModule::new("./src/settings.js", 20),
            SizedModule::new("./node_modules/@ui/kit/button.js", 300),
            SizedModule::new("./node_modules/@ui/kit/modal.js", 200),
        ]
    );
    assert_eq!(
        asset.packages,
        vec![PackageTotal {
            package: "@ui/kit".to_string(),
            size: 500
        }]
    );

    let text = render_plain(&report);
    assert!(text.contains("@ui/kit"));
    assert!(!text.contains("left-pad"));
}

// Core Test 2: directory of profiles keeps file order
#[test]
fn test_profile_directory() {
    let dir = setup_temp_project();
    let bundle = webpack_chunk(&[("./src/a.js", "a();"), ("./src/b.js", "b();")]);

    write_profile(
        &dir.join("profiles/1-home.json"),
        &[("https://x/home.js", bundle.as_str(), executed(&bundle, &["a();"]))],
    );
    write_profile(
        &dir.join("profiles/2-about.json"),
        &[("https://x/about.js", bundle.as_str(), executed(&bundle, &["b();"]))],
    );
    write_file(&dir.join("profiles/notes.txt"), "not a profile");

    let report = Bundlecov::new(dir.join("profiles")).analyze().unwrap();

    let urls: Vec<_> = report.assets.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["https://x/home.js", "https://x/about.js"]);
    assert_eq!(report.assets[0].unused[0].name, "./src/b.js");
    assert_eq!(report.assets[1].unused[0].name, "./src/a.js");
}

// Core Test 3: a broken profile file fails the whole run
#[test]
fn test_malformed_profile_is_error() {
    let dir = setup_temp_project();
    write_file(&dir.join("coverage.json"), "{ not json");

    let result = Bundlecov::new(dir.join("coverage.json")).analyze();
    assert!(result.is_err());
}

// Core Test 4: one broken bundle does not stop the others
#[test]
fn test_broken_asset_does_not_block_batch() {
    let dir = setup_temp_project();
    let bundle = webpack_chunk(&[("./src/a.js", "a();")]);
    write_profile(
        &dir.join("coverage.json"),
        &[
            ("https://x/broken.js", "function (", Vec::new()),
            ("https://x/ok.js", bundle.as_str(), Vec::new()),
        ],
    );

    let report = Bundlecov::new(dir.join("coverage.json")).analyze().unwrap();

    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.assets[0].url, "https://x/ok.js");
    assert!(matches!(report.skipped[0].reason, SkipReason::ParseError(_)));
}

// Core Test 5: extraction feeds reconciliation directly
#[test]
fn test_extract_then_reconcile() {
    let bundle = webpack_chunk(&[
        ("./a.js", "a();"),
        ("./b.js", "b(); b2();"),
        ("./c.js", "c();"),
    ]);
    let modules = extract_modules(&bundle).unwrap().unwrap();

    let b2 = bundle.find("b2();").unwrap();
    let verdict = reconcile(&modules, &[CoverageRange::new(b2, b2 + 5)]);

    assert_eq!(verdict.len(), 3);
    assert_eq!(verdict.unused().collect::<Vec<_>>(), vec!["./a.js", "./c.js"]);
}

// Extended Test 1: the sweep agrees with a brute-force overlap check
#[test]
fn test_sweep_matches_brute_force() {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = |bound: usize| {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((seed >> 33) as usize) % bound
    };

    for round in 0..200 {
        let mut modules = Vec::new();
        let mut pos = 0;
        for i in 0..(1 + next(30)) {
            pos += next(4);
            let len = 1 + next(12);
            modules.push(ModuleInterval::new(format!("m{}", i), pos, pos + len));
            pos += len;
        }

        let mut ranges = Vec::new();
        let mut pos = 0;
        for _ in 0..next(20) {
            pos += 1 + next(15);
            let len = 1 + next(25);
            ranges.push(CoverageRange::new(pos, pos + len));
            pos += len;
        }

        let verdict = reconcile(&modules, &ranges);
        assert_eq!(verdict.len(), modules.len(), "round {}", round);

        for module in &modules {
            let expected = ranges
                .iter()
                .any(|r| module.start < r.end && r.start < module.end);
            assert_eq!(
                verdict.is_used(&module.name),
                Some(expected),
                "round {} module {:?} ranges {:?}",
                round,
                module,
                ranges
            );
        }
    }
}

// Extended Test 2: large bundle stays linear and complete
#[test]
fn test_large_bundle() {
    let names: Vec<String> = (0..2000).map(|i| format!("./node_modules/pkg{}/index.js", i % 50)).collect();
    let bodies: Vec<String> = (0..2000).map(|i| format!("f{}();", i)).collect();
    let modules: Vec<(&str, &str)> = names
        .iter()
        .zip(&bodies)
        .map(|(n, b)| (n.as_str(), b.as_str()))
        .collect();

    let bundle = webpack_chunk(&modules);
    let extracted = extract_modules(&bundle).unwrap().unwrap();
    // Names repeat every 50 modules; the verdict keeps one entry per name.
    assert_eq!(extracted.len(), 2000);

    let verdict = reconcile(&extracted, &[CoverageRange::new(0, bundle.len())]);
    assert_eq!(verdict.len(), 50);
    assert_eq!(verdict.used_count(), 50);
}

// Extended Test 3: JSON output round-trips through serde_json
#[test]
fn test_json_report_from_pipeline() {
    let bundle = webpack_chunk(&[("./node_modules/x/index.js", "x();")]);
    let assets = vec![CoverageAsset {
        url: "https://x/main.js".to_string(),
        ranges: Vec::new(),
        text: bundle,
    }];

    let report = Bundlecov::new("unused.json").analyze_assets(&assets).unwrap();
    let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

    assert_eq!(value["unused_modules"], 1);
    assert_eq!(value["assets"][0]["unused"][0]["name"], "./node_modules/x/index.js");
    assert_eq!(value["assets"][0]["unused"][0]["size"], 0);
    assert_eq!(value["assets"][0]["packages"].as_array().map(Vec::len), Some(0));
}
