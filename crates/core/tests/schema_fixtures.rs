//! Validates every IR fixture under fixtures/ir. Files named `invalid*.json`
//! must produce diagnostics; everything else must pass cleanly.

use modeweave_core::{collect_ir_files, validate_file};
use std::path::Path;

#[test]
fn fixtures_validate_as_expected() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/ir");
    let paths = collect_ir_files(&dir)
        .unwrap_or_else(|e| panic!("Failed to read fixtures at {}: {}", dir.display(), e));
    assert!(!paths.is_empty(), "no fixtures found in {}", dir.display());

    let mut failures = Vec::new();
    for path in &paths {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let diagnostics = validate_file(path);
        let expect_invalid = name.starts_with("invalid");
        if expect_invalid && diagnostics.is_empty() {
            failures.push(format!("{}: expected diagnostics, got none", name));
        }
        if !expect_invalid && !diagnostics.is_empty() {
            for d in diagnostics {
                failures.push(d.to_string());
            }
        }
    }

    assert!(
        failures.is_empty(),
        "fixture validation mismatches ({} of {} files):\n{}",
        failures.len(),
        paths.len(),
        failures.join("\n")
    );
}
