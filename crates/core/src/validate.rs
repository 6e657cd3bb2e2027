//! Validation of grammar IR documents before compilation.
//!
//! Two layers run in order. The embedded JSON Schema checks the shape of
//! the document (field types, reference objects). If the shape is sound,
//! value-level checks follow: schema version, pattern types and flags,
//! mode id presence/uniqueness, and reference resolution. Every problem
//! becomes a [`Diagnostic`]; nothing here fails fast.

use crate::error::Diagnostic;
use modeweave_interchange::IR_VERSION;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static IR_SCHEMA_STR: &str = include_str!("../../../schema/grammar-ir.schema.json");

/// Pattern `type` values the compiler understands.
pub const ALLOWED_PATTERN_TYPES: &[&str] = &["regex", "string"];
/// Regex flags the compiler understands.
pub const ALLOWED_FLAGS: &[char] = &['i', 'u'];

const PATTERN_FIELDS: &[&str] = &["begin", "end", "match", "illegal"];
const REF_LIST_FIELDS: &[&str] = &["contains", "variants"];

/// Outcome of validating a batch of documents.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Number of documents checked.
    pub checked: usize,
    /// Diagnostics across all documents, in file order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

fn schema_validator() -> Result<&'static jsonschema::Validator, String> {
    static VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            let schema: Value = serde_json::from_str(IR_SCHEMA_STR)
                .map_err(|e| format!("failed to parse embedded IR schema: {}", e))?;
            jsonschema::validator_for(&schema)
                .map_err(|e| format!("failed to compile embedded IR schema: {}", e))
        })
        .as_ref()
        .map_err(|e| e.clone())
}

/// Validate an already-parsed document. `source` tags every diagnostic.
pub fn validate_document(doc: &Value, source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    match schema_validator() {
        Ok(validator) => {
            for error in validator.iter_errors(doc) {
                diagnostics.push(Diagnostic::at(source, "schema", error.to_string()));
            }
        }
        Err(msg) => {
            diagnostics.push(Diagnostic::document(source, format!("internal error: {}", msg)));
            return diagnostics;
        }
    }

    // Value-level checks assume the shape is sound.
    if diagnostics.is_empty() {
        check_document(doc, source, &mut diagnostics);
    }
    diagnostics
}

/// Read, parse and validate one file. Read and parse failures are
/// reported as diagnostics like any other problem.
pub fn validate_file(path: &Path) -> Vec<Diagnostic> {
    let source = path.display().to_string();
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => return vec![Diagnostic::document(&source, format!("failed to read file: {}", e))],
    };
    let doc: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => return vec![Diagnostic::document(&source, format!("failed to parse JSON: {}", e))],
    };
    validate_document(&doc, &source)
}

/// Validate every path, collecting diagnostics across all of them.
pub fn validate_paths(paths: &[PathBuf]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for path in paths {
        let diagnostics = validate_file(path);
        tracing::debug!(
            path = %path.display(),
            diagnostics = diagnostics.len(),
            "validated IR document"
        );
        report.diagnostics.extend(diagnostics);
        report.checked += 1;
    }
    report
}

/// The `*.json` files directly inside `dir`, sorted by path.
pub fn collect_ir_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

// ── Value-level checks ──────────────────────────────────────────────

fn check_document(doc: &Value, source: &str, out: &mut Vec<Diagnostic>) {
    let version = doc.get("version").cloned().unwrap_or(Value::Null);
    if version.as_u64() != Some(IR_VERSION) {
        out.push(Diagnostic::document(
            source,
            format!("unsupported IR version '{}'", version),
        ));
    }

    let Some(language) = doc.get("language").filter(|l| l.is_object()) else {
        out.push(Diagnostic::document(source, "missing language object"));
        return;
    };

    check_pattern(language.get("illegal"), source, "language.illegal", out);
    if let Some(kw) = language.get("keywords") {
        check_pattern(kw.get("pattern"), source, "language.keywords.pattern", out);
    }

    let modes: &[Value] = doc
        .get("modes")
        .and_then(|m| m.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut mode_ids: HashSet<&str> = HashSet::new();
    for mode in modes {
        match mode.get("id").and_then(|v| v.as_str()) {
            None | Some("") => out.push(Diagnostic::document(source, "mode missing id")),
            Some(mid) => {
                if !mode_ids.insert(mid) {
                    out.push(Diagnostic::document(
                        source,
                        format!("duplicate mode id '{}'", mid),
                    ));
                }
                if !is_identifier_safe(mid) {
                    out.push(Diagnostic::document(
                        source,
                        format!("mode id '{}' is not identifier-safe", mid),
                    ));
                }
            }
        }
    }

    for mode in modes {
        check_mode(mode, &mode_ids, source, out);
    }

    check_refs(language.get("contains"), &mode_ids, source, "language.contains", out);
}

/// Ids become part of generated declaration names.
fn is_identifier_safe(id: &str) -> bool {
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_pattern(pattern: Option<&Value>, source: &str, location: &str, out: &mut Vec<Diagnostic>) {
    let Some(pattern) = pattern.filter(|p| !p.is_null()) else {
        return;
    };
    let ptype = pattern.get("type").and_then(|t| t.as_str());
    if !ptype.is_some_and(|t| ALLOWED_PATTERN_TYPES.contains(&t)) {
        out.push(Diagnostic::at(
            source,
            location,
            format!("unsupported pattern type '{}'", ptype.unwrap_or("None")),
        ));
    }
    let flags = pattern.get("flags").and_then(|f| f.as_str()).unwrap_or("");
    for flag in flags.chars() {
        if !ALLOWED_FLAGS.contains(&flag) {
            out.push(Diagnostic::at(
                source,
                location,
                format!("unsupported regex flag '{}'", flag),
            ));
        }
    }
}

fn check_mode(mode: &Value, mode_ids: &HashSet<&str>, source: &str, out: &mut Vec<Diagnostic>) {
    let mid = mode.get("id").and_then(|v| v.as_str()).unwrap_or("<unknown>");

    for key in PATTERN_FIELDS {
        check_pattern(mode.get(*key), source, &format!("mode {}.{}", mid, key), out);
    }
    if let Some(kw) = mode.get("keywords") {
        check_pattern(kw.get("pattern"), source, &format!("mode {}.keywords.pattern", mid), out);
    }

    for key in REF_LIST_FIELDS {
        check_refs(mode.get(*key), mode_ids, source, &format!("mode {}.{}", mid, key), out);
    }

    if let Some(starts) = mode.get("starts").filter(|s| !s.is_null()) {
        check_ref(starts, mode_ids, source, &format!("mode {}.starts", mid), out);
    }
}

fn check_refs(
    refs: Option<&Value>,
    mode_ids: &HashSet<&str>,
    source: &str,
    location: &str,
    out: &mut Vec<Diagnostic>,
) {
    let Some(refs) = refs.and_then(|r| r.as_array()) else {
        return;
    };
    for r in refs {
        if r.as_str() == Some("self") {
            continue;
        }
        check_ref(r, mode_ids, source, location, out);
    }
}

fn check_ref(r: &Value, mode_ids: &HashSet<&str>, source: &str, location: &str, out: &mut Vec<Diagnostic>) {
    match r.get("ref").and_then(|t| t.as_str()) {
        Some(target) if mode_ids.contains(target) => {}
        Some(target) => out.push(Diagnostic::at(
            source,
            location,
            format!("unknown ref '{}'", target),
        )),
        None => out.push(Diagnostic::at(source, location, format!("invalid ref '{}'", r))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(diags: &[Diagnostic]) -> Vec<String> {
        diags.iter().map(|d| d.to_string()).collect()
    }

    fn valid_doc() -> Value {
        json!({
            "version": 1,
            "language": {
                "name": "Demo",
                "aliases": ["dm"],
                "keywords": null,
                "illegal": {"type": "regex", "source": "</", "flags": ""},
                "classNameAliases": {},
                "contains": [{"ref": "m1"}]
            },
            "modes": [
                {
                    "id": "m1",
                    "scope": "string",
                    "begin": {"type": "regex", "source": "\"", "flags": "iu"},
                    "end": {"type": "string", "source": "\""},
                    "contains": ["self", {"ref": "m2"}],
                    "variants": [],
                    "starts": null,
                    "relevance": null
                },
                {
                    "id": "m2",
                    "scope": "subst",
                    "beginScope": {"1": "keyword"},
                    "contains": [{"ref": "m1"}],
                    "starts": {"ref": "m1"}
                }
            ]
        })
    }

    #[test]
    fn valid_document_has_no_diagnostics() {
        let diags = validate_document(&valid_doc(), "demo.json");
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", messages(&diags));
    }

    #[test]
    fn unsupported_version() {
        let mut doc = valid_doc();
        doc["version"] = json!(2);
        let diags = validate_document(&doc, "demo.json");
        assert_eq!(messages(&diags), vec!["demo.json: unsupported IR version '2'"]);
    }

    #[test]
    fn missing_version_reports_null() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("version");
        let diags = validate_document(&doc, "demo.json");
        assert_eq!(messages(&diags), vec!["demo.json: unsupported IR version 'null'"]);
    }

    #[test]
    fn missing_language() {
        let doc = json!({"version": 1, "modes": []});
        let diags = validate_document(&doc, "x.json");
        assert_eq!(messages(&diags), vec!["x.json: missing language object"]);
    }

    #[test]
    fn pattern_type_and_flags() {
        let mut doc = valid_doc();
        doc["modes"][0]["begin"] = json!({"type": "glob", "source": "*", "flags": "gi"});
        let diags = validate_document(&doc, "d");
        assert_eq!(
            messages(&diags),
            vec![
                "d: mode m1.begin: unsupported pattern type 'glob'",
                "d: mode m1.begin: unsupported regex flag 'g'",
            ]
        );
    }

    #[test]
    fn duplicate_and_missing_ids() {
        let mut doc = valid_doc();
        doc["modes"].as_array_mut().unwrap().push(json!({"id": "m1"}));
        doc["modes"].as_array_mut().unwrap().push(json!({"scope": "x"}));
        let diags = validate_document(&doc, "d");
        let msgs = messages(&diags);
        assert!(msgs.contains(&"d: duplicate mode id 'm1'".to_string()), "{:?}", msgs);
        assert!(msgs.contains(&"d: mode missing id".to_string()), "{:?}", msgs);
    }

    #[test]
    fn identifier_unsafe_id() {
        let mut doc = valid_doc();
        doc["modes"].as_array_mut().unwrap().push(json!({"id": "bad-id"}));
        let diags = validate_document(&doc, "d");
        assert_eq!(messages(&diags), vec!["d: mode id 'bad-id' is not identifier-safe"]);
    }

    #[test]
    fn unknown_references() {
        let mut doc = valid_doc();
        doc["modes"][0]["variants"] = json!([{"ref": "nope"}]);
        doc["modes"][1]["starts"] = json!({"ref": "gone"});
        doc["language"]["contains"] = json!([{"ref": "m1"}, {"ref": "zz"}]);
        let diags = validate_document(&doc, "d");
        assert_eq!(
            messages(&diags),
            vec![
                "d: mode m1.variants: unknown ref 'nope'",
                "d: mode m2.starts: unknown ref 'gone'",
                "d: language.contains: unknown ref 'zz'",
            ]
        );
    }

    #[test]
    fn shape_errors_stop_value_checks() {
        let doc = json!({
            "version": 7,
            "language": {"contains": "m1"},
            "modes": [{"id": "m1", "contains": [42]}]
        });
        let diags = validate_document(&doc, "d");
        assert!(!diags.is_empty());
        assert!(diags
            .iter()
            .all(|d| d.location.as_deref() == Some("schema")));
    }

    #[test]
    fn validate_paths_collects_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.json");
        let bad = dir.path().join("b.json");
        let broken = dir.path().join("c.json");
        std::fs::write(&good, valid_doc().to_string()).unwrap();
        std::fs::write(&bad, json!({"version": 3, "language": {}}).to_string()).unwrap();
        std::fs::write(&broken, "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let paths = collect_ir_files(dir.path()).unwrap();
        assert_eq!(paths, vec![good.clone(), bad.clone(), broken.clone()]);

        let report = validate_paths(&paths);
        assert_eq!(report.checked, 3);
        assert!(!report.is_valid());
        assert_eq!(report.diagnostics.len(), 2);
        assert!(report.diagnostics[0].message.contains("unsupported IR version '3'"));
        assert!(report.diagnostics[1].message.starts_with("failed to parse JSON"));
    }

    #[test]
    fn diagnostic_json_shape() {
        let d = Diagnostic::at("f.json", "mode m1.begin", "bad");
        let v = d.to_json_value();
        assert_eq!(v["source"], "f.json");
        assert_eq!(v["location"], "mode m1.begin");
        assert_eq!(v["message"], "bad");
        assert!(Diagnostic::document("f", "x").to_json_value()["location"].is_null());
    }
}
