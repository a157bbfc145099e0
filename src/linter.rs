//! Schema linting - static analysis of schema files before mapping.
//!
//! Checks schema files for:
//! - JSON syntax errors
//! - Broken $ref references (file not found, anchor not found)
//! - Object members the mapper would drop (unresolvable type)
//! - `required` entries naming undeclared properties
//! - Schemas that map to no entity properties at all

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};

use crate::loader::{is_url, load_schema, navigate_fragment, split_ref};
use crate::mapper::SchemaPropertyMapper;
use crate::resolver::DefaultResolver;

/// Keywords that make a root document something the mapper should produce
/// properties for (as opposed to a pure `$defs` library).
const MAPPABLE_KEYWORDS: &[&str] = &[
    "type", "properties", "anyOf", "allOf", "oneOf", "enum", "const", "$ref",
];

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/properties/id")
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    /// What the finding means for the mapped property list.
    pub fn impact(&self) -> &'static str {
        match self.code.as_str() {
            "E001" => "file cannot be mapped",
            "E002" | "E003" => "referencing property is dropped",
            "W001" => "property missing from output",
            "W002" => "required flag never applied",
            "W003" => "empty property list",
            _ => "",
        }
    }
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, files with warnings count as failed.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let results: Vec<FileResult> = files.iter().map(|file| lint_file(file, path)).collect();

    let count = |severity: Severity| {
        results
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    tracing::debug!(files = files.len(), errors, warnings, "lint finished");

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors,
        warnings,
        results,
    }
}

/// Lint a single schema file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let display_path = file
        .strip_prefix(base_path)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .unwrap_or(file)
        .to_path_buf();

    let schema = match load_schema(file) {
        Ok(s) => s,
        Err(e) => {
            return FileResult {
                file: display_path,
                status: FileStatus::Error,
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    code: "E001".to_string(),
                    file: file.to_path_buf(),
                    path: "/".to_string(),
                    message: format!("syntax error: {}", e),
                }],
            };
        }
    };

    let file_dir = file.parent().unwrap_or(Path::new("."));
    let mut checker = Checker {
        file,
        file_dir,
        root: &schema,
        mapper: SchemaPropertyMapper::new(DefaultResolver::new(schema.clone()).base_dir(file_dir)),
        diagnostics: Vec::new(),
    };
    checker.check_refs(&schema, "");
    checker.check_objects(&schema, "");
    checker.check_root();

    let diagnostics = checker.diagnostics;
    let status = if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        FileStatus::Error
    } else if diagnostics.is_empty() {
        FileStatus::Ok
    } else {
        FileStatus::Warning
    };

    FileResult {
        file: display_path,
        status,
        diagnostics,
    }
}

struct Checker<'a> {
    file: &'a Path,
    file_dir: &'a Path,
    root: &'a Value,
    mapper: SchemaPropertyMapper<DefaultResolver>,
    diagnostics: Vec<Diagnostic>,
}

impl Checker<'_> {
    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            message,
        });
    }

    /// Recursively check $ref values.
    fn check_refs(&mut self, value: &Value, path: &str) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    self.check_single_ref(reference, path);
                }
                for (key, child) in map {
                    self.check_refs(child, &format!("{}/{}", path, key));
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.check_refs(item, &format!("{}/{}", path, i));
                }
            }
            _ => {}
        }
    }

    fn check_single_ref(&mut self, reference: &str, path: &str) {
        // External URLs can't be checked locally
        if is_url(reference) {
            return;
        }

        let (file_part, fragment) = split_ref(reference);
        if file_part.is_empty() {
            if navigate_fragment(self.root, fragment.unwrap_or("#")).is_err() {
                self.push(
                    Severity::Error,
                    "E003",
                    path,
                    format!("anchor not found: {}", reference),
                );
            }
            return;
        }

        let ref_path = self.file_dir.join(file_part);
        if !ref_path.exists() {
            self.push(
                Severity::Error,
                "E002",
                path,
                format!("file not found: {}", file_part),
            );
            return;
        }

        if let Some(fragment) = fragment.filter(|f| *f != "#") {
            // An unreadable target already shows up when that file is linted
            if let Ok(target) = load_schema(&ref_path) {
                if navigate_fragment(&target, fragment).is_err() {
                    self.push(
                        Severity::Error,
                        "E003",
                        path,
                        format!("anchor not found in {}: {}", file_part, fragment),
                    );
                }
            }
        }
    }

    /// Check every object schema with declared properties.
    fn check_objects(&mut self, value: &Value, path: &str) {
        match value {
            Value::Object(map) => {
                let is_object = map.get("type").and_then(Value::as_str) == Some("object");
                if let (true, Some(Value::Object(properties))) =
                    (is_object, map.get("properties"))
                {
                    self.check_object(properties, map.get("required"), path);
                }
                for (key, child) in map {
                    self.check_objects(child, &format!("{}/{}", path, key));
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.check_objects(item, &format!("{}/{}", path, i));
                }
            }
            _ => {}
        }
    }

    fn check_object(
        &mut self,
        properties: &serde_json::Map<String, Value>,
        required: Option<&Value>,
        path: &str,
    ) {
        // Only the declared members; names from sibling compositions don't count.
        let members = json!({ "type": "object", "properties": properties });
        let mapped = self.mapper.map(&members, None, "");
        for key in properties.keys() {
            if !mapped.iter().any(|p| &p.name == key) {
                self.push(
                    Severity::Warning,
                    "W001",
                    &format!("{}/properties/{}", path, key),
                    format!("property \"{}\" has no resolvable type and is dropped", key),
                );
            }
        }

        let required = required.and_then(Value::as_array).into_iter().flatten();
        for name in required.filter_map(Value::as_str) {
            if !properties.contains_key(name) {
                self.push(
                    Severity::Warning,
                    "W002",
                    &format!("{}/required", path),
                    format!("required property \"{}\" is not declared", name),
                );
            }
        }
    }

    fn check_root(&mut self) {
        let Some(map) = self.root.as_object() else {
            return;
        };
        if !MAPPABLE_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
            return;
        }
        if self.mapper.map(self.root, None, "").is_empty() {
            self.push(
                Severity::Warning,
                "W003",
                "",
                "schema produces no entity properties".to_string(),
            );
        }
    }
}

/// Schema files under `path`, sorted. A file path is taken as is when it
/// has a `.json` extension.
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    let is_json = |p: &Path| p.extension().is_some_and(|ext| ext == "json");
    if path.is_file() {
        return if is_json(path) { vec![path.to_path_buf()] } else { Vec::new() };
    }

    let mut files = Vec::new();
    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten().map(|e| e.path()) {
            if entry.is_dir() {
                pending.push(entry);
            } else if is_json(&entry) {
                files.push(entry);
            }
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn lint_str(content: &str) -> FileResult {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        lint_file(file.path(), file.path().parent().unwrap())
    }

    fn codes(result: &FileResult) -> Vec<&str> {
        result.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn lint_valid_schema() {
        let result = lint_str(
            r#"{
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "string" } }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Ok);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn lint_invalid_json_syntax() {
        let result = lint_str("{ not valid json }");
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(codes(&result), vec!["E001"]);
    }

    #[test]
    fn lint_broken_internal_ref() {
        let result = lint_str(
            r##"{
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "data": { "$ref": "#/$defs/missing" }
                }
            }"##,
        );
        assert_eq!(result.status, FileStatus::Error);
        assert!(codes(&result).contains(&"E003"));
    }

    #[test]
    fn lint_broken_file_ref() {
        let result = lint_str(r#"{ "$ref": "nonexistent.json" }"#);
        assert_eq!(result.status, FileStatus::Error);
        assert!(codes(&result).contains(&"E002"));
    }

    #[test]
    fn lint_dropped_property() {
        let result = lint_str(
            r#"{
                "type": "object",
                "properties": {
                    "ok": { "type": "string" },
                    "broken": { "type": "decimal" }
                }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Warning);
        let diag = &result.diagnostics[0];
        assert_eq!(diag.code, "W001");
        assert_eq!(diag.path, "/properties/broken");
    }

    #[test]
    fn lint_dropped_property_shadowed_by_composition() {
        let result = lint_str(
            r#"{
                "type": "object",
                "properties": { "x": { "type": "decimal" } },
                "anyOf": [
                    { "type": "object", "properties": { "x": { "type": "string" } } }
                ]
            }"#,
        );
        assert_eq!(codes(&result), vec!["W001"]);
        assert_eq!(result.diagnostics[0].path, "/properties/x");
    }

    #[test]
    fn lint_nested_object_is_checked() {
        let result = lint_str(
            r#"{
                "type": "object",
                "properties": {
                    "address": {
                        "type": "object",
                        "required": ["zip"],
                        "properties": { "street": { "type": "string" } }
                    }
                }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Warning);
        let diag = &result.diagnostics[0];
        assert_eq!(diag.code, "W002");
        assert_eq!(diag.path, "/properties/address/required");
    }

    #[test]
    fn lint_schema_without_properties() {
        let result = lint_str(r#"{ "type": null }"#);
        assert_eq!(codes(&result), vec!["W003"]);
    }

    #[test]
    fn lint_definitions_library_is_not_flagged() {
        let result = lint_str(r#"{ "$defs": { "name": { "type": "string" } } }"#);
        assert_eq!(result.status, FileStatus::Ok);
    }

    #[test]
    fn diagnostics_describe_mapping_impact() {
        let result = lint_str(r#"{ "type": "object", "properties": { "x": {} } }"#);
        assert_eq!(codes(&result), vec!["W001", "W003"]);
        assert_eq!(result.diagnostics[0].impact(), "property missing from output");
        assert_eq!(result.diagnostics[1].impact(), "empty property list");
    }

    #[test]
    fn lint_nested_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b/deep")).unwrap();
        std::fs::write(dir.path().join("b/deep/z.json"), r#"{"type": "string"}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"type": "string"}"#).unwrap();

        let result = lint(dir.path(), false);
        let files: Vec<PathBuf> = result.results.iter().map(|r| r.file.clone()).collect();
        assert_eq!(
            files,
            vec![PathBuf::from("a.json"), Path::new("b").join("deep").join("z.json")]
        );
    }

    #[test]
    fn lint_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("valid.json"), r#"{"type": "string"}"#).unwrap();
        std::fs::write(dir.path().join("invalid.json"), "{ not json }").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.is_ok());
    }

    #[test]
    fn lint_strict_mode() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");
        std::fs::write(
            &file_path,
            r#"{"type": "object", "required": ["x"], "properties": {"y": {"type": "string"}}}"#,
        )
        .unwrap();

        let result = lint(&file_path, false);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.results[0].file, file_path);
        assert_eq!(result.passed, 1);
        assert_eq!(result.warnings, 1);

        let result = lint(&file_path, true);
        assert_eq!(result.passed, 0);
        assert_eq!(result.failed, 1);
    }

    #[test]
    fn lint_valid_ref_with_anchor() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("types.json"),
            r#"{"$defs": {"thing": {"type": "string"}}}"#,
        )
        .unwrap();
        let main_path = dir.path().join("main.json");
        std::fs::write(&main_path, r#"{"$ref": "types.json#/$defs/thing"}"#).unwrap();

        let result = lint_file(&main_path, dir.path());
        assert_eq!(result.status, FileStatus::Ok);
    }

    #[test]
    fn lint_broken_ref_anchor() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("types.json"), r#"{"$defs": {}}"#).unwrap();
        let main_path = dir.path().join("main.json");
        std::fs::write(
            &main_path,
            r#"{"type": "string", "anyOf": [{"$ref": "types.json#/$defs/missing"}]}"#,
        )
        .unwrap();

        let result = lint_file(&main_path, dir.path());
        assert_eq!(result.status, FileStatus::Error);
        assert!(codes(&result).contains(&"E003"));
    }
}
