//! Schema resolver - reference dereferencing and primitive type rules.
//!
//! The mapper consumes these through the [`SchemaResolver`] trait so tests can
//! inject a fake. [`DefaultResolver`] is the implementation the CLI uses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ResolverConfig;
use crate::loader::{load_schema, navigate_fragment, split_ref};
use crate::types::{PrimitiveType, COMPOSITION_KEYWORDS, JSON_TYPE};

/// Collaborator used by the mapper for everything it does not decide itself.
pub trait SchemaResolver {
    /// Dereference `reference` found on `context`. `None` if it cannot be
    /// resolved.
    fn resolve_reference(&self, reference: &str, context: &Value) -> Option<Value>;

    /// Derive the primitive type(s) of a raw schema.
    fn primitive_type(&self, schema: &Value) -> PrimitiveType;

    /// Final type coercion for a mapped property. `model` is the schema the
    /// property came from, if it has one. `None` drops the property.
    fn refine_type(&self, model: Option<&Value>, raw_type: &str) -> Option<String>;
}

impl<R: SchemaResolver + ?Sized> SchemaResolver for &R {
    fn resolve_reference(&self, reference: &str, context: &Value) -> Option<Value> {
        (**self).resolve_reference(reference, context)
    }

    fn primitive_type(&self, schema: &Value) -> PrimitiveType {
        (**self).primitive_type(schema)
    }

    fn refine_type(&self, model: Option<&Value>, raw_type: &str) -> Option<String> {
        (**self).refine_type(model, raw_type)
    }
}

/// Resolver backed by a root document and an optional base directory for
/// file references.
#[derive(Debug, Clone, Default)]
pub struct DefaultResolver {
    root: Value,
    base_dir: Option<PathBuf>,
    config: ResolverConfig,
}

impl DefaultResolver {
    /// Resolve internal `#/...` references against `root`.
    pub fn new(root: Value) -> Self {
        Self {
            root,
            base_dir: None,
            config: ResolverConfig::default(),
        }
    }

    /// Resolve relative file references against `dir`.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    fn root_scope(&self) -> Scope<'_> {
        Scope {
            document: &self.root,
            file: None,
        }
    }

    /// Directory that file references found in `scope` are relative to.
    fn ref_dir<'a>(&'a self, scope: &Scope<'a>) -> Option<&'a Path> {
        match scope.file {
            Some(file) => file.parent(),
            None => self.base_dir.as_deref(),
        }
    }

    fn load_external(&self, path: &Path) -> Option<Value> {
        match load_schema(path) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "cannot load referenced schema"
                );
                None
            }
        }
    }

    fn derive_type(&self, schema: &Value, scope: Scope<'_>, walk: &mut Walk) -> PrimitiveType {
        let single = |ty: Option<String>| {
            PrimitiveType::Single(ty.unwrap_or_else(|| JSON_TYPE.to_string()))
        };

        if let Value::Array(items) = schema {
            return self.derive_members(items, scope, walk);
        }
        let Some(map) = schema.as_object() else {
            return single(None);
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return self.follow(reference, scope, walk);
        }

        match map.get("type") {
            Some(Value::String(ty)) => single(self.refine_type(Some(schema), ty)),
            Some(Value::Array(types)) => PrimitiveType::Multiple(
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|ty| *ty != "null")
                    .map(|ty| {
                        self.refine_type(Some(schema), ty)
                            .unwrap_or_else(|| JSON_TYPE.to_string())
                    })
                    .collect(),
            ),
            _ => {
                let composition = COMPOSITION_KEYWORDS
                    .iter()
                    .find_map(|keyword| map.get(*keyword).and_then(Value::as_array));
                if let Some(items) = composition {
                    self.derive_members(items, scope, walk)
                } else if map.get("enum").is_some_and(Value::is_array) {
                    single(Some("enum".to_string()))
                } else {
                    single(None)
                }
            }
        }
    }

    fn derive_members(
        &self,
        items: &[Value],
        scope: Scope<'_>,
        walk: &mut Walk,
    ) -> PrimitiveType {
        PrimitiveType::Multiple(
            items
                .iter()
                .flat_map(|m| flatten(self.derive_type(m, scope, walk)))
                .collect(),
        )
    }

    /// Derive the type of a `$ref` target. Fragments resolve against the
    /// document the reference was found in.
    fn follow(&self, reference: &str, scope: Scope<'_>, walk: &mut Walk) -> PrimitiveType {
        let json = || PrimitiveType::Single(JSON_TYPE.to_string());
        let (file_part, fragment) = split_ref(reference);
        let fragment = fragment.unwrap_or("#");

        if file_part.is_empty() {
            let key = ref_key(scope.file, fragment);
            let Ok(target) = navigate_fragment(scope.document, fragment) else {
                tracing::debug!(reference, "unresolved reference");
                return json();
            };
            return walk.enter(key, |walk| self.derive_type(target, scope, walk));
        }

        let Some(dir) = self.ref_dir(&scope) else {
            tracing::warn!(reference = file_part, "file reference without a base directory");
            return json();
        };
        let path = dir.join(file_part);
        let key = ref_key(Some(&path), fragment);
        if let Some(known) = walk.known(&key) {
            return known;
        }
        let Some(document) = self.load_external(&path) else {
            return json();
        };
        let Ok(target) = navigate_fragment(&document, fragment) else {
            tracing::debug!(reference, "unresolved reference");
            return json();
        };
        let inner = Scope {
            document: &document,
            file: Some(&path),
        };
        walk.enter(key, |walk| self.derive_type(target, inner, walk))
    }

    /// Apply the alias table and check the vocabulary.
    fn canonical(&self, raw: &str) -> Option<String> {
        let ty = self.config.aliases.get(raw).map(String::as_str).unwrap_or(raw);
        self.config.is_known(ty).then(|| ty.to_string())
    }
}

impl SchemaResolver for DefaultResolver {
    fn resolve_reference(&self, reference: &str, _context: &Value) -> Option<Value> {
        let (file_part, fragment) = split_ref(reference);
        let resolved = if file_part.is_empty() {
            navigate_fragment(&self.root, fragment.unwrap_or("#"))
                .ok()
                .cloned()
        } else if let Some(dir) = self.ref_dir(&self.root_scope()) {
            let document = self.load_external(&dir.join(file_part));
            match fragment {
                Some(fragment) => document
                    .and_then(|document| navigate_fragment(&document, fragment).ok().cloned()),
                None => document,
            }
        } else {
            tracing::warn!(reference = file_part, "file reference without a base directory");
            None
        };
        if resolved.is_none() {
            tracing::debug!(reference, "unresolved reference");
        }
        resolved
    }

    fn primitive_type(&self, schema: &Value) -> PrimitiveType {
        self.derive_type(schema, self.root_scope(), &mut Walk::default())
    }

    fn refine_type(&self, model: Option<&Value>, raw_type: &str) -> Option<String> {
        // Comma-joined tags come from array-valued `type`s.
        if raw_type.contains(',') {
            let mut members = raw_type.split(',').map(str::trim).filter(|t| *t != "null");
            return match (members.next(), members.next()) {
                (Some(only), None) => self.refine_type(model, only),
                _ => Some(JSON_TYPE.to_string()),
            };
        }

        if raw_type == "string" {
            let format = model
                .and_then(|m| m.get("format"))
                .and_then(Value::as_str)
                .and_then(|f| self.config.formats.get(f));
            if let Some(ty) = format {
                return self.canonical(ty);
            }
        }

        self.canonical(raw_type)
    }
}

/// Document that `#...` references resolve against.
#[derive(Clone, Copy)]
struct Scope<'a> {
    document: &'a Value,
    /// File the document was loaded from, `None` for the root document.
    file: Option<&'a Path>,
}

/// Bookkeeping for one `primitive_type` call.
#[derive(Default)]
struct Walk {
    /// References being followed on the current path.
    active: Vec<String>,
    /// Types of references already derived.
    done: HashMap<String, PrimitiveType>,
}

impl Walk {
    fn known(&self, key: &str) -> Option<PrimitiveType> {
        if self.active.iter().any(|k| k == key) {
            tracing::debug!(reference = key, "cyclic reference");
            return Some(PrimitiveType::Single(JSON_TYPE.to_string()));
        }
        self.done.get(key).cloned()
    }

    /// Derive a reference target once. Cycles derive `json`.
    fn enter(
        &mut self,
        key: String,
        derive: impl FnOnce(&mut Walk) -> PrimitiveType,
    ) -> PrimitiveType {
        if let Some(known) = self.known(&key) {
            return known;
        }
        self.active.push(key.clone());
        let ty = derive(self);
        self.active.pop();
        self.done.insert(key, ty.clone());
        ty
    }
}

fn ref_key(file: Option<&Path>, fragment: &str) -> String {
    let fragment = fragment.trim_start_matches('#');
    match file {
        Some(file) => format!("{}#{}", file.display(), fragment),
        None => format!("#{}", fragment),
    }
}

fn flatten(ty: PrimitiveType) -> Vec<String> {
    match ty {
        PrimitiveType::Single(t) => vec![t],
        PrimitiveType::Multiple(ts) => ts,
    }
}
