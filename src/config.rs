//! Resolver configuration.
//!
//! Defaults cover the standard property-editor vocabulary. A TOML file can
//! extend it:
//!
//! ```toml
//! extra_types = ["file", "folder"]
//!
//! [formats]
//! date = "date"
//! date-time = "datetime"
//! uri = "string"
//!
//! [aliases]
//! int = "integer"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Primitive types every property editor understands.
pub const BASE_TYPES: &[&str] = &[
    "string", "integer", "boolean", "date", "datetime", "json", "array", "enum", "file",
    "folder",
];

/// Rules used by [`DefaultResolver`](crate::DefaultResolver) to refine raw
/// schema types.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// `format` of a string schema → primitive type.
    pub formats: BTreeMap<String, String>,
    /// Raw `type` value → primitive type.
    pub aliases: BTreeMap<String, String>,
    /// Types accepted in addition to [`BASE_TYPES`].
    pub extra_types: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let formats = [("date", "date"), ("date-time", "datetime")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let aliases = [("object", "json"), ("number", "string"), ("date-time", "datetime")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            formats,
            aliases,
            extra_types: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Parse a TOML document. Missing tables keep their defaults, present
    /// tables are merged over them.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: ResolverConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse { source })?;
        let mut config = Self::default();
        config.formats.extend(parsed.formats);
        config.aliases.extend(parsed.aliases);
        config.extra_types = parsed.extra_types;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Map a string `format` to a primitive type.
    pub fn format(mut self, format: impl Into<String>, ty: impl Into<String>) -> Self {
        self.formats.insert(format.into(), ty.into());
        self
    }

    /// Map a raw `type` value to a primitive type.
    pub fn alias(mut self, raw: impl Into<String>, ty: impl Into<String>) -> Self {
        self.aliases.insert(raw.into(), ty.into());
        self
    }

    /// Accept an additional primitive type.
    pub fn extra_type(mut self, ty: impl Into<String>) -> Self {
        self.extra_types.push(ty.into());
        self
    }

    /// Returns true if `ty` belongs to the configured vocabulary.
    pub fn is_known(&self, ty: &str) -> bool {
        BASE_TYPES.contains(&ty) || self.extra_types.iter().any(|t| t == ty)
    }
}
