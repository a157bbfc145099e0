//! Schema Property Mapper
//!
//! Turns JSON Schema documents into flat, ordered lists of entity property
//! descriptors for property-editing interfaces.
//!
//! # Example
//!
//! ```
//! use schema_props::{DefaultResolver, SchemaPropertyMapper};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["a"],
//!     "properties": {
//!         "a": { "type": "string" },
//!         "b": { "type": "number" }
//!     }
//! });
//!
//! let mapper = SchemaPropertyMapper::new(DefaultResolver::new(schema.clone()));
//! let properties = mapper.map(&schema, None, "");
//!
//! assert_eq!(properties.len(), 2);
//! assert_eq!(properties[0].name, "a");
//! assert!(properties[0].required);
//! // Numbers are edited as free-form text.
//! assert_eq!(properties[1].property_type, "string");
//! assert!(!properties[1].required);
//! ```
//!
//! # Mapping Rules
//!
//! | Schema | Result |
//! |--------|--------|
//! | `type: "object"` with `properties` | one property per key, `required` flags set |
//! | scalar `type` | one property for the node itself |
//! | `type: [..]` | one aggregated `json` property |
//! | `anyOf`/`allOf`/`oneOf`, several members, one basic | one aggregated `json` property |
//! | `anyOf`/`allOf`/`oneOf`, otherwise | members mapped recursively |
//! | `enum` / `const` | one property for the node (`const` is read-only `json`) |
//! | `$ref` | one property for the referenced schema |
//!
//! Properties whose type cannot be resolved are dropped.

mod config;
mod error;
mod linter;
mod loader;
mod mapper;
mod node;
mod resolver;
mod types;
mod validator;

pub use config::{ResolverConfig, BASE_TYPES};
pub use error::{ConfigError, LoadError, ValidateError, ValueError};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{
    is_url, load_schema, load_schema_auto, load_schema_str, navigate_fragment, split_ref,
};
pub use mapper::{map_schema_to_properties, SchemaPropertyMapper};
pub use node::{is_basic, NodeKeywords, PrimitiveKind, TypeKeyword};
pub use resolver::{DefaultResolver, SchemaResolver};
pub use types::{json_type_name, EntityProperty, PrimitiveType, JSON_TYPE};
pub use validator::{parse_input, validate_value};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
