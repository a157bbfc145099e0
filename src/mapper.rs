//! Schema → entity property mapping.
//!
//! Walks a schema node and produces the flat, ordered list of properties a
//! property editor shows for it. Branches are evaluated in a fixed order and
//! all applicable ones contribute:
//!
//! 1. `anyOf`, `allOf`, `oneOf` (each either recursed into or aggregated)
//! 2. `type` (aggregated for array types, expanded for objects)
//! 3. `enum` / `const`
//! 4. `$ref`
//!
//! Entries whose type cannot be resolved are dropped at the end.

use serde_json::{json, Value};

use crate::node::{is_basic, NodeKeywords, PrimitiveKind, TypeKeyword};
use crate::resolver::SchemaResolver;
use crate::types::{capitalize, EntityProperty, PrimitiveType, JSON_TYPE};

/// Maps schema nodes to entity properties using an injected resolver.
#[derive(Debug, Clone)]
pub struct SchemaPropertyMapper<R> {
    resolver: R,
}

impl<R: SchemaResolver> SchemaPropertyMapper<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Primitive type(s) of a raw schema, as derived by the resolver.
    pub fn primitive_type(&self, schema: &Value) -> PrimitiveType {
        self.resolver.primitive_type(schema)
    }

    /// Map `schema` to entity properties.
    ///
    /// `name` names the property produced for the node itself (object
    /// members are named after their keys). `prefix` is prepended to every
    /// produced name. Non-object nodes map to nothing.
    pub fn map(&self, schema: &Value, name: Option<&str>, prefix: &str) -> Vec<EntityProperty> {
        let name = name.filter(|n| !n.is_empty());
        let Some(node) = NodeKeywords::classify(schema) else {
            return Vec::new();
        };

        let mut entries: Vec<Option<EntityProperty>> = Vec::new();

        for members in node.compositions().into_iter().flatten() {
            if members.len() == 1 || !members.iter().any(is_basic) {
                for member in members {
                    entries.extend(self.map(member, name, prefix).into_iter().map(Some));
                }
            } else {
                entries.push(self.aggregate(members, name, prefix));
            }
        }

        match node.type_keyword {
            TypeKeyword::Union(types) => entries.push(self.aggregate(types, name, prefix)),
            TypeKeyword::Single("object") => {
                if let Some(properties) = node.properties {
                    for (key, property) in properties {
                        entries.push(self.primitive(property, Some(key), prefix));
                    }
                    for required in &node.required {
                        let full_name = format!("{prefix}{required}");
                        let entry = entries.iter_mut().flatten().find(|p| p.name == full_name);
                        if let Some(entry) = entry {
                            entry.required = true;
                        }
                    }
                }
            }
            TypeKeyword::Single(_) => entries.push(self.primitive(schema, name, prefix)),
            TypeKeyword::Absent | TypeKeyword::Null => {}
        }

        if node.enum_values.is_some() || node.const_value.is_some() {
            entries.push(self.primitive(schema, name, prefix));
        }

        if let Some(reference) = node.reference {
            match self.resolver.resolve_reference(reference, schema) {
                Some(target) => entries.push(self.primitive(&target, name, prefix)),
                None => tracing::debug!(reference, "skipping unresolved reference"),
            }
        }

        let produced = entries.len();
        let properties: Vec<EntityProperty> = entries
            .into_iter()
            .flatten()
            .filter(|p| !p.property_type.is_empty())
            .collect();
        if properties.len() < produced {
            tracing::trace!(
                dropped = produced - properties.len(),
                "dropped properties without a resolvable type"
            );
        }
        properties
    }

    /// Collapse union/intersection members (or array `type` entries) into a
    /// single `json` property listing the member types.
    fn aggregate(
        &self,
        members: &[Value],
        name: Option<&str>,
        prefix: &str,
    ) -> Option<EntityProperty> {
        let mut property = self.primitive(&json!({ "type": JSON_TYPE }), name, prefix)?;

        let mut aggregated: Vec<String> = Vec::new();
        for tag in members.iter().map(member_tag) {
            if !aggregated.contains(&tag) {
                aggregated.push(tag);
            }
        }

        property.aggregated_types = Some(aggregated);
        property.model = None;
        Some(property)
    }

    /// Map a single node to one property, without looking into its members.
    fn primitive(
        &self,
        schema: &Value,
        name: Option<&str>,
        prefix: &str,
    ) -> Option<EntityProperty> {
        let node = NodeKeywords::classify(schema)?;
        if node.is_empty() {
            return None;
        }
        let mut property = basic_property(&node, schema, name, prefix);

        match node.primitive_kind() {
            PrimitiveKind::NullType | PrimitiveKind::Bare => return None,
            PrimitiveKind::Typed(TypeKeyword::Single("object")) => {
                property.property_type = JSON_TYPE.to_string();
            }
            // Numeric inputs are edited as free-form text.
            PrimitiveKind::Typed(TypeKeyword::Single("number")) => {
                property.property_type = "string".to_string();
            }
            PrimitiveKind::Typed(_) | PrimitiveKind::Enum => {}
            PrimitiveKind::Const(value) => {
                property.value = Some(value.clone());
                property.read_only = true;
                property.property_type = JSON_TYPE.to_string();
                property.model = None;
            }
            PrimitiveKind::Composite => {
                property.property_type = JSON_TYPE.to_string();
            }
        }

        property.property_type = self
            .resolver
            .refine_type(property.model.as_ref(), &property.property_type)?;
        Some(property)
    }
}

/// Map `schema` to entity properties with the given resolver.
///
/// Shorthand for [`SchemaPropertyMapper::map`].
pub fn map_schema_to_properties<R: SchemaResolver>(
    schema: &Value,
    name: Option<&str>,
    prefix: &str,
    resolver: R,
) -> Vec<EntityProperty> {
    SchemaPropertyMapper::new(resolver).map(schema, name, prefix)
}

/// Descriptor fields taken directly from the node's own keywords.
fn basic_property(
    node: &NodeKeywords<'_>,
    schema: &Value,
    name: Option<&str>,
    prefix: &str,
) -> EntityProperty {
    let tag = node.type_tag();
    let fallback = capitalize(&tag);

    EntityProperty {
        id: name.map_or_else(|| tag.clone(), str::to_string),
        name: format!("{prefix}{}", name.unwrap_or(&fallback)),
        label: node.title.or(name).unwrap_or(&fallback).to_string(),
        property_type: tag,
        description: node.description.map(str::to_string),
        value: node.default.cloned(),
        read_only: node.read_only,
        required: false,
        placeholder: node.comment.map(str::to_string),
        model: Some(schema.clone()),
        aggregated_types: None,
    }
}

/// Type tag contributed by one aggregated member.
fn member_tag(member: &Value) -> String {
    match member {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("type") {
            Some(Value::String(ty)) if !ty.is_empty() => ty.clone(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => JSON_TYPE.to_string(),
            _ if map.get("enum").is_some_and(Value::is_array) => "enum".to_string(),
            _ => JSON_TYPE.to_string(),
        },
        _ => JSON_TYPE.to_string(),
    }
}
