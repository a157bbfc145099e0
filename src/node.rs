//! One-pass classification of a schema node's keywords.
//!
//! The mapper inspects a node through [`NodeKeywords`] instead of probing the
//! raw JSON map repeatedly.

use serde_json::{Map, Value};

/// Shape of a node's `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeKeyword<'a> {
    /// No usable `type` (missing, empty string, or a non-string scalar).
    Absent,
    /// `"type": null`
    Null,
    Single(&'a str),
    /// Array-valued `type`, e.g. `["string", "null"]`.
    Union(&'a [Value]),
}

impl<'a> TypeKeyword<'a> {
    fn parse(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Null) => TypeKeyword::Null,
            Some(Value::String(s)) if !s.is_empty() => TypeKeyword::Single(s),
            Some(Value::Array(items)) => TypeKeyword::Union(items),
            _ => TypeKeyword::Absent,
        }
    }

    /// Tag used for ids and labels. Union members are joined with `,`.
    pub fn tag(&self) -> Option<String> {
        match self {
            TypeKeyword::Single(s) => Some((*s).to_string()),
            TypeKeyword::Union(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            TypeKeyword::Absent | TypeKeyword::Null => None,
        }
    }
}

/// How primitive mapping treats a node, decided from its keywords.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveKind<'a> {
    /// Has a `type`; the tag is resolved from it.
    Typed(TypeKeyword<'a>),
    /// `"type": null` never maps to a property.
    NullType,
    /// `const` without a `type`.
    Const(&'a Value),
    /// `allOf`/`anyOf`/`oneOf` without a `type`.
    Composite,
    /// `enum` without a `type`.
    Enum,
    /// Nothing mappable.
    Bare,
}

/// Borrowed view over the keywords the mapper understands.
#[derive(Debug, Clone)]
pub struct NodeKeywords<'a> {
    pub map: &'a Map<String, Value>,
    pub type_keyword: TypeKeyword<'a>,
    pub properties: Option<&'a Map<String, Value>>,
    pub required: Vec<&'a str>,
    pub enum_values: Option<&'a Vec<Value>>,
    pub const_value: Option<&'a Value>,
    pub any_of: Option<&'a [Value]>,
    pub all_of: Option<&'a [Value]>,
    pub one_of: Option<&'a [Value]>,
    pub reference: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub default: Option<&'a Value>,
    pub read_only: bool,
    pub comment: Option<&'a str>,
}

impl<'a> NodeKeywords<'a> {
    /// Classify a node. Returns `None` for anything that is not a JSON object.
    pub fn classify(node: &'a Value) -> Option<Self> {
        let map = node.as_object()?;
        let members = move |key: &str| {
            map.get(key)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
        };
        let text = move |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        Some(Self {
            map,
            type_keyword: TypeKeyword::parse(map.get("type")),
            properties: map.get("properties").and_then(Value::as_object),
            required: map
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default(),
            enum_values: map.get("enum").and_then(Value::as_array),
            const_value: map.get("const"),
            any_of: members("anyOf"),
            all_of: members("allOf"),
            one_of: members("oneOf"),
            reference: text("$ref"),
            title: text("title"),
            description: map.get("description").and_then(Value::as_str),
            default: map.get("default"),
            read_only: map.get("readOnly").and_then(Value::as_bool).unwrap_or(false),
            comment: map.get("$comment").and_then(Value::as_str),
        })
    }

    /// Composition members in visiting order: `anyOf`, `allOf`, `oneOf`.
    pub fn compositions(&self) -> [Option<&'a [Value]>; 3] {
        [self.any_of, self.all_of, self.one_of]
    }

    pub fn is_composite(&self) -> bool {
        self.compositions().iter().any(Option::is_some)
    }

    /// A node with no keywords at all.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Tag used for ids and labels when no name is given.
    pub fn type_tag(&self) -> String {
        self.type_keyword.tag().unwrap_or_else(|| {
            if self.enum_values.is_some() {
                "enum".to_string()
            } else {
                "const".to_string()
            }
        })
    }

    pub fn primitive_kind(&self) -> PrimitiveKind<'a> {
        match self.type_keyword {
            TypeKeyword::Null => PrimitiveKind::NullType,
            TypeKeyword::Single(_) | TypeKeyword::Union(_) => {
                PrimitiveKind::Typed(self.type_keyword)
            }
            TypeKeyword::Absent => {
                if let Some(value) = self.const_value {
                    PrimitiveKind::Const(value)
                } else if self.is_composite() {
                    PrimitiveKind::Composite
                } else if self.enum_values.is_some() {
                    PrimitiveKind::Enum
                } else {
                    PrimitiveKind::Bare
                }
            }
        }
    }
}

/// A union member is basic unless it is an object, an array, an enum or a const.
pub fn is_basic(member: &Value) -> bool {
    let Some(map) = member.as_object() else {
        return true;
    };
    let ty = map.get("type").and_then(Value::as_str);
    ty != Some("object")
        && ty != Some("array")
        && !map.get("enum").is_some_and(Value::is_array)
        && !map.contains_key("const")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_rejects_non_objects() {
        assert!(NodeKeywords::classify(&json!("string")).is_none());
        assert!(NodeKeywords::classify(&json!([{"type": "string"}])).is_none());
        assert!(NodeKeywords::classify(&json!(null)).is_none());
    }

    #[test]
    fn classify_reads_keywords() {
        let node = json!({
            "type": "object",
            "title": "Customer",
            "required": ["id", 3, "name"],
            "properties": { "id": { "type": "string" } },
            "readOnly": true,
            "$comment": "hint"
        });
        let kw = NodeKeywords::classify(&node).unwrap();
        assert_eq!(kw.type_keyword, TypeKeyword::Single("object"));
        assert_eq!(kw.required, vec!["id", "name"]);
        assert_eq!(kw.title, Some("Customer"));
        assert!(kw.read_only);
        assert_eq!(kw.comment, Some("hint"));
        assert!(kw.properties.is_some());
        assert!(!kw.is_composite());
    }

    #[test]
    fn type_keyword_variants() {
        assert_eq!(TypeKeyword::parse(None), TypeKeyword::Absent);
        assert_eq!(TypeKeyword::parse(Some(&json!(null))), TypeKeyword::Null);
        assert_eq!(TypeKeyword::parse(Some(&json!(""))), TypeKeyword::Absent);
        assert_eq!(TypeKeyword::parse(Some(&json!(7))), TypeKeyword::Absent);

        let union = json!(["string", "null"]);
        let kw = TypeKeyword::parse(Some(&union));
        assert!(matches!(kw, TypeKeyword::Union(items) if items.len() == 2));
        assert_eq!(kw.tag().as_deref(), Some("string,null"));
    }

    #[test]
    fn type_tag_falls_back_to_enum_then_const() {
        let node = json!({ "enum": ["a", "b"] });
        assert_eq!(NodeKeywords::classify(&node).unwrap().type_tag(), "enum");

        let node = json!({ "const": 1 });
        assert_eq!(NodeKeywords::classify(&node).unwrap().type_tag(), "const");
    }

    #[test]
    fn primitive_kind_precedence() {
        let typed = json!({"type": "string", "const": "x"});
        let kw = NodeKeywords::classify(&typed).unwrap();
        assert!(matches!(kw.primitive_kind(), PrimitiveKind::Typed(_)));

        let null_type = json!({"type": null, "enum": [1]});
        let kw = NodeKeywords::classify(&null_type).unwrap();
        assert!(matches!(kw.primitive_kind(), PrimitiveKind::NullType));

        let constant = json!({"const": 0, "anyOf": []});
        let kw = NodeKeywords::classify(&constant).unwrap();
        assert!(matches!(kw.primitive_kind(), PrimitiveKind::Const(v) if *v == json!(0)));

        let composite = json!({"oneOf": [], "enum": [1]});
        let kw = NodeKeywords::classify(&composite).unwrap();
        assert!(matches!(kw.primitive_kind(), PrimitiveKind::Composite));

        let enumeration = json!({"enum": [1]});
        let kw = NodeKeywords::classify(&enumeration).unwrap();
        assert!(matches!(kw.primitive_kind(), PrimitiveKind::Enum));

        let bare = json!({"title": "x"});
        let kw = NodeKeywords::classify(&bare).unwrap();
        assert!(matches!(kw.primitive_kind(), PrimitiveKind::Bare));
    }

    #[test]
    fn basic_members() {
        assert!(is_basic(&json!({"type": "string"})));
        assert!(is_basic(&json!({"$ref": "#/$defs/a"})));
        assert!(is_basic(&json!("integer")));
        assert!(!is_basic(&json!({"type": "object"})));
        assert!(!is_basic(&json!({"type": "array"})));
        assert!(!is_basic(&json!({"enum": ["a"]})));
        assert!(!is_basic(&json!({"const": false})));
    }
}
