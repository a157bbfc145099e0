//! Value checks for mapped properties.
//!
//! Property editors collect raw text. [`parse_input`] turns that text into a
//! JSON value according to the property's type, and [`validate_value`]
//! checks the result against the schema the property was mapped from.

use serde_json::Value;

use crate::error::{ValidateError, ValueError};
use crate::types::EntityProperty;

/// Parse editor text into a value for `property`.
///
/// Blank input yields `Ok(None)`.
///
/// # Errors
///
/// Returns `ValidateError::Unparseable` if the text does not fit the
/// property's type.
pub fn parse_input(property: &EntityProperty, input: &str) -> Result<Option<Value>, ValidateError> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let unparseable = || ValidateError::Unparseable {
        input: input.to_string(),
        expected: property.property_type.clone(),
    };

    let value = match property.property_type.as_str() {
        "integer" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| unparseable())?,
        "boolean" => match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(unparseable()),
        },
        "json" | "array" => serde_json::from_str(text).map_err(|_| unparseable())?,
        "string" if model_type(property) == Some("number") => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| Value::String(input.to_string()), Value::Number),
        _ => Value::String(input.to_string()),
    };
    Ok(Some(value))
}

/// Validate a value for `property`.
///
/// A missing value is only an error when the property is required.
/// Properties without a model accept any value.
///
/// # Errors
///
/// Returns `ValidateError::MissingRequired`, `ValidateError::InvalidModel`
/// if the property's model is not a usable schema, or
/// `ValidateError::Invalid` with every violation found.
pub fn validate_value(
    property: &EntityProperty,
    value: Option<&Value>,
) -> Result<(), ValidateError> {
    let Some(value) = value else {
        return if property.required {
            Err(ValidateError::MissingRequired {
                name: property.name.clone(),
            })
        } else {
            Ok(())
        };
    };
    let Some(model) = &property.model else {
        return Ok(());
    };

    let validator = jsonschema::validator_for(model).map_err(|e| ValidateError::InvalidModel {
        name: property.name.clone(),
        message: e.to_string(),
    })?;

    let errors: Vec<ValueError> = validator
        .iter_errors(value)
        .map(|e| ValueError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(property = %property.name, errors = errors.len(), "value rejected");
        Err(ValidateError::Invalid { errors })
    }
}

fn model_type(property: &EntityProperty) -> Option<&str> {
    property.model.as_ref()?.get("type")?.as_str()
}
