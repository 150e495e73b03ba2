//! Error types raised by the custom field subsystem.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// One failed check on a custom field definition, scoped to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttributeError {
    /// Attribute the message refers to (`name`, `field_type`, `enum_options`)
    #[schema(value_type = String)]
    pub attribute: &'static str,
    /// Message suffix, e.g. `"must be present for enum type fields"`
    pub message: String,
}

impl AttributeError {
    pub fn new(attribute: &'static str, message: impl Into<String>) -> Self {
        Self {
            attribute,
            message: message.into(),
        }
    }
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.message)
    }
}

/// A custom field definition failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid custom field definition: {}", join(.errors))]
pub struct DefinitionError {
    pub errors: Vec<AttributeError>,
}

impl DefinitionError {
    pub fn single(attribute: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![AttributeError::new(attribute, message)],
        }
    }

    /// Messages for the given attribute, in the order they were recorded.
    pub fn messages_for(&self, attribute: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|error| error.attribute == attribute)
            .map(|error| error.message.as_str())
            .collect()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// A single problem found while applying a batch of custom field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldValueError {
    /// The name did not resolve to a field of the building's client.
    #[error("Unknown custom field '{name}' for the client")]
    UnknownField { name: String },
    /// The value failed the field's type rule.
    #[error("Invalid value for '{name}': {message}")]
    InvalidValue { name: String, message: String },
}

impl FieldValueError {
    pub fn name(&self) -> &str {
        match self {
            FieldValueError::UnknownField { name } => name,
            FieldValueError::InvalidValue { name, .. } => name,
        }
    }
}

/// Every problem found in a rejected batch; nothing from the batch was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("custom field values rejected: {}", join(.errors))]
pub struct BulkSetError {
    pub errors: Vec<FieldValueError>,
}

impl BulkSetError {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_errors_render_api_messages() {
        let unknown = FieldValueError::UnknownField {
            name: "unknown_field".to_string(),
        };
        assert_eq!(
            unknown.to_string(),
            "Unknown custom field 'unknown_field' for the client"
        );

        let invalid = FieldValueError::InvalidValue {
            name: "num_field".to_string(),
            message: "must be a number".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "Invalid value for 'num_field': must be a number"
        );
    }

    #[test]
    fn definition_error_groups_by_attribute() {
        let error = DefinitionError {
            errors: vec![
                AttributeError::new("name", "can't be blank"),
                AttributeError::new("enum_options", "must be present for enum type fields"),
            ],
        };

        assert_eq!(
            error.messages_for("enum_options"),
            vec!["must be present for enum type fields"]
        );
        assert_eq!(
            error.full_messages(),
            vec![
                "name can't be blank".to_string(),
                "enum_options must be present for enum type fields".to_string(),
            ]
        );
    }
}
