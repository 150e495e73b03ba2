//! Custom field definition checks.
//!
//! A [`ProposedField`] is an unsaved definition as submitted by schema
//! administration. [`ProposedField::validate`] runs every check that does not
//! need the database and folds in the uniqueness result supplied by the
//! repository, so one call reports every problem at once.

use serde::Deserialize;
use utoipa::ToSchema;

use super::errors::{AttributeError, DefinitionError};
use super::field_type::{FieldKind, FieldType};
use super::name::normalize_field_name;

pub const MSG_BLANK: &str = "can't be blank";
pub const MSG_TAKEN: &str = "has already been taken";
pub const MSG_NOT_INCLUDED: &str = "is not included in the list";
pub const MSG_ENUM_OPTIONS_REQUIRED: &str = "must be present for enum type fields";

/// An unsaved custom field definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ProposedField {
    /// Display label or identifier; normalized before it is stored
    #[schema(example = "Roof Type")]
    pub name: String,
    /// One of `number`, `freeform`, `enum`
    #[schema(example = "enum")]
    pub field_type: String,
    /// Allowed values, required for `enum` fields
    #[serde(default)]
    #[schema(example = json!(["Shingle", "Metal"]))]
    pub enum_options: Option<Vec<String>>,
}

impl ProposedField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            field_type: kind.as_str().to_string(),
            enum_options: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// The identifier this definition would be stored under.
    pub fn normalized_name(&self) -> String {
        normalize_field_name(&self.name)
    }

    /// Validates the definition. `name_taken` reports whether another field of
    /// the same client already uses the normalized name.
    pub fn validate(&self, name_taken: bool) -> Result<FieldDefinition, DefinitionError> {
        let mut errors = Vec::new();

        let name = self.normalized_name();
        if name.is_empty() {
            errors.push(AttributeError::new("name", MSG_BLANK));
        } else if name_taken {
            errors.push(AttributeError::new("name", MSG_TAKEN));
        }

        let field_type = match self.field_type.trim() {
            "" => {
                errors.push(AttributeError::new("field_type", MSG_BLANK));
                None
            }
            tag => match tag.parse::<FieldKind>() {
                Ok(kind) => build_field_type(kind, self.enum_options.as_deref(), &mut errors),
                Err(_) => {
                    errors.push(AttributeError::new("field_type", MSG_NOT_INCLUDED));
                    None
                }
            },
        };

        match field_type {
            Some(field_type) if errors.is_empty() => Ok(FieldDefinition { name, field_type }),
            _ => Err(DefinitionError { errors }),
        }
    }
}

/// A definition that passed validation and is ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDefinition {
    /// Options to persist; `None` unless the field is an enum.
    pub fn stored_options(&self) -> Option<Vec<String>> {
        match &self.field_type {
            FieldType::Enum { options } => Some(options.clone()),
            _ => None,
        }
    }
}

fn build_field_type(
    kind: FieldKind,
    options: Option<&[String]>,
    errors: &mut Vec<AttributeError>,
) -> Option<FieldType> {
    match kind {
        FieldKind::Number => Some(FieldType::Number),
        FieldKind::Freeform => Some(FieldType::Freeform),
        FieldKind::Enum => match options {
            Some(options) if !options.is_empty() => Some(FieldType::Enum {
                options: options.to_vec(),
            }),
            _ => {
                errors.push(AttributeError::new(
                    "enum_options",
                    MSG_ENUM_OPTIONS_REQUIRED,
                ));
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_name_on_success() {
        let definition = ProposedField::new("Building_Size", FieldKind::Number)
            .validate(false)
            .unwrap();
        assert_eq!(definition.name, "building_size");
        assert_eq!(definition.field_type, FieldType::Number);
    }

    #[test]
    fn enum_requires_options() {
        let missing = ProposedField::new("status", FieldKind::Enum)
            .validate(false)
            .unwrap_err();
        assert_eq!(
            missing.messages_for("enum_options"),
            vec![MSG_ENUM_OPTIONS_REQUIRED]
        );

        let empty = ProposedField::new("status", FieldKind::Enum)
            .with_options(Vec::<String>::new())
            .validate(false)
            .unwrap_err();
        assert_eq!(
            empty.messages_for("enum_options"),
            vec![MSG_ENUM_OPTIONS_REQUIRED]
        );
    }

    #[test]
    fn enum_keeps_declared_option_order() {
        let definition = ProposedField::new("roof_type", FieldKind::Enum)
            .with_options(["Shingle", "Metal"])
            .validate(false)
            .unwrap();
        assert_eq!(
            definition.stored_options(),
            Some(vec!["Shingle".to_string(), "Metal".to_string()])
        );
    }

    #[test]
    fn options_are_dropped_for_non_enum_types() {
        let definition = ProposedField::new("area", FieldKind::Number)
            .with_options(["ignored"])
            .validate(false)
            .unwrap();
        assert_eq!(definition.stored_options(), None);
    }

    #[test]
    fn rejects_unknown_type_with_generic_message() {
        let proposed = ProposedField {
            name: "color".to_string(),
            field_type: "colour".to_string(),
            enum_options: None,
        };
        let error = proposed.validate(false).unwrap_err();
        assert_eq!(error.messages_for("field_type"), vec![MSG_NOT_INCLUDED]);
        assert!(error.messages_for("enum_options").is_empty());
    }

    #[test]
    fn collects_every_problem() {
        let proposed = ProposedField {
            name: "--".to_string(),
            field_type: String::new(),
            enum_options: None,
        };
        let error = proposed.validate(false).unwrap_err();
        assert_eq!(
            error.full_messages(),
            vec!["name can't be blank", "field_type can't be blank"]
        );
    }

    #[test]
    fn reports_taken_name() {
        let error = ProposedField::new("Brick Color", FieldKind::Freeform)
            .validate(true)
            .unwrap_err();
        assert_eq!(error.messages_for("name"), vec![MSG_TAKEN]);
    }
}
