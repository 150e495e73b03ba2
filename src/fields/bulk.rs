//! # Bulk Value Assignment
//!
//! Setting many custom field values on one building goes through a single
//! planning pass, parameterised by a [`BulkSetPolicy`]:
//!
//! - [`BulkSetPolicy::STRICT`] (API callers): unknown names are errors and any
//!   error rejects the whole batch, so nothing is written.
//! - [`BulkSetPolicy::LENIENT`] (seeding and other internal callers): unknown
//!   names are skipped and invalid values are reported as annotations while
//!   the valid siblings are still written.
//!
//! Planning is pure. The write side lives in
//! [`crate::services::buildings`], which applies a plan inside the caller's
//! transaction.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use uuid::Uuid;

use super::errors::{BulkSetError, FieldValueError};
use super::field_type::{FieldType, GENERIC_INVALID_MESSAGE, is_blank};
use super::name::normalize_field_name;

/// What to do with a name that matches no field of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    Reject,
    Skip,
}

/// What an error does to the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any error rejects the batch; nothing is written.
    AbortBatch,
    /// Invalid items are left out; valid items are still written.
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkSetPolicy {
    pub unknown_fields: UnknownFieldPolicy,
    pub on_error: ErrorPolicy,
}

impl BulkSetPolicy {
    pub const STRICT: BulkSetPolicy = BulkSetPolicy {
        unknown_fields: UnknownFieldPolicy::Reject,
        on_error: ErrorPolicy::AbortBatch,
    };

    pub const LENIENT: BulkSetPolicy = BulkSetPolicy {
        unknown_fields: UnknownFieldPolicy::Skip,
        on_error: ErrorPolicy::BestEffort,
    };
}

/// A client's field as seen by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub id: Uuid,
    pub name: String,
    /// `None` when the stored definition carries an unrecognised type tag.
    pub field_type: Option<FieldType>,
}

impl SchemaField {
    /// Applies the field's rule to a raw value. Blank always passes.
    pub fn check(&self, raw: &str) -> Result<(), String> {
        if is_blank(raw) {
            return Ok(());
        }
        match &self.field_type {
            Some(field_type) if field_type.is_valid(raw) => Ok(()),
            Some(field_type) => Err(field_type.error_message()),
            None => Err(GENERIC_INVALID_MESSAGE.to_string()),
        }
    }
}

/// One value that passed its checks and should be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub field_id: Uuid,
    pub field_name: String,
    pub value: String,
}

/// Result of planning a batch, before the policy's error rule is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPlan {
    pub writes: Vec<PlannedWrite>,
    pub errors: Vec<FieldValueError>,
    /// Names dropped under [`UnknownFieldPolicy::Skip`].
    pub skipped: Vec<String>,
}

impl BulkPlan {
    /// Applies the error rule: under [`ErrorPolicy::AbortBatch`] any recorded
    /// error rejects the batch with every error attached.
    pub fn resolve(self, policy: BulkSetPolicy) -> Result<ResolvedPlan, BulkSetError> {
        match policy.on_error {
            ErrorPolicy::AbortBatch if !self.errors.is_empty() => {
                Err(BulkSetError { errors: self.errors })
            }
            ErrorPolicy::AbortBatch => Ok(ResolvedPlan {
                writes: self.writes,
                annotations: Vec::new(),
            }),
            ErrorPolicy::BestEffort => Ok(ResolvedPlan {
                writes: self.writes,
                annotations: self
                    .errors
                    .into_iter()
                    .filter_map(ValueAnnotation::from_error)
                    .collect(),
            }),
        }
    }
}

/// Writes to perform plus the annotations best-effort mode keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub writes: Vec<PlannedWrite>,
    pub annotations: Vec<ValueAnnotation>,
}

/// An invalid value recorded against a building without failing the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueAnnotation {
    pub name: String,
    pub message: String,
}

impl ValueAnnotation {
    fn from_error(error: FieldValueError) -> Option<Self> {
        match error {
            FieldValueError::InvalidValue { name, message } => Some(Self { name, message }),
            FieldValueError::UnknownField { .. } => None,
        }
    }
}

impl fmt::Display for ValueAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value for custom field '{}': {}",
            self.name, self.message
        )
    }
}

/// Checks each `(name, raw value)` pair against the client's schema.
///
/// Names are resolved by their normalized form. Errors are collected, never
/// short-circuited, and keep the input order.
pub fn plan_bulk_set(
    schema: &[SchemaField],
    input: &[(String, String)],
    policy: BulkSetPolicy,
) -> BulkPlan {
    let by_name: HashMap<&str, &SchemaField> = schema
        .iter()
        .map(|field| (field.name.as_str(), field))
        .collect();

    let mut plan = BulkPlan::default();

    for (name, raw) in input {
        let Some(field) = by_name.get(normalize_field_name(name).as_str()) else {
            match policy.unknown_fields {
                UnknownFieldPolicy::Reject => plan
                    .errors
                    .push(FieldValueError::UnknownField { name: name.clone() }),
                UnknownFieldPolicy::Skip => plan.skipped.push(name.clone()),
            }
            continue;
        };

        match field.check(raw) {
            Ok(()) => plan.writes.push(PlannedWrite {
                field_id: field.id,
                field_name: field.name.clone(),
                value: raw.trim().to_string(),
            }),
            Err(message) => plan.errors.push(FieldValueError::InvalidValue {
                name: name.clone(),
                message,
            }),
        }
    }

    plan
}

/// Flattens a JSON object of custom field values into ordered pairs.
///
/// Strings are taken as-is, numbers and booleans use their JSON text and
/// `null` becomes the empty string. Returns `None` when `value` is not an
/// object.
pub fn values_from_json(value: &Value) -> Option<Vec<(String, String)>> {
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .map(|(name, value)| (name.clone(), json_scalar_to_string(value)))
            .collect(),
    )
}

fn json_scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Schema {
        fields: Vec<SchemaField>,
    }

    impl Schema {
        fn new() -> Self {
            Self {
                fields: vec![
                    SchemaField {
                        id: Uuid::new_v4(),
                        name: "area_sqft".to_string(),
                        field_type: Some(FieldType::Number),
                    },
                    SchemaField {
                        id: Uuid::new_v4(),
                        name: "roof_type".to_string(),
                        field_type: Some(FieldType::Enum {
                            options: vec!["Shingle".to_string(), "Metal".to_string()],
                        }),
                    },
                    SchemaField {
                        id: Uuid::new_v4(),
                        name: "brick_color".to_string(),
                        field_type: Some(FieldType::Freeform),
                    },
                ],
            }
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn strict_collects_every_error() {
        let schema = Schema::new();
        let input = pairs(&[
            ("area_sqft", "abc"),
            ("unknown_field", "value"),
            ("roof_type", "Wood"),
            ("brick_color", "Red"),
        ]);

        let plan = plan_bulk_set(&schema.fields, &input, BulkSetPolicy::STRICT);
        let error = plan.resolve(BulkSetPolicy::STRICT).unwrap_err();

        assert_eq!(
            error.messages(),
            vec![
                "Invalid value for 'area_sqft': must be a number",
                "Unknown custom field 'unknown_field' for the client",
                "Invalid value for 'roof_type': must be one of: Shingle, Metal",
            ]
        );
    }

    #[test]
    fn strict_accepts_a_clean_batch() {
        let schema = Schema::new();
        let input = pairs(&[("area_sqft", "25000"), ("roof_type", "shingle")]);

        let resolved = plan_bulk_set(&schema.fields, &input, BulkSetPolicy::STRICT)
            .resolve(BulkSetPolicy::STRICT)
            .unwrap();

        assert_eq!(resolved.writes.len(), 2);
        assert_eq!(resolved.writes[1].value, "shingle");
        assert!(resolved.annotations.is_empty());
    }

    #[test]
    fn names_resolve_through_normalization() {
        let schema = Schema::new();
        let input = pairs(&[("Roof Type", "Metal"), ("AREA_SQFT", "12.5")]);

        let plan = plan_bulk_set(&schema.fields, &input, BulkSetPolicy::STRICT);

        assert!(plan.errors.is_empty());
        assert_eq!(plan.writes[0].field_name, "roof_type");
        assert_eq!(plan.writes[1].field_name, "area_sqft");
    }

    #[test]
    fn blank_values_are_planned_as_empty_writes() {
        let schema = Schema::new();
        let input = pairs(&[("area_sqft", "   "), ("roof_type", "")]);

        let plan = plan_bulk_set(&schema.fields, &input, BulkSetPolicy::STRICT);

        assert!(plan.errors.is_empty());
        assert!(plan.writes.iter().all(|write| write.value.is_empty()));
    }

    #[test]
    fn lenient_skips_unknown_and_keeps_valid_siblings() {
        let schema = Schema::new();
        let input = pairs(&[
            ("area_sqft", "not_a_number"),
            ("unknown_field", "value"),
            ("brick_color", "Red"),
        ]);

        let plan = plan_bulk_set(&schema.fields, &input, BulkSetPolicy::LENIENT);
        assert_eq!(plan.skipped, vec!["unknown_field".to_string()]);

        let resolved = plan.resolve(BulkSetPolicy::LENIENT).unwrap();
        assert_eq!(resolved.writes.len(), 1);
        assert_eq!(resolved.writes[0].field_name, "brick_color");
        assert_eq!(
            resolved
                .annotations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["Invalid value for custom field 'area_sqft': must be a number"]
        );
    }

    #[test]
    fn unrecognised_stored_type_rejects_non_blank_values() {
        let fields = vec![SchemaField {
            id: Uuid::new_v4(),
            name: "legacy".to_string(),
            field_type: None,
        }];

        let plan = plan_bulk_set(
            &fields,
            &pairs(&[("legacy", "x")]),
            BulkSetPolicy::STRICT,
        );

        assert_eq!(
            plan.errors,
            vec![FieldValueError::InvalidValue {
                name: "legacy".to_string(),
                message: "invalid value".to_string(),
            }]
        );
    }

    #[test]
    fn values_from_json_stringifies_scalars() {
        let values = values_from_json(&json!({
            "area_sqft": 25000,
            "roof_type": "Metal",
            "flag": true,
            "gone": null,
        }))
        .unwrap();

        assert!(values.contains(&("area_sqft".to_string(), "25000".to_string())));
        assert!(values.contains(&("roof_type".to_string(), "Metal".to_string())));
        assert!(values.contains(&("flag".to_string(), "true".to_string())));
        assert!(values.contains(&("gone".to_string(), String::new())));
        assert!(values_from_json(&json!("not a hash")).is_none());
    }
}
