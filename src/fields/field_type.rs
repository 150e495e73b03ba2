//! # Field Types
//!
//! The closed set of custom field types and the per-type value rules.
//!
//! [`FieldKind`] is the bare tag stored in the `custom_fields.field_type`
//! column and exchanged over the API. [`FieldType`] is the validated form a
//! definition is checked against: only the enum variant carries a payload
//! (its allowed options, in the order the client declared them).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message reported for a field type this build does not recognise.
pub const GENERIC_INVALID_MESSAGE: &str = "invalid value";

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d+)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("decimal pattern compiles")
});

/// Storage/API tag for a custom field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Freeform,
    Enum,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [FieldKind::Number, FieldKind::Freeform, FieldKind::Enum];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Freeform => "freeform",
            FieldKind::Enum => "enum",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted type tag is not one of [`FieldKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type '{0}'")]
pub struct UnknownFieldKind(pub String);

impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "number" => Ok(FieldKind::Number),
            "freeform" => Ok(FieldKind::Freeform),
            "enum" => Ok(FieldKind::Enum),
            other => Err(UnknownFieldKind(other.to_string())),
        }
    }
}

/// A field's declared type with everything needed to validate a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Freeform,
    Enum { options: Vec<String> },
}

impl FieldType {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldType::Number => FieldKind::Number,
            FieldType::Freeform => FieldKind::Freeform,
            FieldType::Enum { .. } => FieldKind::Enum,
        }
    }

    /// Enum options, or an empty slice for the other types.
    pub fn options(&self) -> &[String] {
        match self {
            FieldType::Enum { options } => options,
            _ => &[],
        }
    }

    /// Returns whether `raw` is acceptable for this type.
    ///
    /// Blank input (empty or whitespace only) is accepted for every type so
    /// that callers can clear a value without tripping the type check.
    pub fn is_valid(&self, raw: &str) -> bool {
        if is_blank(raw) {
            return true;
        }

        match self {
            FieldType::Number => is_decimal(raw),
            FieldType::Freeform => true,
            FieldType::Enum { options } => {
                let candidate = raw.to_lowercase();
                options
                    .iter()
                    .any(|option| option.to_lowercase() == candidate)
            }
        }
    }

    /// Human-readable reason a value was rejected; fixed per type.
    pub fn error_message(&self) -> String {
        match self {
            FieldType::Number => "must be a number".to_string(),
            FieldType::Enum { options } => format!("must be one of: {}", options.join(", ")),
            FieldType::Freeform => GENERIC_INVALID_MESSAGE.to_string(),
        }
    }
}

/// Blank means empty after trimming whitespace.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

fn is_decimal(raw: &str) -> bool {
    let trimmed = raw.trim();
    DECIMAL.is_match(trimmed) && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}
