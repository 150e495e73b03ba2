//! # Custom Fields
//!
//! Client-defined typed attributes layered over buildings: the type rules,
//! name normalization, definition checks, projection of sparse stored values
//! into a dense view, and bulk-assignment planning. Everything here is pure;
//! persistence lives in [`crate::repositories`] and transactional
//! orchestration in [`crate::services`].

pub mod bulk;
pub mod definition;
pub mod errors;
pub mod field_type;
pub mod name;
pub mod projection;

pub use bulk::{
    BulkPlan, BulkSetPolicy, ErrorPolicy, PlannedWrite, ResolvedPlan, SchemaField,
    UnknownFieldPolicy, ValueAnnotation, plan_bulk_set, values_from_json,
};
pub use definition::{FieldDefinition, ProposedField};
pub use errors::{AttributeError, BulkSetError, DefinitionError, FieldValueError};
pub use field_type::{FieldKind, FieldType};
pub use name::normalize_field_name;
pub use projection::{Projection, project};
