//! Dense view of a building's custom field values.
//!
//! Stored values are sparse. Projection walks every field of the building's
//! client and fills in `""` where nothing is stored, so consumers can tell
//! "unset" (empty string) apart from "not a field of this client" (no key).

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

/// Field name to value, one entry per field of the client.
pub type Projection = BTreeMap<String, String>;

/// Builds the projection from the client's fields (`(field id, current name)`)
/// and the building's stored values keyed by field id.
///
/// Stored values whose field is not in `fields` are ignored.
pub fn project<'a, I>(fields: I, stored: &HashMap<Uuid, String>) -> Projection
where
    I: IntoIterator<Item = (Uuid, &'a str)>,
{
    fields
        .into_iter()
        .map(|(field_id, name)| {
            let value = stored.get(&field_id).cloned().unwrap_or_default();
            (name.to_string(), value)
        })
        .collect()
}
