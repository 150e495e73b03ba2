//! # Data Models
//!
//! This module contains the SeaORM entities used throughout the buildings service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod building;
pub mod client;
pub mod custom_field;
pub mod custom_field_value;

pub use building::Entity as Building;
pub use client::Entity as Client;
pub use custom_field::Entity as CustomField;
pub use custom_field_value::Entity as CustomFieldValue;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "buildings".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
