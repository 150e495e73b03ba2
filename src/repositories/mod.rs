//! # Repository Layer
//!
//! Repositories wrap SeaORM queries for each table. They borrow any
//! [`sea_orm::ConnectionTrait`], so the same code runs against the pool or
//! inside a transaction.

pub mod building;
pub mod client;
pub mod custom_field;
pub mod custom_field_value;

pub use building::{BuildingAttributes, BuildingRepository};
pub use client::ClientRepository;
pub use custom_field::{CustomFieldRepository, FieldChanges};
pub use custom_field_value::CustomFieldValueRepository;
