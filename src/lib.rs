//! # Buildings API Library
//!
//! Buildings owned by clients, where every client defines its own typed
//! custom fields. This library provides the field rules, persistence,
//! transactional services and the HTTP layer.

pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;
