//! Database seeding functionality
//!
//! This module populates a fresh database with demo clients, their custom
//! field definitions and a few buildings.

pub mod demo;

pub use demo::{SeedSummary, seed_demo_data};
