//! Transactional orchestration on top of the repositories.

pub mod buildings;

pub use buildings::{
    BuildingPage, BuildingService, BuildingView, BulkOutcome, RepositoryValueWriter, ValueWriter,
};
