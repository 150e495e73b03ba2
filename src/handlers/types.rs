//! # Common API Types
//!
//! Shared response envelopes and pagination helpers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::PaginationConfig;
use crate::services::BuildingPage;

/// Status marker carried by every successful response body.
pub const SUCCESS: &str = "success";

/// Page selection for list endpoints.
///
/// Values are read leniently: a non-numeric or negative value counts as 0
/// and is then clamped.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number starting at 1
    #[param(example = "1")]
    pub page: Option<String>,
    /// Items per page (1-100, default 10)
    #[param(example = "10")]
    pub per_page: Option<String>,
}

impl PaginationQuery {
    /// Resolves to `(page, per_page)` under the configured limits.
    pub fn resolve(&self, limits: &PaginationConfig) -> (u64, u64) {
        limits.resolve(
            lenient_count(self.page.as_deref()),
            lenient_count(self.per_page.as_deref()),
        )
    }
}

fn lenient_count(raw: Option<&str>) -> Option<u64> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    Some(raw.parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0))
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PaginationMeta {
    #[schema(example = 1)]
    pub current_page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 3)]
    pub total_pages: u64,
    #[schema(example = 25)]
    pub total_count: u64,
}

impl From<&BuildingPage> for PaginationMeta {
    fn from(page: &BuildingPage) -> Self {
        Self {
            current_page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages(),
            total_count: page.total_count,
        }
    }
}

/// Response for deletions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "success")]
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: SUCCESS.to_string(),
            message: message.into(),
        }
    }
}
