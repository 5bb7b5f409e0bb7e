// ── Domain model ──
//
// Wire records come straight from devtrack-api; this module adds the
// store-side shapes: record patches, list filters and pagination.

mod filters;
mod pagination;
mod patch;

pub use devtrack_api::types::{
    CreateDeviation, Deviation, DeviationPriority, DeviationStats, DeviationStatus, ListParams,
    Page, SortOrder, UpdateDeviation,
};

pub use filters::{DeviationFilters, FilterUpdate};
pub use pagination::{Pagination, PaginationUpdate};
pub use patch::DeviationPatch;
