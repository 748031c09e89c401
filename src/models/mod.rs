//! Request and Response models for the storefront API
//!
//! Query-string and envelope types. Entity payloads are not modelled here;
//! they are validated from raw JSON into `domain` inputs.

pub mod requests;
pub mod responses;

pub use requests::{ListProductsQuery, ProductSearchQuery, PurgeRequest, SearchQuery};
pub use responses::{
    ApiResponse, DeletedResponse, HealthResponse, PurgeResponse, SearchResults, StatsResponse,
};
