//! Response models for the feed cache API
//!
//! DTOs serialized into HTTP response bodies. The read-only API carries no
//! request bodies; query parameters deserialize straight into
//! [`crate::cache::FeedParams`].

pub mod responses;

pub use responses::{
    BatchResponse, ClearResponse, ErrorResponse, HealthResponse, IndicatorResponse,
    InvalidateResponse, StatsResponse,
};
