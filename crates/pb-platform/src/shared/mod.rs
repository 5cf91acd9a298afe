//! Shared infrastructure used by every aggregate.

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod http;
pub mod token_cache;
